//! Live price feed
//!
//! Discovery of the instrument set, the streaming ticker ingest, and the
//! shared last-price cache it fills.

mod cache;
mod discovery;
mod kraken;

pub use cache::PriceCache;
pub use discovery::DiscoveryClient;
pub use kraken::{decode_frame, DecodeOutcome, IgnoreReason, KrakenFeed};
