//! WebSocket transport
//!
//! Reusable client with bounded reconnection and ping/pong keepalive

mod client;
mod types;

pub use client::WsClient;
pub use types::{WsConfig, WsError, WsEvent};
