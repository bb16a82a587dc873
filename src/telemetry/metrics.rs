//! Prometheus metrics

use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;

/// Counter metric types
#[derive(Debug, Clone, Copy)]
pub enum CounterMetric {
    /// Ticker frames that updated the cache
    FramesApplied,
    /// Well-formed frames that were not ticker updates
    FramesIgnored,
    /// Frames dropped for bad JSON or shape
    FramesMalformed,
    /// Buy/sell operations that settled
    TradesExecuted,
    /// Buy/sell operations rejected by validation or business rules
    TradesRejected,
}

/// Gauge metric types
#[derive(Debug, Clone, Copy)]
pub enum GaugeMetric {
    /// Current account balance
    AccountBalance,
    /// Instruments with a known price
    CachedSymbols,
}

/// Increment a counter by one
pub fn increment(metric: CounterMetric) {
    let name = match metric {
        CounterMetric::FramesApplied => "krakensim_ticker_frames_applied_total",
        CounterMetric::FramesIgnored => "krakensim_ticker_frames_ignored_total",
        CounterMetric::FramesMalformed => "krakensim_ticker_frames_malformed_total",
        CounterMetric::TradesExecuted => "krakensim_trades_executed_total",
        CounterMetric::TradesRejected => "krakensim_trades_rejected_total",
    };
    metrics::counter!(name).increment(1);
}

/// Set a gauge value
pub fn set_gauge(metric: GaugeMetric, value: f64) {
    let name = match metric {
        GaugeMetric::AccountBalance => "krakensim_account_balance",
        GaugeMetric::CachedSymbols => "krakensim_cached_symbols",
    };
    metrics::gauge!(name).set(value);
}

/// Start the Prometheus exporter on the given port
pub fn init_metrics(port: u16) -> anyhow::Result<()> {
    let addr: SocketAddr = ([0, 0, 0, 0], port).into();
    PrometheusBuilder::new()
        .with_http_listener(addr)
        .install()
        .map_err(|e| anyhow::anyhow!("Failed to start metrics exporter: {}", e))?;

    tracing::info!(%addr, "Prometheus exporter listening");
    Ok(())
}
