//! WebSocket client with bounded automatic reconnection

use super::types::{WsConfig, WsError, WsEvent};
use futures_util::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tokio::time::sleep;
use tokio_tungstenite::{connect_async, tungstenite::Message};

/// Reusable WebSocket client.
///
/// Spawns a background task that owns the connection, reconnects with
/// exponential backoff up to a bounded number of attempts, and keeps the
/// connection alive with ping/pong. Outbound messages queued on the returned
/// sender are written to whichever connection is currently live, so a
/// subscription sent after each [`WsEvent::Connected`] survives reconnects.
pub struct WsClient {
    config: WsConfig,
}

impl WsClient {
    /// Create a new WebSocket client with the given configuration
    pub fn new(config: WsConfig) -> Self {
        Self { config }
    }

    /// Get the configured URL
    pub fn url(&self) -> &str {
        &self.config.url
    }

    /// Connect and return an event receiver plus an outbound text sender
    pub fn connect(&self) -> (mpsc::Receiver<WsEvent>, mpsc::Sender<String>) {
        let (event_tx, event_rx) = mpsc::channel(1024);
        let (send_tx, send_rx) = mpsc::channel(256);
        let config = self.config.clone();

        tokio::spawn(async move {
            if let Err(e) = Self::run_connection_loop(config, event_tx, send_rx).await {
                tracing::error!(error = %e, "WebSocket connection loop failed");
            }
        });

        (event_rx, send_tx)
    }

    /// Run the connection loop with bounded reconnection
    async fn run_connection_loop(
        config: WsConfig,
        tx: mpsc::Sender<WsEvent>,
        mut send_rx: mpsc::Receiver<String>,
    ) -> Result<(), WsError> {
        let mut reconnect_attempts = 0;
        let mut reconnect_delay = config.initial_reconnect_delay;

        loop {
            match Self::connect_and_stream(&config, &tx, &mut send_rx).await {
                Ok(()) => {
                    tracing::info!("WebSocket connection closed cleanly");
                    let _ = tx.send(WsEvent::Disconnected).await;
                    break;
                }
                Err(e) => {
                    reconnect_attempts += 1;
                    tracing::warn!(
                        error = %e,
                        attempt = reconnect_attempts,
                        "WebSocket connection error, reconnecting..."
                    );

                    // 0 = retry forever
                    if config.max_reconnect_attempts > 0
                        && reconnect_attempts >= config.max_reconnect_attempts
                    {
                        tracing::error!("Max reconnection attempts reached");
                        let _ = tx.send(WsEvent::Disconnected).await;
                        return Err(WsError::MaxReconnectsExceeded);
                    }

                    if tx.is_closed() {
                        tracing::info!("Receiver dropped, stopping reconnection");
                        break;
                    }

                    let _ = tx
                        .send(WsEvent::Reconnecting {
                            attempt: reconnect_attempts,
                        })
                        .await;

                    sleep(reconnect_delay).await;
                    reconnect_delay = (reconnect_delay * 2).min(config.max_reconnect_delay);
                }
            }
        }

        Ok(())
    }

    /// Connect once and stream until the connection drops
    async fn connect_and_stream(
        config: &WsConfig,
        tx: &mpsc::Sender<WsEvent>,
        send_rx: &mut mpsc::Receiver<String>,
    ) -> Result<(), WsError> {
        tracing::info!(url = %config.url, "Connecting to WebSocket");

        let (ws_stream, _response) = connect_async(&config.url)
            .await
            .map_err(|e| WsError::ConnectionFailed(e.to_string()))?;

        let (mut write, mut read) = ws_stream.split();

        if tx.send(WsEvent::Connected).await.is_err() {
            return Ok(());
        }

        let mut ping_interval = tokio::time::interval(config.ping_interval);
        ping_interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

        let mut waiting_for_pong = false;

        loop {
            tokio::select! {
                msg = read.next() => {
                    match msg {
                        Some(Ok(Message::Text(text))) => {
                            if tx.send(WsEvent::Frame(text)).await.is_err() {
                                tracing::debug!("Receiver dropped, closing connection");
                                return Ok(());
                            }
                        }
                        Some(Ok(Message::Ping(data))) => {
                            write.send(Message::Pong(data)).await
                                .map_err(|e| WsError::SendFailed(e.to_string()))?;
                        }
                        Some(Ok(Message::Pong(_))) => {
                            waiting_for_pong = false;
                        }
                        Some(Ok(Message::Close(_))) => {
                            tracing::info!("Received close frame");
                            return Ok(());
                        }
                        Some(Err(e)) => {
                            return Err(WsError::ConnectionFailed(e.to_string()));
                        }
                        None => {
                            return Err(WsError::ConnectionFailed("Stream ended unexpectedly".into()));
                        }
                        _ => {}
                    }
                }

                msg = send_rx.recv() => {
                    match msg {
                        Some(text) => {
                            write.send(Message::Text(text)).await
                                .map_err(|e| WsError::SendFailed(e.to_string()))?;
                        }
                        None => {
                            // Sender dropped, close connection
                            return Ok(());
                        }
                    }
                }

                _ = ping_interval.tick() => {
                    if waiting_for_pong {
                        return Err(WsError::ConnectionFailed("Pong timeout".into()));
                    }
                    write.send(Message::Ping(vec![])).await
                        .map_err(|e| WsError::SendFailed(e.to_string()))?;
                    waiting_for_pong = true;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_ws_client_creation() {
        let client = WsClient::new(WsConfig::new("wss://example.com"));
        assert_eq!(client.url(), "wss://example.com");
    }

    #[tokio::test]
    async fn test_ws_client_connection_failure() {
        // Connecting to an unresolvable host should retry, then give up
        let client = WsClient::new(
            WsConfig::new("wss://invalid.localhost.test:12345")
                .max_reconnects(2)
                .initial_delay(Duration::from_millis(10)),
        );

        let (mut rx, _tx) = client.connect();

        let mut got_reconnecting = false;
        let mut got_disconnect = false;
        let timeout = tokio::time::timeout(Duration::from_secs(5), async {
            while let Some(event) = rx.recv().await {
                match event {
                    WsEvent::Disconnected => {
                        got_disconnect = true;
                        break;
                    }
                    WsEvent::Reconnecting { .. } => got_reconnecting = true,
                    _ => {}
                }
            }
        });

        timeout.await.expect("Test timed out");
        assert!(got_reconnecting, "Should attempt to reconnect");
        assert!(got_disconnect, "Should give up with Disconnected");
    }
}
