//! Resolved Transactions Stream: long-lived WebSocket subscriber.
//!
//! Connects once to the gateway's `resolvedTransactionsStream` and reports
//! every decoded trade. Any receive or decode failure ends the consumer:
//! there is no reconnect loop.
//!
//! Architecture:
//!   Gateway WS ──frame──→ decode ──→ ResolvedTransaction ──→ log (+ optional sink)

use anyhow::{bail, Context, Result};
use futures::StreamExt;
use tokio::sync::mpsc;
use tokio_tungstenite::{connect_async, tungstenite::Message};
use tracing::{debug, error, info};
use url::Url;

use super::types::ResolvedTransaction;

pub struct TransactionStream {
    url: Url,
    sink: Option<mpsc::Sender<ResolvedTransaction>>,
}

impl TransactionStream {
    pub fn new(url: Url) -> Self {
        Self { url, sink: None }
    }

    /// Forward each decoded transaction to `sink` in addition to logging it.
    pub fn with_sink(mut self, sink: mpsc::Sender<ResolvedTransaction>) -> Self {
        self.sink = Some(sink);
        self
    }

    /// Actor main loop. Returns only when the stream fails.
    pub async fn run(self) {
        info!(url = %self.url, "📡 Subscribing to resolved transactions stream");
        if let Err(err) = self.listen().await {
            error!("📡 Resolved transactions stream stopped: {:#}", err);
        }
    }

    async fn listen(&self) -> Result<()> {
        let (mut ws, response) = connect_async(self.url.as_str())
            .await
            .with_context(|| format!("WS connect to {} failed", self.url))?;
        info!("✅ Stream connected (status={:?})", response.status());

        let mut received: u64 = 0;
        while let Some(msg) = ws.next().await {
            let msg = msg.context("WS receive failed")?;
            let Some(tx) = decode_frame(&msg)? else {
                continue;
            };

            received += 1;
            info!(
                "🔁 Resolved transaction #{}: id={} {} {:.4}@{:.4} buyer={} seller={} ts={}",
                received,
                tx.transaction_id,
                tx.asset,
                tx.quantity,
                tx.price,
                tx.buyer,
                tx.seller,
                tx.timestamp,
            );

            if let Some(sink) = &self.sink {
                let _ = sink.send(tx).await;
            }
        }

        bail!("stream ended after {} transactions", received)
    }
}

/// Decode one WS frame. Control frames yield `None`; a close frame or an
/// undecodable payload is an error.
pub fn decode_frame(msg: &Message) -> Result<Option<ResolvedTransaction>> {
    match msg {
        Message::Text(text) => serde_json::from_str(text)
            .map(Some)
            .with_context(|| format!("undecodable transaction frame: {}", text)),
        Message::Binary(bytes) => serde_json::from_slice(bytes)
            .map(Some)
            .context("undecodable binary transaction frame"),
        Message::Close(frame) => bail!("stream closed by server: {:?}", frame),
        Message::Ping(_) | Message::Pong(_) | Message::Frame(_) => {
            debug!("📡 control frame skipped");
            Ok(None)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FRAME: &str = r#"{"transactionId":"7f1c","asset":"BTC","price":1178.2,"quantity":2.5,"timestamp":"2024-03-01T10:15:30.120Z","buyer":"trader1","seller":"trader4"}"#;

    fn expected() -> ResolvedTransaction {
        ResolvedTransaction {
            transaction_id: "7f1c".to_string(),
            asset: "BTC".to_string(),
            price: 1178.2,
            quantity: 2.5,
            timestamp: "2024-03-01T10:15:30.120Z".to_string(),
            buyer: "trader1".to_string(),
            seller: "trader4".to_string(),
        }
    }

    #[test]
    fn test_text_frame_decodes_every_field() {
        let tx = decode_frame(&Message::Text(FRAME.to_string())).unwrap().unwrap();
        assert_eq!(tx, expected());
    }

    #[test]
    fn test_binary_frame_decodes() {
        let tx = decode_frame(&Message::Binary(FRAME.as_bytes().to_vec())).unwrap().unwrap();
        assert_eq!(tx, expected());
    }

    #[test]
    fn test_control_frames_skipped() {
        assert!(decode_frame(&Message::Ping(vec![1, 2])).unwrap().is_none());
        assert!(decode_frame(&Message::Pong(vec![])).unwrap().is_none());
    }

    #[test]
    fn test_close_and_garbage_are_fatal() {
        assert!(decode_frame(&Message::Close(None)).is_err());
        assert!(decode_frame(&Message::Text("PONG".to_string())).is_err());
        // missing seller
        let partial = r#"{"transactionId":"1","asset":"BTC","price":1.0,"quantity":1.0,"timestamp":"t","buyer":"a"}"#;
        assert!(decode_frame(&Message::Text(partial.to_string())).is_err());
    }

    #[tokio::test]
    async fn test_run_returns_when_gateway_unreachable() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let url = Url::parse(&format!("ws://{}/resolvedTransactionsStream", addr)).unwrap();
        let (tx, mut rx) = mpsc::channel(4);
        TransactionStream::new(url).with_sink(tx).run().await;
        assert!(rx.recv().await.is_none());
    }
}
