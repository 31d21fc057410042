//! Live board subscription over WebSocket
//!
//! The server sends `Ready` on connect (and again after lag or `resync`),
//! then one `Change` per row change.

use futures::{SinkExt, StreamExt};
use shared::message::{LiveCommand, LiveMessage};
use tokio_tungstenite::MaybeTlsStream;
use tokio_tungstenite::tungstenite::Message;

use crate::{ClientConfig, ClientError, ClientResult};

pub type WsStream = tokio_tungstenite::WebSocketStream<MaybeTlsStream<tokio::net::TcpStream>>;

/// Connection to `GET /api/live/ws`
pub struct LiveClient {
    ws: WsStream,
}

impl LiveClient {
    pub async fn connect(config: &ClientConfig) -> ClientResult<Self> {
        let url = config.live_url();
        let (ws, _response) = tokio_tungstenite::connect_async(url.as_str()).await?;
        tracing::info!(url = %url, "Live board connected");
        Ok(Self { ws })
    }

    /// Next board message. Pings are answered, unknown text frames skipped.
    pub async fn next_message(&mut self) -> ClientResult<LiveMessage> {
        loop {
            match self.ws.next().await {
                Some(Ok(Message::Text(text))) => match serde_json::from_str(&text) {
                    Ok(msg) => return Ok(msg),
                    Err(e) => tracing::warn!(error = %e, "Skipping unreadable live message"),
                },
                Some(Ok(Message::Ping(data))) => {
                    self.ws.send(Message::Pong(data)).await?;
                }
                Some(Ok(Message::Close(_))) | None => return Err(ClientError::Closed),
                Some(Err(e)) => return Err(e.into()),
                _ => {} // Binary, Pong
            }
        }
    }

    /// Ask the server for a fresh `Ready` snapshot
    pub async fn resync(&mut self) -> ClientResult<()> {
        let json = serde_json::to_string(&LiveCommand::Resync)?;
        self.ws.send(Message::Text(json.into())).await?;
        Ok(())
    }

    pub async fn close(mut self) -> ClientResult<()> {
        self.ws.close(None).await?;
        Ok(())
    }
}
