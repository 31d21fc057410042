//! Live board WebSocket
//!
//! GET /api/live/ws
//!
//! Protocol:
//! - Server → client: LiveMessage (Ready, Change)
//! - Client → server: LiveCommand (Resync)

use std::sync::atomic::{AtomicUsize, Ordering};

use axum::extract::State;
use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::http::{Extensions, HeaderMap};
use axum::response::IntoResponse;
use futures::{SinkExt, StreamExt};
use shared::error::{AppError, ErrorCode};
use shared::message::{LiveCommand, LiveMessage};
use tokio::sync::broadcast;
use tokio::time::Duration;

use crate::auth::rate_limit::client_ip;
use crate::live::HubEvent;
use crate::state::AppState;

/// Maximum concurrent live sessions per client IP
const MAX_LIVE_WS_PER_IP: usize = 20;

const PING_INTERVAL: Duration = Duration::from_secs(30);

/// Holds one slot of the per-IP session budget until dropped
struct SessionSlot {
    state: AppState,
    ip: String,
}

impl SessionSlot {
    fn acquire(state: &AppState, ip: String) -> Result<Self, AppError> {
        let counter = state
            .live_connections
            .entry(ip.clone())
            .or_insert_with(|| AtomicUsize::new(0));
        let prev = counter.fetch_add(1, Ordering::SeqCst);
        if prev >= MAX_LIVE_WS_PER_IP {
            counter.fetch_sub(1, Ordering::SeqCst);
            return Err(AppError::with_message(
                ErrorCode::TooManyRequests,
                format!("Too many live connections ({prev}/{MAX_LIVE_WS_PER_IP})"),
            ));
        }
        drop(counter);
        Ok(Self {
            state: state.clone(),
            ip,
        })
    }
}

impl Drop for SessionSlot {
    fn drop(&mut self) {
        if let Some(counter) = self.state.live_connections.get(&self.ip) {
            counter.fetch_sub(1, Ordering::SeqCst);
        }
        self.state
            .live_connections
            .remove_if(&self.ip, |_, c| c.load(Ordering::SeqCst) == 0);
    }
}

/// GET /api/live/ws
pub async fn handle_live_ws(
    State(state): State<AppState>,
    headers: HeaderMap,
    extensions: Extensions,
    ws: WebSocketUpgrade,
) -> Result<impl IntoResponse, AppError> {
    let ip = client_ip(&headers, &extensions);
    let slot = SessionSlot::acquire(&state, ip)?;
    Ok(ws.on_upgrade(move |socket| live_session(socket, state, slot)))
}

async fn live_session(socket: WebSocket, state: AppState, slot: SessionSlot) {
    let (mut sink, mut stream) = socket.split();
    let ip = slot.ip.clone();

    tracing::info!(ip = %ip, "Live WS connected");

    // Subscribe before taking the snapshot so nothing falls in between
    let mut hub_rx = state.hub.subscribe();

    if send_message(&mut sink, &state.hub.snapshot().await)
        .await
        .is_err()
    {
        return;
    }

    let mut ping_interval = tokio::time::interval(PING_INTERVAL);
    ping_interval.tick().await; // skip immediate

    loop {
        tokio::select! {
            _ = ping_interval.tick() => {
                if sink.send(Message::Ping(vec![].into())).await.is_err() {
                    break;
                }
            }

            event = hub_rx.recv() => {
                let msg = match event {
                    Ok(HubEvent::Change(change)) => LiveMessage::Change { change },
                    Ok(HubEvent::Reloaded) => state.hub.snapshot().await,
                    Err(broadcast::error::RecvError::Lagged(n)) => {
                        tracing::warn!(ip = %ip, lagged = n, "Live subscriber lagged, resending snapshot");
                        hub_rx = state.hub.subscribe();
                        state.hub.snapshot().await
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                };
                if send_message(&mut sink, &msg).await.is_err() {
                    break;
                }
            }

            msg = stream.next() => {
                match msg {
                    Some(Ok(Message::Text(text))) => {
                        match serde_json::from_str::<LiveCommand>(&text) {
                            Ok(LiveCommand::Resync) => {
                                if send_message(&mut sink, &state.hub.snapshot().await).await.is_err() {
                                    break;
                                }
                            }
                            Err(e) => tracing::debug!(ip = %ip, error = %e, "Ignoring unknown live command"),
                        }
                    }
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Err(_)) => break,
                    _ => {}
                }
            }
        }
    }

    tracing::info!(ip = %ip, "Live WS disconnected");
    drop(slot);
}

async fn send_message<S>(sink: &mut S, msg: &LiveMessage) -> Result<(), ()>
where
    S: futures::Sink<Message, Error = axum::Error> + Unpin,
{
    let json = serde_json::to_string(msg).map_err(|_| ())?;
    sink.send(Message::Text(json.into())).await.map_err(|_| ())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{spawn_http, test_state};
    use futures::{SinkExt, StreamExt};
    use shared::message::BoardChange;
    use shared::models::Seat;
    use tokio_tungstenite::tungstenite::Message as WsMessage;

    async fn next_live(
        ws: &mut tokio_tungstenite::WebSocketStream<
            tokio_tungstenite::MaybeTlsStream<tokio::net::TcpStream>,
        >,
    ) -> LiveMessage {
        loop {
            match ws.next().await.unwrap().unwrap() {
                WsMessage::Text(text) => return serde_json::from_str(&text).unwrap(),
                _ => continue,
            }
        }
    }

    #[tokio::test]
    async fn session_sends_ready_then_changes() {
        let state = test_state(vec![]);
        let hub = state.hub.clone();
        let base = spawn_http(crate::api::create_router(state, None)).await;
        let url = format!("{}/api/live/ws", base.replace("http://", "ws://"));

        let (mut ws, _) = tokio_tungstenite::connect_async(url).await.unwrap();

        match next_live(&mut ws).await {
            LiveMessage::Ready { seats, .. } => assert_eq!(seats.len(), 8),
            other => panic!("Expected Ready, got {other:?}"),
        }

        let seat = Seat {
            id: 2,
            name: Some("Yuki".into()),
            is_occupied: true,
            updated_date: "11:00".into(),
        };
        hub.apply(BoardChange::SeatUpserted { seat: seat.clone() }, "11:00")
            .await;
        match next_live(&mut ws).await {
            LiveMessage::Change {
                change: BoardChange::SeatUpserted { seat: got },
            } => assert_eq!(got, seat),
            other => panic!("Expected Change, got {other:?}"),
        }

        ws.send(WsMessage::Text(r#"{"type":"resync"}"#.into()))
            .await
            .unwrap();
        match next_live(&mut ws).await {
            LiveMessage::Ready { seats, .. } => {
                assert_eq!(seats[1].name.as_deref(), Some("Yuki"))
            }
            other => panic!("Expected Ready, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn session_budget_is_per_ip() {
        let state = test_state(vec![]);
        let slots: Vec<SessionSlot> = (0..MAX_LIVE_WS_PER_IP)
            .map(|_| SessionSlot::acquire(&state, "10.1.1.1".into()).unwrap())
            .collect();

        assert!(SessionSlot::acquire(&state, "10.1.1.1".into()).is_err());
        assert!(SessionSlot::acquire(&state, "10.1.1.2".into()).is_ok());

        drop(slots);
        assert!(!state.live_connections.contains_key("10.1.1.1"));
        assert!(SessionSlot::acquire(&state, "10.1.1.1".into()).is_ok());
    }
}
