//! Optimistic board synchronization
//!
//! `BoardSync` keeps a local [`SeatBoard`] in step with the server: local
//! edits are applied immediately and rolled back if the write fails, and
//! live messages are reconciled without clobbering seats still in flight.
//!
//! The board lock is never held across a request, so live messages and
//! writes to other seats proceed while a write is outstanding. Clones share
//! the same board.

use std::sync::Arc;

use shared::SeatBoard;
use shared::board::UpdateOutcome;
use shared::message::LiveMessage;
use shared::models::{Density, Seat, SeatPatch, normalize_name};
use shared::util::{now_hhmm, now_millis};
use tokio::sync::{Mutex, MutexGuard};

use crate::{ClientError, ClientResult, HttpClient};

enum SeatOp {
    Occupy(String),
    Release,
    Rename(String),
}

impl SeatOp {
    fn patch(&self) -> SeatPatch {
        match self {
            SeatOp::Occupy(name) => SeatPatch::occupy(name.clone()),
            SeatOp::Release => SeatPatch::release(),
            SeatOp::Rename(name) => SeatPatch::rename(name.clone()),
        }
    }
}

#[derive(Clone)]
pub struct BoardSync {
    http: HttpClient,
    board: Arc<Mutex<SeatBoard>>,
}

impl BoardSync {
    pub fn new(http: HttpClient) -> Self {
        Self {
            http,
            board: Arc::new(Mutex::new(SeatBoard::new(&now_hhmm()))),
        }
    }

    /// Lock the local board for reading
    pub async fn board(&self) -> MutexGuard<'_, SeatBoard> {
        self.board.lock().await
    }

    /// Reload seats and density from the server
    pub async fn refresh(&self) -> ClientResult<()> {
        let seats = self.http.seats().await?;
        let density = self.http.density().await?;
        self.board.lock().await.load(&seats, density, &now_hhmm());
        Ok(())
    }

    pub async fn occupy(&self, id: i32, name: &str) -> ClientResult<Seat> {
        let name = require_name(name)?;
        self.write(id, SeatOp::Occupy(name)).await
    }

    pub async fn release(&self, id: i32) -> ClientResult<Seat> {
        self.write(id, SeatOp::Release).await
    }

    pub async fn rename(&self, id: i32, name: &str) -> ClientResult<Seat> {
        let name = require_name(name)?;
        self.write(id, SeatOp::Rename(name)).await
    }

    pub async fn set_density(&self, value: i64) -> ClientResult<Density> {
        let density = self.http.set_density(value).await?;
        self.board.lock().await.set_density(density);
        Ok(density)
    }

    /// Fold a live message into the board; returns whether anything changed
    pub async fn handle_live(&self, msg: &LiveMessage) -> bool {
        let mut board = self.board.lock().await;
        match msg {
            LiveMessage::Ready { seats, density } => {
                board.load(seats, *density, &now_hhmm());
                true
            }
            LiveMessage::Change { change } => board.apply_remote(change, &now_hhmm()),
        }
    }

    async fn write(&self, id: i32, op: SeatOp) -> ClientResult<Seat> {
        let pending = self
            .board
            .lock()
            .await
            .begin_update(id, op.patch(), now_millis(), &now_hhmm())?;

        let result = match &op {
            SeatOp::Occupy(name) => self.http.occupy(id, name).await,
            SeatOp::Release => self.http.release(id).await,
            SeatOp::Rename(name) => self.http.rename(id, name).await,
        };

        let mut board = self.board.lock().await;
        match result {
            Ok(seat) => {
                board.finish_update(pending, UpdateOutcome::Confirmed(seat.clone()));
                Ok(seat)
            }
            Err(e) => {
                tracing::warn!(seat_id = id, error = %e, "Seat update failed, rolling back");
                board.finish_update(pending, UpdateOutcome::Failed);
                Err(e)
            }
        }
    }
}

fn require_name(raw: &str) -> ClientResult<String> {
    normalize_name(raw).ok_or_else(|| ClientError::Validation("Seat name must not be empty".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ClientConfig;
    use shared::message::BoardChange;

    /// Nothing listens here
    fn offline() -> BoardSync {
        let http = ClientConfig::new("http://127.0.0.1:1")
            .with_timeout(2)
            .build_http_client()
            .unwrap();
        BoardSync::new(http)
    }

    #[tokio::test]
    async fn failed_write_rolls_back() {
        let sync = offline();
        let err = sync.occupy(3, "Aki").await.unwrap_err();
        assert!(matches!(err, ClientError::Http(_)));

        let board = sync.board().await;
        let seat = board.seat(3).unwrap();
        assert!(!seat.is_occupied);
        assert_eq!(seat.name, None);
        assert!(!board.is_updating(3));
    }

    #[tokio::test]
    async fn rejected_before_any_request() {
        let sync = offline();
        assert!(matches!(
            sync.occupy(3, "  ").await,
            Err(ClientError::Validation(_))
        ));
        assert!(matches!(
            sync.release(12).await,
            Err(ClientError::Rejected(shared::UpdateRejected::InvalidSeat(12)))
        ));

        // A failed write still counts for the debounce window
        let _ = sync.release(1).await;
        assert!(matches!(
            sync.release(1).await,
            Err(ClientError::Rejected(shared::UpdateRejected::Debounced(1)))
        ));
    }

    #[tokio::test]
    async fn live_messages_update_board() {
        let http = ClientConfig::default().build_http_client().unwrap();
        let sync = BoardSync::new(http);

        let mut seats: Vec<Seat> = (1..=8).map(|id| Seat::empty(id, "08:00")).collect();
        seats[5].is_occupied = true;
        seats[5].name = Some("Mei".into());
        assert!(
            sync.handle_live(&LiveMessage::Ready {
                seats,
                density: Density::clamped(30),
            })
            .await
        );
        assert_eq!(sync.board().await.occupied_count(), 1);
        assert_eq!(sync.board().await.density().value(), 30);

        let change = LiveMessage::Change {
            change: BoardChange::DensityChanged {
                density: Density::clamped(30),
            },
        };
        assert!(!sync.handle_live(&change).await);

        let change = LiveMessage::Change {
            change: BoardChange::SeatDeleted { id: 6 },
        };
        assert!(sync.handle_live(&change).await);
        assert_eq!(sync.board().await.occupied_count(), 0);
    }
}
