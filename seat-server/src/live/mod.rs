//! LiveBoardHub: realtime board fan-out
//!
//! ```text
//! Postgres NOTIFY seat_board
//!       │
//!       ▼
//! listener task ── BoardChange ──▶ LiveBoardHub
//!                                    ├── mirror: SeatBoard (server-side copy)
//!                                    └── broadcast: Sender<HubEvent>
//!                                          │
//!                                          ▼
//!                                    WS sessions (subscribe → push)
//! ```

pub mod listener;

use std::sync::Arc;

use shared::SeatBoard;
use shared::message::{BoardChange, LiveMessage};
use shared::models::{Density, Seat};
use tokio::sync::{RwLock, broadcast};

/// Hub events
#[derive(Debug, Clone)]
pub enum HubEvent {
    /// Applied change that altered the mirror
    Change(BoardChange),
    /// Mirror replaced wholesale; sessions should resend a snapshot
    Reloaded,
}

/// Broadcast channel capacity, enough to absorb a board reset burst
const BROADCAST_CAPACITY: usize = 256;

#[derive(Clone)]
pub struct LiveBoardHub {
    mirror: Arc<RwLock<SeatBoard>>,
    tx: broadcast::Sender<HubEvent>,
}

impl LiveBoardHub {
    pub fn new(now_hhmm: &str) -> Self {
        let (tx, _) = broadcast::channel(BROADCAST_CAPACITY);
        Self {
            mirror: Arc::new(RwLock::new(SeatBoard::new(now_hhmm))),
            tx,
        }
    }

    /// Replace the mirror with rows read from the database
    pub async fn load(&self, seats: &[Seat], density: Density, now_hhmm: &str) {
        self.mirror.write().await.load(seats, density, now_hhmm);
        // No subscribers is fine
        let _ = self.tx.send(HubEvent::Reloaded);
    }

    /// Reconcile a database change; broadcasts only when the mirror changed.
    pub async fn apply(&self, change: BoardChange, now_hhmm: &str) -> bool {
        let changed = self.mirror.write().await.apply_remote(&change, now_hhmm);
        if changed {
            let _ = self.tx.send(HubEvent::Change(change));
        }
        changed
    }

    /// Full board state for a newly connected (or lagging) session
    pub async fn snapshot(&self) -> LiveMessage {
        let board = self.mirror.read().await;
        LiveMessage::Ready {
            seats: board.seats().to_vec(),
            density: board.density(),
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<HubEvent> {
        self.tx.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}
