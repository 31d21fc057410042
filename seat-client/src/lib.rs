//! Seat Client - HTTP and live client for seat-server
//!
//! Typed REST calls, the live board WebSocket, and [`BoardSync`] which
//! keeps a local `SeatBoard` up to date with optimistic writes.

pub mod config;
pub mod error;
pub mod http;
pub mod live;
pub mod sync;

pub use config::ClientConfig;
pub use error::{ClientError, ClientResult};
pub use http::{HistoryAverages, HttpClient, WeekdayPrediction};
pub use live::LiveClient;
pub use sync::BoardSync;

// Re-export shared types for convenience
pub use shared::models::{Density, PickedDays, Seat, TodayTomorrow, WeeklyForecast};
pub use shared::{BoardChange, LiveMessage, SeatBoard};
