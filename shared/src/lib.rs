//! Shared types for the seat board
//!
//! Models, realtime messages, error codes and the `SeatBoard` reducer used by
//! both seat-server and seat-client.

pub mod board;
pub mod error;
pub mod message;
pub mod models;
pub mod util;

// Re-exports
pub use axum::{Json, body};
pub use http;
pub use serde::{Deserialize, Serialize};

pub use board::{PendingUpdate, SeatBoard, UpdateOutcome, UpdateRejected};
pub use error::{ApiResponse, AppError, AppResult, ErrorCode};
pub use message::{BoardChange, LiveCommand, LiveMessage};
