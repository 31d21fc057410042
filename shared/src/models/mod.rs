//! Data models
//!
//! Shared between seat-server and seat-client (via API).
//! DB row types use `#[cfg_attr(feature = "db", derive(sqlx::FromRow))]`.

pub mod feedback;
pub mod history;
pub mod prediction;
pub mod seat;
pub mod setting;

// Re-exports
pub use feedback::*;
pub use history::*;
pub use prediction::*;
pub use seat::*;
pub use setting::*;
