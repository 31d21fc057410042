//! Density history records

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One end-of-day snapshot of the board
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct DensityRecord {
    pub id: i64,
    /// Monday = 0 .. Sunday = 6
    pub day_of_week: i16,
    pub occupied_seats: i32,
    pub density_rate: f64,
    pub created_at: DateTime<Utc>,
}

/// Insert payload for `density_history`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewDensityRecord {
    pub day_of_week: i16,
    pub occupied_seats: i32,
    pub density_rate: f64,
}

/// Averages for one weekday
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeekdayAverages {
    pub density_rate: f64,
    pub occupied_seats: f64,
}
