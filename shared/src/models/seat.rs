//! Seat Model

use serde::{Deserialize, Deserializer, Serialize};

/// Number of physical seats on the board
pub const SEAT_COUNT: usize = 8;

/// Longest accepted seat name (after trimming)
pub const MAX_SEAT_NAME_LEN: usize = 100;

/// Seat entity
///
/// `updated_date` is the local time of the last write as `HH:MM`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Seat {
    pub id: i32,
    pub name: Option<String>,
    pub is_occupied: bool,
    #[serde(default)]
    pub updated_date: String,
}

impl Seat {
    /// A free seat with no name
    pub fn empty(id: i32, updated_date: impl Into<String>) -> Self {
        Self {
            id,
            name: None,
            is_occupied: false,
            updated_date: updated_date.into(),
        }
    }

    pub fn is_valid_id(id: i32) -> bool {
        (1..=SEAT_COUNT as i32).contains(&id)
    }

    /// Slot index for a valid id
    pub fn index_of(id: i32) -> Option<usize> {
        Self::is_valid_id(id).then(|| (id - 1) as usize)
    }

    /// Merge a patch into this seat. Does not touch `updated_date`.
    pub fn apply(&mut self, patch: &SeatPatch) {
        if let Some(name) = &patch.name {
            self.name = name.clone();
        }
        if let Some(occupied) = patch.is_occupied {
            self.is_occupied = occupied;
        }
    }

    /// Fields compared by realtime reconciliation
    pub fn same_content(&self, other: &Seat) -> bool {
        self.name == other.name
            && self.is_occupied == other.is_occupied
            && self.updated_date == other.updated_date
    }
}

/// Partial seat update
///
/// `name: Some(None)` clears the name; an absent `name` leaves it unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeatPatch {
    #[serde(
        default,
        deserialize_with = "deserialize_some",
        skip_serializing_if = "Option::is_none"
    )]
    pub name: Option<Option<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_occupied: Option<bool>,
}

impl SeatPatch {
    pub fn occupy(name: impl Into<String>) -> Self {
        Self {
            name: Some(Some(name.into())),
            is_occupied: Some(true),
        }
    }

    pub fn release() -> Self {
        Self {
            name: Some(None),
            is_occupied: Some(false),
        }
    }

    pub fn rename(name: impl Into<String>) -> Self {
        Self {
            name: Some(Some(name.into())),
            is_occupied: None,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.is_occupied.is_none()
    }
}

// Distinguishes `"name": null` from a missing key.
fn deserialize_some<'de, T, D>(deserializer: D) -> Result<Option<T>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Deserialize::deserialize(deserializer).map(Some)
}

/// Body of `POST /api/seats/{id}/occupy`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OccupyRequest {
    pub name: String,
}

/// Body of `PUT /api/seats/{id}/name`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenameRequest {
    pub name: String,
}

/// Body of `POST /api/reset-seats`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResetRequest {
    /// Missing key is treated as a wrong key
    #[serde(default)]
    pub authorization: String,
}

/// Trim a user-entered seat name; blank or oversized names are rejected.
pub fn normalize_name(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed.chars().count() > MAX_SEAT_NAME_LEN {
        return None;
    }
    Some(trimmed.to_string())
}
