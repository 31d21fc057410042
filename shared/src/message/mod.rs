//! Realtime board messages
//!
//! ```text
//! Postgres trigger ── NOTIFY seat_board ──▶ BoardChange ──▶ LiveBoardHub
//!                                                              │
//!                               LiveMessage::Ready / Change ◀──┘ (WebSocket)
//! ```

use serde::{Deserialize, Serialize};

use crate::models::{DENSITY_KEY, Density, Seat, SettingRow};

/// Postgres notification channel carrying row changes
pub const NOTIFY_CHANNEL: &str = "seat_board";

/// A single row change on the board
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum BoardChange {
    SeatUpserted { seat: Seat },
    SeatDeleted { id: i32 },
    DensityChanged { density: Density },
}

/// Row operation reported by the trigger
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RowOp {
    Insert,
    Update,
    Delete,
}

#[derive(Debug, Deserialize)]
struct Notification {
    table: String,
    op: RowOp,
    row: serde_json::Value,
}

impl BoardChange {
    /// Decode a `seat_board` notification payload.
    ///
    /// Returns `Ok(None)` for changes that do not affect the board (other
    /// settings keys, deleted settings rows, unknown tables).
    pub fn from_notification(payload: &str) -> Result<Option<Self>, serde_json::Error> {
        let n: Notification = serde_json::from_str(payload)?;
        let change = match (n.table.as_str(), n.op) {
            ("seats", RowOp::Delete) => {
                #[derive(Deserialize)]
                struct Key {
                    id: i32,
                }
                let key: Key = serde_json::from_value(n.row)?;
                Some(BoardChange::SeatDeleted { id: key.id })
            }
            ("seats", _) => Some(BoardChange::SeatUpserted {
                seat: serde_json::from_value(n.row)?,
            }),
            ("settings", RowOp::Insert | RowOp::Update) => {
                let row: SettingRow = serde_json::from_value(n.row)?;
                (row.key == DENSITY_KEY).then(|| BoardChange::DensityChanged {
                    density: Density::clamped(row.value as i64),
                })
            }
            _ => None,
        };
        Ok(change)
    }
}

/// Server → client
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum LiveMessage {
    /// Full board state; sent on connect, after lag and on `Resync`
    Ready { seats: Vec<Seat>, density: Density },
    Change { change: BoardChange },
}

/// Client → server
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum LiveCommand {
    Resync,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_seat_update() {
        let payload = r#"{"table":"seats","op":"UPDATE","row":{"id":4,"name":"Sora","is_occupied":true,"updated_date":"10:15"}}"#;
        let change = BoardChange::from_notification(payload).unwrap().unwrap();
        match change {
            BoardChange::SeatUpserted { seat } => {
                assert_eq!(seat.id, 4);
                assert_eq!(seat.name.as_deref(), Some("Sora"));
                assert_eq!(seat.updated_date, "10:15");
            }
            other => panic!("Expected SeatUpserted, got {other:?}"),
        }
    }

    #[test]
    fn decodes_seat_delete_from_old_row() {
        let payload = r#"{"table":"seats","op":"DELETE","row":{"id":2,"name":null,"is_occupied":false,"updated_date":"21:00"}}"#;
        assert_eq!(
            BoardChange::from_notification(payload).unwrap(),
            Some(BoardChange::SeatDeleted { id: 2 })
        );
    }

    #[test]
    fn density_changes_are_clamped_and_other_keys_ignored() {
        let density = r#"{"table":"settings","op":"INSERT","row":{"key":"density","value":140}}"#;
        assert_eq!(
            BoardChange::from_notification(density).unwrap(),
            Some(BoardChange::DensityChanged {
                density: Density::clamped(100)
            })
        );

        let other = r#"{"table":"settings","op":"UPDATE","row":{"key":"theme","value":1}}"#;
        assert_eq!(BoardChange::from_notification(other).unwrap(), None);

        let deleted = r#"{"table":"settings","op":"DELETE","row":{"key":"density","value":3}}"#;
        assert_eq!(BoardChange::from_notification(deleted).unwrap(), None);
    }

    #[test]
    fn malformed_payload_is_an_error() {
        assert!(BoardChange::from_notification("{not json").is_err());
        assert!(BoardChange::from_notification(r#"{"table":"seats","op":"TRUNCATE","row":{}}"#).is_err());
    }

    #[test]
    fn live_message_wire_format() {
        let msg = LiveMessage::Change {
            change: BoardChange::SeatDeleted { id: 1 },
        };
        let json = serde_json::to_value(&msg).unwrap();
        assert_eq!(json["type"], "change");
        assert_eq!(json["change"]["kind"], "seat_deleted");
        assert_eq!(json["change"]["id"], 1);

        let cmd: LiveCommand = serde_json::from_str(r#"{"type":"resync"}"#).unwrap();
        assert_eq!(cmd, LiveCommand::Resync);
    }
}
