//! SeatBoard: fixed-order seat state with optimistic updates
//!
//! Every view of the board (browser tab, `seat-client`, the server's live
//! mirror) runs the same reducer so that they converge on identical state.
//!
//! ```text
//! local edit ──▶ begin_update ──▶ (optimistic slot) ──▶ HTTP write
//!                                                          │
//!                          finish_update(Confirmed|Failed) ◀┘
//!
//! NOTIFY ──▶ BoardChange ──▶ apply_remote (skipped while the seat is in flight)
//! ```
//!
//! Invariant: `seats[i].id == i + 1` for all `i`, and there are always
//! exactly [`SEAT_COUNT`] slots.

use std::collections::{HashMap, HashSet};

use thiserror::Error;

use crate::message::BoardChange;
use crate::models::{Density, SEAT_COUNT, Seat, SeatPatch};

/// Minimum spacing between two local updates of the same seat
pub const DEBOUNCE_MS: i64 = 500;

/// Why a local update was not started
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum UpdateRejected {
    #[error("seat {0} does not exist")]
    InvalidSeat(i32),
    #[error("seat {0} is already being updated")]
    AlreadyUpdating(i32),
    #[error("seat {0} was updated less than {DEBOUNCE_MS} ms ago")]
    Debounced(i32),
}

/// Handle for an optimistic update that has not been confirmed yet
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingUpdate {
    pub seat_id: i32,
    pub patch: SeatPatch,
    previous: Seat,
}

impl PendingUpdate {
    /// Seat as it was before the optimistic write
    pub fn previous(&self) -> &Seat {
        &self.previous
    }
}

/// Result of the remote write backing a [`PendingUpdate`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpdateOutcome {
    /// The server stored this row
    Confirmed(Seat),
    Failed,
}

#[derive(Debug, Clone)]
pub struct SeatBoard {
    seats: Vec<Seat>,
    density: Density,
    in_flight: HashSet<i32>,
    last_local_update: HashMap<i32, i64>,
}

impl SeatBoard {
    /// Board with every seat free
    pub fn new(now_hhmm: &str) -> Self {
        Self {
            seats: empty_seats(now_hhmm),
            density: Density::ZERO,
            in_flight: HashSet::new(),
            last_local_update: HashMap::new(),
        }
    }

    /// Replace the board with rows fetched from storage.
    ///
    /// Rows are placed by id; unknown ids are dropped and missing ids become
    /// free seats stamped `now_hhmm`.
    pub fn load(&mut self, rows: &[Seat], density: Density, now_hhmm: &str) {
        let mut seats = empty_seats(now_hhmm);
        for row in rows {
            if let Some(idx) = Seat::index_of(row.id) {
                seats[idx] = row.clone();
            }
        }
        self.seats = seats;
        self.density = density;
    }

    pub fn seats(&self) -> &[Seat] {
        &self.seats
    }

    pub fn seat(&self, id: i32) -> Option<&Seat> {
        Seat::index_of(id).map(|idx| &self.seats[idx])
    }

    pub fn density(&self) -> Density {
        self.density
    }

    pub fn set_density(&mut self, density: Density) {
        self.density = density;
    }

    pub fn occupied_count(&self) -> usize {
        self.seats.iter().filter(|s| s.is_occupied).count()
    }

    pub fn is_updating(&self, id: i32) -> bool {
        self.in_flight.contains(&id)
    }

    /// Start a local update: checks, marks the seat in flight and applies
    /// the patch immediately.
    pub fn begin_update(
        &mut self,
        id: i32,
        patch: SeatPatch,
        now_ms: i64,
        now_hhmm: &str,
    ) -> Result<PendingUpdate, UpdateRejected> {
        let idx = Seat::index_of(id).ok_or(UpdateRejected::InvalidSeat(id))?;

        if self.in_flight.contains(&id) {
            return Err(UpdateRejected::AlreadyUpdating(id));
        }
        if let Some(last) = self.last_local_update.get(&id)
            && now_ms - last < DEBOUNCE_MS
        {
            return Err(UpdateRejected::Debounced(id));
        }

        self.in_flight.insert(id);
        self.last_local_update.insert(id, now_ms);

        let previous = self.seats[idx].clone();
        let slot = &mut self.seats[idx];
        slot.apply(&patch);
        slot.updated_date = now_hhmm.to_string();

        Ok(PendingUpdate {
            seat_id: id,
            patch,
            previous,
        })
    }

    /// Settle a pending update; a failed write restores the previous seat.
    pub fn finish_update(&mut self, pending: PendingUpdate, outcome: UpdateOutcome) {
        self.in_flight.remove(&pending.seat_id);
        let Some(idx) = Seat::index_of(pending.seat_id) else {
            return;
        };
        match outcome {
            UpdateOutcome::Confirmed(seat) if seat.id == pending.seat_id => {
                self.seats[idx] = seat;
            }
            UpdateOutcome::Confirmed(_) => {}
            UpdateOutcome::Failed => {
                self.seats[idx] = pending.previous;
            }
        }
    }

    /// Reconcile a change pushed by the database.
    ///
    /// Returns `true` when the visible state changed.
    pub fn apply_remote(&mut self, change: &BoardChange, now_hhmm: &str) -> bool {
        match change {
            BoardChange::SeatUpserted { seat } => {
                let Some(idx) = Seat::index_of(seat.id) else {
                    return false;
                };
                if self.in_flight.contains(&seat.id) || self.seats[idx].same_content(seat) {
                    return false;
                }
                self.seats[idx] = seat.clone();
                true
            }
            BoardChange::SeatDeleted { id } => {
                let Some(idx) = Seat::index_of(*id) else {
                    return false;
                };
                self.seats[idx] = Seat::empty(*id, now_hhmm);
                true
            }
            BoardChange::DensityChanged { density } => {
                if self.density == *density {
                    return false;
                }
                self.density = *density;
                true
            }
        }
    }
}

fn empty_seats(now_hhmm: &str) -> Vec<Seat> {
    (1..=SEAT_COUNT as i32)
        .map(|id| Seat::empty(id, now_hhmm))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn occupied(id: i32, name: &str, at: &str) -> Seat {
        Seat {
            id,
            name: Some(name.to_string()),
            is_occupied: true,
            updated_date: at.to_string(),
        }
    }

    fn ids(board: &SeatBoard) -> Vec<i32> {
        board.seats().iter().map(|s| s.id).collect()
    }

    #[test]
    fn new_board_has_eight_free_seats_in_order() {
        let board = SeatBoard::new("09:00");
        assert_eq!(ids(&board), (1..=8).collect::<Vec<_>>());
        assert_eq!(board.occupied_count(), 0);
        assert_eq!(board.density(), Density::ZERO);
    }

    #[test]
    fn load_places_rows_by_id_and_fills_gaps() {
        let mut board = SeatBoard::new("09:00");
        let rows = vec![
            occupied(5, "Hana", "08:30"),
            occupied(2, "Kei", "08:45"),
            occupied(42, "Ghost", "08:50"),
        ];
        board.load(&rows, Density::clamped(35), "09:01");

        assert_eq!(ids(&board), (1..=8).collect::<Vec<_>>());
        assert_eq!(board.seat(2).unwrap().name.as_deref(), Some("Kei"));
        assert_eq!(board.seat(5).unwrap().name.as_deref(), Some("Hana"));
        assert_eq!(board.seat(1).unwrap(), &Seat::empty(1, "09:01"));
        assert_eq!(board.occupied_count(), 2);
        assert_eq!(board.density().value(), 35);
    }

    #[test]
    fn begin_update_applies_optimistically() {
        let mut board = SeatBoard::new("09:00");
        let pending = board
            .begin_update(3, SeatPatch::occupy("Yui"), 1_000, "09:10")
            .unwrap();

        assert!(board.is_updating(3));
        assert_eq!(pending.previous(), &Seat::empty(3, "09:00"));
        let seat = board.seat(3).unwrap();
        assert_eq!(seat.name.as_deref(), Some("Yui"));
        assert!(seat.is_occupied);
        assert_eq!(seat.updated_date, "09:10");
    }

    #[test]
    fn rejects_invalid_busy_and_debounced_updates() {
        let mut board = SeatBoard::new("09:00");
        assert_eq!(
            board.begin_update(0, SeatPatch::release(), 0, "09:00"),
            Err(UpdateRejected::InvalidSeat(0))
        );

        let pending = board
            .begin_update(1, SeatPatch::occupy("A"), 1_000, "09:00")
            .unwrap();
        assert_eq!(
            board.begin_update(1, SeatPatch::release(), 5_000, "09:00"),
            Err(UpdateRejected::AlreadyUpdating(1))
        );

        board.finish_update(pending, UpdateOutcome::Failed);
        assert_eq!(
            board.begin_update(1, SeatPatch::release(), 1_499, "09:00"),
            Err(UpdateRejected::Debounced(1))
        );
        assert!(
            board
                .begin_update(1, SeatPatch::release(), 1_500, "09:00")
                .is_ok()
        );
    }

    #[test]
    fn failed_update_rolls_back() {
        let mut board = SeatBoard::new("09:00");
        let pending = board
            .begin_update(6, SeatPatch::occupy("Rin"), 0, "09:05")
            .unwrap();
        board.finish_update(pending, UpdateOutcome::Failed);

        assert!(!board.is_updating(6));
        assert_eq!(board.seat(6).unwrap(), &Seat::empty(6, "09:00"));
    }

    #[test]
    fn confirmed_update_takes_server_row() {
        let mut board = SeatBoard::new("09:00");
        let pending = board
            .begin_update(6, SeatPatch::occupy("Rin"), 0, "09:05")
            .unwrap();
        board.finish_update(pending, UpdateOutcome::Confirmed(occupied(6, "Rin", "09:06")));

        assert!(!board.is_updating(6));
        assert_eq!(board.seat(6).unwrap().updated_date, "09:06");
    }

    #[test]
    fn remote_upsert_replaces_only_that_slot() {
        let mut board = SeatBoard::new("09:00");
        let change = BoardChange::SeatUpserted {
            seat: occupied(8, "Tomo", "10:00"),
        };
        assert!(board.apply_remote(&change, "10:00"));
        assert_eq!(board.seat(8).unwrap().name.as_deref(), Some("Tomo"));
        assert_eq!(ids(&board), (1..=8).collect::<Vec<_>>());

        // Same content again is a no-op
        assert!(!board.apply_remote(&change, "10:00"));
    }

    #[test]
    fn remote_upsert_skipped_while_in_flight() {
        let mut board = SeatBoard::new("09:00");
        let _pending = board
            .begin_update(4, SeatPatch::occupy("Mine"), 0, "09:30")
            .unwrap();

        let echo = BoardChange::SeatUpserted {
            seat: occupied(4, "Theirs", "09:29"),
        };
        assert!(!board.apply_remote(&echo, "09:30"));
        assert_eq!(board.seat(4).unwrap().name.as_deref(), Some("Mine"));
    }

    #[test]
    fn remote_upsert_with_invalid_id_is_ignored() {
        let mut board = SeatBoard::new("09:00");
        let change = BoardChange::SeatUpserted {
            seat: occupied(12, "Nobody", "10:00"),
        };
        assert!(!board.apply_remote(&change, "10:00"));
        assert_eq!(board.seats().len(), SEAT_COUNT);
    }

    #[test]
    fn remote_delete_clears_slot_but_keeps_it() {
        let mut board = SeatBoard::new("09:00");
        board.load(&[occupied(2, "Kai", "08:00")], Density::ZERO, "09:00");

        assert!(board.apply_remote(&BoardChange::SeatDeleted { id: 2 }, "21:00"));
        assert_eq!(board.seat(2).unwrap(), &Seat::empty(2, "21:00"));
        assert_eq!(board.seats().len(), SEAT_COUNT);

        assert!(!board.apply_remote(&BoardChange::SeatDeleted { id: 99 }, "21:00"));
    }

    #[test]
    fn remote_density_change() {
        let mut board = SeatBoard::new("09:00");
        let change = BoardChange::DensityChanged {
            density: Density::clamped(60),
        };
        assert!(board.apply_remote(&change, "09:00"));
        assert!(!board.apply_remote(&change, "09:00"));
        assert_eq!(board.density().value(), 60);
    }
}
