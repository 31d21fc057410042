//! Background jobs

use std::time::Duration;

use chrono::{Local, NaiveDate, NaiveDateTime, Timelike};
use shared::models::{Density, DensityRecord, NewDensityRecord, Seat};
use shared::util::{now_hhmm, weekday_index};
use sqlx::PgPool;

use crate::db::{self, BoxError, history, seats, settings};

const CHECK_INTERVAL: Duration = Duration::from_secs(60);

/// Reset is due once per calendar day, at or after `reset_hour`.
pub fn should_reset(now: NaiveDateTime, reset_hour: u32, last_run: Option<NaiveDate>) -> bool {
    now.hour() >= reset_hour && last_run != Some(now.date())
}

/// End-of-day snapshot of the board
pub fn snapshot_record(seats: &[Seat], density: Density, day: NaiveDate) -> NewDensityRecord {
    NewDensityRecord {
        day_of_week: weekday_index(day) as i16,
        occupied_seats: seats.iter().filter(|s| s.is_occupied).count() as i32,
        density_rate: density.value() as f64,
    }
}

/// Nightly reset loop: record today's snapshot, then clear the board.
pub async fn run_nightly_reset(pool: PgPool, reset_hour: u32) {
    let mut last_run = last_snapshot_date(&pool).await;
    let mut interval = tokio::time::interval(CHECK_INTERVAL);

    tracing::info!(reset_hour, ?last_run, "Nightly reset scheduled");

    loop {
        interval.tick().await;
        let now = Local::now().naive_local();
        run_due_reset(&pool, now, reset_hour, &mut last_run).await;
    }
}

/// One scheduler tick. `last_run` only advances once the snapshot and the
/// reset have both been committed, so a failed attempt is retried on the
/// next tick without leaving a stray history row behind.
async fn run_due_reset(
    pool: &PgPool,
    now: NaiveDateTime,
    reset_hour: u32,
    last_run: &mut Option<NaiveDate>,
) -> bool {
    if !should_reset(now, reset_hour, *last_run) {
        return false;
    }

    match reset_and_record(pool, now.date()).await {
        Ok(record) => {
            tracing::info!(
                day_of_week = record.day_of_week,
                occupied_seats = record.occupied_seats,
                density_rate = record.density_rate,
                "Nightly reset done"
            );
            *last_run = Some(now.date());
            true
        }
        Err(e) => {
            tracing::error!(error = %e, "Nightly reset failed");
            false
        }
    }
}

async fn reset_and_record(pool: &PgPool, today: NaiveDate) -> Result<DensityRecord, BoxError> {
    let board = seats::list(pool).await?;
    let density = settings::get_density(pool).await?.unwrap_or(Density::ZERO);

    db::record_and_reset(pool, &snapshot_record(&board, density, today), &now_hhmm()).await
}

/// Local date of the newest snapshot, so a restart does not record twice
async fn last_snapshot_date(pool: &PgPool) -> Option<NaiveDate> {
    match history::latest(pool, 1).await {
        Ok(rows) => rows
            .first()
            .map(|r| r.created_at.with_timezone(&Local).date_naive()),
        Err(e) => {
            tracing::warn!(error = %e, "Could not read last snapshot date");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(day: u32, hour: u32, minute: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 6, day)
            .unwrap()
            .and_hms_opt(hour, minute, 0)
            .unwrap()
    }

    #[test]
    fn waits_for_reset_hour() {
        assert!(!should_reset(at(2, 20, 59), 21, None));
        assert!(should_reset(at(2, 21, 0), 21, None));
        assert!(should_reset(at(2, 23, 30), 21, None));
    }

    #[test]
    fn runs_once_per_day() {
        let monday = NaiveDate::from_ymd_opt(2025, 6, 2).unwrap();
        assert!(!should_reset(at(2, 21, 1), 21, Some(monday)));
        assert!(!should_reset(at(3, 9, 0), 21, Some(monday)));
        assert!(should_reset(at(3, 21, 0), 21, Some(monday)));
    }

    #[tokio::test]
    async fn failed_reset_is_retried_next_tick() {
        // Lazy pool on a port nothing listens on
        let pool = crate::test_support::test_state(vec![]).pool;
        let mut last_run = None;

        assert!(!run_due_reset(&pool, at(2, 21, 0), 21, &mut last_run).await);
        assert_eq!(last_run, None);
        assert!(should_reset(at(2, 21, 1), 21, last_run));
    }

    #[tokio::test]
    async fn no_database_work_before_reset_hour() {
        let pool = crate::test_support::test_state(vec![]).pool;
        let monday = NaiveDate::from_ymd_opt(2025, 6, 2).unwrap();
        let mut last_run = Some(monday);

        assert!(!run_due_reset(&pool, at(2, 22, 0), 21, &mut last_run).await);
        assert_eq!(last_run, Some(monday));
    }

    #[test]
    fn snapshot_counts_occupied_seats() {
        let mut board: Vec<Seat> = (1..=8).map(|id| Seat::empty(id, "20:00")).collect();
        board[0].is_occupied = true;
        board[4].is_occupied = true;

        // 2025-06-04 is a Wednesday
        let record = snapshot_record(
            &board,
            Density::clamped(45),
            NaiveDate::from_ymd_opt(2025, 6, 4).unwrap(),
        );
        assert_eq!(record.day_of_week, 2);
        assert_eq!(record.occupied_seats, 2);
        assert_eq!(record.density_rate, 45.0);
    }
}
