//! Database access layer
//!
//! Free functions over `&PgPool`; every write to `seats` or `settings` is
//! published on the `seat_board` channel by the triggers in `migrations/`.

pub mod history;
pub mod seats;
pub mod settings;

use shared::models::{Density, DensityRecord, NewDensityRecord, Seat};
use sqlx::{PgConnection, PgPool};

pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Clear the board: all seats free, density 0, in one transaction
pub async fn reset_board(pool: &PgPool, now_hhmm: &str) -> Result<Vec<Seat>, BoxError> {
    let mut tx = pool.begin().await?;
    let seats = clear_board(&mut tx, now_hhmm).await?;
    tx.commit().await?;
    Ok(seats)
}

/// Store the day's snapshot and clear the board atomically; if either
/// step fails nothing is written.
pub async fn record_and_reset(
    pool: &PgPool,
    record: &NewDensityRecord,
    now_hhmm: &str,
) -> Result<DensityRecord, BoxError> {
    let mut tx = pool.begin().await?;
    let saved = history::insert(&mut *tx, record).await?;
    clear_board(&mut tx, now_hhmm).await?;
    tx.commit().await?;
    Ok(saved)
}

async fn clear_board(conn: &mut PgConnection, now_hhmm: &str) -> Result<Vec<Seat>, BoxError> {
    let seats = seats::reset_all(conn, now_hhmm).await?;
    settings::set_density(&mut *conn, Density::ZERO).await?;
    Ok(seats)
}
