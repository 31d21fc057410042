//! Daily density snapshots

use shared::models::{DensityRecord, NewDensityRecord};
use sqlx::{PgExecutor, PgPool};

use super::BoxError;

pub async fn insert<'e>(
    exec: impl PgExecutor<'e>,
    record: &NewDensityRecord,
) -> Result<DensityRecord, BoxError> {
    let row: DensityRecord = sqlx::query_as(
        r#"
        INSERT INTO density_history (day_of_week, occupied_seats, density_rate)
        VALUES ($1, $2, $3)
        RETURNING id, day_of_week, occupied_seats, density_rate, created_at
        "#,
    )
    .bind(record.day_of_week)
    .bind(record.occupied_seats)
    .bind(record.density_rate)
    .fetch_one(exec)
    .await?;
    Ok(row)
}

/// Newest first
pub async fn latest(pool: &PgPool, limit: i64) -> Result<Vec<DensityRecord>, BoxError> {
    let rows: Vec<DensityRecord> = sqlx::query_as(
        r#"
        SELECT id, day_of_week, occupied_seats, density_rate, created_at
        FROM density_history
        ORDER BY created_at DESC
        LIMIT $1
        "#,
    )
    .bind(limit)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

/// Newest first, one weekday only (Monday = 0)
pub async fn latest_for_day(
    pool: &PgPool,
    day_of_week: i16,
    limit: i64,
) -> Result<Vec<DensityRecord>, BoxError> {
    let rows: Vec<DensityRecord> = sqlx::query_as(
        r#"
        SELECT id, day_of_week, occupied_seats, density_rate, created_at
        FROM density_history
        WHERE day_of_week = $1
        ORDER BY created_at DESC
        LIMIT $2
        "#,
    )
    .bind(day_of_week)
    .bind(limit)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}
