//! Seat rows

use shared::models::{SEAT_COUNT, Seat};
use sqlx::{PgConnection, PgPool};

use super::BoxError;

pub async fn list(pool: &PgPool) -> Result<Vec<Seat>, BoxError> {
    let rows: Vec<Seat> = sqlx::query_as(
        r#"
        SELECT id, name, is_occupied, updated_date
        FROM seats
        ORDER BY id
        "#,
    )
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

/// Insert any of the fixed seats that have no row yet. Returns how many were created.
pub async fn seed_missing(pool: &PgPool, now_hhmm: &str) -> Result<u64, BoxError> {
    let result = sqlx::query(
        r#"
        INSERT INTO seats (id, name, is_occupied, updated_date)
        SELECT g, NULL, FALSE, $1 FROM generate_series(1, $2::INTEGER) AS g
        ON CONFLICT (id) DO NOTHING
        "#,
    )
    .bind(now_hhmm)
    .bind(SEAT_COUNT as i32)
    .execute(pool)
    .await?;
    Ok(result.rows_affected())
}

pub async fn find(pool: &PgPool, id: i32) -> Result<Option<Seat>, BoxError> {
    let row: Option<Seat> = sqlx::query_as(
        "SELECT id, name, is_occupied, updated_date FROM seats WHERE id = $1",
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;
    Ok(row)
}

pub async fn upsert(pool: &PgPool, seat: &Seat) -> Result<Seat, BoxError> {
    let row: Seat = sqlx::query_as(
        r#"
        INSERT INTO seats (id, name, is_occupied, updated_date)
        VALUES ($1, $2, $3, $4)
        ON CONFLICT (id)
        DO UPDATE SET
            name = EXCLUDED.name, is_occupied = EXCLUDED.is_occupied,
            updated_date = EXCLUDED.updated_date
        RETURNING id, name, is_occupied, updated_date
        "#,
    )
    .bind(seat.id)
    .bind(&seat.name)
    .bind(seat.is_occupied)
    .bind(&seat.updated_date)
    .fetch_one(pool)
    .await?;
    Ok(row)
}

/// Delete every seat and recreate them empty
pub async fn reset_all(conn: &mut PgConnection, now_hhmm: &str) -> Result<Vec<Seat>, BoxError> {
    sqlx::query("DELETE FROM seats").execute(&mut *conn).await?;

    let mut rows: Vec<Seat> = sqlx::query_as(
        r#"
        INSERT INTO seats (id, name, is_occupied, updated_date)
        SELECT g, NULL, FALSE, $1 FROM generate_series(1, $2::INTEGER) AS g
        RETURNING id, name, is_occupied, updated_date
        "#,
    )
    .bind(now_hhmm)
    .bind(SEAT_COUNT as i32)
    .fetch_all(&mut *conn)
    .await?;

    rows.sort_by_key(|s| s.id);
    Ok(rows)
}
