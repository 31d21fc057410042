//! Key/value settings (currently only density)

use shared::models::{DENSITY_KEY, Density};
use sqlx::{PgExecutor, PgPool};

use super::BoxError;

pub async fn get_density(pool: &PgPool) -> Result<Option<Density>, BoxError> {
    let value: Option<(i32,)> = sqlx::query_as("SELECT value FROM settings WHERE key = $1")
        .bind(DENSITY_KEY)
        .fetch_optional(pool)
        .await?;
    Ok(value.map(|(v,)| Density::clamped(v as i64)))
}

pub async fn set_density<'e>(exec: impl PgExecutor<'e>, density: Density) -> Result<(), BoxError> {
    sqlx::query(
        r#"
        INSERT INTO settings (key, value)
        VALUES ($1, $2)
        ON CONFLICT (key) DO UPDATE SET value = EXCLUDED.value
        "#,
    )
    .bind(DENSITY_KEY)
    .bind(density.value() as i32)
    .execute(exec)
    .await?;
    Ok(())
}

/// Current density, creating the row with 0 if it is missing
pub async fn ensure_density(pool: &PgPool) -> Result<Density, BoxError> {
    sqlx::query(
        r#"
        INSERT INTO settings (key, value)
        VALUES ($1, 0)
        ON CONFLICT (key) DO NOTHING
        "#,
    )
    .bind(DENSITY_KEY)
    .execute(pool)
    .await?;
    Ok(get_density(pool).await?.unwrap_or(Density::ZERO))
}
