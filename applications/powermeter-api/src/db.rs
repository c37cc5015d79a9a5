use crate::config::DbConfig;
use crate::error::AppError;
use sqlx::{postgres::PgPoolOptions, Pool, Postgres};

pub type DbPool = Pool<Postgres>;

pub async fn connect(cfg: &DbConfig) -> Result<DbPool, AppError> {
    let pool = PgPoolOptions::new()
        .max_connections(cfg.max_connections)
        .connect(&cfg.url)
        .await?;
    Ok(pool)
}

/// Create the tables backing the store if they are missing.
pub async fn ensure_schema(pool: &DbPool) -> Result<(), AppError> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS store_scalars (
            key   TEXT PRIMARY KEY,
            value TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS store_list_items (
            list     TEXT NOT NULL,
            position BIGSERIAL,
            payload  TEXT NOT NULL,
            PRIMARY KEY (list, position)
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS store_hash_fields (
            key   TEXT NOT NULL,
            field TEXT NOT NULL,
            value TEXT NOT NULL,
            PRIMARY KEY (key, field)
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}
