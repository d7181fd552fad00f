//! # SQLite Database methods
//!
//! Low-level SQLite interactions live here as free functions that accept a `&mut SqliteConnection`. Callers either
//! acquire a connection from the pool, or open a transaction and pass `&mut tx`, so the same functions compose into
//! atomic units without any changes.
use std::env;

use log::info;
use sqlx::{sqlite::SqlitePoolOptions, Error as SqlxError, SqlitePool};

pub mod audit;
pub mod orders;
pub mod services;

const SQLITE_DB_URL: &str = "sqlite://data/snsgrow.db";

pub fn db_url() -> String {
    let result = env::var("SG_DATABASE_URL").unwrap_or_else(|_| {
        info!("🗃️ SG_DATABASE_URL is not set. Using the default.");
        SQLITE_DB_URL.to_string()
    });
    info!("🗃️ Using database URL: {result}");
    result
}

pub async fn new_pool(url: &str, max_connections: u32) -> Result<SqlitePool, SqlxError> {
    let pool = SqlitePoolOptions::new().max_connections(max_connections).connect(url).await?;
    Ok(pool)
}
