use chrono::Utc;
use log::debug;
use sqlx::SqliteConnection;

use crate::db_types::{NewService, Service};

pub async fn delete_all_services(conn: &mut SqliteConnection) -> Result<u64, sqlx::Error> {
    let result = sqlx::query("DELETE FROM services").execute(conn).await?;
    Ok(result.rows_affected())
}

pub async fn insert_service(service: NewService, conn: &mut SqliteConnection) -> Result<Service, sqlx::Error> {
    let service = sqlx::query_as(
        r#"
        INSERT INTO services (
            smmturk_id,
            name,
            platform,
            category,
            service_type,
            smmturk_price,
            price,
            min_quantity,
            max_quantity,
            dripfeed,
            refill,
            cancel,
            updated_at
        ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
        ON CONFLICT (smmturk_id) DO UPDATE SET
            name = excluded.name,
            platform = excluded.platform,
            category = excluded.category,
            service_type = excluded.service_type,
            smmturk_price = excluded.smmturk_price,
            price = excluded.price,
            min_quantity = excluded.min_quantity,
            max_quantity = excluded.max_quantity,
            dripfeed = excluded.dripfeed,
            refill = excluded.refill,
            cancel = excluded.cancel,
            updated_at = excluded.updated_at
        RETURNING *
        "#,
    )
    .bind(service.smmturk_id)
    .bind(service.name)
    .bind(service.platform)
    .bind(service.category)
    .bind(service.service_type)
    .bind(service.smmturk_price)
    .bind(service.price)
    .bind(service.min_quantity)
    .bind(service.max_quantity)
    .bind(service.dripfeed)
    .bind(service.refill)
    .bind(service.cancel)
    .bind(Utc::now())
    .fetch_one(conn)
    .await?;
    Ok(service)
}

/// Replaces the catalogue. Run inside a transaction so that readers never observe a half-written list.
pub async fn replace_services(
    services: Vec<NewService>,
    conn: &mut SqliteConnection,
) -> Result<Vec<Service>, sqlx::Error> {
    let deleted = delete_all_services(conn).await?;
    let mut result = Vec::with_capacity(services.len());
    for service in services {
        result.push(insert_service(service, conn).await?);
    }
    debug!("🗃️ Replaced {deleted} cached services with {}", result.len());
    Ok(result)
}

pub async fn fetch_services(platform: Option<&str>, conn: &mut SqliteConnection) -> Result<Vec<Service>, sqlx::Error> {
    let services = match platform {
        Some(p) => {
            sqlx::query_as("SELECT * FROM services WHERE platform = $1 ORDER BY platform, name, smmturk_id")
                .bind(p.trim().to_lowercase())
                .fetch_all(conn)
                .await?
        },
        None => sqlx::query_as("SELECT * FROM services ORDER BY platform, name, smmturk_id").fetch_all(conn).await?,
    };
    Ok(services)
}

pub async fn fetch_service_by_provider_id(
    smmturk_id: i64,
    conn: &mut SqliteConnection,
) -> Result<Option<Service>, sqlx::Error> {
    let service =
        sqlx::query_as("SELECT * FROM services WHERE smmturk_id = $1").bind(smmturk_id).fetch_optional(conn).await?;
    Ok(service)
}
