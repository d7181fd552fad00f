//! Status history and service log rows. Both tables are append-only.
use chrono::Utc;
use log::trace;
use sqlx::SqliteConnection;

use crate::db_types::{NewServiceLog, OrderStatusType, ServiceLog, StatusHistoryEntry};

pub async fn insert_status_history(
    order_id: i64,
    status: OrderStatusType,
    conn: &mut SqliteConnection,
) -> Result<(), sqlx::Error> {
    sqlx::query("INSERT INTO order_status_history (order_id, status, changed_at) VALUES ($1, $2, $3)")
        .bind(order_id)
        .bind(status)
        .bind(Utc::now())
        .execute(conn)
        .await?;
    trace!("🗃️ Order #{order_id} status history: {status}");
    Ok(())
}

pub async fn fetch_status_history(
    order_id: i64,
    conn: &mut SqliteConnection,
) -> Result<Vec<StatusHistoryEntry>, sqlx::Error> {
    let history = sqlx::query_as(
        "SELECT status, changed_at FROM order_status_history WHERE order_id = $1 ORDER BY changed_at, id",
    )
    .bind(order_id)
    .fetch_all(conn)
    .await?;
    Ok(history)
}

pub async fn insert_service_log(
    order_id: i64,
    log: NewServiceLog,
    conn: &mut SqliteConnection,
) -> Result<ServiceLog, sqlx::Error> {
    let row: ServiceLog = sqlx::query_as(
        r#"
        INSERT INTO service_logs (order_id, action, details, progress_before, progress_after, created_at)
        VALUES ($1, $2, $3, $4, $5, $6)
        RETURNING *
        "#,
    )
    .bind(order_id)
    .bind(log.action)
    .bind(log.details)
    .bind(log.progress_before)
    .bind(log.progress_after)
    .bind(Utc::now())
    .fetch_one(conn)
    .await?;
    trace!("🗃️ Order #{order_id} service log {:?}: {}", row.action, row.details);
    Ok(row)
}

pub async fn fetch_service_logs(order_id: i64, conn: &mut SqliteConnection) -> Result<Vec<ServiceLog>, sqlx::Error> {
    let logs = sqlx::query_as("SELECT * FROM service_logs WHERE order_id = $1 ORDER BY created_at, id")
        .bind(order_id)
        .fetch_all(conn)
        .await?;
    Ok(logs)
}
