use chrono::Utc;
use log::{debug, trace};
use sqlx::{QueryBuilder, SqliteConnection};

use crate::{
    db_types::{NewOrder, Order, OrderId, OrderStatusType},
    order_objects::OrderQueryFilter,
    traits::OrderUpdate,
};

/// Inserts a new `pending` order. This is not atomic on its own; pass `&mut *tx` to embed it in a transaction.
///
/// The e-mail address is normalised to lower case so that tracking look-ups are case-insensitive.
pub async fn insert_order(order: NewOrder, conn: &mut SqliteConnection) -> Result<Order, sqlx::Error> {
    let email = normalize_email(&order.customer_email);
    let order: Order = sqlx::query_as(
        r#"
            INSERT INTO orders (
                order_id,
                customer_email,
                service_id,
                service_name,
                target_url,
                quantity,
                total_price,
                status,
                progress,
                created_at,
                updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, 0, $9, $9)
            RETURNING *;
        "#,
    )
    .bind(order.order_id)
    .bind(email)
    .bind(order.service_id)
    .bind(order.service_name)
    .bind(order.target_url)
    .bind(order.quantity)
    .bind(order.total_price)
    .bind(OrderStatusType::Pending)
    .bind(order.created_at)
    .fetch_one(conn)
    .await?;
    debug!("🗃️ Order [{}] inserted with id {}", order.order_id, order.id);
    Ok(order)
}

pub async fn fetch_order_by_order_id(
    order_id: &OrderId,
    conn: &mut SqliteConnection,
) -> Result<Option<Order>, sqlx::Error> {
    let order =
        sqlx::query_as("SELECT * FROM orders WHERE order_id = $1").bind(order_id.as_str()).fetch_optional(conn).await?;
    Ok(order)
}

pub async fn fetch_order_by_id(id: i64, conn: &mut SqliteConnection) -> Result<Option<Order>, sqlx::Error> {
    let order = sqlx::query_as("SELECT * FROM orders WHERE id = $1").bind(id).fetch_optional(conn).await?;
    Ok(order)
}

pub async fn fetch_latest_order_for_email(
    email: &str,
    conn: &mut SqliteConnection,
) -> Result<Option<Order>, sqlx::Error> {
    let order = sqlx::query_as(
        "SELECT * FROM orders WHERE customer_email = $1 ORDER BY created_at DESC, id DESC LIMIT 1",
    )
    .bind(normalize_email(email))
    .fetch_optional(conn)
    .await?;
    Ok(order)
}

/// Orders that are still being worked on upstream, newest first.
pub async fn fetch_orders_to_sync(limit: i64, conn: &mut SqliteConnection) -> Result<Vec<Order>, sqlx::Error> {
    let orders = sqlx::query_as(
        r#"
        SELECT * FROM orders
        WHERE status = $1 AND provider_order_id IS NOT NULL
        ORDER BY created_at DESC, id DESC
        LIMIT $2
        "#,
    )
    .bind(OrderStatusType::Processing)
    .bind(limit)
    .fetch_all(conn)
    .await?;
    Ok(orders)
}

/// Fetches orders according to the criteria in the `OrderQueryFilter`, newest first.
pub async fn search_orders(query: OrderQueryFilter, conn: &mut SqliteConnection) -> Result<Vec<Order>, sqlx::Error> {
    let mut builder = QueryBuilder::new("SELECT * FROM orders ");
    if !query.is_empty() {
        builder.push("WHERE ");
    }
    let mut where_clause = builder.separated(" AND ");
    if let Some(email) = &query.customer_email {
        where_clause.push("customer_email = ");
        where_clause.push_bind_unseparated(normalize_email(email));
    }
    if let Some(statuses) = query.status.as_ref().filter(|s| !s.is_empty()) {
        where_clause.push("status IN (");
        for (i, status) in statuses.iter().enumerate() {
            if i > 0 {
                where_clause.push_unseparated(", ");
            }
            where_clause.push_bind_unseparated(*status);
        }
        where_clause.push_unseparated(")");
    }
    if let Some(since) = query.since {
        where_clause.push("created_at >= ");
        where_clause.push_bind_unseparated(since);
    }
    if let Some(until) = query.until {
        where_clause.push("created_at <= ");
        where_clause.push_bind_unseparated(until);
    }
    builder.push(" ORDER BY created_at DESC, id DESC");
    if let Some(limit) = query.limit {
        builder.push(" LIMIT ");
        builder.push_bind(limit);
    }
    trace!("🗃️ Executing query: {}", builder.sql());
    let orders = builder.build_query_as::<Order>().fetch_all(conn).await?;
    trace!("🗃️ Result of search_orders: {} orders", orders.len());
    Ok(orders)
}

/// Applies the non-empty fields of `update` to the order. `updated_at` is always refreshed.
///
/// Returns `None` if no order has the given internal id.
pub async fn update_order(
    id: i64,
    update: &OrderUpdate,
    conn: &mut SqliteConnection,
) -> Result<Option<Order>, sqlx::Error> {
    let mut builder = QueryBuilder::new("UPDATE orders SET updated_at = ");
    builder.push_bind(Utc::now());
    if let Some(status) = update.status {
        builder.push(", status = ").push_bind(status);
    }
    if let Some(progress) = update.progress {
        builder.push(", progress = ").push_bind(progress);
    }
    if let Some(remains) = update.remains {
        builder.push(", remains = ").push_bind(remains);
    }
    if let Some(provider_order_id) = &update.provider_order_id {
        builder.push(", provider_order_id = ").push_bind(provider_order_id.clone());
    }
    if let Some(provider_name) = &update.provider_name {
        builder.push(", provider_name = ").push_bind(provider_name.clone());
    }
    if let Some(charge) = update.provider_charge {
        builder.push(", provider_charge = ").push_bind(charge);
    }
    if let Some(notes) = &update.notes {
        builder.push(", notes = ").push_bind(notes.clone());
    }
    if let Some(started_at) = update.started_at {
        builder.push(", started_at = ").push_bind(started_at);
    }
    if let Some(completed_at) = update.completed_at {
        builder.push(", completed_at = ").push_bind(completed_at);
    }
    builder.push(" WHERE id = ").push_bind(id).push(" RETURNING *");
    trace!("🗃️ Executing query: {}", builder.sql());
    let order = builder.build_query_as::<Order>().fetch_optional(conn).await?;
    Ok(order)
}

pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}
