//! `SqliteDatabase` is the concrete storage backend for the SNS Growth engine.
//!
//! It implements [`OrderManagement`] and [`ServiceCatalog`] on top of the free functions in [`super::db`], opening a
//! transaction wherever a change spans more than one table.
use std::fmt::Debug;

use log::*;
use sqlx::{migrate::MigrateError, SqlitePool};

use super::db::{audit, db_url, new_pool, orders, services};
use crate::{
    db_types::{
        NewOrder,
        NewService,
        NewServiceLog,
        Order,
        OrderId,
        OrderStatusType,
        Service,
        ServiceLog,
        ServiceLogAction,
        StatusHistoryEntry,
    },
    order_objects::OrderQueryFilter,
    traits::{CatalogError, OrderFlowError, OrderManagement, OrderUpdate, ServiceCatalog},
};

#[derive(Clone)]
pub struct SqliteDatabase {
    url: String,
    pool: SqlitePool,
}

impl Debug for SqliteDatabase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "SqliteDatabase ({:?})", self.pool)
    }
}

impl OrderManagement for SqliteDatabase {
    fn url(&self) -> &str {
        self.url.as_str()
    }

    async fn insert_order(&self, order: NewOrder) -> Result<Order, OrderFlowError> {
        let mut tx = self.pool.begin().await?;
        if orders::fetch_order_by_order_id(&order.order_id, &mut tx).await?.is_some() {
            return Err(OrderFlowError::OrderAlreadyExists(order.order_id));
        }
        let details = format!("Order received: {} x{} for {}", order.service_id, order.quantity, order.target_url);
        let order = orders::insert_order(order, &mut tx).await?;
        audit::insert_status_history(order.id, OrderStatusType::Pending, &mut tx).await?;
        audit::insert_service_log(order.id, NewServiceLog::new(ServiceLogAction::OrderCreated, details), &mut tx)
            .await?;
        tx.commit().await?;
        debug!("🗃️ Order {} has been saved in the DB with id {}", order.order_id, order.id);
        Ok(order)
    }

    async fn fetch_order_by_order_id(&self, order_id: &OrderId) -> Result<Option<Order>, OrderFlowError> {
        let mut conn = self.pool.acquire().await?;
        let order = orders::fetch_order_by_order_id(order_id, &mut conn).await?;
        Ok(order)
    }

    async fn fetch_latest_order_for_email(&self, email: &str) -> Result<Option<Order>, OrderFlowError> {
        let mut conn = self.pool.acquire().await?;
        let order = orders::fetch_latest_order_for_email(email, &mut conn).await?;
        Ok(order)
    }

    async fn search_orders(&self, query: OrderQueryFilter) -> Result<Vec<Order>, OrderFlowError> {
        let mut conn = self.pool.acquire().await?;
        let orders = orders::search_orders(query, &mut conn).await?;
        Ok(orders)
    }

    async fn fetch_orders_to_sync(&self, limit: i64) -> Result<Vec<Order>, OrderFlowError> {
        let mut conn = self.pool.acquire().await?;
        let orders = orders::fetch_orders_to_sync(limit, &mut conn).await?;
        trace!("🗃️ {} orders are waiting on the provider", orders.len());
        Ok(orders)
    }

    async fn fetch_status_history(&self, id: i64) -> Result<Vec<StatusHistoryEntry>, OrderFlowError> {
        let mut conn = self.pool.acquire().await?;
        let history = audit::fetch_status_history(id, &mut conn).await?;
        Ok(history)
    }

    async fn fetch_service_logs(&self, id: i64) -> Result<Vec<ServiceLog>, OrderFlowError> {
        let mut conn = self.pool.acquire().await?;
        let logs = audit::fetch_service_logs(id, &mut conn).await?;
        Ok(logs)
    }

    /// In a single transaction:
    /// * the stored status is checked against the update (see [`OrderUpdate::applies_to`]),
    /// * the order row is updated,
    /// * if the status changed, history rows are appended for the intermediate statuses and the new status,
    /// * the service log row is written.
    async fn record_order_change(
        &self,
        id: i64,
        update: OrderUpdate,
        log: NewServiceLog,
    ) -> Result<Order, OrderFlowError> {
        let mut tx = self.pool.begin().await?;
        let old = orders::fetch_order_by_id(id, &mut tx).await?.ok_or(OrderFlowError::OrderIdNotFound(id))?;
        if !update.applies_to(old.status) {
            debug!("🗃️ Update for order {} rejected. It is {}", old.order_id, old.status);
            let to = update.status.unwrap_or(old.status);
            return Err(OrderFlowError::InvalidTransition { order_id: old.order_id, from: old.status, to });
        }
        let order = orders::update_order(id, &update, &mut tx).await?.ok_or(OrderFlowError::OrderIdNotFound(id))?;
        if order.status != old.status {
            for status in &update.intermediate_statuses {
                audit::insert_status_history(id, *status, &mut tx).await?;
            }
            audit::insert_status_history(id, order.status, &mut tx).await?;
            trace!("🗃️ Order {} moved from {} to {}", order.order_id, old.status, order.status);
        }
        audit::insert_service_log(id, log, &mut tx).await?;
        tx.commit().await?;
        Ok(order)
    }
}

impl ServiceCatalog for SqliteDatabase {
    async fn replace_services(&self, new_services: Vec<NewService>) -> Result<Vec<Service>, CatalogError> {
        let mut tx = self.pool.begin().await?;
        let result = services::replace_services(new_services, &mut tx).await?;
        tx.commit().await?;
        Ok(result)
    }

    async fn fetch_services(&self, platform: Option<&str>) -> Result<Vec<Service>, CatalogError> {
        let mut conn = self.pool.acquire().await?;
        let result = services::fetch_services(platform, &mut conn).await?;
        Ok(result)
    }

    async fn fetch_service_by_provider_id(&self, smmturk_id: i64) -> Result<Option<Service>, CatalogError> {
        let mut conn = self.pool.acquire().await?;
        let result = services::fetch_service_by_provider_id(smmturk_id, &mut conn).await?;
        Ok(result)
    }
}

impl SqliteDatabase {
    /// Creates a new database connection pool using the URL in `SG_DATABASE_URL`.
    pub async fn new(max_connections: u32) -> Result<Self, sqlx::Error> {
        let url = db_url();
        SqliteDatabase::new_with_url(url.as_str(), max_connections).await
    }

    pub async fn new_with_url(url: &str, max_connections: u32) -> Result<Self, sqlx::Error> {
        trace!("🗃️ Creating new database connection pool with url {url}");
        let pool = new_pool(url, max_connections).await?;
        let url = url.to_string();
        Ok(Self { url, pool })
    }

    /// Brings the schema up to date.
    pub async fn migrate(&self) -> Result<(), MigrateError> {
        sqlx::migrate!("./src/sqlite/migrations").run(&self.pool).await?;
        info!("🗃️ Database migrations complete");
        Ok(())
    }

    /// Returns a reference to the database connection pool.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    pub async fn close(&mut self) -> Result<(), sqlx::Error> {
        self.pool.close().await;
        Ok(())
    }
}
