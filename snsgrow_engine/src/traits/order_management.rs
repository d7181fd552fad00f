use thiserror::Error;

use crate::{
    db_types::{NewOrder, NewServiceLog, Order, OrderId, OrderStatusType, ServiceLog, StatusHistoryEntry},
    order_objects::OrderQueryFilter,
    traits::{FulfillmentError, OrderUpdate},
};

#[derive(Debug, Clone, Error)]
pub enum OrderFlowError {
    #[error("We have an internal database engine (configuration/uptime etc.) : {0}")]
    DatabaseError(String),
    #[error("Cannot insert order, since it already exists: {0}")]
    OrderAlreadyExists(OrderId),
    #[error("The requested order {0} does not exist")]
    OrderNotFound(OrderId),
    #[error("The requested order (internal id {0}) does not exist")]
    OrderIdNotFound(i64),
    #[error("No order matches the search value '{0}'")]
    NoMatchingOrder(String),
    #[error("Order {0} is not ready for this action. {1}")]
    OrderNotReady(OrderId, String),
    #[error("Order {order_id} cannot move from {from} to {to}")]
    InvalidTransition { order_id: OrderId, from: OrderStatusType, to: OrderStatusType },
    #[error("Order {0} cannot be cancelled while it is {1}")]
    NotCancellable(OrderId, OrderStatusType),
    #[error("Upstream provider error. {0}")]
    Upstream(#[from] FulfillmentError),
    #[error("Invalid request. {0}")]
    InvalidRequest(String),
}

impl From<sqlx::Error> for OrderFlowError {
    fn from(e: sqlx::Error) -> Self {
        OrderFlowError::DatabaseError(e.to_string())
    }
}

/// Storage contract for orders and their audit trail.
#[allow(async_fn_in_trait)]
pub trait OrderManagement: Clone {
    /// The URL of the database
    fn url(&self) -> &str;

    /// Stores a new `pending` order, its first history row and an `order_created` log row in one transaction.
    ///
    /// Returns [`OrderFlowError::OrderAlreadyExists`] if the `order_id` is taken.
    async fn insert_order(&self, order: NewOrder) -> Result<Order, OrderFlowError>;

    async fn fetch_order_by_order_id(&self, order_id: &OrderId) -> Result<Option<Order>, OrderFlowError>;

    /// The most recently created order for the given e-mail address (case-insensitive).
    async fn fetch_latest_order_for_email(&self, email: &str) -> Result<Option<Order>, OrderFlowError>;

    async fn search_orders(&self, query: OrderQueryFilter) -> Result<Vec<Order>, OrderFlowError>;

    /// Up to `limit` `processing` orders that have been sent upstream, newest first.
    async fn fetch_orders_to_sync(&self, limit: i64) -> Result<Vec<Order>, OrderFlowError>;

    /// Status history for the order with internal id `id`, oldest first.
    async fn fetch_status_history(&self, id: i64) -> Result<Vec<StatusHistoryEntry>, OrderFlowError>;

    /// Audit log for the order with internal id `id`, oldest first.
    async fn fetch_service_logs(&self, id: i64) -> Result<Vec<ServiceLog>, OrderFlowError>;

    /// Applies `update` to the order with internal id `id` and writes the history rows and the `log` row. All of this
    /// happens in a single transaction; either everything is persisted or nothing is.
    ///
    /// The stored status is read inside that transaction. If [`OrderUpdate::applies_to`] rejects it, nothing is written
    /// and [`OrderFlowError::InvalidTransition`] is returned.
    ///
    /// `updated_at` is always refreshed. Returns the updated order.
    async fn record_order_change(&self, id: i64, update: OrderUpdate, log: NewServiceLog)
        -> Result<Order, OrderFlowError>;
}
