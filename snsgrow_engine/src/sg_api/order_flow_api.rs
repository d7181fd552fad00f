use std::fmt::Debug;

use log::*;

use crate::{
    db_types::{NewOrder, NewServiceLog, Order, OrderId, OrderStatusType, ServiceLogAction},
    order_objects::{OrderDetails, OrderQueryFilter},
    traits::{OrderFlowError, OrderManagement, OrderUpdate},
};

/// `OrderFlowApi` handles order intake and payment confirmation.
///
/// Orders arrive as `pending`. Once the payment gateway confirms payment, the order moves through
/// `payment_confirmed` to `processing`, where it waits to be sent upstream by
/// [`OrderSyncApi::process_order`](crate::OrderSyncApi::process_order).
pub struct OrderFlowApi<B> {
    db: B,
}

impl<B> Debug for OrderFlowApi<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "OrderFlowApi")
    }
}

impl<B> OrderFlowApi<B> {
    pub fn new(db: B) -> Self {
        Self { db }
    }

    pub fn db(&self) -> &B {
        &self.db
    }
}

impl<B> OrderFlowApi<B>
where B: OrderManagement
{
    /// Submit a new order. The order is stored as `pending`.
    ///
    /// Duplicate order ids are rejected with [`OrderFlowError::OrderAlreadyExists`].
    pub async fn create_order(&self, order: NewOrder) -> Result<Order, OrderFlowError> {
        validate_new_order(&order)?;
        let order = self.db.insert_order(order).await?;
        info!("🔄️📦️ Order {} received for {}", order.order_id, order.customer_email);
        Ok(order)
    }

    /// Marks the payment for a `pending` order as confirmed. The order passes through `payment_confirmed` and lands
    /// in `processing`, ready to be sent to the provider.
    pub async fn confirm_payment(&self, order_id: &OrderId) -> Result<Order, OrderFlowError> {
        let order = self.fetch_order(order_id).await?;
        if order.status != OrderStatusType::Pending {
            warn!("🔄️💰️ Payment confirmation for order {order_id} ignored. The order is {}", order.status);
            return Err(OrderFlowError::InvalidTransition {
                order_id: order.order_id,
                from: order.status,
                to: OrderStatusType::PaymentConfirmed,
            });
        }
        let update = OrderUpdate::default()
            .via(OrderStatusType::PaymentConfirmed)
            .with_status(OrderStatusType::Processing)
            .only_from(&[OrderStatusType::Pending]);
        let details = format!("Payment of {} confirmed", order.total_price);
        let log = NewServiceLog::new(ServiceLogAction::PaymentConfirmed, details);
        let order = self.db.record_order_change(order.id, update, log).await?;
        info!("🔄️💰️ Payment for order {order_id} confirmed. The order is now {}", order.status);
        Ok(order)
    }

    pub async fn fetch_order(&self, order_id: &OrderId) -> Result<Order, OrderFlowError> {
        self.db.fetch_order_by_order_id(order_id).await?.ok_or_else(|| OrderFlowError::OrderNotFound(order_id.clone()))
    }

    pub async fn search_orders(&self, query: OrderQueryFilter) -> Result<Vec<Order>, OrderFlowError> {
        trace!("🔄️📦️ Searching orders: {query}");
        self.db.search_orders(query).await
    }

    /// The order with its full status history and audit log.
    pub async fn order_details(&self, order_id: &OrderId) -> Result<OrderDetails, OrderFlowError> {
        let order = self.fetch_order(order_id).await?;
        let history = self.db.fetch_status_history(order.id).await?;
        let logs = self.db.fetch_service_logs(order.id).await?;
        Ok(OrderDetails { order, history, logs })
    }
}

fn validate_new_order(order: &NewOrder) -> Result<(), OrderFlowError> {
    let invalid = |msg: &str| Err(OrderFlowError::InvalidRequest(msg.to_string()));
    if order.order_id.as_str().trim().is_empty() {
        return invalid("order id is empty");
    }
    if !order.customer_email.contains('@') {
        return invalid("customer e-mail address is not valid");
    }
    if order.service_id.trim().is_empty() {
        return invalid("service id is empty");
    }
    if order.target_url.trim().is_empty() {
        return invalid("target url is empty");
    }
    if order.quantity <= 0 {
        return invalid("quantity must be positive");
    }
    Ok(())
}
