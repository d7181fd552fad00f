use std::fmt::Debug;

use log::*;

use crate::{
    db_types::{NewServiceLog, Order, OrderId, OrderStatusType, ServiceLogAction, StatusHistoryEntry},
    order_objects::{TimelineStage, TrackingQuery, TrackingView},
    traits::{OrderFlowError, OrderManagement, OrderUpdate},
};

/// Clients re-fetch a non-terminal order at this interval.
pub const POLL_INTERVAL_SECS: u64 = 30;

const TIMELINE: [(OrderStatusType, &str); 5] = [
    (OrderStatusType::Pending, "주문 접수"),
    (OrderStatusType::PaymentConfirmed, "결제 완료"),
    (OrderStatusType::Processing, "처리 중"),
    (OrderStatusType::InProgress, "진행 중"),
    (OrderStatusType::Completed, "완료"),
];

/// `TrackingApi` is the customer-facing read path.
///
/// It only ever renders persisted values; progress is never recomputed here.
pub struct TrackingApi<B> {
    db: B,
}

impl<B> Debug for TrackingApi<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "TrackingApi")
    }
}

impl<B> TrackingApi<B> {
    pub fn new(db: B) -> Self {
        Self { db }
    }
}

impl<B> TrackingApi<B>
where B: OrderManagement
{
    /// Looks an order up by order id, or by e-mail when the search value contains `@`. For an e-mail, the most
    /// recent order is returned.
    pub async fn track(&self, search_value: &str) -> Result<TrackingView, OrderFlowError> {
        let query = search_value.parse::<TrackingQuery>().map_err(OrderFlowError::InvalidRequest)?;
        trace!("🔍️ Tracking {query}");
        let order = match &query {
            TrackingQuery::OrderId(id) => self.db.fetch_order_by_order_id(id).await?,
            TrackingQuery::Email(email) => self.db.fetch_latest_order_for_email(email).await?,
        };
        let order = order.ok_or_else(|| OrderFlowError::NoMatchingOrder(search_value.trim().to_string()))?;
        let history = self.db.fetch_status_history(order.id).await?;
        Ok(tracking_view(order, &history))
    }

    /// Cancels an order that is still `pending` or `processing`.
    pub async fn cancel(&self, order_id: &OrderId) -> Result<Order, OrderFlowError> {
        let order = self
            .db
            .fetch_order_by_order_id(order_id)
            .await?
            .ok_or_else(|| OrderFlowError::OrderNotFound(order_id.clone()))?;
        if !order.status.is_cancellable() {
            debug!("🔍️ Order {order_id} cannot be cancelled while it is {}", order.status);
            return Err(OrderFlowError::NotCancellable(order.order_id, order.status));
        }
        let update = OrderUpdate::default()
            .with_status(OrderStatusType::Cancelled)
            .with_progress(0)
            .only_from(&[OrderStatusType::Pending, OrderStatusType::Processing]);
        let log = NewServiceLog::new(ServiceLogAction::OrderCancelled, format!("Cancelled while {}", order.status))
            .with_progress(order.progress, 0);
        // The status may have moved since it was read above
        let order = match self.db.record_order_change(order.id, update, log).await {
            Err(OrderFlowError::InvalidTransition { order_id, from, .. }) => {
                debug!("🔍️ Order {order_id} moved to {from} before it could be cancelled");
                return Err(OrderFlowError::NotCancellable(order_id, from));
            },
            res => res?,
        };
        info!("🔍️ Order {order_id} has been cancelled");
        Ok(order)
    }
}

/// Builds the tracking view for an order from its persisted state and status history.
pub fn tracking_view(order: Order, history: &[StatusHistoryEntry]) -> TrackingView {
    let is_terminal = order.status.is_terminal();
    let timeline = build_timeline(&order, history);
    TrackingView {
        delivered: order.delivered(),
        remains: order.remains,
        progress: order.progress,
        timeline,
        is_terminal,
        can_cancel: order.status.is_cancellable(),
        poll_interval_secs: (!is_terminal).then_some(POLL_INTERVAL_SECS),
        order,
    }
}

fn stage_index(status: OrderStatusType) -> Option<usize> {
    TIMELINE.iter().position(|(s, _)| *s == status)
}

/// The five stage timeline. A stage is reached when the order passed through it. For `failed` and `cancelled` orders,
/// the furthest stage the history shows is marked as current.
fn build_timeline(order: &Order, history: &[StatusHistoryEntry]) -> Vec<TimelineStage> {
    let current = stage_index(order.status).or_else(|| history.iter().filter_map(|h| stage_index(h.status)).max());
    TIMELINE
        .iter()
        .enumerate()
        .map(|(i, (status, label))| {
            let reached = current.map_or(false, |c| i <= c);
            let is_current = current == Some(i);
            let changed_at = history.iter().rev().find(|h| h.status == *status).map(|h| h.changed_at).or({
                if i == 0 {
                    Some(order.created_at)
                } else if is_current {
                    Some(order.updated_at)
                } else {
                    None
                }
            });
            TimelineStage {
                status: *status,
                label: label.to_string(),
                reached,
                current: is_current,
                changed_at: if reached { changed_at } else { None },
            }
        })
        .collect()
}
