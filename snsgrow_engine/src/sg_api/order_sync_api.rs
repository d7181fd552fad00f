use std::fmt::Debug;

use chrono::Utc;
use log::*;

use crate::{
    db_types::{NewServiceLog, Order, OrderId, OrderStatusType, ServiceLogAction},
    helpers::status_mapper::{clamp_progress, compute_progress, map_status},
    order_objects::ProcessOrderResult,
    traits::{FulfillmentProvider, FulfillmentRequest, OrderFlowError, OrderManagement, OrderUpdate},
};

pub const DEFAULT_SYNC_BATCH_LIMIT: i64 = 50;
pub const DEFAULT_ESTIMATED_START: &str = "10-30분";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncConfig {
    /// Maximum number of orders reconciled by one batch sync.
    pub batch_limit: i64,
    /// Message returned to the storefront after an order has been sent upstream.
    pub estimated_start: String,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self { batch_limit: DEFAULT_SYNC_BATCH_LIMIT, estimated_start: DEFAULT_ESTIMATED_START.to_string() }
    }
}

/// `OrderSyncApi` keeps local orders in step with the upstream provider.
///
/// * [`Self::process_order`] sends a paid order upstream.
/// * [`Self::sync_order_status`] polls the provider for the status of orders that are in flight and persists the
///   mapped status and progress.
///
/// There is no locking. Running a sync twice, or two syncs concurrently, writes the same `{status, progress}`
/// as long as the provider reports the same thing.
pub struct OrderSyncApi<B, P> {
    db: B,
    provider: P,
    config: SyncConfig,
}

impl<B, P> Debug for OrderSyncApi<B, P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "OrderSyncApi ({:?})", self.config)
    }
}

impl<B, P> OrderSyncApi<B, P> {
    pub fn new(db: B, provider: P, config: SyncConfig) -> Self {
        Self { db, provider, config }
    }

    pub fn config(&self) -> &SyncConfig {
        &self.config
    }
}

impl<B, P> OrderSyncApi<B, P>
where
    B: OrderManagement,
    P: FulfillmentProvider,
{
    /// Sends a `processing` order to the provider.
    ///
    /// The order must exist, be `processing` and not have been sent yet; otherwise
    /// [`OrderFlowError::OrderNotFound`] or [`OrderFlowError::OrderNotReady`] is returned and nothing is sent.
    ///
    /// If the provider refuses the order, it is marked `failed` with the provider's message in `notes`, and the
    /// provider error is returned as [`OrderFlowError::Upstream`].
    pub async fn process_order(
        &self,
        order_id: &OrderId,
        service_type: &str,
        target_url: &str,
        quantity: i64,
    ) -> Result<ProcessOrderResult, OrderFlowError> {
        let order = self
            .db
            .fetch_order_by_order_id(order_id)
            .await?
            .ok_or_else(|| OrderFlowError::OrderNotFound(order_id.clone()))?;
        if order.status != OrderStatusType::Processing {
            return Err(OrderFlowError::OrderNotReady(order.order_id, format!("The order is {}", order.status)));
        }
        if let Some(existing) = &order.provider_order_id {
            let reason = format!("It was already sent upstream as {existing}");
            return Err(OrderFlowError::OrderNotReady(order.order_id, reason));
        }
        let request =
            FulfillmentRequest { service: service_type.to_string(), link: target_url.to_string(), quantity };
        debug!("🔄️🚀️ Sending order {order_id} to {}", self.provider.provider_name());
        match self.provider.create_order(&request).await {
            Ok(receipt) => {
                let update = OrderUpdate::default()
                    .with_provider_order(receipt.provider_order_id.clone(), self.provider.provider_name())
                    .with_provider_charge(receipt.charge)
                    .started_at(Utc::now());
                let details = format!(
                    "Sent to {} as order {} (charge {})",
                    self.provider.provider_name(),
                    receipt.provider_order_id,
                    receipt.charge.map(|c| c.to_string()).unwrap_or_else(|| "unknown".into())
                );
                let log = NewServiceLog::new(ServiceLogAction::OrderSent, details);
                self.db.record_order_change(order.id, update, log).await?;
                info!("🔄️🚀️ Order {order_id} is now provider order {}", receipt.provider_order_id);
                Ok(ProcessOrderResult {
                    order_id: order.order_id,
                    provider_order_id: receipt.provider_order_id,
                    charge: receipt.charge,
                    estimated_start: self.config.estimated_start.clone(),
                })
            },
            Err(e) => {
                warn!("🔄️🚀️ The provider refused order {order_id}. {e}");
                let update = OrderUpdate::default()
                    .with_status(OrderStatusType::Failed)
                    .with_progress(0)
                    .with_notes(e.to_string());
                let log =
                    NewServiceLog::new(ServiceLogAction::OrderFailed, e.to_string()).with_progress(order.progress, 0);
                if let Err(db_err) = self.db.record_order_change(order.id, update, log).await {
                    error!("🔄️🚀️ Could not mark order {order_id} as failed. {db_err}");
                }
                Err(OrderFlowError::Upstream(e))
            },
        }
    }

    /// Reconciles orders with the provider.
    ///
    /// With `Some(order_id)`, only that order is synced. It must exist and have a provider order id, else
    /// [`OrderFlowError::OrderNotFound`] / [`OrderFlowError::OrderNotReady`].
    ///
    /// With `None`, up to [`SyncConfig::batch_limit`] of the newest `processing` orders are synced. Each order is
    /// handled independently: a failure on one is logged and the rest carry on.
    ///
    /// Returns the orders that were updated.
    pub async fn sync_order_status(&self, order_id: Option<&OrderId>) -> Result<Vec<Order>, OrderFlowError> {
        let targets = match order_id {
            Some(id) => {
                let order = self
                    .db
                    .fetch_order_by_order_id(id)
                    .await?
                    .ok_or_else(|| OrderFlowError::OrderNotFound(id.clone()))?;
                if !order.has_provider_order() {
                    let reason = "It has not been sent to the provider yet".to_string();
                    return Err(OrderFlowError::OrderNotReady(order.order_id, reason));
                }
                vec![order]
            },
            None => self.db.fetch_orders_to_sync(self.config.batch_limit).await?,
        };
        debug!("🔄️📡️ Syncing {} orders with {}", targets.len(), self.provider.provider_name());
        let total = targets.len();
        let mut updated = Vec::with_capacity(total);
        for order in targets {
            let id = order.order_id.clone();
            match self.sync_one(order).await {
                Ok(order) => updated.push(order),
                Err(e) => warn!("🔄️📡️ Could not sync order {id}. {e}"),
            }
        }
        info!("🔄️📡️ Order sync complete. {} of {total} orders updated", updated.len());
        Ok(updated)
    }

    async fn sync_one(&self, order: Order) -> Result<Order, OrderFlowError> {
        let provider_order_id = order.provider_order_id.clone().ok_or_else(|| {
            OrderFlowError::OrderNotReady(order.order_id.clone(), "No provider order id".to_string())
        })?;
        let status = self.provider.get_order_status(&provider_order_id).await?;
        let fresh = compute_progress(&status.status, status.remains, Some(order.quantity));
        // A terminal order never moves again, whatever the provider says now.
        let (new_status, progress) = if order.status.is_terminal() {
            (order.status, order.progress)
        } else {
            let mapped = map_status(&status.status);
            (mapped, clamp_progress(mapped, order.progress, fresh))
        };
        trace!(
            "🔄️📡️ Order {} (provider {provider_order_id}): '{}' -> {new_status}, progress {} -> {progress}",
            order.order_id,
            status.status,
            order.progress
        );
        let mut update = OrderUpdate::default()
            .with_status(new_status)
            .with_progress(progress)
            .with_remains(status.remains)
            .with_provider_charge(status.charge);
        if new_status == OrderStatusType::Completed && order.completed_at.is_none() {
            update = update.completed_at(Utc::now());
        }
        let details = format!("Provider status '{}', remains {:?}", status.status, status.remains);
        let log = NewServiceLog::new(ServiceLogAction::StatusSync, details).with_progress(order.progress, progress);
        let order = self.db.record_order_change(order.id, update, log).await?;
        if order.status.is_terminal() {
            info!("🔄️📡️ Order {} is {}", order.order_id, order.status);
        }
        Ok(order)
    }
}
