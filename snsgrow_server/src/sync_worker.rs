use std::time::Duration;

use log::*;
use snsgrow_engine::{db_types::Order, OrderSyncApi, SqliteDatabase, SyncConfig};
use tokio::task::JoinHandle;

use crate::integrations::smmturk::SmmTurkProvider;

/// Starts the order sync worker. Do not await the returned JoinHandle, as it will run indefinitely.
///
/// Every `interval`, the most recent in-flight orders are reconciled with the provider. A failing run is logged and
/// the worker carries on with the next tick.
pub fn start_sync_worker(
    db: SqliteDatabase,
    provider: SmmTurkProvider,
    config: SyncConfig,
    interval: Duration,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut timer = tokio::time::interval(interval);
        timer.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        let api = OrderSyncApi::new(db, provider, config);
        info!("🕰️ Order sync worker started. Syncing every {}s", interval.as_secs());
        loop {
            timer.tick().await;
            debug!("🕰️ Running scheduled order sync");
            match api.sync_order_status(None).await {
                Ok(updated) => {
                    info!("🕰️ {} orders synced", updated.len());
                    debug!("🕰️ Synced orders: {}", order_list(&updated));
                },
                Err(e) => {
                    error!("🕰️ Error running the scheduled order sync: {e}");
                },
            }
        }
    })
}

fn order_list(orders: &[Order]) -> String {
    orders
        .iter()
        .map(|o| format!("[{}] order_id: {} status: {} progress: {}", o.id, o.order_id, o.status, o.progress))
        .collect::<Vec<String>>()
        .join(", ")
}
