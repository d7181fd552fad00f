//! Client-side order tracking.
//!
//! [`OrderTracker`] fetches an order once, and then again every [`POLL_INTERVAL_SECS`] seconds until the order reaches
//! a terminal status. The status is taken from each fresh fetch, so an order that completes between two ticks stops
//! the polling on the very next one. Fetch failures are logged and the tracker keeps polling.
//!
//! Dropping the future returned by [`OrderTracker::track`] cancels the polling.
use std::time::Duration;

use anyhow::Result;
use log::*;
use snsgrow_engine::{order_objects::TrackingView, POLL_INTERVAL_SECS};
use tokio::time::MissedTickBehavior;

#[allow(async_fn_in_trait)]
pub trait TrackingSource {
    async fn fetch(&self, search_value: &str) -> Result<TrackingView>;
}

pub struct OrderTracker<S> {
    source: S,
    interval: Duration,
}

impl<S: TrackingSource> OrderTracker<S> {
    pub fn new(source: S) -> Self {
        Self { source, interval: Duration::from_secs(POLL_INTERVAL_SECS) }
    }

    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Polls until the order is terminal, passing every successfully fetched view to `on_update`. Returns the
    /// terminal view.
    pub async fn track<F>(&self, search_value: &str, mut on_update: F) -> TrackingView
    where F: FnMut(&TrackingView) {
        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            match self.source.fetch(search_value).await {
                Ok(view) => {
                    let status = view.order.status;
                    trace!("🔍️ Order {} is {status} ({}%)", view.order.order_id, view.progress);
                    on_update(&view);
                    if status.is_terminal() {
                        info!("🔍️ Order {} reached {status}. Polling stopped.", view.order.order_id);
                        return view;
                    }
                },
                Err(e) => warn!("🔍️ Could not fetch '{search_value}'. Will try again in {:?}. {e}", self.interval),
            }
        }
    }
}
