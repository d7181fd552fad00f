use chrono::{DateTime, Utc};
use sg_common::Price;

use crate::db_types::OrderStatusType;

/// A partial update to an order row. `None` fields are left untouched.
///
/// When `status` differs from the stored status, the backend appends one history row for every entry in
/// `intermediate_statuses` (in order) followed by one for `status` itself.
///
/// The stored status is re-read inside the same transaction before anything is written. A terminal order never
/// takes a different status, and when `allowed_from` is not empty the stored status must be one of its entries.
/// Either violation is reported as [`OrderFlowError::InvalidTransition`](crate::traits::OrderFlowError).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OrderUpdate {
    pub status: Option<OrderStatusType>,
    pub intermediate_statuses: Vec<OrderStatusType>,
    pub progress: Option<i64>,
    pub remains: Option<i64>,
    pub provider_order_id: Option<String>,
    pub provider_name: Option<String>,
    pub provider_charge: Option<Price>,
    pub notes: Option<String>,
    pub started_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    pub allowed_from: Vec<OrderStatusType>,
}

impl OrderUpdate {
    pub fn with_status(mut self, status: OrderStatusType) -> Self {
        self.status = Some(status);
        self
    }

    pub fn via(mut self, status: OrderStatusType) -> Self {
        self.intermediate_statuses.push(status);
        self
    }

    pub fn with_progress(mut self, progress: i64) -> Self {
        self.progress = Some(progress);
        self
    }

    pub fn with_remains(mut self, remains: Option<i64>) -> Self {
        self.remains = remains;
        self
    }

    pub fn with_provider_order<S: Into<String>, N: Into<String>>(mut self, order_id: S, provider: N) -> Self {
        self.provider_order_id = Some(order_id.into());
        self.provider_name = Some(provider.into());
        self
    }

    pub fn with_provider_charge(mut self, charge: Option<Price>) -> Self {
        self.provider_charge = charge;
        self
    }

    pub fn with_notes<S: Into<String>>(mut self, notes: S) -> Self {
        self.notes = Some(notes.into());
        self
    }

    pub fn started_at(mut self, ts: DateTime<Utc>) -> Self {
        self.started_at = Some(ts);
        self
    }

    pub fn completed_at(mut self, ts: DateTime<Utc>) -> Self {
        self.completed_at = Some(ts);
        self
    }

    /// Only apply the update if the stored status is one of `statuses`.
    pub fn only_from(mut self, statuses: &[OrderStatusType]) -> Self {
        self.allowed_from = statuses.to_vec();
        self
    }

    /// Whether an order currently in `current` may take this update.
    pub fn applies_to(&self, current: OrderStatusType) -> bool {
        let leaves_terminal = current.is_terminal() && self.status.is_some_and(|s| s != current);
        let allowed = self.allowed_from.is_empty() || self.allowed_from.contains(&current);
        !leaves_terminal && allowed
    }

    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }
}
