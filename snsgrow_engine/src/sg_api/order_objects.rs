use std::{fmt::Display, str::FromStr};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sg_common::Price;

use crate::db_types::{Order, OrderId, OrderStatusType, ServiceLog, StatusHistoryEntry};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OrderQueryFilter {
    pub customer_email: Option<String>,
    pub status: Option<Vec<OrderStatusType>>,
    pub since: Option<DateTime<Utc>>,
    pub until: Option<DateTime<Utc>>,
    pub limit: Option<i64>,
}

impl OrderQueryFilter {
    pub fn with_customer_email<S: Into<String>>(mut self, email: S) -> Self {
        self.customer_email = Some(email.into());
        self
    }

    pub fn with_status(mut self, status: OrderStatusType) -> Self {
        self.status.get_or_insert_with(Vec::new).push(status);
        self
    }

    pub fn since(mut self, since: DateTime<Utc>) -> Self {
        self.since = Some(since);
        self
    }

    pub fn until(mut self, until: DateTime<Utc>) -> Self {
        self.until = Some(until);
        self
    }

    pub fn with_limit(mut self, limit: i64) -> Self {
        self.limit = Some(limit);
        self
    }

    /// True when no row-selecting criteria are set. `limit` does not count.
    pub fn is_empty(&self) -> bool {
        self.customer_email.is_none()
            && self.status.as_ref().map_or(true, |s| s.is_empty())
            && self.since.is_none()
            && self.until.is_none()
    }
}

impl Display for OrderQueryFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.is_empty() {
            return write!(f, "All orders");
        }
        if let Some(email) = &self.customer_email {
            write!(f, "email: {email}. ")?;
        }
        if let Some(statuses) = &self.status {
            let s = statuses.iter().map(|s| s.to_string()).collect::<Vec<_>>().join(",");
            write!(f, "status: [{s}]. ")?;
        }
        if let Some(since) = self.since {
            write!(f, "since: {since}. ")?;
        }
        if let Some(until) = self.until {
            write!(f, "until: {until}. ")?;
        }
        Ok(())
    }
}

/// How a tracking look-up identifies the order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TrackingQuery {
    OrderId(OrderId),
    Email(String),
}

impl FromStr for TrackingQuery {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value = s.trim();
        if value.is_empty() {
            return Err("An order id or e-mail address is required".to_string());
        }
        if value.contains('@') {
            Ok(Self::Email(value.to_lowercase()))
        } else {
            Ok(Self::OrderId(OrderId::from(value)))
        }
    }
}

impl Display for TrackingQuery {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::OrderId(id) => write!(f, "order {id}"),
            Self::Email(email) => write!(f, "e-mail {email}"),
        }
    }
}

/// One step of the customer-facing progress timeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimelineStage {
    pub status: OrderStatusType,
    pub label: String,
    pub reached: bool,
    pub current: bool,
    pub changed_at: Option<DateTime<Utc>>,
}

/// Everything the tracking page needs to render one order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackingView {
    pub order: Order,
    pub delivered: Option<i64>,
    pub remains: Option<i64>,
    pub progress: i64,
    pub timeline: Vec<TimelineStage>,
    pub is_terminal: bool,
    pub can_cancel: bool,
    pub poll_interval_secs: Option<u64>,
}

/// The result of successfully sending an order upstream.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessOrderResult {
    pub order_id: OrderId,
    pub provider_order_id: String,
    pub charge: Option<Price>,
    pub estimated_start: String,
}

/// An order together with its audit trail, for the admin views.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderDetails {
    pub order: Order,
    pub history: Vec<StatusHistoryEntry>,
    pub logs: Vec<ServiceLog>,
}
