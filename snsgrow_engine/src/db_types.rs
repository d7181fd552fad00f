use std::{fmt::Display, str::FromStr};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sg_common::Price;
use sqlx::{FromRow, Type};
use thiserror::Error;

/// Name recorded against orders that were fulfilled by the SMM Turk panel.
pub const SMMTURK_PROVIDER_NAME: &str = "smmturk";

//--------------------------------------        OrderId        ---------------------------------------------------------
#[derive(Debug, Clone, PartialEq, Eq, Hash, Type, Serialize, Deserialize)]
#[sqlx(transparent)]
#[serde(transparent)]
pub struct OrderId(pub String);

impl FromStr for OrderId {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(s.to_string()))
    }
}

impl From<String> for OrderId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for OrderId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl Display for OrderId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

impl OrderId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

//--------------------------------------   OrderStatusType     ---------------------------------------------------------
/// Local order states. Orders only ever move forward through this list (or sideways into `Cancelled`/`Failed`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Type, Serialize, Deserialize)]
#[sqlx(rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum OrderStatusType {
    /// The order has been placed but payment has not been confirmed yet.
    Pending,
    /// The payment gateway confirmed the payment.
    PaymentConfirmed,
    /// The order is waiting on, or being worked on by, the upstream provider.
    Processing,
    /// Delivery has visibly started.
    InProgress,
    /// Delivery finished (fully, or partially with the remainder refunded upstream).
    Completed,
    /// Cancelled by the customer or an admin before delivery.
    Cancelled,
    /// The provider rejected or cancelled the order.
    Failed,
}

impl OrderStatusType {
    /// No further synchronisation is expected once an order reaches one of these states.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Cancelled | Self::Failed)
    }

    pub fn is_cancellable(&self) -> bool {
        matches!(self, Self::Pending | Self::Processing)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::PaymentConfirmed => "payment_confirmed",
            Self::Processing => "processing",
            Self::InProgress => "in_progress",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
            Self::Failed => "failed",
        }
    }
}

impl Display for OrderStatusType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Error)]
#[error("Invalid order status: {0}")]
pub struct ConversionError(String);

impl FromStr for OrderStatusType {
    type Err = ConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace([' ', '-'], "_").as_str() {
            "pending" => Ok(Self::Pending),
            "payment_confirmed" => Ok(Self::PaymentConfirmed),
            "processing" => Ok(Self::Processing),
            "in_progress" => Ok(Self::InProgress),
            "completed" => Ok(Self::Completed),
            "cancelled" | "canceled" => Ok(Self::Cancelled),
            "failed" => Ok(Self::Failed),
            _ => Err(ConversionError(s.to_string())),
        }
    }
}

//--------------------------------------        NewOrder       ---------------------------------------------------------
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewOrder {
    pub order_id: OrderId,
    pub customer_email: String,
    /// Upstream service identifier
    pub service_id: String,
    #[serde(default)]
    pub service_name: String,
    pub target_url: String,
    pub quantity: i64,
    #[serde(default)]
    pub total_price: Price,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
}

impl NewOrder {
    pub fn new<E: Into<String>, S: Into<String>, U: Into<String>>(
        order_id: OrderId,
        customer_email: E,
        service_id: S,
        target_url: U,
        quantity: i64,
    ) -> Self {
        Self {
            order_id,
            customer_email: customer_email.into(),
            service_id: service_id.into(),
            service_name: String::default(),
            target_url: target_url.into(),
            quantity,
            total_price: Price::default(),
            created_at: Utc::now(),
        }
    }

    pub fn with_service_name<S: Into<String>>(mut self, name: S) -> Self {
        self.service_name = name.into();
        self
    }

    pub fn with_total_price(mut self, price: Price) -> Self {
        self.total_price = price;
        self
    }
}

impl Display for NewOrder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Order {} for {}: service {} x{} -> {}",
            self.order_id, self.customer_email, self.service_id, self.quantity, self.target_url
        )
    }
}

//--------------------------------------          Order        ---------------------------------------------------------
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: i64,
    pub order_id: OrderId,
    pub customer_email: String,
    pub service_id: String,
    pub service_name: String,
    pub target_url: String,
    pub quantity: i64,
    pub total_price: Price,
    pub status: OrderStatusType,
    pub progress: i64,
    /// The last `remains` value reported by the provider
    pub remains: Option<i64>,
    pub provider_order_id: Option<String>,
    pub provider_name: Option<String>,
    pub provider_charge: Option<Price>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub started_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
}

impl Order {
    /// Units delivered so far, derived from the provider's `remains`. `None` until the provider has reported one.
    pub fn delivered(&self) -> Option<i64> {
        self.remains.map(|r| (self.quantity - r).clamp(0, self.quantity))
    }

    pub fn has_provider_order(&self) -> bool {
        self.provider_order_id.is_some()
    }
}

//--------------------------------------   StatusHistoryEntry  ---------------------------------------------------------
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusHistoryEntry {
    pub status: OrderStatusType,
    pub changed_at: DateTime<Utc>,
}

//--------------------------------------       ServiceLog      ---------------------------------------------------------
#[derive(Debug, Clone, Copy, PartialEq, Eq, Type, Serialize, Deserialize)]
#[sqlx(rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ServiceLogAction {
    OrderCreated,
    PaymentConfirmed,
    OrderSent,
    OrderFailed,
    StatusSync,
    OrderCancelled,
}

/// An audit row. One is written in the same transaction as every order change.
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceLog {
    pub id: i64,
    pub order_id: i64,
    pub action: ServiceLogAction,
    pub details: String,
    pub progress_before: Option<i64>,
    pub progress_after: Option<i64>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewServiceLog {
    pub action: ServiceLogAction,
    pub details: String,
    pub progress_before: Option<i64>,
    pub progress_after: Option<i64>,
}

impl NewServiceLog {
    pub fn new<S: Into<String>>(action: ServiceLogAction, details: S) -> Self {
        Self { action, details: details.into(), progress_before: None, progress_after: None }
    }

    pub fn with_progress(mut self, before: i64, after: i64) -> Self {
        self.progress_before = Some(before);
        self.progress_after = Some(after);
        self
    }
}

//--------------------------------------         Service       ---------------------------------------------------------
/// A cached upstream catalogue entry with the local selling price.
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Service {
    pub id: i64,
    pub smmturk_id: i64,
    pub name: String,
    pub platform: String,
    pub category: String,
    pub service_type: String,
    /// Upstream rate per 1000 units
    pub smmturk_price: Price,
    /// Selling price per 1000 units
    pub price: Price,
    pub min_quantity: i64,
    pub max_quantity: i64,
    pub dripfeed: bool,
    pub refill: bool,
    pub cancel: bool,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewService {
    pub smmturk_id: i64,
    pub name: String,
    pub platform: String,
    pub category: String,
    pub service_type: String,
    pub smmturk_price: Price,
    pub price: Price,
    pub min_quantity: i64,
    pub max_quantity: i64,
    pub dripfeed: bool,
    pub refill: bool,
    pub cancel: bool,
}
