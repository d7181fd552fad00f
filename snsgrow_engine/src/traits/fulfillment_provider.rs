use serde::{Deserialize, Serialize};
use sg_common::Price;
use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FulfillmentError {
    /// The provider answered, and refused the request. The message is the provider's own text.
    #[error("{0}")]
    Rejected(String),
    #[error("The provider could not be reached. {0}")]
    Unavailable(String),
    #[error("The provider sent a response we could not understand. {0}")]
    InvalidResponse(String),
}

/// A service as offered by the provider, before the local markup is applied.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProviderServiceInfo {
    pub service: i64,
    pub name: String,
    pub service_type: String,
    pub category: String,
    /// Price per 1000 units
    pub rate: Price,
    pub min: i64,
    pub max: i64,
    pub dripfeed: bool,
    pub refill: bool,
    pub cancel: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FulfillmentRequest {
    pub service: String,
    pub link: String,
    pub quantity: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FulfillmentReceipt {
    pub provider_order_id: String,
    pub charge: Option<Price>,
    pub currency: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderOrderStatus {
    /// The provider's raw status string, e.g. `"In progress"`.
    pub status: String,
    pub remains: Option<i64>,
    pub start_count: Option<i64>,
    pub charge: Option<Price>,
    pub currency: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderBalance {
    pub balance: Price,
    pub currency: String,
}

/// The upstream panel that delivers orders.
///
/// Implementations are expected to handle transport concerns (timeouts, retries) themselves. Errors returned here are
/// final.
#[allow(async_fn_in_trait)]
pub trait FulfillmentProvider: Clone {
    /// The name recorded in `provider_name` for orders sent to this provider.
    fn provider_name(&self) -> &'static str;

    async fn fetch_services(&self) -> Result<Vec<ProviderServiceInfo>, FulfillmentError>;

    /// Submits an order. This call is not idempotent; a success means the provider is now delivering.
    async fn create_order(&self, request: &FulfillmentRequest) -> Result<FulfillmentReceipt, FulfillmentError>;

    async fn get_order_status(&self, provider_order_id: &str) -> Result<ProviderOrderStatus, FulfillmentError>;

    async fn get_balance(&self) -> Result<ProviderBalance, FulfillmentError>;
}
