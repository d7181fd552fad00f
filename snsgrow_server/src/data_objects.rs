use std::fmt::Display;

use serde::{Deserialize, Serialize};
use snsgrow_engine::{
    db_types::{OrderId, OrderStatusType},
    order_objects::OrderQueryFilter,
};

use crate::errors::ServerError;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonResponse {
    pub success: bool,
    pub message: String,
}

impl JsonResponse {
    pub fn success<S: Display>(message: S) -> Self {
        Self { success: true, message: message.to_string() }
    }

    pub fn failure<S: Display>(message: S) -> Self {
        Self { success: false, message: message.to_string() }
    }
}

/// The `{success: true, data}` envelope used by the REST surface.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: T,
}

impl<T> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self { success: true, data }
    }
}

/// `{success: true, ...fields}`, as returned by the provider-action dispatch endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct DispatchResponse<T> {
    pub success: bool,
    #[serde(flatten)]
    pub data: T,
}

impl<T> DispatchResponse<T> {
    pub fn ok(data: T) -> Self {
        Self { success: true, data }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackParams {
    pub order_id: Option<String>,
    pub email: Option<String>,
}

impl TrackParams {
    /// The order id takes precedence when both parameters are given.
    pub fn search_value(&self) -> &str {
        self.order_id.as_deref().filter(|s| !s.trim().is_empty()).or(self.email.as_deref()).unwrap_or_default()
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ServicesParams {
    pub platform: Option<String>,
}

/// Query string for the admin order search. `status` is a comma-separated list.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AdminOrdersParams {
    pub status: Option<String>,
    pub email: Option<String>,
    pub limit: Option<i64>,
}

impl TryFrom<AdminOrdersParams> for OrderQueryFilter {
    type Error = ServerError;

    fn try_from(params: AdminOrdersParams) -> Result<Self, Self::Error> {
        let mut filter = OrderQueryFilter::default();
        if let Some(email) = params.email.filter(|e| !e.trim().is_empty()) {
            filter = filter.with_customer_email(email);
        }
        for s in params.status.iter().flat_map(|s| s.split(',')).filter(|s| !s.trim().is_empty()) {
            let status =
                s.parse::<OrderStatusType>().map_err(|e| ServerError::InvalidRequestBody(e.to_string()))?;
            filter = filter.with_status(status);
        }
        if let Some(limit) = params.limit {
            filter = filter.with_limit(limit.max(1));
        }
        Ok(filter)
    }
}

/// Body of `POST /api/admin/orders/sync`. An absent `orderId` syncs a batch.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncRequest {
    pub order_id: Option<OrderId>,
}

/// Requests accepted by the provider-action dispatch endpoint.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "action", rename_all = "kebab-case")]
pub enum ProviderAction {
    #[serde(rename_all = "camelCase")]
    ProcessOrder { order_id: OrderId, service_type: String, target_url: String, quantity: i64 },
    #[serde(rename_all = "camelCase")]
    SyncOrderStatus {
        #[serde(default)]
        order_id: Option<OrderId>,
    },
    GetProviderServices,
    CheckBalance,
}

impl ProviderAction {
    pub const NAMES: [&'static str; 4] =
        ["process-order", "sync-order-status", "get-provider-services", "check-balance"];

    pub fn name(&self) -> &'static str {
        match self {
            Self::ProcessOrder { .. } => "process-order",
            Self::SyncOrderStatus { .. } => "sync-order-status",
            Self::GetProviderServices => "get-provider-services",
            Self::CheckBalance => "check-balance",
        }
    }
}
