use std::sync::Arc;

use log::*;
use reqwest::{
    header::{HeaderMap, HeaderValue},
    Client,
};
use serde::de::DeserializeOwned;
use serde_json::{json, Map, Value};

use crate::{
    config::SmmTurkConfig,
    data_objects::{Balance, NewProviderOrder, OrderCreated, OrderStatus, ProviderService},
    SmmTurkApiError,
};

#[derive(Clone)]
pub struct SmmTurkApi {
    config: SmmTurkConfig,
    client: Arc<Client>,
}

impl SmmTurkApi {
    pub fn new(config: SmmTurkConfig) -> Result<Self, SmmTurkApiError> {
        let mut headers = HeaderMap::with_capacity(2);
        headers.insert("Accept", HeaderValue::from_static("application/json"));
        headers.insert("Content-Type", HeaderValue::from_static("application/json"));
        let client = Client::builder()
            .user_agent("snsgrow-fulfilment")
            .default_headers(headers)
            .timeout(config.timeout)
            .build()
            .map_err(|e| SmmTurkApiError::Initialization(e.to_string()))?;
        Ok(Self { config, client: Arc::new(client) })
    }

    pub fn url(&self) -> &str {
        self.config.api_url.as_str()
    }

    /// The single transport primitive. Posts `{key, action, ...params}` to the panel endpoint and returns the raw
    /// JSON response. Application errors (`{"error": ...}`) are returned as [`SmmTurkApiError::Rejected`].
    ///
    /// No retries happen here; see [`Self::action_query_with_retry`].
    pub async fn action_query(&self, action: &str, params: Map<String, Value>) -> Result<Value, SmmTurkApiError> {
        let mut body = params;
        body.insert("key".into(), Value::String(self.config.api_key.reveal().clone()));
        body.insert("action".into(), Value::String(action.into()));
        trace!("🛰️ Sending '{action}' request to {}", self.config.api_url);
        let response = self.client.post(&self.config.api_url).json(&body).send().await?;
        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            debug!("🛰️ '{action}' request failed with HTTP {status}");
            return Err(SmmTurkApiError::QueryError { status: status.as_u16(), message });
        }
        let value = response.json::<Value>().await.map_err(|e| SmmTurkApiError::JsonError(e.to_string()))?;
        check_for_rejection(value)
    }

    /// Calls [`Self::action_query`] under the configured [`RetryPolicy`](crate::RetryPolicy). When `idempotent` is
    /// false, only failures where no connection was made are retried.
    pub async fn action_query_with_retry(
        &self,
        action: &str,
        params: Map<String, Value>,
        idempotent: bool,
    ) -> Result<Value, SmmTurkApiError> {
        let should_retry = |e: &SmmTurkApiError| if idempotent { e.is_transient() } else { e.is_connect_failure() };
        self.config.retry.run(action, should_retry, || self.action_query(action, params.clone())).await
    }

    pub async fn fetch_services(&self) -> Result<Vec<ProviderService>, SmmTurkApiError> {
        debug!("🛰️ Fetching provider services");
        let value = self.action_query_with_retry("services", Map::new(), true).await?;
        if !value.is_array() {
            return Err(SmmTurkApiError::InvalidResponse(format!("expected a list of services, got {value}")));
        }
        let services = parse_response::<Vec<ProviderService>>(value)?;
        info!("🛰️ Fetched {} provider services", services.len());
        Ok(services)
    }

    pub async fn create_order(&self, order: &NewProviderOrder) -> Result<OrderCreated, SmmTurkApiError> {
        let params = add_params(order);
        debug!("🛰️ Submitting order for service {} x{} -> {}", order.service, order.quantity, order.link);
        let value = self.action_query_with_retry("add", params, false).await?;
        if value.get("order").map_or(true, Value::is_null) {
            return Err(SmmTurkApiError::InvalidResponse(format!("no order id in response: {value}")));
        }
        let created = parse_response::<OrderCreated>(value)?;
        info!("🛰️ Provider accepted order. Provider order id {}", created.order);
        Ok(created)
    }

    pub async fn get_order_status(&self, provider_order_id: &str) -> Result<OrderStatus, SmmTurkApiError> {
        let mut params = Map::new();
        params.insert("order".into(), json!(provider_order_id));
        trace!("🛰️ Fetching status for provider order {provider_order_id}");
        let value = self.action_query_with_retry("status", params, true).await?;
        let status = parse_response::<OrderStatus>(value)?;
        debug!("🛰️ Provider order {provider_order_id} is '{}' (remains {:?})", status.status, status.remains);
        Ok(status)
    }

    pub async fn get_balance(&self) -> Result<Balance, SmmTurkApiError> {
        let value = self.action_query_with_retry("balance", Map::new(), true).await?;
        let balance = parse_response::<Balance>(value)?;
        debug!("🛰️ Provider balance: {} {}", balance.balance, balance.currency);
        Ok(balance)
    }
}

/// Maps `{"error": "..."}` onto [`SmmTurkApiError::Rejected`]. Any other value is passed through.
pub(crate) fn check_for_rejection(value: Value) -> Result<Value, SmmTurkApiError> {
    match value.get("error") {
        Some(Value::String(msg)) => {
            debug!("🛰️ Provider rejected request: {msg}");
            Err(SmmTurkApiError::Rejected(msg.clone()))
        },
        Some(Value::Null) | None => Ok(value),
        Some(other) => Err(SmmTurkApiError::Rejected(other.to_string())),
    }
}

pub(crate) fn parse_response<T: DeserializeOwned>(value: Value) -> Result<T, SmmTurkApiError> {
    serde_json::from_value(value).map_err(|e| SmmTurkApiError::InvalidResponse(e.to_string()))
}

/// Body fields for the `add` action, besides `key` and `action`.
fn add_params(order: &NewProviderOrder) -> Map<String, Value> {
    let mut params = Map::new();
    params.insert("service".into(), json!(order.service));
    params.insert("link".into(), json!(order.link));
    params.insert("quantity".into(), json!(order.quantity));
    params
}
