use std::fmt::Display;

use anyhow::{anyhow, Result};
use log::{debug, trace};
use reqwest::{
    header::{HeaderMap, HeaderValue},
    Client,
    Response,
};
use serde::de::DeserializeOwned;
use serde_json::Value;
use snsgrow_engine::{db_types::OrderId, order_objects::TrackingView};
use snsgrow_server::data_objects::{ApiResponse, JsonResponse};
use url::Url;

use crate::tracker::TrackingSource;

pub const DEFAULT_SERVER_URL: &str = "http://127.0.0.1:8360";

/// A thin client for the storefront endpoints of the order server.
#[derive(Clone)]
pub struct SnsGrowClient {
    client: Client,
    server: Url,
}

impl SnsGrowClient {
    pub fn new(server: &str) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert("Accept", HeaderValue::from_static("application/json"));
        let client = Client::builder()
            .user_agent("SNS Growth Tools")
            .default_headers(headers)
            .build()
            .map_err(|e| anyhow!("Failed to create the HTTP client. {e}"))?;
        let server = Url::parse(server).map_err(|e| anyhow!("'{server}' is not a valid server URL. {e}"))?;
        Ok(Self { client, server })
    }

    /// Uses `SG_SERVER_URL`, or the local default.
    pub fn new_from_env_or_default() -> Result<Self> {
        let server = std::env::var("SG_SERVER_URL").unwrap_or_else(|_| DEFAULT_SERVER_URL.to_string());
        Self::new(&server)
    }

    pub fn server(&self) -> &str {
        self.server.as_str()
    }

    pub fn url(&self, path: &str) -> Result<Url> {
        self.server.join(path).map_err(|e| anyhow!("Failed to join URL: {}", e))
    }

    pub async fn health(&self) -> Result<String> {
        let url = self.url("/health")?;
        let res = self.client.get(url).send().await?;
        let response = res.text().await?;
        Ok(response)
    }

    /// Looks an order up by order id, or by e-mail address if `search_value` contains an `@`.
    pub async fn track(&self, search_value: &str) -> Result<TrackingView> {
        let search_value = search_value.trim();
        let param = if search_value.contains('@') { "email" } else { "orderId" };
        let path = format!("/api/orders/track?{param}={}", urlencoding::encode(search_value));
        let url = self.url(&path)?;
        trace!("Fetching {url}");
        let res = self.client.get(url).send().await?;
        let view: ApiResponse<TrackingView> = parse_response(res, "track order").await?;
        Ok(view.data)
    }

    pub async fn cancel(&self, order_id: &OrderId) -> Result<String> {
        let url = self.url(&format!("/api/orders/{}/cancel", urlencoding::encode(order_id.as_str())))?;
        let res = self.client.post(url).send().await?;
        let response: JsonResponse = parse_response(res, "cancel order").await?;
        Ok(response.message)
    }
}

impl TrackingSource for SnsGrowClient {
    async fn fetch(&self, search_value: &str) -> Result<TrackingView> {
        self.track(search_value).await
    }
}

impl Display for SnsGrowClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "SNS Growth server ({})", self.server())
    }
}

/// Failures come back as `{success: false, error, details?}`. Both messages are surfaced when present.
async fn parse_response<T: DeserializeOwned>(res: Response, what: &str) -> Result<T> {
    let code = res.status();
    if code.is_success() {
        return Ok(res.json::<T>().await?);
    }
    let body = res.text().await?;
    debug!("Could not {what}. {code}: {body}");
    let msg = match serde_json::from_str::<Value>(&body) {
        Ok(v) => {
            let error = v["error"].as_str().unwrap_or("Unknown error");
            match v["details"].as_str() {
                Some(details) => format!("{error} ({details})"),
                None => error.to_string(),
            }
        },
        Err(_) => body,
    };
    Err(anyhow!("Error {code}. Could not {what}. {msg}"))
}
