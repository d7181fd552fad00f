use serde::{Deserialize, Serialize};
use sg_common::Price;

use crate::helpers::{flexible_bool, flexible_i64, flexible_opt_i64, flexible_opt_price, string_or_number};

/// An entry from the `services` action.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct ProviderService {
    #[serde(deserialize_with = "flexible_i64")]
    pub service: i64,
    pub name: String,
    #[serde(rename = "type", default)]
    pub service_type: String,
    #[serde(default)]
    pub category: String,
    /// Price per 1000 units, in the panel's account currency
    pub rate: Price,
    #[serde(deserialize_with = "flexible_i64")]
    pub min: i64,
    #[serde(deserialize_with = "flexible_i64")]
    pub max: i64,
    #[serde(default, deserialize_with = "flexible_bool")]
    pub dripfeed: bool,
    #[serde(default, deserialize_with = "flexible_bool")]
    pub refill: bool,
    #[serde(default, deserialize_with = "flexible_bool")]
    pub cancel: bool,
}

/// Parameters for the `add` action.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewProviderOrder {
    pub service: String,
    pub link: String,
    pub quantity: i64,
}

impl NewProviderOrder {
    pub fn new<S: Into<String>, L: Into<String>>(service: S, link: L, quantity: i64) -> Self {
        Self { service: service.into(), link: link.into(), quantity }
    }
}

/// Response to the `add` action.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct OrderCreated {
    #[serde(deserialize_with = "string_or_number")]
    pub order: String,
    #[serde(default, deserialize_with = "flexible_opt_price")]
    pub charge: Option<Price>,
    #[serde(default)]
    pub currency: Option<String>,
}

/// Response to the `status` action.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct OrderStatus {
    pub status: String,
    #[serde(default, deserialize_with = "flexible_opt_i64")]
    pub remains: Option<i64>,
    #[serde(default, deserialize_with = "flexible_opt_i64")]
    pub start_count: Option<i64>,
    #[serde(default, deserialize_with = "flexible_opt_price")]
    pub charge: Option<Price>,
    #[serde(default)]
    pub currency: Option<String>,
}

/// Response to the `balance` action.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Balance {
    pub balance: Price,
    #[serde(default)]
    pub currency: String,
}
