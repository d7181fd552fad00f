//! # SMM Turk API client
//!
//! The upstream panel exposes a single endpoint. Every request is a POST carrying the API key and an `action`
//! parameter, which selects one of `services`, `add`, `status` or `balance`. Application errors come back as
//! `{"error": "..."}` inside an otherwise successful HTTP response.
//!
//! [`SmmTurkApi`] wraps that contract. All calls share one transport primitive ([`SmmTurkApi::action_query`]), which
//! applies the configured request timeout and the [`RetryPolicy`] for transient failures.
mod api;
mod config;
mod error;
mod retry;

pub mod data_objects;
pub mod helpers;

pub use api::SmmTurkApi;
pub use config::{SmmTurkConfig, DEFAULT_SMMTURK_API_URL};
pub use data_objects::{Balance, NewProviderOrder, OrderCreated, OrderStatus, ProviderService};
pub use error::SmmTurkApiError;
pub use retry::RetryPolicy;
