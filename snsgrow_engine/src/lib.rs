//! SNS Growth order engine
//!
//! The engine holds the order lifecycle for the storefront and keeps it in step with the upstream SMM panel that
//! actually delivers followers, likes and views. It is provider-agnostic: the panel is reached through the
//! [`FulfillmentProvider`] trait, and storage through the [`OrderManagement`] and [`ServiceCatalog`] traits.
//!
//! The library is divided into three sections:
//! 1. Data types ([`db_types`]) and the status mapping rules ([`helpers::status_mapper`]).
//! 2. Backend contracts ([`traits`]) and the SQLite backend ([`SqliteDatabase`]).
//! 3. The public API objects:
//!    * [`OrderFlowApi`] takes orders in and confirms payments.
//!    * [`OrderSyncApi`] sends paid orders upstream and reconciles their status and progress.
//!    * [`TrackingApi`] is the customer-facing read path (tracking views, timeline, cancellation).
//!    * [`CatalogApi`] caches the upstream service list with the reseller markup applied.
pub mod db_types;
pub mod helpers;
mod sg_api;
pub mod traits;

#[cfg(feature = "sqlite")]
mod sqlite;

#[cfg(feature = "sqlite")]
pub use sqlite::SqliteDatabase;
pub use sg_api::{
    catalog_api::{CatalogApi, PricingConfig},
    order_flow_api::OrderFlowApi,
    order_objects,
    order_sync_api::{OrderSyncApi, SyncConfig},
    tracking_api::{tracking_view, TrackingApi, POLL_INTERVAL_SECS},
};
pub use traits::{
    CatalogError,
    FulfillmentError,
    FulfillmentProvider,
    OrderFlowError,
    OrderManagement,
    ServiceCatalog,
};
