//! # SNS Growth engine public API
//!
//! The API is modular, so callers pick the pieces they need.
//!
//! * [`order_flow_api`] takes new orders in and moves them through payment confirmation.
//! * [`order_sync_api`] sends paid orders to the upstream provider and reconciles their status and progress.
//! * [`tracking_api`] is the customer-facing read path, including cancellation.
//! * [`catalog_api`] maintains the cached provider service list.
//!
//! # API usage
//!
//! Every API is created by supplying the backends it needs:
//!
//! ```rust,ignore
//! use snsgrow_engine::{SqliteDatabase, TrackingApi};
//! let db = SqliteDatabase::new_with_url(...).await?;
//! let api = TrackingApi::new(db);
//! let view = api.track("customer@example.com").await?;
//! ```
pub mod catalog_api;
pub mod order_flow_api;
pub mod order_objects;
pub mod order_sync_api;
pub mod tracking_api;
