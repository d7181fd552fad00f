//! # SNS Growth server
//! This crate hosts the HTTP server for the SNS Growth storefront. It is responsible for:
//! * Taking orders from the storefront and serving the customer-facing tracking page.
//! * Sending paid orders to the SMM Turk panel and keeping their status and progress in sync, both on request and
//!   from a background worker.
//! * Keeping a cached copy of the panel's service catalogue, with the reseller markup applied.
//!
//! ## Configuration
//! The server is configured via environment variables. See [config](config/index.html) for more information.
//!
//! ## Routes
//! * `/health`: A health check route that returns a 200 OK response.
//! * `/api/...`: The storefront and admin REST surface. See [routes](routes/index.html).
//! * `/smmturk`: The provider-action dispatch endpoint.

pub mod cli;
pub mod config;
pub mod data_objects;
pub mod errors;
pub mod helpers;
pub mod integrations;
pub mod middleware;
pub mod routes;
pub mod server;
pub mod sync_worker;
