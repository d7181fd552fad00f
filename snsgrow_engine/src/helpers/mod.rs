//! Pure helper functions used by the engine APIs.
//!
//! * [`status_mapper`] translates provider status strings into local order states and delivery progress.
//! * [`catalog`] classifies provider services by platform and category.
pub mod catalog;
pub mod status_mapper;

pub use catalog::{derive_category, derive_platform};
pub use status_mapper::{clamp_progress, compute_progress, map_status};
