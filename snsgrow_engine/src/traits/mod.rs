//! # Backend contracts
//!
//! The engine APIs are generic over the storage backend and the upstream fulfilment provider. This module defines the
//! contracts those collaborators must honour.
//!
//! * [`OrderManagement`] stores orders together with their status history and audit log. Every state change goes
//!   through [`OrderManagement::record_order_change`], which must be atomic.
//! * [`ServiceCatalog`] caches the provider's service list.
//! * [`FulfillmentProvider`] is the upstream panel that actually delivers orders.
mod data_objects;
mod fulfillment_provider;
mod order_management;
mod service_catalog;

pub use data_objects::OrderUpdate;
pub use fulfillment_provider::{
    FulfillmentError,
    FulfillmentProvider,
    FulfillmentReceipt,
    FulfillmentRequest,
    ProviderBalance,
    ProviderOrderStatus,
    ProviderServiceInfo,
};
pub use order_management::{OrderFlowError, OrderManagement};
pub use service_catalog::{CatalogError, ServiceCatalog};
