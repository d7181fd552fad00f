use thiserror::Error;

use crate::{
    db_types::{NewService, Service},
    traits::FulfillmentError,
};

#[derive(Debug, Clone, Error)]
pub enum CatalogError {
    #[error("We have an internal database engine (configuration/uptime etc.) : {0}")]
    DatabaseError(String),
    #[error("Upstream provider error. {0}")]
    Upstream(#[from] FulfillmentError),
    #[error("The provider returned no services. The cached catalogue was left unchanged.")]
    EmptyCatalogue,
}

impl From<sqlx::Error> for CatalogError {
    fn from(e: sqlx::Error) -> Self {
        CatalogError::DatabaseError(e.to_string())
    }
}

#[allow(async_fn_in_trait)]
pub trait ServiceCatalog: Clone {
    /// Replaces the entire cached service list in a single transaction. Returns the stored services.
    async fn replace_services(&self, services: Vec<NewService>) -> Result<Vec<Service>, CatalogError>;

    /// Cached services, ordered by platform and then name. `platform` filters when given.
    async fn fetch_services(&self, platform: Option<&str>) -> Result<Vec<Service>, CatalogError>;

    async fn fetch_service_by_provider_id(&self, smmturk_id: i64) -> Result<Option<Service>, CatalogError>;
}
