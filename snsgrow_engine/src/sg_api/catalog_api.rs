use std::fmt::Debug;

use log::*;

use crate::{
    db_types::{NewService, Service},
    helpers::catalog::{derive_category, derive_platform},
    traits::{CatalogError, FulfillmentProvider, ProviderBalance, ProviderServiceInfo, ServiceCatalog},
};

pub const DEFAULT_PRICE_MARKUP: f64 = 9.0;

#[derive(Debug, Clone, PartialEq)]
pub struct PricingConfig {
    /// Multiplier applied to the provider's rate to get the selling price.
    pub markup: f64,
}

impl Default for PricingConfig {
    fn default() -> Self {
        Self { markup: DEFAULT_PRICE_MARKUP }
    }
}

/// `CatalogApi` keeps the local copy of the provider's service list.
pub struct CatalogApi<B, P> {
    db: B,
    provider: P,
    pricing: PricingConfig,
}

impl<B, P> Debug for CatalogApi<B, P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "CatalogApi (markup x{})", self.pricing.markup)
    }
}

impl<B, P> CatalogApi<B, P> {
    pub fn new(db: B, provider: P, pricing: PricingConfig) -> Self {
        Self { db, provider, pricing }
    }

    pub fn pricing(&self) -> &PricingConfig {
        &self.pricing
    }

    pub fn to_new_service(&self, info: ProviderServiceInfo) -> NewService {
        NewService {
            smmturk_id: info.service,
            platform: derive_platform(&info.name, &info.category).to_string(),
            category: derive_category(&info.name, &info.category).to_string(),
            name: info.name,
            service_type: info.service_type,
            smmturk_price: info.rate,
            price: info.rate.with_markup(self.pricing.markup),
            min_quantity: info.min,
            max_quantity: info.max,
            dripfeed: info.dripfeed,
            refill: info.refill,
            cancel: info.cancel,
        }
    }
}

impl<B, P> CatalogApi<B, P>
where
    B: ServiceCatalog,
    P: FulfillmentProvider,
{
    /// Fetches the provider's service list and replaces the cached catalogue with it.
    ///
    /// An empty list from the provider leaves the cache untouched and returns [`CatalogError::EmptyCatalogue`].
    pub async fn sync_services(&self) -> Result<Vec<Service>, CatalogError> {
        let upstream = self.provider.fetch_services().await?;
        if upstream.is_empty() {
            warn!("🛒️ The provider returned an empty service list. Keeping the cached catalogue.");
            return Err(CatalogError::EmptyCatalogue);
        }
        let services = upstream.into_iter().map(|s| self.to_new_service(s)).collect::<Vec<_>>();
        let stored = self.db.replace_services(services).await?;
        info!("🛒️ Service catalogue refreshed with {} services", stored.len());
        Ok(stored)
    }

    pub async fn list_services(&self, platform: Option<&str>) -> Result<Vec<Service>, CatalogError> {
        self.db.fetch_services(platform).await
    }

    pub async fn fetch_service(&self, smmturk_id: i64) -> Result<Option<Service>, CatalogError> {
        self.db.fetch_service_by_provider_id(smmturk_id).await
    }

    pub async fn balance(&self) -> Result<ProviderBalance, CatalogError> {
        let balance = self.provider.get_balance().await?;
        debug!("🛒️ Provider balance is {} {}", balance.balance, balance.currency);
        Ok(balance)
    }
}
