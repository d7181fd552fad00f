//! Binds the SMM Turk panel client to the engine's [`FulfillmentProvider`] seam.
use smmturk_tools::{
    Balance,
    NewProviderOrder,
    OrderCreated,
    OrderStatus,
    ProviderService,
    SmmTurkApi,
    SmmTurkApiError,
    SmmTurkConfig,
};
use snsgrow_engine::{
    db_types::SMMTURK_PROVIDER_NAME,
    traits::{
        FulfillmentError,
        FulfillmentProvider,
        FulfillmentReceipt,
        FulfillmentRequest,
        ProviderBalance,
        ProviderOrderStatus,
        ProviderServiceInfo,
    },
};

use crate::errors::ServerError;

#[derive(Clone)]
pub struct SmmTurkProvider {
    api: SmmTurkApi,
}

impl SmmTurkProvider {
    pub fn new(config: SmmTurkConfig) -> Result<Self, ServerError> {
        let api = SmmTurkApi::new(config).map_err(|e| ServerError::InitializeError(e.to_string()))?;
        Ok(Self { api })
    }

    pub fn api(&self) -> &SmmTurkApi {
        &self.api
    }
}

impl FulfillmentProvider for SmmTurkProvider {
    fn provider_name(&self) -> &'static str {
        SMMTURK_PROVIDER_NAME
    }

    async fn fetch_services(&self) -> Result<Vec<ProviderServiceInfo>, FulfillmentError> {
        let services = self.api.fetch_services().await.map_err(to_fulfillment_error)?;
        Ok(services.into_iter().map(service_info).collect())
    }

    async fn create_order(&self, request: &FulfillmentRequest) -> Result<FulfillmentReceipt, FulfillmentError> {
        let order = NewProviderOrder::new(request.service.as_str(), request.link.as_str(), request.quantity);
        let OrderCreated { order, charge, currency } =
            self.api.create_order(&order).await.map_err(to_fulfillment_error)?;
        Ok(FulfillmentReceipt { provider_order_id: order, charge, currency })
    }

    async fn get_order_status(&self, provider_order_id: &str) -> Result<ProviderOrderStatus, FulfillmentError> {
        let OrderStatus { status, remains, start_count, charge, currency } =
            self.api.get_order_status(provider_order_id).await.map_err(to_fulfillment_error)?;
        Ok(ProviderOrderStatus { status, remains, start_count, charge, currency })
    }

    async fn get_balance(&self) -> Result<ProviderBalance, FulfillmentError> {
        let Balance { balance, currency } = self.api.get_balance().await.map_err(to_fulfillment_error)?;
        Ok(ProviderBalance { balance, currency })
    }
}

fn service_info(s: ProviderService) -> ProviderServiceInfo {
    ProviderServiceInfo {
        service: s.service,
        name: s.name,
        service_type: s.service_type,
        category: s.category,
        rate: s.rate,
        min: s.min,
        max: s.max,
        dripfeed: s.dripfeed,
        refill: s.refill,
        cancel: s.cancel,
    }
}

pub fn to_fulfillment_error(e: SmmTurkApiError) -> FulfillmentError {
    match e {
        SmmTurkApiError::Rejected(msg) => FulfillmentError::Rejected(msg),
        SmmTurkApiError::Transport { .. } | SmmTurkApiError::QueryError { .. } => {
            FulfillmentError::Unavailable(e.to_string())
        },
        SmmTurkApiError::Initialization(_) | SmmTurkApiError::InvalidResponse(_) | SmmTurkApiError::JsonError(_) => {
            FulfillmentError::InvalidResponse(e.to_string())
        },
    }
}
