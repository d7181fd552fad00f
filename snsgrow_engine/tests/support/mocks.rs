use mockall::mock;
use sg_common::Price;
use snsgrow_engine::traits::{
    FulfillmentError,
    FulfillmentProvider,
    FulfillmentReceipt,
    FulfillmentRequest,
    ProviderBalance,
    ProviderOrderStatus,
    ProviderServiceInfo,
};

mock! {
    pub Provider {}
    impl Clone for Provider {
        fn clone(&self) -> Self;
    }
    impl FulfillmentProvider for Provider {
        fn provider_name(&self) -> &'static str;
        async fn fetch_services(&self) -> Result<Vec<ProviderServiceInfo>, FulfillmentError>;
        async fn create_order(&self, request: &FulfillmentRequest) -> Result<FulfillmentReceipt, FulfillmentError>;
        async fn get_order_status(&self, provider_order_id: &str) -> Result<ProviderOrderStatus, FulfillmentError>;
        async fn get_balance(&self) -> Result<ProviderBalance, FulfillmentError>;
    }
}

pub fn provider() -> MockProvider {
    let mut provider = MockProvider::new();
    provider.expect_provider_name().return_const("smmturk");
    provider
}

pub fn status(status: &str, remains: Option<i64>) -> ProviderOrderStatus {
    ProviderOrderStatus {
        status: status.to_string(),
        remains,
        start_count: Some(100),
        charge: Some(Price::from_micros(450_000)),
        currency: Some("USD".to_string()),
    }
}
