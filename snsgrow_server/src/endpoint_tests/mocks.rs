use std::sync::{Arc, Mutex};

use chrono::{TimeZone, Utc};
use mockall::mock;
use sg_common::Price;
use snsgrow_engine::{
    db_types::{
        NewOrder,
        NewService,
        NewServiceLog,
        Order,
        OrderId,
        OrderStatusType,
        Service,
        ServiceLog,
        StatusHistoryEntry,
    },
    order_objects::OrderQueryFilter,
    traits::{
        CatalogError,
        FulfillmentError,
        FulfillmentProvider,
        FulfillmentReceipt,
        FulfillmentRequest,
        OrderFlowError,
        OrderManagement,
        OrderUpdate,
        ProviderBalance,
        ProviderOrderStatus,
        ProviderServiceInfo,
        ServiceCatalog,
    },
};

mock! {
    pub OrderManager {}
    impl Clone for OrderManager {
        fn clone(&self) -> Self;
    }
    impl OrderManagement for OrderManager {
        fn url(&self) -> &str;
        async fn insert_order(&self, order: NewOrder) -> Result<Order, OrderFlowError>;
        async fn fetch_order_by_order_id(&self, order_id: &OrderId) -> Result<Option<Order>, OrderFlowError>;
        async fn fetch_latest_order_for_email(&self, email: &str) -> Result<Option<Order>, OrderFlowError>;
        async fn search_orders(&self, query: OrderQueryFilter) -> Result<Vec<Order>, OrderFlowError>;
        async fn fetch_orders_to_sync(&self, limit: i64) -> Result<Vec<Order>, OrderFlowError>;
        async fn fetch_status_history(&self, id: i64) -> Result<Vec<StatusHistoryEntry>, OrderFlowError>;
        async fn fetch_service_logs(&self, id: i64) -> Result<Vec<ServiceLog>, OrderFlowError>;
        async fn record_order_change(&self, id: i64, update: OrderUpdate, log: NewServiceLog)
            -> Result<Order, OrderFlowError>;
    }
}

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

/// An in-memory catalogue. Replacing assigns ids in insertion order.
#[derive(Clone, Default)]
pub struct MemoryCatalog {
    services: Arc<Mutex<Vec<Service>>>,
}

impl ServiceCatalog for MemoryCatalog {
    async fn replace_services(&self, services: Vec<NewService>) -> Result<Vec<Service>, CatalogError> {
        let stored = services
            .into_iter()
            .enumerate()
            .map(|(i, s)| Service {
                id: i as i64 + 1,
                smmturk_id: s.smmturk_id,
                name: s.name,
                platform: s.platform,
                category: s.category,
                service_type: s.service_type,
                smmturk_price: s.smmturk_price,
                price: s.price,
                min_quantity: s.min_quantity,
                max_quantity: s.max_quantity,
                dripfeed: s.dripfeed,
                refill: s.refill,
                cancel: s.cancel,
                updated_at: Utc::now(),
            })
            .collect::<Vec<_>>();
        *self.services.lock().unwrap() = stored.clone();
        Ok(stored)
    }

    async fn fetch_services(&self, platform: Option<&str>) -> Result<Vec<Service>, CatalogError> {
        let services = self.services.lock().unwrap();
        Ok(services.iter().filter(|s| platform.map_or(true, |p| s.platform == p)).cloned().collect())
    }

    async fn fetch_service_by_provider_id(&self, smmturk_id: i64) -> Result<Option<Service>, CatalogError> {
        Ok(self.services.lock().unwrap().iter().find(|s| s.smmturk_id == smmturk_id).cloned())
    }
}

/// A 1000-unit instagram order created on 1 June 2024.
pub fn order(order_id: &str, status: OrderStatusType, progress: i64) -> Order {
    let created_at = Utc.with_ymd_and_hms(2024, 6, 1, 9, 0, 0).unwrap();
    Order {
        id: 1,
        order_id: OrderId::from(order_id),
        customer_email: "jane@example.com".to_string(),
        service_id: "101".to_string(),
        service_name: "Instagram Followers".to_string(),
        target_url: "https://instagram.com/sg_test".to_string(),
        quantity: 1000,
        total_price: Price::from_units(9),
        status,
        progress,
        remains: None,
        provider_order_id: None,
        provider_name: None,
        provider_charge: None,
        notes: None,
        created_at,
        updated_at: Utc.with_ymd_and_hms(2024, 6, 1, 9, 30, 0).unwrap(),
        started_at: None,
        completed_at: None,
    }
}

pub fn history(statuses: &[OrderStatusType]) -> Vec<StatusHistoryEntry> {
    statuses
        .iter()
        .enumerate()
        .map(|(i, s)| StatusHistoryEntry {
            status: *s,
            changed_at: Utc.with_ymd_and_hms(2024, 6, 1, 9, i as u32 * 5, 0).unwrap(),
        })
        .collect()
}

pub fn service_info(id: i64, name: &str, category: &str) -> ProviderServiceInfo {
    ProviderServiceInfo {
        service: id,
        name: name.to_string(),
        service_type: "Default".to_string(),
        category: category.to_string(),
        rate: Price::from_micros(450_000),
        min: 10,
        max: 10_000,
        dripfeed: false,
        refill: true,
        cancel: false,
    }
}
