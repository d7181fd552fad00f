use actix_web::{http::StatusCode, web, web::ServiceConfig};
use chrono::{TimeZone, Utc};
use sg_common::Secret;
use snsgrow_engine::{
    db_types::{OrderStatusType::*, ServiceLog, ServiceLogAction},
    traits::{FulfillmentError, ProviderBalance},
    CatalogApi,
    OrderFlowApi,
    OrderSyncApi,
    PricingConfig,
    SyncConfig,
};

use super::{
    helpers::{get_request, post_request, send, TEST_ADMIN_KEY},
    mocks::{history, order, provider, service_info, MemoryCatalog, MockOrderManager, MockProvider},
};
use crate::{
    middleware::AdminKeyMiddlewareFactory,
    routes::{
        ConfirmPaymentRoute,
        OrderDetailsRoute,
        ProviderBalanceRoute,
        SearchOrdersRoute,
        SyncOrdersRoute,
        SyncServicesRoute,
    },
};

fn configure(db: MockOrderManager, upstream: MockProvider) -> impl FnOnce(&mut ServiceConfig) {
    move |cfg| {
        let orders_api = OrderFlowApi::new(db.clone());
        let sync_api = OrderSyncApi::new(db, upstream, SyncConfig { batch_limit: 2, ..SyncConfig::default() });
        cfg.service(
            web::scope("/api").service(
                web::scope("/admin")
                    .wrap(AdminKeyMiddlewareFactory::new(Secret::new(TEST_ADMIN_KEY.to_string()), false, false))
                    .service(ConfirmPaymentRoute::<MockOrderManager>::new())
                    .service(SyncOrdersRoute::<MockOrderManager, MockProvider>::new())
                    .service(SearchOrdersRoute::<MockOrderManager>::new())
                    .service(OrderDetailsRoute::<MockOrderManager>::new()),
            ),
        )
        .app_data(web::Data::new(orders_api))
        .app_data(web::Data::new(sync_api));
    }
}

fn configure_catalog(upstream: MockProvider) -> impl FnOnce(&mut ServiceConfig) {
    move |cfg| {
        let catalog_api = CatalogApi::new(MemoryCatalog::default(), upstream, PricingConfig::default());
        cfg.service(
            web::scope("/api").service(
                web::scope("/admin")
                    .wrap(AdminKeyMiddlewareFactory::new(Secret::new(TEST_ADMIN_KEY.to_string()), false, false))
                    .service(SyncServicesRoute::<MemoryCatalog, MockProvider>::new())
                    .service(ProviderBalanceRoute::<MemoryCatalog, MockProvider>::new()),
            ),
        )
        .app_data(web::Data::new(catalog_api));
    }
}

/// The order api and the sync api each hold their own copy of the backend.
fn cloneable(mut db: MockOrderManager, setup: fn(&mut MockOrderManager)) -> MockOrderManager {
    db.expect_clone().returning(move || {
        let mut copy = MockOrderManager::new();
        setup(&mut copy);
        copy
    });
    db
}

#[actix_web::test]
async fn admin_routes_need_the_key() {
    let _ = env_logger::try_init().ok();
    let db = cloneable(MockOrderManager::new(), |_| {});
    let app = configure(db, provider());
    let (status, body) = post_request("/api/admin/orders/SG-1/confirm-payment", None, None, app).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["success"], false);
    assert_eq!(body["error"], "인증에 실패했습니다.");
}

#[actix_web::test]
async fn confirm_payment() {
    let _ = env_logger::try_init().ok();
    let db = cloneable(MockOrderManager::new(), |db| {
        db.expect_fetch_order_by_order_id().returning(|id| Ok(Some(order(id.as_str(), Pending, 0))));
        db.expect_record_order_change()
            .withf(|_, update, log| {
                update.status == Some(Processing) &&
                    update.intermediate_statuses == vec![PaymentConfirmed] &&
                    log.action == ServiceLogAction::PaymentConfirmed
            })
            .times(1)
            .returning(|_, _, _| Ok(order("SG-4001", Processing, 0)));
    });
    let app = configure(db, provider());
    let (status, body) =
        post_request("/api/admin/orders/SG-4001/confirm-payment", Some(TEST_ADMIN_KEY), None, app).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["status"], "processing");
}

#[actix_web::test]
async fn confirm_payment_twice_is_a_conflict() {
    let _ = env_logger::try_init().ok();
    let db = cloneable(MockOrderManager::new(), |db| {
        db.expect_fetch_order_by_order_id().returning(|id| Ok(Some(order(id.as_str(), Processing, 0))));
        db.expect_record_order_change().never();
    });
    let app = configure(db, provider());
    let (status, _) =
        post_request("/api/admin/orders/SG-4001/confirm-payment", Some(TEST_ADMIN_KEY), None, app).await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[actix_web::test]
async fn batch_sync_skips_failing_orders() {
    let _ = env_logger::try_init().ok();
    let mut db = cloneable(MockOrderManager::new(), |_| {});
    db.expect_fetch_orders_to_sync().with(mockall::predicate::eq(2)).returning(|_| {
        let mut first = order("SG-5001", Processing, 10);
        first.provider_order_id = Some("1".into());
        let mut second = order("SG-5002", Processing, 10);
        second.id = 2;
        second.provider_order_id = Some("2".into());
        Ok(vec![first, second])
    });
    db.expect_record_order_change().times(1).returning(|_, _, _| {
        let mut o = order("SG-5001", Completed, 100);
        o.provider_order_id = Some("1".into());
        Ok(o)
    });
    let mut upstream = provider();
    upstream.expect_get_order_status().returning(|id| match id {
        "1" => Ok(snsgrow_engine::traits::ProviderOrderStatus {
            status: "Completed".into(),
            remains: Some(0),
            start_count: None,
            charge: None,
            currency: None,
        }),
        _ => Err(snsgrow_engine::traits::FulfillmentError::Unavailable("timed out".into())),
    });
    let app = configure(db, upstream);
    let (status, body) = post_request("/api/admin/orders/sync", Some(TEST_ADMIN_KEY), None, app).await;
    assert_eq!(status, StatusCode::OK);
    let orders = body["data"].as_array().unwrap();
    assert_eq!(orders.len(), 1);
    assert_eq!(orders[0]["orderId"], "SG-5001");
    assert_eq!(orders[0]["status"], "completed");
}

#[actix_web::test]
async fn search_orders_by_status() {
    let _ = env_logger::try_init().ok();
    let db = cloneable(MockOrderManager::new(), |db| {
        db.expect_search_orders()
            .withf(|q| q.status == Some(vec![Failed]) && q.customer_email.as_deref() == Some("jane@example.com"))
            .returning(|_| Ok(vec![order("SG-6001", Failed, 0)]));
    });
    let app = configure(db, provider());
    let req = actix_web::test::TestRequest::get()
        .uri("/api/admin/orders?status=failed&email=jane@example.com")
        .insert_header(("X-Admin-Key", TEST_ADMIN_KEY));
    let (status, body) = send(req, app).await;
    assert_eq!(status, StatusCode::OK);
    let body: serde_json::Value = serde_json::from_str(&body).unwrap();
    assert_eq!(body["data"][0]["orderId"], "SG-6001");
}

#[actix_web::test]
async fn order_details_with_audit_trail() {
    let _ = env_logger::try_init().ok();
    let db = cloneable(MockOrderManager::new(), |db| {
        db.expect_fetch_order_by_order_id().returning(|id| Ok(Some(order(id.as_str(), Processing, 0))));
        db.expect_fetch_status_history().returning(|_| Ok(history(&[Pending, PaymentConfirmed, Processing])));
        db.expect_fetch_service_logs().returning(|id| {
            Ok(vec![ServiceLog {
                id: 1,
                order_id: id,
                action: ServiceLogAction::PaymentConfirmed,
                details: "Payment confirmed".into(),
                progress_before: None,
                progress_after: None,
                created_at: Utc.with_ymd_and_hms(2024, 6, 1, 9, 5, 0).unwrap(),
            }])
        });
    });
    let app = configure(db, provider());
    let req = actix_web::test::TestRequest::get()
        .uri("/api/admin/orders/SG-7001")
        .insert_header(("Authorization", format!("Bearer {TEST_ADMIN_KEY}")));
    let (status, body) = send(req, app).await;
    assert_eq!(status, StatusCode::OK);
    let body: serde_json::Value = serde_json::from_str(&body).unwrap();
    assert_eq!(body["data"]["history"].as_array().unwrap().len(), 3);
    assert_eq!(body["data"]["logs"][0]["action"], "payment_confirmed");
    assert_eq!(body["data"]["order"]["orderId"], "SG-7001");
}

#[actix_web::test]
async fn unauthenticated_get_is_refused() {
    let _ = env_logger::try_init().ok();
    let db = cloneable(MockOrderManager::new(), |_| {});
    let (status, body) = get_request("/api/admin/orders", configure(db, provider())).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "인증에 실패했습니다.");
    assert!(body["details"].as_str().unwrap().contains("An admin key is required"));
}

#[actix_web::test]
async fn sync_services_applies_the_markup() {
    let _ = env_logger::try_init().ok();
    let mut upstream = provider();
    upstream.expect_fetch_services().times(1).returning(|| {
        Ok(vec![
            service_info(1, "Instagram Followers [Real]", "Instagram Followers"),
            service_info(2, "YouTube Views", "YouTube"),
        ])
    });
    let app = configure_catalog(upstream);
    let (status, body) = post_request("/api/admin/services/sync", Some(TEST_ADMIN_KEY), None, app).await;
    assert_eq!(status, StatusCode::OK);
    let services = body["data"].as_array().unwrap();
    assert_eq!(services.len(), 2);
    assert_eq!(services[0]["smmturkId"], 1);
    assert_eq!(services[0]["platform"], "instagram");
    assert_eq!(services[1]["platform"], "youtube");
}

#[actix_web::test]
async fn provider_balance() {
    let _ = env_logger::try_init().ok();
    let mut upstream = provider();
    upstream
        .expect_get_balance()
        .times(1)
        .returning(|| Err(FulfillmentError::InvalidResponse("expected a number".into())));
    let app = configure_catalog(upstream);
    let req = actix_web::test::TestRequest::get()
        .uri("/api/admin/balance")
        .insert_header(("X-Admin-Key", TEST_ADMIN_KEY));
    let (status, body) = send(req, app).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(!body.contains("expected a number"));

    let mut upstream = provider();
    upstream.expect_get_balance().returning(|| {
        Ok(ProviderBalance { balance: sg_common::Price::from_micros(12_500_000), currency: "USD".into() })
    });
    let app = configure_catalog(upstream);
    let req = actix_web::test::TestRequest::get()
        .uri("/api/admin/balance")
        .insert_header(("X-Admin-Key", TEST_ADMIN_KEY));
    let (status, body) = send(req, app).await;
    assert_eq!(status, StatusCode::OK);
    let body: serde_json::Value = serde_json::from_str(&body).unwrap();
    assert_eq!(body["data"]["currency"], "USD");
}
