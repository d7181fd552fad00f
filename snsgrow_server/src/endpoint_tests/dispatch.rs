use actix_web::{http::StatusCode, test::TestRequest, web, web::ServiceConfig};
use mockall::predicate::eq;
use serde_json::json;
use sg_common::{Price, Secret};
use snsgrow_engine::{
    db_types::{OrderId, OrderStatusType::*, ServiceLogAction},
    traits::{FulfillmentError, FulfillmentReceipt, ProviderBalance, ProviderOrderStatus},
    CatalogApi,
    OrderSyncApi,
    PricingConfig,
    SyncConfig,
};

use super::{
    helpers::{post_request, send, TEST_ADMIN_KEY},
    mocks::{order, provider, service_info, MemoryCatalog, MockOrderManager, MockProvider},
};
use crate::{
    middleware::AdminKeyMiddlewareFactory,
    routes::{smmturk_preflight, SmmturkDispatchRoute},
    server::cors_headers,
};

fn configure(
    db: MockOrderManager,
    sync_provider: MockProvider,
    catalog_provider: MockProvider,
) -> impl FnOnce(&mut ServiceConfig) {
    move |cfg| {
        let sync_api = OrderSyncApi::new(db, sync_provider, SyncConfig::default());
        let catalog_api = CatalogApi::new(MemoryCatalog::default(), catalog_provider, PricingConfig::default());
        cfg.service(
            web::scope("/smmturk")
                .wrap(AdminKeyMiddlewareFactory::new(Secret::new(TEST_ADMIN_KEY.to_string()), false, false))
                .wrap(cors_headers())
                .service(smmturk_preflight)
                .service(SmmturkDispatchRoute::<MockOrderManager, MemoryCatalog, MockProvider>::new()),
        )
        .app_data(web::Data::new(sync_api))
        .app_data(web::Data::new(catalog_api));
    }
}

fn paid_order_db() -> MockOrderManager {
    let mut db = MockOrderManager::new();
    db.expect_fetch_order_by_order_id().returning(|id| Ok(Some(order(id.as_str(), Processing, 0))));
    db
}

fn process_order_body() -> serde_json::Value {
    json!({
        "action": "process-order",
        "orderId": "SG-3001",
        "serviceType": "101",
        "targetUrl": "https://instagram.com/sg_test",
        "quantity": 1000
    })
}

#[actix_web::test]
async fn process_order_success() {
    let _ = env_logger::try_init().ok();
    let mut db = paid_order_db();
    db.expect_record_order_change()
        .withf(|_, update, log| {
            update.provider_order_id.as_deref() == Some("98765") &&
                update.provider_name.as_deref() == Some("smmturk") &&
                update.started_at.is_some() &&
                log.action == ServiceLogAction::OrderSent
        })
        .times(1)
        .returning(|_, _, _| {
            let mut o = order("SG-3001", Processing, 0);
            o.provider_order_id = Some("98765".into());
            Ok(o)
        });
    let mut upstream = provider();
    upstream
        .expect_create_order()
        .withf(|r| r.service == "101" && r.link == "https://instagram.com/sg_test" && r.quantity == 1000)
        .times(1)
        .returning(|_| {
            Ok(FulfillmentReceipt {
                provider_order_id: "98765".into(),
                charge: Some(Price::from_micros(450_000)),
                currency: Some("USD".into()),
            })
        });
    let app = configure(db, upstream, provider());
    let (status, body) = post_request("/smmturk", Some(TEST_ADMIN_KEY), Some(process_order_body()), app).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({
            "success": true,
            "orderId": "SG-3001",
            "providerOrderId": "98765",
            "charge": 0.45,
            "estimatedStart": "10-30분"
        })
    );
}

#[actix_web::test]
async fn process_order_rejected_upstream() {
    let _ = env_logger::try_init().ok();
    let mut db = paid_order_db();
    db.expect_record_order_change()
        .withf(|_, update, log| {
            update.status == Some(Failed) &&
                update.progress == Some(0) &&
                update.notes.as_deref() == Some("Not enough funds") &&
                log.action == ServiceLogAction::OrderFailed
        })
        .times(1)
        .returning(|_, _, _| {
            let mut o = order("SG-3001", Failed, 0);
            o.notes = Some("Not enough funds".into());
            Ok(o)
        });
    let mut upstream = provider();
    upstream.expect_create_order().returning(|_| Err(FulfillmentError::Rejected("Not enough funds".into())));
    let app = configure(db, upstream, provider());
    let (status, body) = post_request("/smmturk", Some(TEST_ADMIN_KEY), Some(process_order_body()), app).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
    assert_eq!(body["error"], "주문 처리에 실패했습니다.");
    assert_eq!(body["details"], "Not enough funds");
}

#[actix_web::test]
async fn process_order_for_unpaid_order() {
    let _ = env_logger::try_init().ok();
    let mut db = MockOrderManager::new();
    db.expect_fetch_order_by_order_id().returning(|id| Ok(Some(order(id.as_str(), Pending, 0))));
    db.expect_record_order_change().never();
    let mut upstream = provider();
    upstream.expect_create_order().never();
    let app = configure(db, upstream, provider());
    let (status, _) = post_request("/smmturk", Some(TEST_ADMIN_KEY), Some(process_order_body()), app).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn sync_single_order() {
    let _ = env_logger::try_init().ok();
    let mut db = MockOrderManager::new();
    db.expect_fetch_order_by_order_id().with(eq(OrderId::from("SG-3002"))).returning(|id| {
        let mut o = order(id.as_str(), Processing, 20);
        o.provider_order_id = Some("555".into());
        Ok(Some(o))
    });
    db.expect_record_order_change()
        .withf(|_, update, log| {
            update.status == Some(Processing) &&
                update.progress == Some(40) &&
                update.remains == Some(600) &&
                log.progress_before == Some(20) &&
                log.progress_after == Some(40)
        })
        .times(1)
        .returning(|_, _, _| {
            let mut o = order("SG-3002", Processing, 40);
            o.provider_order_id = Some("555".into());
            o.remains = Some(600);
            Ok(o)
        });
    let mut upstream = provider();
    upstream.expect_get_order_status().with(eq("555")).returning(|_| {
        Ok(ProviderOrderStatus {
            status: "In progress".into(),
            remains: Some(600),
            start_count: Some(100),
            charge: None,
            currency: None,
        })
    });
    let body = json!({"action": "sync-order-status", "orderId": "SG-3002"});
    let (status, body) =
        post_request("/smmturk", Some(TEST_ADMIN_KEY), Some(body), configure(db, upstream, provider())).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["updated"], 1);
    assert_eq!(body["orders"][0]["progress"], 40);
}

#[actix_web::test]
async fn sync_unknown_order() {
    let _ = env_logger::try_init().ok();
    let mut db = MockOrderManager::new();
    db.expect_fetch_order_by_order_id().returning(|_| Ok(None));
    let body = json!({"action": "sync-order-status", "orderId": "NOPE"});
    let (status, body) =
        post_request("/smmturk", Some(TEST_ADMIN_KEY), Some(body), configure(db, provider(), provider())).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["success"], false);
}

#[actix_web::test]
async fn get_provider_services_refreshes_catalogue() {
    let _ = env_logger::try_init().ok();
    let mut upstream = provider();
    upstream.expect_fetch_services().times(1).returning(|| {
        Ok(vec![
            service_info(11, "Instagram Likes", "Instagram"),
            service_info(12, "TikTok Views", "TikTok"),
            service_info(13, "YouTube Subscribers", "YouTube"),
        ])
    });
    let body = json!({"action": "get-provider-services"});
    let app = configure(MockOrderManager::new(), provider(), upstream);
    let (status, body) = post_request("/smmturk", Some(TEST_ADMIN_KEY), Some(body), app).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], 3);
    // 0.45 per thousand with the default 9x markup
    assert_eq!(body["services"][0]["price"], 4.05);
}

#[actix_web::test]
async fn check_balance() {
    let _ = env_logger::try_init().ok();
    let mut upstream = provider();
    upstream
        .expect_get_balance()
        .returning(|| Ok(ProviderBalance { balance: Price::from_micros(12_500_000), currency: "USD".into() }));
    let body = json!({"action": "check-balance"});
    let app = configure(MockOrderManager::new(), provider(), upstream);
    let (status, body) = post_request("/smmturk", Some(TEST_ADMIN_KEY), Some(body), app).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"success": true, "balance": 12.5, "currency": "USD"}));
}

#[actix_web::test]
async fn balance_provider_outage_is_a_server_error() {
    let _ = env_logger::try_init().ok();
    let mut upstream = provider();
    upstream.expect_get_balance().returning(|| Err(FulfillmentError::Unavailable("timed out".into())));
    let body = json!({"action": "check-balance"});
    let app = configure(MockOrderManager::new(), provider(), upstream);
    let (status, body) = post_request("/smmturk", Some(TEST_ADMIN_KEY), Some(body), app).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["success"], false);
    assert!(body.get("details").is_none());
}

#[actix_web::test]
async fn unknown_or_malformed_actions() {
    let _ = env_logger::try_init().ok();
    let (status, body) = post_request(
        "/smmturk",
        Some(TEST_ADMIN_KEY),
        Some(json!({"action": "refill"})),
        configure(MockOrderManager::new(), provider(), provider()),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "지원하지 않는 작업입니다.");

    let (status, body) = post_request(
        "/smmturk",
        Some(TEST_ADMIN_KEY),
        Some(json!({"action": "process-order", "orderId": "SG-1"})),
        configure(MockOrderManager::new(), provider(), provider()),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "잘못된 요청입니다.");
}

#[actix_web::test]
async fn dispatch_requires_admin_key() {
    let _ = env_logger::try_init().ok();
    let body = json!({"action": "check-balance"});
    let app = configure(MockOrderManager::new(), provider(), provider());
    let (status, body) = post_request("/smmturk", Some("guess"), Some(body), app).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["success"], false);
}

#[actix_web::test]
async fn cors_preflight() {
    let _ = env_logger::try_init().ok();
    let req = TestRequest::default()
        .method(actix_web::http::Method::OPTIONS)
        .uri("/smmturk")
        .insert_header(("Origin", "https://shop.example.com"))
        .insert_header(("Access-Control-Request-Method", "POST"));
    let app = actix_web::test::init_service(
        actix_web::App::new().configure(configure(MockOrderManager::new(), provider(), provider())),
    )
    .await;
    let res = actix_web::test::call_service(&app, req.to_request()).await;
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(res.headers().get("Access-Control-Allow-Origin").unwrap(), "*");
    assert!(res.headers().get("Access-Control-Allow-Headers").unwrap().to_str().unwrap().contains("X-Admin-Key"));
    // `send` renders the same request through the shared helper too
    let (status, _) = send(
        TestRequest::default().method(actix_web::http::Method::OPTIONS).uri("/smmturk"),
        configure(MockOrderManager::new(), provider(), provider()),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
}
