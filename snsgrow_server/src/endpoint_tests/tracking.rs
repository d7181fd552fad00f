use actix_web::{http::StatusCode, web, web::ServiceConfig};
use mockall::predicate::eq;
use serde_json::json;
use snsgrow_engine::{
    db_types::{OrderId, OrderStatusType::*},
    traits::OrderFlowError,
    CatalogApi,
    OrderFlowApi,
    PricingConfig,
    TrackingApi,
};

use super::{
    helpers::{get_request, post_request},
    mocks::{history, order, provider, service_info, MemoryCatalog, MockOrderManager, MockProvider},
};
use crate::routes::{CancelOrderRoute, CreateOrderRoute, ListServicesRoute, TrackOrderRoute};

fn configure(db: MockOrderManager) -> impl FnOnce(&mut ServiceConfig) {
    move |cfg| {
        let tracking_api = TrackingApi::new(db);
        cfg.service(
            web::scope("/api")
                .service(TrackOrderRoute::<MockOrderManager>::new())
                .service(CancelOrderRoute::<MockOrderManager>::new()),
        )
        .app_data(web::Data::new(tracking_api));
    }
}

#[actix_web::test]
async fn track_by_order_id() {
    let _ = env_logger::try_init().ok();
    let mut db = MockOrderManager::new();
    db.expect_fetch_order_by_order_id().with(eq(OrderId::from("SG-1001"))).returning(|_| {
        let mut o = order("SG-1001", Processing, 40);
        o.remains = Some(600);
        o.provider_order_id = Some("98765".into());
        Ok(Some(o))
    });
    db.expect_fetch_status_history().with(eq(1)).returning(|_| Ok(history(&[Pending, PaymentConfirmed, Processing])));
    let (status, body) = get_request("/api/orders/track?orderId=SG-1001", configure(db)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    let data = &body["data"];
    assert_eq!(data["order"]["orderId"], "SG-1001");
    assert_eq!(data["progress"], 40);
    assert_eq!(data["delivered"], 400);
    assert_eq!(data["remains"], 600);
    assert_eq!(data["isTerminal"], false);
    assert_eq!(data["canCancel"], true);
    assert_eq!(data["pollIntervalSecs"], 30);
    let timeline = data["timeline"].as_array().unwrap();
    assert_eq!(timeline.len(), 5);
    assert_eq!(timeline[0]["label"], "주문 접수");
    assert_eq!(timeline[2]["current"], true);
    assert_eq!(timeline[3]["reached"], false);
    assert_eq!(timeline[3]["changedAt"], serde_json::Value::Null);
}

#[actix_web::test]
async fn track_by_email_returns_latest_order() {
    let _ = env_logger::try_init().ok();
    let mut db = MockOrderManager::new();
    db.expect_fetch_latest_order_for_email().with(eq("jane@example.com")).returning(|_| {
        let mut o = order("SG-1002", Completed, 100);
        o.remains = Some(0);
        Ok(Some(o))
    });
    db.expect_fetch_status_history().returning(|_| {
        Ok(history(&[Pending, PaymentConfirmed, Processing, Completed]))
    });
    let (status, body) = get_request("/api/orders/track?email=Jane@Example.com", configure(db)).await;
    assert_eq!(status, StatusCode::OK);
    let data = &body["data"];
    assert_eq!(data["order"]["orderId"], "SG-1002");
    assert_eq!(data["progress"], 100);
    assert_eq!(data["delivered"], 1000);
    assert_eq!(data["isTerminal"], true);
    assert_eq!(data["canCancel"], false);
    assert_eq!(data["pollIntervalSecs"], serde_json::Value::Null);
    assert_eq!(data["timeline"][4]["current"], true);
}

#[actix_web::test]
async fn track_unknown_order() {
    let _ = env_logger::try_init().ok();
    let mut db = MockOrderManager::new();
    db.expect_fetch_order_by_order_id().returning(|_| Ok(None));
    let (status, body) = get_request("/api/orders/track?orderId=NOPE", configure(db)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["success"], false);
    assert_eq!(body["error"], "주문을 찾을 수 없습니다.");
}

#[actix_web::test]
async fn track_without_search_value() {
    let _ = env_logger::try_init().ok();
    let db = MockOrderManager::new();
    let (status, body) = get_request("/api/orders/track", configure(db)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
}

#[actix_web::test]
async fn track_database_failure_hides_details() {
    let _ = env_logger::try_init().ok();
    let mut db = MockOrderManager::new();
    db.expect_fetch_order_by_order_id().returning(|_| Err(OrderFlowError::DatabaseError("database is locked".into())));
    let (status, body) = get_request("/api/orders/track?orderId=SG-1", configure(db)).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body.get("details").is_none());
}

#[actix_web::test]
async fn cancel_pending_order() {
    let _ = env_logger::try_init().ok();
    let mut db = MockOrderManager::new();
    db.expect_fetch_order_by_order_id().returning(|_| Ok(Some(order("SG-1003", Pending, 0))));
    db.expect_record_order_change()
        .withf(|id, update, _| *id == 1 && update.status == Some(Cancelled) && update.progress == Some(0))
        .times(1)
        .returning(|_, _, _| Ok(order("SG-1003", Cancelled, 0)));
    let (status, body) = post_request("/api/orders/SG-1003/cancel", None, None, configure(db)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"success": true, "message": "주문이 취소되었습니다."}));
}

#[actix_web::test]
async fn cannot_cancel_completed_order() {
    let _ = env_logger::try_init().ok();
    let mut db = MockOrderManager::new();
    db.expect_fetch_order_by_order_id().returning(|_| Ok(Some(order("SG-1004", Completed, 100))));
    db.expect_record_order_change().never();
    let (status, body) = post_request("/api/orders/SG-1004/cancel", None, None, configure(db)).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "취소할 수 없는 주문입니다.");
}

#[actix_web::test]
async fn create_order() {
    let _ = env_logger::try_init().ok();
    let mut db = MockOrderManager::new();
    db.expect_insert_order()
        .withf(|o| o.order_id.as_str() == "SG-2001" && o.quantity == 500)
        .times(1)
        .returning(|o| Ok(order(o.order_id.as_str(), Pending, 0)));
    let body = json!({
        "orderId": "SG-2001",
        "customerEmail": "jane@example.com",
        "serviceId": "101",
        "targetUrl": "https://instagram.com/sg_test",
        "quantity": 500
    });
    let configure = move |cfg: &mut ServiceConfig| {
        cfg.service(web::scope("/api").service(CreateOrderRoute::<MockOrderManager>::new()))
            .app_data(web::Data::new(OrderFlowApi::new(db)));
    };
    let (status, body) = post_request("/api/orders", None, Some(body), configure).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["data"]["status"], "pending");
}

#[actix_web::test]
async fn create_order_rejects_bad_quantity() {
    let _ = env_logger::try_init().ok();
    let mut db = MockOrderManager::new();
    db.expect_insert_order().never();
    let body = json!({
        "orderId": "SG-2002",
        "customerEmail": "jane@example.com",
        "serviceId": "101",
        "targetUrl": "https://instagram.com/sg_test",
        "quantity": 0
    });
    let configure = move |cfg: &mut ServiceConfig| {
        cfg.service(web::scope("/api").service(CreateOrderRoute::<MockOrderManager>::new()))
            .app_data(web::Data::new(OrderFlowApi::new(db)));
    };
    let (status, body) = post_request("/api/orders", None, Some(body), configure).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
}

#[actix_web::test]
async fn list_services_by_platform() {
    let _ = env_logger::try_init().ok();
    let mut upstream = provider();
    upstream.expect_fetch_services().returning(|| {
        Ok(vec![
            service_info(1, "Instagram Followers [Real]", "Instagram Followers"),
            service_info(2, "YouTube Views", "YouTube"),
        ])
    });
    let api = CatalogApi::new(MemoryCatalog::default(), upstream, PricingConfig::default());
    api.sync_services().await.unwrap();
    let configure = move |cfg: &mut ServiceConfig| {
        cfg.service(web::scope("/api").service(ListServicesRoute::<MemoryCatalog, MockProvider>::new()))
            .app_data(web::Data::new(api));
    };
    let (status, body) = get_request("/api/services?platform=youtube", configure).await;
    assert_eq!(status, StatusCode::OK);
    let services = body["data"].as_array().unwrap();
    assert_eq!(services.len(), 1);
    assert_eq!(services[0]["smmturkId"], 2);
}
