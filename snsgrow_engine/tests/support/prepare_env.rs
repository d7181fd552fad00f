use log::*;
use sg_common::Price;
use snsgrow_engine::{
    db_types::{NewOrder, NewServiceLog, Order, OrderId, ServiceLogAction},
    traits::{OrderManagement, OrderUpdate},
    OrderFlowApi,
    SqliteDatabase,
};
use sqlx::{migrate::MigrateDatabase, Sqlite};

pub fn random_db_path() -> String {
    let dir = std::env::temp_dir();
    format!("sqlite://{}/sg_engine_test_{}.db", dir.display(), rand::random::<u64>())
}

/// A fresh, migrated database in the temp directory.
pub async fn prepare_test_env() -> SqliteDatabase {
    dotenvy::from_filename(".env.test").ok();
    let _ = env_logger::try_init();
    let url = random_db_path();
    Sqlite::create_database(&url).await.expect("Error creating database");
    let db = SqliteDatabase::new_with_url(&url, 5).await.expect("Error creating connection to database");
    db.migrate().await.expect("Error running DB migrations");
    debug!("🚀️ Test database ready at {url}");
    db
}

pub fn new_order(id: &str, email: &str, quantity: i64) -> NewOrder {
    NewOrder::new(OrderId::from(id), email, "101", "https://instagram.com/sg_test", quantity)
        .with_service_name("Instagram Followers [Real]")
        .with_total_price(Price::from_units(9))
}

/// Creates a paid order, i.e. one that is `processing` and waiting to be sent upstream.
pub async fn paid_order(db: &SqliteDatabase, id: &str, quantity: i64) -> Order {
    let api = OrderFlowApi::new(db.clone());
    api.create_order(new_order(id, "buyer@example.com", quantity)).await.expect("Error creating order");
    api.confirm_payment(&OrderId::from(id)).await.expect("Error confirming payment")
}

/// Creates a paid order that the provider has already accepted under `provider_id`.
pub async fn sent_order(db: &SqliteDatabase, id: &str, provider_id: &str, quantity: i64) -> Order {
    let order = paid_order(db, id, quantity).await;
    let update = OrderUpdate::default().with_provider_order(provider_id, "smmturk");
    let log = NewServiceLog::new(ServiceLogAction::OrderSent, "test fixture");
    db.record_order_change(order.id, update, log).await.expect("Error marking order as sent")
}
