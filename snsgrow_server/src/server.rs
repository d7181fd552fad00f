use std::time::Duration;

use actix_web::{
    dev::Server,
    error::JsonPayloadError,
    http::KeepAlive,
    middleware::{DefaultHeaders, Logger},
    web,
    App,
    Error,
    HttpRequest,
    HttpServer,
};
use log::{info, warn};
use snsgrow_engine::{CatalogApi, OrderFlowApi, OrderSyncApi, SqliteDatabase, TrackingApi};

use crate::{
    config::ServerConfig,
    errors::ServerError,
    integrations::smmturk::SmmTurkProvider,
    middleware::{AdminKeyMiddlewareFactory, ADMIN_KEY_HEADER},
    routes::{
        health,
        smmturk_preflight,
        CancelOrderRoute,
        ConfirmPaymentRoute,
        CreateOrderRoute,
        ListServicesRoute,
        OrderDetailsRoute,
        ProviderBalanceRoute,
        SearchOrdersRoute,
        SmmturkDispatchRoute,
        SyncOrdersRoute,
        SyncServicesRoute,
        TrackOrderRoute,
    },
    sync_worker::start_sync_worker,
};

pub async fn run_server(config: ServerConfig) -> Result<(), ServerError> {
    let db = SqliteDatabase::new_with_url(&config.database_url, 25)
        .await
        .map_err(|e| ServerError::InitializeError(e.to_string()))?;
    db.migrate().await.map_err(|e| ServerError::InitializeError(format!("Could not run migrations. {e}")))?;
    let provider = SmmTurkProvider::new(config.smmturk.clone())?;
    match config.sync_worker.interval {
        Some(interval) => {
            let _handle = start_sync_worker(db.clone(), provider.clone(), config.sync.clone(), interval);
        },
        None => warn!("🕰️ The order sync worker is disabled. Orders will only sync on request."),
    }
    let srv = create_server_instance(config, db, provider)?;
    srv.await.map_err(|e| ServerError::Unspecified(e.to_string()))
}

pub fn create_server_instance(
    config: ServerConfig,
    db: SqliteDatabase,
    provider: SmmTurkProvider,
) -> Result<Server, ServerError> {
    info!("💻️ Provider endpoint: {}", provider.api().url());
    let bind_addr = (config.host.clone(), config.port);
    let srv = HttpServer::new(move || {
        let orders_api = OrderFlowApi::new(db.clone());
        let tracking_api = TrackingApi::new(db.clone());
        let sync_api = OrderSyncApi::new(db.clone(), provider.clone(), config.sync.clone());
        let catalog_api = CatalogApi::new(db.clone(), provider.clone(), config.pricing.clone());
        let app = App::new()
            .wrap(Logger::new("%t (%D ms) %s %a %{Host}i %U").log_target("sg::access_log"))
            .app_data(json_config())
            .app_data(web::Data::new(orders_api))
            .app_data(web::Data::new(tracking_api))
            .app_data(web::Data::new(sync_api))
            .app_data(web::Data::new(catalog_api));
        let admin_scope = web::scope("/admin")
            .wrap(admin_key_guard(&config))
            .service(ConfirmPaymentRoute::<SqliteDatabase>::new())
            .service(SyncOrdersRoute::<SqliteDatabase, SmmTurkProvider>::new())
            .service(SearchOrdersRoute::<SqliteDatabase>::new())
            .service(OrderDetailsRoute::<SqliteDatabase>::new())
            .service(SyncServicesRoute::<SqliteDatabase, SmmTurkProvider>::new())
            .service(ProviderBalanceRoute::<SqliteDatabase, SmmTurkProvider>::new());
        let api_scope = web::scope("/api")
            .service(admin_scope)
            .service(TrackOrderRoute::<SqliteDatabase>::new())
            .service(CreateOrderRoute::<SqliteDatabase>::new())
            .service(CancelOrderRoute::<SqliteDatabase>::new())
            .service(ListServicesRoute::<SqliteDatabase, SmmTurkProvider>::new());
        let dispatch_scope = web::scope("/smmturk")
            .wrap(admin_key_guard(&config))
            .wrap(cors_headers())
            .service(smmturk_preflight)
            .service(SmmturkDispatchRoute::<SqliteDatabase, SqliteDatabase, SmmTurkProvider>::new());
        app.service(health).service(api_scope).service(dispatch_scope)
    })
    .keep_alive(KeepAlive::Timeout(Duration::from_secs(600)))
    .bind((bind_addr.0.as_str(), bind_addr.1))?
    .run();
    Ok(srv)
}

fn admin_key_guard(config: &ServerConfig) -> AdminKeyMiddlewareFactory {
    AdminKeyMiddlewareFactory::new(config.admin_api_key.clone(), config.use_x_forwarded_for, config.use_forwarded)
}

/// The dispatch endpoint is called from the storefront's browser code, on another origin.
pub fn cors_headers() -> DefaultHeaders {
    DefaultHeaders::new()
        .add(("Access-Control-Allow-Origin", "*"))
        .add(("Access-Control-Allow-Methods", "POST, OPTIONS"))
        .add(("Access-Control-Allow-Headers", format!("Content-Type, Authorization, {ADMIN_KEY_HEADER}")))
}

/// Malformed JSON bodies get the same error envelope as every other failure.
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default().error_handler(|err: JsonPayloadError, _req: &HttpRequest| -> Error {
        ServerError::InvalidRequestBody(err.to_string()).into()
    })
}
