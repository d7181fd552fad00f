//! Request handler definitions
//!
//! Define each route and its handler here. Handlers that are more than a few lines MUST push their logic into the
//! engine APIs. Keep this module neat and tidy 🙏
//!
//! Handlers never block. Every database and provider call is awaited, so a slow upstream only parks the current
//! request, not the worker thread.
//!
//! Surfaces:
//! * Storefront: `/api/orders/track`, `/api/orders`, `/api/orders/{order_id}/cancel`, `/api/services`.
//! * Admin (`X-Admin-Key`): everything under `/api/admin`.
//! * Provider-action dispatch (`X-Admin-Key`, CORS `*`): `POST /smmturk`.
use actix_web::{get, options, web, HttpResponse, Responder};
use log::*;
use serde_json::{json, Value};
use snsgrow_engine::{
    db_types::{NewOrder, OrderId},
    order_objects::OrderQueryFilter,
    traits::{FulfillmentProvider, OrderManagement, ServiceCatalog},
    CatalogApi,
    OrderFlowApi,
    OrderFlowError,
    OrderSyncApi,
    TrackingApi,
};

use crate::{
    data_objects::{
        AdminOrdersParams,
        ApiResponse,
        DispatchResponse,
        JsonResponse,
        ProviderAction,
        ServicesParams,
        SyncRequest,
        TrackParams,
    },
    errors::ServerError,
};

// Web-actix cannot handle generics in handlers, so it's implemented manually using the `route!` macro
#[macro_export]
macro_rules! route {
    ($name:ident => $method:ident $path:literal impl $($bounds:ty),+) => {
        paste::paste! { pub struct [<$name:camel Route>]< $( [< T $bounds:camel> ],)+ >( $( core::marker::PhantomData<fn() -> [< T $bounds:camel> ] >,)+ );}
        paste::paste! { impl< $( [< T $bounds:camel> ],)+ > [<$name:camel Route>]< $( [< T $bounds:camel> ],)+ > {
            #[allow(clippy::new_without_default)]
            pub fn new() -> Self {
                Self($( core::marker::PhantomData::<fn() -> [< T $bounds:camel> ] >,)+)
            }
        }}
        paste::paste! { impl<$( [< T $bounds:camel >] , )+> actix_web::dev::HttpServiceFactory for [<$name:camel Route>]<$([<T $bounds:camel>],)+>
        where
            $([<T $bounds:camel>]: $bounds + 'static,)+
        {
            fn register(self, config: &mut actix_web::dev::AppService) {
                let res = actix_web::Resource::new($path)
                    .name(stringify!($name))
                    .guard(actix_web::guard::$method())
                    .to($name::< $( [< T $bounds:camel >], )+>);
                actix_web::dev::HttpServiceFactory::register(res, config);
            }
        }}
    };
}

// ----------------------------------------------   Health  ----------------------------------------------------
#[get("/health")]
pub async fn health() -> impl Responder {
    trace!("💻️ Received health check request");
    HttpResponse::Ok().body("👍️\n")
}

//----------------------------------------------   Tracking  ----------------------------------------------------
route!(track_order => Get "/orders/track" impl OrderManagement);
/// Route handler for the order tracking endpoint
///
/// Customers look their order up with `?orderId=` or `?email=`. For an e-mail address, the most recent order placed
/// with that address is returned. The response carries the persisted progress, the status timeline, and
/// `pollIntervalSecs`, which is `null` once the order has reached a terminal state.
pub async fn track_order<B: OrderManagement>(
    query: web::Query<TrackParams>,
    api: web::Data<TrackingApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let search = query.search_value();
    debug!("💻️ GET track order for '{search}'");
    let view = api.track(search).await.map_err(|e| {
        debug!("💻️ Could not track order '{search}'. {e}");
        ServerError::from(e)
    })?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok(view)))
}

route!(cancel_order => Post "/orders/{order_id}/cancel" impl OrderManagement);
pub async fn cancel_order<B: OrderManagement>(
    path: web::Path<OrderId>,
    api: web::Data<TrackingApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let order_id = path.into_inner();
    debug!("💻️ POST cancel order {order_id}");
    api.cancel(&order_id).await?;
    Ok(HttpResponse::Ok().json(JsonResponse::success("주문이 취소되었습니다.")))
}

//----------------------------------------------   Orders  ----------------------------------------------------
route!(create_order => Post "/orders" impl OrderManagement);
/// Route handler for new storefront orders. The order starts out `pending`; payment is confirmed separately.
pub async fn create_order<B: OrderManagement>(
    body: web::Json<NewOrder>,
    api: web::Data<OrderFlowApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let order = body.into_inner();
    debug!("💻️ POST new order. {order}");
    let order = api.create_order(order).await?;
    Ok(HttpResponse::Created().json(ApiResponse::ok(order)))
}

//----------------------------------------------   Services  ----------------------------------------------------
route!(list_services => Get "/services" impl ServiceCatalog, FulfillmentProvider);
pub async fn list_services<B: ServiceCatalog, P: FulfillmentProvider>(
    query: web::Query<ServicesParams>,
    api: web::Data<CatalogApi<B, P>>,
) -> Result<HttpResponse, ServerError> {
    let platform = query.platform.as_deref().filter(|p| !p.trim().is_empty());
    trace!("💻️ GET services (platform: {platform:?})");
    let services = api.list_services(platform).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok(services)))
}

//----------------------------------------------   Admin  ----------------------------------------------------
route!(confirm_payment => Post "/orders/{order_id}/confirm-payment" impl OrderManagement);
/// Marks a `pending` order as paid. The order moves through `payment_confirmed` to `processing` and is then ready
/// to be sent to the provider.
pub async fn confirm_payment<B: OrderManagement>(
    path: web::Path<OrderId>,
    api: web::Data<OrderFlowApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let order_id = path.into_inner();
    info!("💻️ POST confirm payment for order {order_id}");
    let order = api.confirm_payment(&order_id).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok(order)))
}

route!(sync_orders => Post "/orders/sync" impl OrderManagement, FulfillmentProvider);
/// Reconciles in-flight orders with the provider. With an `orderId` in the body only that order is synced, otherwise
/// the most recent batch of `processing` orders is. Returns the orders that were updated.
pub async fn sync_orders<B: OrderManagement, P: FulfillmentProvider>(
    body: Option<web::Json<SyncRequest>>,
    api: web::Data<OrderSyncApi<B, P>>,
) -> Result<HttpResponse, ServerError> {
    let order_id = body.and_then(|b| b.into_inner().order_id);
    let target = order_id.as_ref().map(|id| id.to_string()).unwrap_or_else(|| "the latest batch".into());
    info!("💻️ POST order sync for {target}");
    let updated = api.sync_order_status(order_id.as_ref()).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok(updated)))
}

route!(search_orders => Get "/orders" impl OrderManagement);
pub async fn search_orders<B: OrderManagement>(
    query: web::Query<AdminOrdersParams>,
    api: web::Data<OrderFlowApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let filter = OrderQueryFilter::try_from(query.into_inner())?;
    debug!("💻️ GET search orders. {filter}");
    let orders = api.search_orders(filter).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok(orders)))
}

route!(order_details => Get "/orders/{order_id}" impl OrderManagement);
pub async fn order_details<B: OrderManagement>(
    path: web::Path<OrderId>,
    api: web::Data<OrderFlowApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let order_id = path.into_inner();
    debug!("💻️ GET order details for {order_id}");
    let details = api.order_details(&order_id).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok(details)))
}

route!(sync_services => Post "/services/sync" impl ServiceCatalog, FulfillmentProvider);
pub async fn sync_services<B: ServiceCatalog, P: FulfillmentProvider>(
    api: web::Data<CatalogApi<B, P>>,
) -> Result<HttpResponse, ServerError> {
    info!("💻️ POST service catalogue sync");
    let services = api.sync_services().await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok(services)))
}

route!(provider_balance => Get "/balance" impl ServiceCatalog, FulfillmentProvider);
pub async fn provider_balance<B: ServiceCatalog, P: FulfillmentProvider>(
    api: web::Data<CatalogApi<B, P>>,
) -> Result<HttpResponse, ServerError> {
    debug!("💻️ GET provider balance");
    let balance = api.balance().await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok(balance)))
}

//----------------------------------------------   Dispatch  ----------------------------------------------------
route!(smmturk_dispatch => Post "" impl OrderManagement, ServiceCatalog, FulfillmentProvider);
/// Provider-action dispatch endpoint.
///
/// The body is `{"action": ..., ...}` where `action` is one of `process-order`, `sync-order-status`,
/// `get-provider-services` or `check-balance`. Successful responses are `{"success": true, ...}`. Failures are
/// `{"success": false, "error", "details"?}` with a 400, 404 or 500 status. A provider refusal of `process-order` is
/// a 400, and the order is marked `failed` with the provider's message.
pub async fn smmturk_dispatch<B, C, P>(
    body: web::Json<Value>,
    sync_api: web::Data<OrderSyncApi<B, P>>,
    catalog_api: web::Data<CatalogApi<C, P>>,
) -> Result<HttpResponse, ServerError>
where
    B: OrderManagement,
    C: ServiceCatalog,
    P: FulfillmentProvider,
{
    let action = parse_action(body.into_inner())?;
    debug!("💻️ POST smmturk dispatch: {}", action.name());
    match action {
        ProviderAction::ProcessOrder { order_id, service_type, target_url, quantity } => {
            if quantity <= 0 || target_url.trim().is_empty() || service_type.trim().is_empty() {
                return Err(ServerError::InvalidRequestBody(
                    "serviceType, targetUrl and a positive quantity are required".into(),
                ));
            }
            let result =
                sync_api.process_order(&order_id, &service_type, &target_url, quantity).await.map_err(|e| match e {
                    OrderFlowError::Upstream(u) => ServerError::OrderRejected(u.to_string()),
                    e => ServerError::from(e),
                })?;
            Ok(HttpResponse::Ok().json(DispatchResponse::ok(result)))
        },
        ProviderAction::SyncOrderStatus { order_id } => {
            let orders = sync_api.sync_order_status(order_id.as_ref()).await?;
            Ok(HttpResponse::Ok().json(json!({ "success": true, "updated": orders.len(), "orders": orders })))
        },
        ProviderAction::GetProviderServices => {
            let services = catalog_api.sync_services().await?;
            Ok(HttpResponse::Ok().json(json!({ "success": true, "count": services.len(), "services": services })))
        },
        ProviderAction::CheckBalance => {
            let balance = catalog_api.balance().await?;
            Ok(HttpResponse::Ok().json(DispatchResponse::ok(balance)))
        },
    }
}

#[options("")]
pub async fn smmturk_preflight() -> impl Responder {
    trace!("💻️ CORS pre-flight for smmturk dispatch");
    HttpResponse::Ok().finish()
}

fn parse_action(body: Value) -> Result<ProviderAction, ServerError> {
    let name = body
        .get("action")
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| ServerError::UnknownAction("No action was given".into()))?;
    if !ProviderAction::NAMES.contains(&name.as_str()) {
        return Err(ServerError::UnknownAction(name));
    }
    serde_json::from_value(body).map_err(|e| ServerError::InvalidRequestBody(format!("{name}: {e}")))
}
