//! Shared-key middleware for Actix Web.
//!
//! Admin routes and the provider-action dispatch endpoint are not customer facing. Callers present the key
//! configured in `SG_ADMIN_API_KEY`, either in the `X-Admin-Key` header or as an `Authorization: Bearer` token.
//!
//! If no key has been configured, every request is refused. CORS pre-flight (`OPTIONS`) requests pass through
//! unchecked, since browsers never attach credentials to them.

use std::{
    future::{ready, Ready},
    rc::Rc,
};

use actix_web::{
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    http::{header::AUTHORIZATION, Method},
    Error,
};
use futures::future::LocalBoxFuture;
use log::{trace, warn};
use sg_common::Secret;

use crate::{errors::ServerError, helpers::get_remote_ip};

pub const ADMIN_KEY_HEADER: &str = "X-Admin-Key";

pub struct AdminKeyMiddlewareFactory {
    key: Secret<String>,
    use_x_forwarded_for: bool,
    use_forwarded: bool,
}

impl AdminKeyMiddlewareFactory {
    pub fn new(key: Secret<String>, use_x_forwarded_for: bool, use_forwarded: bool) -> Self {
        AdminKeyMiddlewareFactory { key, use_x_forwarded_for, use_forwarded }
    }
}

impl<S, B> Transform<S, ServiceRequest> for AdminKeyMiddlewareFactory
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Error = Error;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;
    type InitError = ();
    type Response = ServiceResponse<B>;
    type Transform = AdminKeyMiddlewareService<S>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(AdminKeyMiddlewareService {
            key: self.key.clone(),
            use_x_forwarded_for: self.use_x_forwarded_for,
            use_forwarded: self.use_forwarded,
            service: Rc::new(service),
        }))
    }
}

pub struct AdminKeyMiddlewareService<S> {
    key: Secret<String>,
    use_x_forwarded_for: bool,
    use_forwarded: bool,
    service: Rc<S>,
}

impl<S, B> Service<ServiceRequest> for AdminKeyMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;
    type Response = ServiceResponse<B>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = Rc::clone(&self.service);
        let secret = self.key.clone();
        let use_x_forwarded_for = self.use_x_forwarded_for;
        let use_forwarded = self.use_forwarded;
        Box::pin(async move {
            if req.method() == Method::OPTIONS {
                trace!("💻️ Pre-flight request. Skipping admin key check.");
                return service.call(req).await;
            }
            let remote = get_remote_ip(req.request(), use_x_forwarded_for, use_forwarded);
            if secret.is_empty() {
                warn!("💻️ No admin key is configured. Denying {} {} from {remote:?}", req.method(), req.path());
                return Err(ServerError::Unauthorized("Admin access is disabled".into()).into());
            }
            match presented_key(&req) {
                Some(key) if secret.matches(key) => {
                    trace!("💻️ Admin key check for {} ✅️", req.path());
                    service.call(req).await
                },
                Some(_) => {
                    warn!("💻️ Invalid admin key presented for {} from {remote:?}. Denying access.", req.path());
                    Err(ServerError::Unauthorized("Invalid admin key".into()).into())
                },
                None => {
                    warn!("💻️ No admin key presented for {} from {remote:?}. Denying access.", req.path());
                    Err(ServerError::Unauthorized("An admin key is required".into()).into())
                },
            }
        })
    }
}

fn presented_key(req: &ServiceRequest) -> Option<&str> {
    let headers = req.headers();
    headers.get(ADMIN_KEY_HEADER).and_then(|v| v.to_str().ok()).map(str::trim).or_else(|| {
        headers
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.strip_prefix("Bearer "))
            .map(str::trim)
    })
}
