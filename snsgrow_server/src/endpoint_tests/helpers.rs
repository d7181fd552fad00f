use actix_web::{
    body::MessageBody,
    http::StatusCode,
    test,
    test::TestRequest,
    web::ServiceConfig,
    App,
    ResponseError,
};
use log::debug;
use serde_json::Value;

use crate::server::json_config;

pub const TEST_ADMIN_KEY: &str = "test-admin-key";

/// Sends `req` to an app set up by `configure`. Errors raised by middleware are rendered the way actix would render
/// them to a client.
pub async fn send(req: TestRequest, configure: impl FnOnce(&mut ServiceConfig)) -> (StatusCode, String) {
    let app = App::new().app_data(json_config()).configure(configure);
    let service = test::init_service(app).await;
    debug!("Making request");
    let res = match test::try_call_service(&service, req.to_request()).await {
        Ok(res) => res.into_parts().1.map_into_boxed_body(),
        Err(e) => e.as_response_error().error_response(),
    };
    let status = res.status();
    let body = String::from_utf8_lossy(&res.into_body().try_into_bytes().unwrap()).into_owned();
    (status, body)
}

pub async fn get_request(path: &str, configure: impl FnOnce(&mut ServiceConfig)) -> (StatusCode, Value) {
    let (status, body) = send(TestRequest::get().uri(path), configure).await;
    (status, serde_json::from_str(&body).unwrap_or(Value::String(body)))
}

pub async fn post_request(
    path: &str,
    admin_key: Option<&str>,
    body: Option<Value>,
    configure: impl FnOnce(&mut ServiceConfig),
) -> (StatusCode, Value) {
    let mut req = TestRequest::post().uri(path);
    if let Some(key) = admin_key {
        req = req.insert_header(("X-Admin-Key", key));
    }
    if let Some(body) = body {
        req = req.set_json(body);
    }
    let (status, body) = send(req, configure).await;
    (status, serde_json::from_str(&body).unwrap_or(Value::String(body)))
}
