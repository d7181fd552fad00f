mod admin_key;

pub use admin_key::{AdminKeyMiddlewareFactory, AdminKeyMiddlewareService, ADMIN_KEY_HEADER};
