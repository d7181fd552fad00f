use std::{env, time::Duration};

use log::*;
use sg_common::{
    helpers::{env_or_default, parse_boolean_flag},
    Secret,
};
use smmturk_tools::SmmTurkConfig;
use snsgrow_engine::{PricingConfig, SyncConfig};

const DEFAULT_SG_HOST: &str = "127.0.0.1";
const DEFAULT_SG_PORT: u16 = 8360;
const DEFAULT_SYNC_INTERVAL_SECS: u64 = 300;
const DEFAULT_SYNC_BATCH_LIMIT: i64 = 50;
const DEFAULT_PRICE_MARKUP: f64 = 9.0;

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub database_url: String,
    /// Shared secret for the admin surface and the provider dispatch endpoint. Admin calls are refused while this
    /// is empty.
    pub admin_api_key: Secret<String>,
    /// If true, the X-Forwarded-For header will be used to determine the client's IP address, rather than the
    /// connection's remote address.
    pub use_x_forwarded_for: bool,
    /// If true, the Forwarded header will be used to determine the client's IP address.
    pub use_forwarded: bool,
    pub sync_worker: SyncWorkerConfig,
    pub sync: SyncConfig,
    pub pricing: PricingConfig,
    pub smmturk: SmmTurkConfig,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SyncWorkerConfig {
    /// Time between scheduled syncs. `None` disables the worker.
    pub interval: Option<Duration>,
}

impl Default for SyncWorkerConfig {
    fn default() -> Self {
        Self { interval: Some(Duration::from_secs(DEFAULT_SYNC_INTERVAL_SECS)) }
    }
}

impl SyncWorkerConfig {
    pub fn from_env_or_default() -> Self {
        let secs = env_or_default("SG_SYNC_INTERVAL", DEFAULT_SYNC_INTERVAL_SECS);
        if secs == 0 {
            info!("🪛️ SG_SYNC_INTERVAL is 0. The scheduled order sync is disabled.");
            return Self { interval: None };
        }
        Self { interval: Some(Duration::from_secs(secs)) }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_SG_HOST.to_string(),
            port: DEFAULT_SG_PORT,
            database_url: String::default(),
            admin_api_key: Secret::default(),
            use_x_forwarded_for: false,
            use_forwarded: false,
            sync_worker: SyncWorkerConfig::default(),
            sync: SyncConfig::default(),
            pricing: PricingConfig::default(),
            smmturk: SmmTurkConfig::default(),
        }
    }
}

impl ServerConfig {
    pub fn new(host: &str, port: u16) -> Self {
        Self { host: host.to_string(), port, ..Default::default() }
    }

    pub fn from_env_or_default() -> Self {
        let host = env::var("SG_HOST").ok().unwrap_or_else(|| DEFAULT_SG_HOST.into());
        let port = env_or_default("SG_PORT", DEFAULT_SG_PORT);
        let database_url = env::var("SG_DATABASE_URL").ok().unwrap_or_else(|| {
            error!("🪛️ SG_DATABASE_URL is not set. Please set it to the URL for the SNS Growth database.");
            String::default()
        });
        let admin_api_key = env::var("SG_ADMIN_API_KEY").ok().unwrap_or_else(|| {
            warn!("🪛️ SG_ADMIN_API_KEY is not set. All admin and dispatch requests will be refused.");
            String::default()
        });
        let use_x_forwarded_for = parse_boolean_flag(env::var("SG_USE_X_FORWARDED_FOR").ok(), false);
        let use_forwarded = parse_boolean_flag(env::var("SG_USE_FORWARDED").ok(), false);
        let sync = SyncConfig {
            batch_limit: env_or_default("SG_SYNC_BATCH_LIMIT", DEFAULT_SYNC_BATCH_LIMIT).max(1),
            ..SyncConfig::default()
        };
        let markup = env_or_default("SG_PRICE_MARKUP", DEFAULT_PRICE_MARKUP);
        let pricing = if markup.is_finite() && markup > 0.0 {
            PricingConfig { markup }
        } else {
            warn!("🪛️ SG_PRICE_MARKUP must be a positive number. Using {DEFAULT_PRICE_MARKUP} instead.");
            PricingConfig::default()
        };
        Self {
            host,
            port,
            database_url,
            admin_api_key: Secret::new(admin_api_key),
            use_x_forwarded_for,
            use_forwarded,
            sync_worker: SyncWorkerConfig::from_env_or_default(),
            sync,
            pricing,
            smmturk: SmmTurkConfig::new_from_env_or_default(),
        }
    }
}
