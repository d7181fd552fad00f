use std::{env, time::Duration};

use log::*;
use sg_common::{helpers::env_or_default, Secret};

use crate::RetryPolicy;

pub const DEFAULT_SMMTURK_API_URL: &str = "https://smmturk.org/api/v2";
const DEFAULT_TIMEOUT_SECS: u64 = 30;
const DEFAULT_MAX_RETRIES: u32 = 3;
const DEFAULT_RETRY_DELAY_MS: u64 = 500;

#[derive(Debug, Clone)]
pub struct SmmTurkConfig {
    pub api_url: String,
    pub api_key: Secret<String>,
    /// Upper bound for a single HTTP round trip. Retries get their own timeout each.
    pub timeout: Duration,
    pub retry: RetryPolicy,
}

impl Default for SmmTurkConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_SMMTURK_API_URL.to_string(),
            api_key: Secret::default(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            retry: RetryPolicy::default(),
        }
    }
}

impl SmmTurkConfig {
    pub fn new(api_url: &str, api_key: &str) -> Self {
        Self { api_url: api_url.to_string(), api_key: Secret::new(api_key.to_string()), ..Default::default() }
    }

    pub fn new_from_env_or_default() -> Self {
        let api_url = env::var("SG_SMMTURK_API_URL").unwrap_or_else(|_| {
            info!("🪛️ SG_SMMTURK_API_URL not set, using {DEFAULT_SMMTURK_API_URL}");
            DEFAULT_SMMTURK_API_URL.to_string()
        });
        let api_key = Secret::new(env::var("SG_SMMTURK_API_KEY").unwrap_or_else(|_| {
            warn!("🪛️ SG_SMMTURK_API_KEY not set. Every provider call is going to be rejected.");
            String::default()
        }));
        let timeout = Duration::from_secs(env_or_default("SG_SMMTURK_TIMEOUT", DEFAULT_TIMEOUT_SECS));
        let max_retries = env_or_default("SG_SMMTURK_MAX_RETRIES", DEFAULT_MAX_RETRIES);
        let base_delay = Duration::from_millis(env_or_default("SG_SMMTURK_RETRY_DELAY", DEFAULT_RETRY_DELAY_MS));
        let retry = RetryPolicy::new(max_retries, base_delay);
        Self { api_url, api_key, timeout, retry }
    }
}
