use std::{path::PathBuf, time::Duration};

use anyhow::{Context, Result};
use url::Url;

use super::config_model::{AccountApi, DotEnvyConfig, Storage, Store};

pub const DEFAULT_ACCOUNT_API_BASE_URL: &str = "https://api.lockdownprivacy.com/api/v1/";
pub const DEFAULT_ACCOUNT_API_TIMEOUT_SECS: u64 = 15;
pub const DEFAULT_STATE_FILE: &str = "account_state.json";

pub fn load() -> Result<DotEnvyConfig> {
    dotenvy::dotenv().ok();

    let base_url = env_string("ACCOUNT_API_BASE_URL")
        .unwrap_or_else(|| DEFAULT_ACCOUNT_API_BASE_URL.to_string());
    let timeout_secs = match env_string("ACCOUNT_API_TIMEOUT_SECS") {
        Some(raw) => raw
            .trim()
            .parse::<u64>()
            .with_context(|| format!("ACCOUNT_API_TIMEOUT_SECS is invalid: {raw}"))?,
        None => DEFAULT_ACCOUNT_API_TIMEOUT_SECS,
    };

    let account_api = AccountApi {
        base_url: parse_base_url(&base_url)?,
        timeout: Duration::from_secs(timeout_secs),
    };

    let storage = Storage {
        state_file: env_string("STATE_FILE")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_STATE_FILE)),
    };

    let store = Store {
        receipt_path: env_string("RECEIPT_PATH").map(PathBuf::from),
    };

    Ok(DotEnvyConfig {
        account_api,
        storage,
        store,
        stage: get_stage(),
    })
}

pub fn get_stage() -> String {
    env_string("STAGE").unwrap_or_else(|| "local".to_string())
}

/// Endpoints are joined relative to the base, so it must end with a slash.
pub fn parse_base_url(raw: &str) -> Result<Url> {
    let raw = raw.trim();
    let normalized = if raw.ends_with('/') {
        raw.to_string()
    } else {
        format!("{raw}/")
    };
    Url::parse(&normalized).with_context(|| format!("ACCOUNT_API_BASE_URL is invalid: {raw}"))
}

fn env_string(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|value| !value.trim().is_empty())
}
