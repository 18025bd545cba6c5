use std::{path::PathBuf, time::Duration};

use url::Url;

#[derive(Debug, Clone)]
pub struct DotEnvyConfig {
    pub account_api: AccountApi,
    pub storage: Storage,
    pub store: Store,
    pub stage: String,
}

#[derive(Debug, Clone)]
pub struct AccountApi {
    pub base_url: Url,
    pub timeout: Duration,
}

#[derive(Debug, Clone)]
pub struct Storage {
    pub state_file: PathBuf,
}

#[derive(Debug, Clone)]
pub struct Store {
    /// Receipt file handed over by the platform, if any.
    pub receipt_path: Option<PathBuf>,
}
