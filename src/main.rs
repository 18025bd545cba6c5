use std::sync::Arc;

use account_core::{
    application::usercases::{
        account_client::AccountClient, credential_store::CredentialStore, price_cache::PriceCache,
        subscription_resolver::SubscriptionResolver,
    },
    config::config_loader,
    infrastructure::{
        http::account_api_client::HttpAccountApi, storage::json_file_store::JsonFileStore,
        store::receipt_file_gateway::ReceiptFileGateway,
        vpn::key_value_device_key_sink::KeyValueDeviceKeySink,
    },
    observability,
};
use anyhow::{Context, Result};
use serde_json::json;
use tracing::{error, info};

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        error!("account-status exited with error: {:#}", error);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    // Loads .env first so RUST_LOG and SERVICE_NAME from it reach the subscriber.
    let dotenvy_env = config_loader::load()?;
    observability::init_observability("account-status")?;
    info!(stage = %dotenvy_env.stage, "ENV has been loaded");

    let store = Arc::new(JsonFileStore::open(&dotenvy_env.storage.state_file)?);
    info!(path = %store.path().display(), "State file has been opened");

    let api = Arc::new(HttpAccountApi::new(
        dotenvy_env.account_api.base_url.clone(),
        dotenvy_env.account_api.timeout,
    )?);
    let store_gateway = Arc::new(ReceiptFileGateway::new(
        dotenvy_env.store.receipt_path.clone(),
    ));
    let device_keys = Arc::new(KeyValueDeviceKeySink::new(Arc::clone(&store)));

    let credential_store = Arc::new(CredentialStore::new(Arc::clone(&store), Arc::clone(&api)));
    let account_client = Arc::new(AccountClient::new(api, device_keys, credential_store));
    let resolver = SubscriptionResolver::new(account_client, Arc::clone(&store_gateway));
    let price_cache = Arc::new(PriceCache::new(Arc::clone(&store), store_gateway));

    let refresh = price_cache.spawn_refresh();
    let status = resolver.resolve().await;
    refresh.await.context("price refresh task failed")?;
    if let Some(provisioning) = resolver.take_provisioning() {
        provisioning
            .await
            .context("device provisioning task failed")?;
    }

    let report = json!({
        "status": status,
        "prices": price_cache.entries(),
    });
    println!(
        "{}",
        serde_json::to_string_pretty(&report).context("failed to encode status report")?
    );

    Ok(())
}
