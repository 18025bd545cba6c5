use std::sync::Arc;

use thiserror::Error;
use tracing::{error, info};

use crate::{
    application::usercases::account_client::AccountClient,
    domain::{
        entities::accounts::DeviceKey,
        errors::{AccountError, StoreError},
        repositories::{
            account_api::AccountApi, device_keys::DeviceKeySink, key_value_store::KeyValueStore,
            session_cookies::SessionCookies, store_gateway::StoreGateway,
        },
        value_objects::enums::plan_types::PlanType,
    },
};

#[derive(Debug, Error)]
pub enum PurchaseError {
    #[error("plan {0} cannot be purchased")]
    UnsupportedPlan(PlanType),
    #[error("store purchase failed: {0}")]
    Store(#[from] StoreError),
    #[error("no receipt available after purchase")]
    MissingReceipt,
    #[error(transparent)]
    Account(#[from] AccountError),
}

/// Buys a plan through the platform store and provisions the device with
/// the resulting receipt.
pub struct PurchaseFlow<A, D, G, K, C>
where
    A: AccountApi + 'static,
    D: DeviceKeySink + 'static,
    G: StoreGateway + 'static,
    K: KeyValueStore + 'static,
    C: SessionCookies + 'static,
{
    account_client: Arc<AccountClient<A, D, K, C>>,
    store_gateway: Arc<G>,
}

impl<A, D, G, K, C> PurchaseFlow<A, D, G, K, C>
where
    A: AccountApi + 'static,
    D: DeviceKeySink + 'static,
    G: StoreGateway + 'static,
    K: KeyValueStore + 'static,
    C: SessionCookies + 'static,
{
    pub fn new(account_client: Arc<AccountClient<A, D, K, C>>, store_gateway: Arc<G>) -> Self {
        Self {
            account_client,
            store_gateway,
        }
    }

    pub async fn purchase(&self, plan: PlanType) -> Result<DeviceKey, PurchaseError> {
        let product_id = plan
            .product_id()
            .ok_or(PurchaseError::UnsupportedPlan(plan))?;

        info!(%plan, %product_id, "purchase: starting store purchase");
        self.store_gateway
            .purchase(&product_id)
            .await
            .inspect_err(|err| match err {
                StoreError::Cancelled => info!(%product_id, "purchase: cancelled by user"),
                other => error!(%product_id, error = %other, "purchase: store purchase failed"),
            })?;

        let receipt = self
            .store_gateway
            .receipt()
            .ok_or(PurchaseError::MissingReceipt)?;

        self.account_client.sign_in_with_receipt(&receipt).await?;
        let key = self.account_client.fetch_device_key().await?;

        info!(%plan, key_id = %key.id, "purchase: completed");
        Ok(key)
    }
}
