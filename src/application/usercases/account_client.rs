use std::sync::Arc;

use base64::{Engine, engine::general_purpose::STANDARD};
use tracing::{error, info, warn};

use crate::{
    application::usercases::credential_store::CredentialStore,
    domain::{
        entities::{
            accounts::{DeviceKey, SignIn, SubscriptionEvent},
            credentials::Credentials,
            subscriptions::Subscription,
        },
        errors::{AccountError, AccountResult},
        repositories::{
            account_api::AccountApi, device_keys::DeviceKeySink, key_value_store::KeyValueStore,
            session_cookies::SessionCookies,
        },
    },
};

/// Account operations against the remote API. Errors are returned raw;
/// nothing here retries or reinterprets API codes.
pub struct AccountClient<A, D, K, C>
where
    A: AccountApi + 'static,
    D: DeviceKeySink + 'static,
    K: KeyValueStore + 'static,
    C: SessionCookies + 'static,
{
    api: Arc<A>,
    device_keys: Arc<D>,
    credential_store: Arc<CredentialStore<K, C>>,
}

impl<A, D, K, C> AccountClient<A, D, K, C>
where
    A: AccountApi + 'static,
    D: DeviceKeySink + 'static,
    K: KeyValueStore + 'static,
    C: SessionCookies + 'static,
{
    pub fn new(api: Arc<A>, device_keys: Arc<D>, credential_store: Arc<CredentialStore<K, C>>) -> Self {
        Self {
            api,
            device_keys,
            credential_store,
        }
    }

    pub fn credential_store(&self) -> &Arc<CredentialStore<K, C>> {
        &self.credential_store
    }

    /// Establishes a session for already stored credentials. Does not touch the store.
    pub async fn sign_in_with_credentials(&self, credentials: &Credentials) -> AccountResult<SignIn> {
        self.api
            .sign_in_with_email(&credentials.email, &credentials.password)
            .await
    }

    /// User-initiated sign-in. A successful sign-in implies a confirmed email.
    pub async fn sign_in(&self, email: &str, password: &str) -> AccountResult<SignIn> {
        info!(%email, "account_client: sign in requested");
        let signin = self.api.sign_in_with_email(email, password).await?;
        self.credential_store
            .set(&Credentials::new(email, password, true));
        Ok(signin)
    }

    /// Creates the account; credentials are kept unconfirmed until the email is verified.
    pub async fn sign_up(&self, email: &str, password: &str) -> AccountResult<SignIn> {
        info!(%email, "account_client: sign up requested");
        let signup = self.api.sign_up(email, password).await?;
        self.credential_store
            .set(&Credentials::new(email, password, false));
        Ok(signup)
    }

    /// Device-bound, credential-less session.
    pub async fn sign_in_with_receipt(&self, receipt: &str) -> AccountResult<SignIn> {
        self.api.sign_in_with_receipt(receipt).await
    }

    pub async fn resend_confirmation(&self, email: &str) -> AccountResult<bool> {
        let sent = self.api.resend_confirmation_code(email).await?;
        if sent {
            info!(%email, "account_client: confirmation email re-sent");
        } else {
            warn!(%email, "account_client: confirmation email was not re-sent");
        }
        Ok(sent)
    }

    pub async fn forgot_password(&self, email: &str) -> AccountResult<bool> {
        self.api.forgot_password(email).await
    }

    /// Attaches the device receipt to the signed-in account.
    pub async fn subscription_event(&self, receipt: &str) -> AccountResult<SubscriptionEvent> {
        self.api.subscription_event(receipt).await
    }

    pub async fn fetch_active_subscriptions(&self) -> AccountResult<Vec<Subscription>> {
        self.api.active_subscriptions().await
    }

    /// Fetches the VPN key and hands it to the device-key sink exactly once.
    /// On any failure the previously stored key is left as it was.
    pub async fn fetch_device_key(&self) -> AccountResult<DeviceKey> {
        let key = self.api.get_key().await?;

        if let Err(err) = STANDARD.decode(key.b64.as_bytes()) {
            error!(key_id = %key.id, error = %err, "account_client: device key is not valid base64");
            return Err(AccountError::InvalidResponse(format!(
                "device key {} is not valid base64",
                key.id
            )));
        }

        self.device_keys
            .set_vpn_credentials(&key.id, &key.b64)
            .map_err(|err| {
                error!(key_id = %key.id, error = ?err, "account_client: failed to store device key");
                AccountError::DeviceKeyStorage(err.to_string())
            })?;

        info!(key_id = %key.id, "account_client: device key provisioned");
        Ok(key)
    }

    pub fn sign_out(&self) {
        self.credential_store.clear();
    }
}
