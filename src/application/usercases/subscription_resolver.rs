use std::sync::{Arc, Mutex, PoisonError, RwLock};

use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::{
    application::usercases::account_client::AccountClient,
    domain::{
        entities::{credentials::Credentials, subscriptions::Subscription},
        errors::{AccountError, AccountResult},
        repositories::{
            account_api::AccountApi, device_keys::DeviceKeySink, key_value_store::KeyValueStore,
            session_cookies::SessionCookies, store_gateway::StoreGateway,
        },
        value_objects::{
            enums::{api_error_codes::ApiErrorCode, plan_types::PlanType},
            subscription_status::{
                PendingConfirmation, ResolveErrorKind, SubscriptionStatus, UpgradeAction,
            },
        },
    },
};

/// Which resolution branch the stored credentials select.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolutionPath {
    NoCredentials,
    CredentialsUnconfirmed(Credentials),
    CredentialsConfirmed(Credentials),
}

enum BranchOutcome {
    Subscriptions(Vec<Subscription>),
    AwaitingConfirmation { email: String },
}

/// API codes that mean "nothing active" rather than a failure.
fn is_benign_empty(code: ApiErrorCode) -> bool {
    matches!(
        code,
        ApiErrorCode::NoSubscriptionInReceipt
            | ApiErrorCode::NoActiveSubscription
            | ApiErrorCode::SandboxReceiptNotAllowed
    )
}

/// Reconciles receipt and account subscription signals into one status.
/// Never retries; a failed resolution keeps the last known plans.
pub struct SubscriptionResolver<A, D, G, K, C>
where
    A: AccountApi + 'static,
    D: DeviceKeySink + 'static,
    G: StoreGateway + 'static,
    K: KeyValueStore + 'static,
    C: SessionCookies + 'static,
{
    account_client: Arc<AccountClient<A, D, K, C>>,
    store_gateway: Arc<G>,
    last_active_plans: RwLock<Vec<PlanType>>,
    provisioning: Mutex<Option<JoinHandle<()>>>,
}

impl<A, D, G, K, C> SubscriptionResolver<A, D, G, K, C>
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
            last_active_plans: RwLock::new(Vec::new()),
            provisioning: Mutex::new(None),
        }
    }

    pub fn current_path(&self) -> ResolutionPath {
        match self.account_client.credential_store().get() {
            None => ResolutionPath::NoCredentials,
            Some(credentials) if credentials.confirmed => {
                ResolutionPath::CredentialsConfirmed(credentials)
            }
            Some(credentials) => ResolutionPath::CredentialsUnconfirmed(credentials),
        }
    }

    pub fn last_known_plans(&self) -> Vec<PlanType> {
        self.last_active_plans
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub async fn resolve(&self) -> SubscriptionStatus {
        let path = self.current_path();
        let outcome = match &path {
            ResolutionPath::NoCredentials => {
                debug!("resolver: no credentials, using receipt");
                self.resolve_with_receipt().await
            }
            ResolutionPath::CredentialsUnconfirmed(credentials) => {
                debug!(email = %credentials.email, "resolver: unconfirmed credentials, confirming email");
                self.resolve_with_confirmation(credentials).await
            }
            ResolutionPath::CredentialsConfirmed(credentials) => {
                debug!(email = %credentials.email, "resolver: confirmed credentials, using account");
                self.resolve_with_account(credentials).await
            }
        };

        self.finish(outcome)
    }

    /// Background provisioning started by the last email confirmation, if
    /// any. Callers that exit early await it so the device key is stored.
    pub fn take_provisioning(&self) -> Option<JoinHandle<()>> {
        self.provisioning
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
    }

    /// Sign out and forget the last resolved plans.
    pub fn sign_out(&self) {
        self.account_client.sign_out();
        self.last_active_plans
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
        info!("resolver: signed out");
    }

    async fn resolve_with_receipt(&self) -> AccountResult<BranchOutcome> {
        let Some(receipt) = self.store_gateway.receipt() else {
            debug!("resolver: no receipt on device");
            return Ok(BranchOutcome::Subscriptions(Vec::new()));
        };

        self.account_client.sign_in_with_receipt(&receipt).await?;
        let subscriptions = self.account_client.fetch_active_subscriptions().await?;
        Ok(BranchOutcome::Subscriptions(subscriptions))
    }

    async fn resolve_with_confirmation(
        &self,
        credentials: &Credentials,
    ) -> AccountResult<BranchOutcome> {
        match self
            .account_client
            .sign_in_with_credentials(credentials)
            .await
        {
            Ok(_) => {}
            Err(AccountError::Api { code, .. }) => {
                info!(
                    email = %credentials.email,
                    api_code = %code,
                    "resolver: email not confirmed yet"
                );
                return Ok(BranchOutcome::AwaitingConfirmation {
                    email: credentials.email.clone(),
                });
            }
            Err(err) => return Err(err),
        }

        self.account_client.credential_store().set_confirmed(true);
        info!(email = %credentials.email, "resolver: email confirmed");

        self.spawn_provisioning();

        let subscriptions = self.account_client.fetch_active_subscriptions().await?;
        Ok(BranchOutcome::Subscriptions(subscriptions))
    }

    async fn resolve_with_account(&self, credentials: &Credentials) -> AccountResult<BranchOutcome> {
        self.account_client
            .sign_in_with_credentials(credentials)
            .await?;
        let subscriptions = self.account_client.fetch_active_subscriptions().await?;
        Ok(BranchOutcome::Subscriptions(subscriptions))
    }

    /// Provisioning is not part of the resolution chain; it runs on its own
    /// task and never delays the status.
    fn spawn_provisioning(&self) {
        let handle = tokio::spawn(provision_device(
            Arc::clone(&self.account_client),
            Arc::clone(&self.store_gateway),
        ));
        *self
            .provisioning
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = Some(handle);
    }

    fn finish(&self, outcome: AccountResult<BranchOutcome>) -> SubscriptionStatus {
        let credential_store = self.account_client.credential_store();
        let is_signed_in = credential_store.get().is_some();
        let is_confirmed = is_signed_in && credential_store.is_confirmed();

        match outcome {
            Ok(BranchOutcome::Subscriptions(subscriptions)) => {
                let active_plans: Vec<PlanType> =
                    subscriptions.iter().map(|s| s.plan_type).collect();
                info!(
                    plan_count = active_plans.len(),
                    current = ?active_plans.first(),
                    "resolver: active plans resolved"
                );
                self.active_status(is_signed_in, is_confirmed, active_plans)
            }
            Ok(BranchOutcome::AwaitingConfirmation { email }) => {
                let active_plans = self.last_known_plans();
                SubscriptionStatus {
                    is_signed_in,
                    is_confirmed,
                    upgrade: UpgradeAction::for_active_plans(&active_plans),
                    active_plans,
                    error_kind: None,
                    pending_confirmation: Some(PendingConfirmation { email }),
                }
            }
            Err(AccountError::Api { code, .. }) if is_benign_empty(code) => {
                info!(api_code = %code, "resolver: no active subscription");
                self.active_status(is_signed_in, is_confirmed, Vec::new())
            }
            Err(err) => {
                let error_kind = match &err {
                    AccountError::Transport(_) => ResolveErrorKind::Transport,
                    AccountError::Api { code, .. } => ResolveErrorKind::Api(*code),
                    AccountError::InvalidResponse(_) | AccountError::DeviceKeyStorage(_) => {
                        ResolveErrorKind::InvalidResponse
                    }
                };
                error!(error = %err, "resolver: failed to load plan");
                SubscriptionStatus {
                    is_signed_in,
                    is_confirmed,
                    active_plans: self.last_known_plans(),
                    upgrade: UpgradeAction::Retry,
                    error_kind: Some(error_kind),
                    pending_confirmation: None,
                }
            }
        }
    }

    fn active_status(
        &self,
        is_signed_in: bool,
        is_confirmed: bool,
        active_plans: Vec<PlanType>,
    ) -> SubscriptionStatus {
        *self
            .last_active_plans
            .write()
            .unwrap_or_else(PoisonError::into_inner) = active_plans.clone();

        SubscriptionStatus {
            is_signed_in,
            is_confirmed,
            upgrade: UpgradeAction::for_active_plans(&active_plans),
            active_plans,
            error_kind: None,
            pending_confirmation: None,
        }
    }
}

/// Attach the receipt to the freshly confirmed account and refresh the VPN
/// key. Failures are expected here (no subscription in receipt) and are only
/// logged.
async fn provision_device<A, D, G, K, C>(
    account_client: Arc<AccountClient<A, D, K, C>>,
    store_gateway: Arc<G>,
) where
    A: AccountApi + 'static,
    D: DeviceKeySink + 'static,
    G: StoreGateway + 'static,
    K: KeyValueStore + 'static,
    C: SessionCookies + 'static,
{
    if let Some(receipt) = store_gateway.receipt() {
        if let Err(err) = account_client.subscription_event(&receipt).await {
            warn!(error = %err, "resolver: subscription event after confirmation failed");
            return;
        }
    }

    if let Err(err) = account_client.fetch_device_key().await {
        warn!(error = %err, "resolver: device key refresh after confirmation failed");
    }
}
