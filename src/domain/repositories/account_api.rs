use async_trait::async_trait;

use crate::domain::{
    entities::{
        accounts::{DeviceKey, SignIn, SubscriptionEvent},
        subscriptions::Subscription,
    },
    errors::AccountResult,
};

/// Remote account service. Session state (cookies) is held by the implementation.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AccountApi: Send + Sync {
    async fn sign_in_with_email(&self, email: &str, password: &str) -> AccountResult<SignIn>;

    async fn sign_in_with_receipt(&self, receipt: &str) -> AccountResult<SignIn>;

    async fn sign_up(&self, email: &str, password: &str) -> AccountResult<SignIn>;

    async fn resend_confirmation_code(&self, email: &str) -> AccountResult<bool>;

    async fn forgot_password(&self, email: &str) -> AccountResult<bool>;

    async fn subscription_event(&self, receipt: &str) -> AccountResult<SubscriptionEvent>;

    async fn active_subscriptions(&self) -> AccountResult<Vec<Subscription>>;

    async fn get_key(&self) -> AccountResult<DeviceKey>;
}
