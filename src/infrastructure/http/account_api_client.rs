use std::{
    sync::{Arc, PoisonError, RwLock},
    time::Duration,
};

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::{StatusCode, cookie::Jar};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use serde_json::json;
use tracing::{debug, error, warn};
use url::Url;
use uuid::Uuid;

use crate::domain::{
    entities::{
        accounts::{DeviceKey, SignIn, SubscriptionEvent},
        subscriptions::{Subscription, SubscriptionRow},
    },
    errors::{AccountError, AccountResult},
    repositories::{account_api::AccountApi, session_cookies::SessionCookies},
    value_objects::enums::api_error_codes::ApiErrorCode,
};

/// Account API client built on reqwest. Session cookies live in the client's
/// jar; `clear_cookies` swaps in a fresh client.
pub struct HttpAccountApi {
    base_url: Url,
    timeout: Duration,
    http: RwLock<reqwest::Client>,
}

#[derive(Debug, Deserialize)]
struct ApiEnvelope {
    code: i64,
    #[serde(default)]
    message: Option<String>,
}

#[derive(Serialize)]
struct EmailBody<'a> {
    email: &'a str,
}

#[derive(Serialize)]
struct CredentialsBody<'a> {
    email: &'a str,
    password: &'a str,
}

#[derive(Serialize)]
struct ReceiptBody<'a> {
    receipt: &'a str,
}

impl HttpAccountApi {
    pub fn new(base_url: Url, timeout: Duration) -> Result<Self> {
        let http = Self::build_client(timeout)?;
        Ok(Self {
            base_url,
            timeout,
            http: RwLock::new(http),
        })
    }

    fn build_client(timeout: Duration) -> Result<reqwest::Client> {
        reqwest::Client::builder()
            .cookie_provider(Arc::new(Jar::default()))
            .timeout(timeout)
            .build()
            .context("failed to build account api http client")
    }

    fn client(&self) -> reqwest::Client {
        self.http
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    async fn post<B, T>(&self, path: &str, body: &B) -> AccountResult<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = self
            .base_url
            .join(path)
            .map_err(|err| AccountError::Transport(format!("invalid endpoint {path}: {err}")))?;
        let request_id = Uuid::new_v4();

        debug!(%request_id, %path, "account_api: request");

        let response = self
            .client()
            .post(url)
            .header("X-Request-Id", request_id.to_string())
            .json(body)
            .send()
            .await
            .map_err(|err| {
                warn!(%request_id, %path, error = %err, "account_api: transport failure");
                sanitize_reqwest_error(err)
            })?;

        let status = response.status();
        let text = response.text().await.map_err(|err| {
            warn!(%request_id, %path, error = %err, "account_api: failed to read body");
            sanitize_reqwest_error(err)
        })?;

        decode_response(status, path, &text).inspect_err(|err| match err {
            AccountError::Api { code, message } => warn!(
                %request_id,
                %path,
                status = %status,
                api_code = %code,
                api_message = %message,
                "account_api: request failed"
            ),
            other => error!(
                %request_id,
                %path,
                status = %status,
                error = %other,
                "account_api: undecodable response"
            ),
        })
    }
}

/// Maps a response to the typed result. A non-2xx status or a nonzero
/// envelope `code` is an `Api` failure; without an envelope the HTTP status
/// stands in for the code.
fn decode_response<T>(status: StatusCode, path: &str, body: &str) -> AccountResult<T>
where
    T: DeserializeOwned,
{
    let envelope = serde_json::from_str::<ApiEnvelope>(body).ok();

    if !status.is_success() {
        return Err(match envelope {
            Some(envelope) => AccountError::Api {
                code: ApiErrorCode::from_code(envelope.code),
                message: envelope.message.unwrap_or_default(),
            },
            None => AccountError::Api {
                code: ApiErrorCode::from_code(i64::from(status.as_u16())),
                message: format!("http status {status}"),
            },
        });
    }

    if let Some(envelope) = envelope.filter(|envelope| envelope.code != 0) {
        return Err(AccountError::Api {
            code: ApiErrorCode::from_code(envelope.code),
            message: envelope.message.unwrap_or_default(),
        });
    }

    serde_json::from_str::<T>(body)
        .map_err(|err| AccountError::InvalidResponse(format!("{path}: {err}")))
}

fn sanitize_reqwest_error(error: reqwest::Error) -> AccountError {
    if error.is_timeout() {
        return AccountError::Transport("request timed out".to_string());
    }
    if error.is_connect() {
        return AccountError::Transport("connection failed".to_string());
    }
    AccountError::Transport("request failed".to_string())
}

#[async_trait]
impl AccountApi for HttpAccountApi {
    async fn sign_in_with_email(&self, email: &str, password: &str) -> AccountResult<SignIn> {
        self.post("signin-email", &CredentialsBody { email, password })
            .await
    }

    async fn sign_in_with_receipt(&self, receipt: &str) -> AccountResult<SignIn> {
        self.post("signin", &ReceiptBody { receipt }).await
    }

    async fn sign_up(&self, email: &str, password: &str) -> AccountResult<SignIn> {
        self.post("signup", &CredentialsBody { email, password }).await
    }

    async fn resend_confirmation_code(&self, email: &str) -> AccountResult<bool> {
        let envelope: ApiEnvelope = self
            .post("resend-confirmation-code", &EmailBody { email })
            .await?;
        Ok(envelope.code == 0)
    }

    async fn forgot_password(&self, email: &str) -> AccountResult<bool> {
        let envelope: ApiEnvelope = self.post("forgot-password", &EmailBody { email }).await?;
        Ok(envelope.code == 0)
    }

    async fn subscription_event(&self, receipt: &str) -> AccountResult<SubscriptionEvent> {
        self.post("subscription-event", &ReceiptBody { receipt })
            .await
    }

    async fn active_subscriptions(&self) -> AccountResult<Vec<Subscription>> {
        let rows: Vec<SubscriptionRow> = self.post("active-subscriptions", &json!({})).await?;
        Ok(rows.into_iter().map(Subscription::from).collect())
    }

    async fn get_key(&self) -> AccountResult<DeviceKey> {
        self.post("get-key", &json!({})).await
    }
}

impl SessionCookies for HttpAccountApi {
    fn clear_cookies(&self) {
        match Self::build_client(self.timeout) {
            Ok(fresh) => {
                *self.http.write().unwrap_or_else(PoisonError::into_inner) = fresh;
                debug!("account_api: session cookies cleared");
            }
            Err(err) => {
                error!(error = ?err, "account_api: failed to reset http session");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::value_objects::enums::plan_types::PlanType;

    #[test]
    fn error_status_prefers_envelope_code() {
        let err = decode_response::<SignIn>(
            StatusCode::BAD_REQUEST,
            "signin-email",
            r#"{"code":2,"message":"wrong password"}"#,
        )
        .unwrap_err();

        match err {
            AccountError::Api { code, message } => {
                assert_eq!(code, ApiErrorCode::IncorrectLogin);
                assert_eq!(message, "wrong password");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn error_status_without_envelope_uses_http_status() {
        let err = decode_response::<SignIn>(
            StatusCode::BAD_GATEWAY,
            "signin",
            "<html>bad gateway</html>",
        )
        .unwrap_err();
        assert_eq!(err.api_code(), Some(ApiErrorCode::Unknown(502)));

        let err = decode_response::<SignIn>(StatusCode::INTERNAL_SERVER_ERROR, "signin", "")
            .unwrap_err();
        assert_eq!(err.api_code(), Some(ApiErrorCode::ServerInternal));
    }

    #[test]
    fn nonzero_code_in_success_body_is_an_api_error() {
        let err = decode_response::<Vec<SubscriptionRow>>(
            StatusCode::OK,
            "active-subscriptions",
            r#"{"code":6,"message":"no active subscription"}"#,
        )
        .unwrap_err();
        assert_eq!(err.api_code(), Some(ApiErrorCode::NoActiveSubscription));
    }

    #[test]
    fn array_body_decodes_as_rows() {
        let rows = decode_response::<Vec<SubscriptionRow>>(
            StatusCode::OK,
            "active-subscriptions",
            r#"[{"planType":"proAnnual"},{"planType":"monthly","receiptId":"r-1"}]"#,
        )
        .unwrap();

        let plans: Vec<PlanType> = rows.iter().map(|row| row.plan_type).collect();
        assert_eq!(plans, vec![PlanType::ProAnnual, PlanType::Monthly]);
    }

    #[test]
    fn zero_code_decodes_the_payload() {
        let sign_in = decode_response::<SignIn>(
            StatusCode::OK,
            "signin",
            r#"{"code":0,"message":"ok"}"#,
        )
        .unwrap();
        assert_eq!(sign_in.code, 0);
        assert_eq!(sign_in.message.as_deref(), Some("ok"));
    }

    #[test]
    fn undecodable_success_body_is_invalid_response() {
        let err = decode_response::<DeviceKey>(StatusCode::OK, "get-key", r#"{"id":"key-1"}"#)
            .unwrap_err();

        match err {
            AccountError::InvalidResponse(detail) => assert!(detail.starts_with("get-key: ")),
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
