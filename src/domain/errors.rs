use thiserror::Error;

use crate::domain::value_objects::enums::api_error_codes::ApiErrorCode;

/// Failures of the remote account API, surfaced raw to callers.
#[derive(Debug, Error)]
pub enum AccountError {
    #[error("network error: {0}")]
    Transport(String),
    #[error("api error {code}: {message}")]
    Api { code: ApiErrorCode, message: String },
    #[error("invalid response: {0}")]
    InvalidResponse(String),
    #[error("device key could not be stored: {0}")]
    DeviceKeyStorage(String),
}

impl AccountError {
    pub fn api(code: ApiErrorCode) -> Self {
        AccountError::Api {
            code,
            message: String::new(),
        }
    }

    pub fn api_code(&self) -> Option<ApiErrorCode> {
        match self {
            AccountError::Api { code, .. } => Some(*code),
            _ => None,
        }
    }
}

pub type AccountResult<T> = std::result::Result<T, AccountError>;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("purchase cancelled by user")]
    Cancelled,
    #[error("store unavailable: {0}")]
    Unavailable(String),
    #[error("store request failed: {0}")]
    Failed(String),
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FormatError {
    #[error("unsupported price locale: {0}")]
    UnsupportedLocale(String),
    #[error("price locale {0} names no currency")]
    MissingCurrency(String),
    #[error("unsupported currency: {0}")]
    UnsupportedCurrency(String),
    #[error("price out of range: {0}")]
    OutOfRange(String),
}
