use std::fmt::Display;

use serde::{Deserialize, Serialize};

/// Semantic failure codes reported by the account API.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(from = "i64", into = "i64")]
pub enum ApiErrorCode {
    NoError,
    UserNotConfirmed,
    IncorrectLogin,
    EmailNotAllowed,
    NoActiveSubscription,
    NoSubscriptionInReceipt,
    SandboxReceiptNotAllowed,
    UserAlreadyExists,
    ServerInternal,
    Unknown(i64),
}

impl ApiErrorCode {
    pub fn code(&self) -> i64 {
        match self {
            ApiErrorCode::NoError => 0,
            ApiErrorCode::UserNotConfirmed => 1,
            ApiErrorCode::IncorrectLogin => 2,
            ApiErrorCode::EmailNotAllowed => 3,
            ApiErrorCode::NoActiveSubscription => 6,
            ApiErrorCode::NoSubscriptionInReceipt => 9,
            ApiErrorCode::SandboxReceiptNotAllowed => 21,
            ApiErrorCode::UserAlreadyExists => 40,
            ApiErrorCode::ServerInternal => 500,
            ApiErrorCode::Unknown(code) => *code,
        }
    }

    pub fn from_code(code: i64) -> Self {
        match code {
            0 => ApiErrorCode::NoError,
            1 => ApiErrorCode::UserNotConfirmed,
            2 => ApiErrorCode::IncorrectLogin,
            3 => ApiErrorCode::EmailNotAllowed,
            6 => ApiErrorCode::NoActiveSubscription,
            9 => ApiErrorCode::NoSubscriptionInReceipt,
            21 => ApiErrorCode::SandboxReceiptNotAllowed,
            40 => ApiErrorCode::UserAlreadyExists,
            500 => ApiErrorCode::ServerInternal,
            other => ApiErrorCode::Unknown(other),
        }
    }
}

impl From<i64> for ApiErrorCode {
    fn from(value: i64) -> Self {
        ApiErrorCode::from_code(value)
    }
}

impl From<ApiErrorCode> for i64 {
    fn from(value: ApiErrorCode) -> Self {
        value.code()
    }
}

impl Display for ApiErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ApiErrorCode::NoError => "no_error",
            ApiErrorCode::UserNotConfirmed => "user_not_confirmed",
            ApiErrorCode::IncorrectLogin => "incorrect_login",
            ApiErrorCode::EmailNotAllowed => "email_not_allowed",
            ApiErrorCode::NoActiveSubscription => "no_active_subscription",
            ApiErrorCode::NoSubscriptionInReceipt => "no_subscription_in_receipt",
            ApiErrorCode::SandboxReceiptNotAllowed => "sandbox_receipt_not_allowed",
            ApiErrorCode::UserAlreadyExists => "user_already_exists",
            ApiErrorCode::ServerInternal => "server_internal",
            ApiErrorCode::Unknown(code) => return write!(f, "unknown({code})"),
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_codes_keep_their_value() {
        let code = ApiErrorCode::from_code(777);
        assert_eq!(code, ApiErrorCode::Unknown(777));
        assert_eq!(code.code(), 777);
        assert_eq!(code.to_string(), "unknown(777)");
    }

    #[test]
    fn decodes_from_wire_integer() {
        let code: ApiErrorCode = serde_json::from_str("9").unwrap();
        assert_eq!(code, ApiErrorCode::NoSubscriptionInReceipt);
        assert_eq!(serde_json::to_string(&ApiErrorCode::SandboxReceiptNotAllowed).unwrap(), "21");
    }
}
