use serde::{Deserialize, Serialize};

#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub email: String,
    pub password: String,
    /// Email verified server-side.
    pub confirmed: bool,
}

impl Credentials {
    pub fn new(email: impl Into<String>, password: impl Into<String>, confirmed: bool) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
            confirmed,
        }
    }
}

// Keep passwords out of logs and panics.
impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &"[REDACTED]")
            .field("confirmed", &self.confirmed)
            .finish()
    }
}

/// Persisted form. The confirmed flag lives under its own key.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CredentialsBlob {
    pub email: String,
    pub password: String,
}

impl From<&Credentials> for CredentialsBlob {
    fn from(value: &Credentials) -> Self {
        Self {
            email: value.email.clone(),
            password: value.password.clone(),
        }
    }
}
