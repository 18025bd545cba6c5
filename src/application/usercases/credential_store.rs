use std::sync::{Arc, Mutex, PoisonError};

use serde_json::Value;
use tracing::{debug, error, info, warn};

use crate::domain::{
    entities::credentials::{Credentials, CredentialsBlob},
    repositories::{key_value_store::KeyValueStore, session_cookies::SessionCookies},
};

pub const CREDENTIALS_KEY: &str = "APICredentials";
pub const CREDENTIALS_CONFIRMED_KEY: &str = "APICredentialsConfirmed";

/// Owns the account credentials and their confirmed flag. Never fails:
/// storage errors are logged and reads degrade to "absent".
pub struct CredentialStore<K, C>
where
    K: KeyValueStore + 'static,
    C: SessionCookies + 'static,
{
    store: Arc<K>,
    cookies: Arc<C>,
    write_lock: Mutex<()>,
}

impl<K, C> CredentialStore<K, C>
where
    K: KeyValueStore + 'static,
    C: SessionCookies + 'static,
{
    pub fn new(store: Arc<K>, cookies: Arc<C>) -> Self {
        Self {
            store,
            cookies,
            write_lock: Mutex::new(()),
        }
    }

    pub fn get(&self) -> Option<Credentials> {
        let raw = self.store.get(CREDENTIALS_KEY)?;
        let blob = match serde_json::from_value::<CredentialsBlob>(raw) {
            Ok(blob) => blob,
            Err(err) => {
                warn!(error = %err, "credential_store: stored credentials unreadable");
                return None;
            }
        };

        Some(Credentials {
            email: blob.email,
            password: blob.password,
            confirmed: self.is_confirmed(),
        })
    }

    pub fn is_confirmed(&self) -> bool {
        self.store
            .get_bool(CREDENTIALS_CONFIRMED_KEY)
            .unwrap_or(false)
    }

    pub fn set(&self, credentials: &Credentials) {
        let _guard = self.write_lock.lock().unwrap_or_else(PoisonError::into_inner);

        let blob = match serde_json::to_value(CredentialsBlob::from(credentials)) {
            Ok(blob) => blob,
            Err(err) => {
                error!(error = %err, "credential_store: failed to encode credentials");
                return;
            }
        };

        if let Err(err) = self.store.set(CREDENTIALS_KEY, blob) {
            error!(error = ?err, "credential_store: failed to persist credentials");
            return;
        }
        self.write_confirmed(credentials.confirmed);

        info!(
            email = %credentials.email,
            confirmed = credentials.confirmed,
            "credential_store: credentials saved"
        );
    }

    pub fn set_confirmed(&self, confirmed: bool) {
        let _guard = self.write_lock.lock().unwrap_or_else(PoisonError::into_inner);
        self.write_confirmed(confirmed);
        debug!(confirmed, "credential_store: confirmed flag updated");
    }

    /// Sign-out: forget credentials and confirmation, then drop the HTTP session.
    pub fn clear(&self) {
        {
            let _guard = self.write_lock.lock().unwrap_or_else(PoisonError::into_inner);
            if let Err(err) = self.store.remove(CREDENTIALS_KEY) {
                error!(error = ?err, "credential_store: failed to remove credentials");
            }
            if let Err(err) = self.store.remove(CREDENTIALS_CONFIRMED_KEY) {
                error!(error = ?err, "credential_store: failed to remove confirmed flag");
            }
        }

        self.cookies.clear_cookies();
        info!("credential_store: credentials cleared");
    }

    fn write_confirmed(&self, confirmed: bool) {
        if let Err(err) = self
            .store
            .set(CREDENTIALS_CONFIRMED_KEY, Value::Bool(confirmed))
        {
            error!(error = ?err, "credential_store: failed to persist confirmed flag");
        }
    }
}
