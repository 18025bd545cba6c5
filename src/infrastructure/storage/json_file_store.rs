use std::{
    collections::BTreeMap,
    fs,
    path::{Path, PathBuf},
    sync::{PoisonError, RwLock},
};

use anyhow::{Context, Result};
use serde_json::Value;
use tracing::{debug, info};

use crate::domain::repositories::key_value_store::KeyValueStore;

/// Key-value store persisted as one JSON object on disk. Every write
/// rewrites the file through a temporary sibling and a rename.
pub struct JsonFileStore {
    path: PathBuf,
    values: RwLock<BTreeMap<String, Value>>,
}

impl JsonFileStore {
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();

        let values = if path.exists() {
            let raw = fs::read_to_string(&path)
                .with_context(|| format!("failed to read state file {}", path.display()))?;
            if raw.trim().is_empty() {
                BTreeMap::new()
            } else {
                serde_json::from_str(&raw)
                    .with_context(|| format!("state file {} is not a JSON object", path.display()))?
            }
        } else {
            BTreeMap::new()
        };

        info!(
            path = %path.display(),
            key_count = values.len(),
            "json_file_store: opened"
        );

        Ok(Self {
            path,
            values: RwLock::new(values),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn persist(&self, values: &BTreeMap<String, Value>) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }

        let tmp_path = self.path.with_extension("json.tmp");
        let body = serde_json::to_vec_pretty(values).context("failed to encode state")?;
        fs::write(&tmp_path, body)
            .with_context(|| format!("failed to write {}", tmp_path.display()))?;
        fs::rename(&tmp_path, &self.path)
            .with_context(|| format!("failed to replace {}", self.path.display()))?;

        debug!(path = %self.path.display(), "json_file_store: persisted");
        Ok(())
    }
}

impl KeyValueStore for JsonFileStore {
    fn get(&self, key: &str) -> Option<Value> {
        self.values
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned()
    }

    fn set(&self, key: &str, value: Value) -> Result<()> {
        let mut values = self.values.write().unwrap_or_else(PoisonError::into_inner);
        let mut next = values.clone();
        next.insert(key.to_string(), value);
        self.persist(&next)?;
        *values = next;
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        let mut values = self.values.write().unwrap_or_else(PoisonError::into_inner);
        if !values.contains_key(key) {
            return Ok(());
        }
        let mut next = values.clone();
        next.remove(key);
        self.persist(&next)?;
        *values = next;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use uuid::Uuid;

    fn temp_state_path() -> PathBuf {
        std::env::temp_dir()
            .join(format!("account-core-{}", Uuid::new_v4()))
            .join("state.json")
    }

    #[test]
    fn values_survive_reopen() {
        let path = temp_state_path();

        let store = JsonFileStore::open(&path).unwrap();
        store.set("APICredentialsConfirmed", json!(true)).unwrap();
        store.set("LockdowniOSVpnAnnualPrice", json!("$59.99")).unwrap();
        drop(store);

        let reopened = JsonFileStore::open(&path).unwrap();
        assert_eq!(reopened.get_bool("APICredentialsConfirmed"), Some(true));
        assert_eq!(
            reopened.get_string("LockdowniOSVpnAnnualPrice").as_deref(),
            Some("$59.99")
        );

        reopened.remove("APICredentialsConfirmed").unwrap();
        let reopened = JsonFileStore::open(&path).unwrap();
        assert_eq!(reopened.get("APICredentialsConfirmed"), None);

        let _ = fs::remove_dir_all(path.parent().unwrap());
    }

    #[test]
    fn failed_write_is_not_visible() {
        let path = temp_state_path();
        let store = JsonFileStore::open(&path).unwrap();
        store.set("APICredentialsConfirmed", json!(true)).unwrap();

        // Turn the state directory into a regular file so the next write fails.
        let dir = path.parent().unwrap().to_path_buf();
        fs::remove_dir_all(&dir).unwrap();
        fs::write(&dir, "blocker").unwrap();

        assert!(store.set("APICredentials", json!({"email": "a@example.com"})).is_err());
        assert_eq!(store.get("APICredentials"), None);

        assert!(store.remove("APICredentialsConfirmed").is_err());
        assert_eq!(store.get_bool("APICredentialsConfirmed"), Some(true));

        let _ = fs::remove_file(&dir);
    }

    #[test]
    fn corrupt_file_is_reported() {
        let path = temp_state_path();
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, "not json").unwrap();

        assert!(JsonFileStore::open(&path).is_err());

        let _ = fs::remove_dir_all(path.parent().unwrap());
    }
}
