use std::sync::Arc;

use anyhow::{Context, Result};
use serde_json::Value;
use tracing::{error, info};

use crate::domain::repositories::{device_keys::DeviceKeySink, key_value_store::KeyValueStore};

pub const VPN_KEY_ID_KEY: &str = "VPNKeyId";
pub const VPN_KEY_BASE64_KEY: &str = "VPNKeyBase64";

/// Hands provisioned keys to the VPN configuration by persisting them in the
/// shared key-value store.
pub struct KeyValueDeviceKeySink<K>
where
    K: KeyValueStore + 'static,
{
    store: Arc<K>,
}

impl<K> KeyValueDeviceKeySink<K>
where
    K: KeyValueStore + 'static,
{
    pub fn new(store: Arc<K>) -> Self {
        Self { store }
    }
}

impl<K> DeviceKeySink for KeyValueDeviceKeySink<K>
where
    K: KeyValueStore + 'static,
{
    fn set_vpn_credentials(&self, id: &str, key_base64: &str) -> Result<()> {
        let previous_key = self.store.get(VPN_KEY_BASE64_KEY);

        self.store
            .set(VPN_KEY_BASE64_KEY, Value::String(key_base64.to_string()))
            .context("failed to store vpn key")?;

        if let Err(err) = self
            .store
            .set(VPN_KEY_ID_KEY, Value::String(id.to_string()))
        {
            // Key and id must stay a pair; put the old key back.
            let restored = match previous_key {
                Some(previous) => self.store.set(VPN_KEY_BASE64_KEY, previous),
                None => self.store.remove(VPN_KEY_BASE64_KEY),
            };
            if let Err(restore_err) = restored {
                error!(error = ?restore_err, "vpn: failed to restore previous device key");
            }
            return Err(err.context("failed to store vpn key id"));
        }

        info!(key_id = %id, "vpn: device key stored");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::storage::memory_store::MemoryStore;

    #[test]
    fn stores_key_and_id() {
        let store = Arc::new(MemoryStore::new());
        let sink = KeyValueDeviceKeySink::new(Arc::clone(&store));

        sink.set_vpn_credentials("key-1", "dnBuLWtleS1tYXRlcmlhbA==")
            .unwrap();

        assert_eq!(store.get_string(VPN_KEY_ID_KEY).as_deref(), Some("key-1"));
        assert_eq!(
            store.get_string(VPN_KEY_BASE64_KEY).as_deref(),
            Some("dnBuLWtleS1tYXRlcmlhbA==")
        );
    }

    /// Memory store that refuses writes to one key.
    struct RejectingStore {
        inner: MemoryStore,
        rejected_key: &'static str,
    }

    impl KeyValueStore for RejectingStore {
        fn get(&self, key: &str) -> Option<Value> {
            self.inner.get(key)
        }

        fn set(&self, key: &str, value: Value) -> Result<()> {
            if key == self.rejected_key {
                anyhow::bail!("write to {key} rejected");
            }
            self.inner.set(key, value)
        }

        fn remove(&self, key: &str) -> Result<()> {
            self.inner.remove(key)
        }
    }

    #[test]
    fn failed_id_write_keeps_previous_pair() {
        let inner = MemoryStore::new();
        inner
            .set(VPN_KEY_ID_KEY, Value::String("old-id".to_string()))
            .unwrap();
        inner
            .set(VPN_KEY_BASE64_KEY, Value::String("b2xk".to_string()))
            .unwrap();
        let store = Arc::new(RejectingStore {
            inner,
            rejected_key: VPN_KEY_ID_KEY,
        });
        let sink = KeyValueDeviceKeySink::new(Arc::clone(&store));

        assert!(sink.set_vpn_credentials("new-id", "bmV3").is_err());

        assert_eq!(store.get_string(VPN_KEY_ID_KEY).as_deref(), Some("old-id"));
        assert_eq!(store.get_string(VPN_KEY_BASE64_KEY).as_deref(), Some("b2xk"));
    }

    #[test]
    fn failed_first_provisioning_leaves_no_key() {
        let store = Arc::new(RejectingStore {
            inner: MemoryStore::new(),
            rejected_key: VPN_KEY_ID_KEY,
        });
        let sink = KeyValueDeviceKeySink::new(Arc::clone(&store));

        assert!(sink.set_vpn_credentials("key-1", "bmV3").is_err());
        assert_eq!(store.get(VPN_KEY_BASE64_KEY), None);
    }
}
