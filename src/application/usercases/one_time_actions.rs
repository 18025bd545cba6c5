use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, error};

use crate::domain::{
    repositories::key_value_store::KeyValueStore,
    value_objects::enums::one_time_flags::OneTimeFlag,
};

/// Persisted "has seen" flags for popups and notifications shown once per install.
pub struct OneTimeActions<K>
where
    K: KeyValueStore + 'static,
{
    store: Arc<K>,
}

impl<K> OneTimeActions<K>
where
    K: KeyValueStore + 'static,
{
    pub fn new(store: Arc<K>) -> Self {
        Self { store }
    }

    pub fn has_seen(&self, flag: OneTimeFlag) -> bool {
        self.store.get_bool(flag.key()).unwrap_or(false)
    }

    pub fn mark_as_seen(&self, flag: OneTimeFlag) {
        if let Err(err) = self.store.set(flag.key(), Value::Bool(true)) {
            error!(flag = flag.key(), error = ?err, "one_time_actions: failed to persist flag");
        }
    }

    /// Runs `action` unless `flag` was already seen. Returns whether it ran.
    pub fn perform_once<F>(&self, flag: OneTimeFlag, action: F) -> bool
    where
        F: FnOnce(),
    {
        if self.has_seen(flag) {
            debug!(flag = flag.key(), "one_time_actions: already seen");
            return false;
        }

        action();
        self.mark_as_seen(flag);
        true
    }
}
