use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SignIn {
    pub code: i64,
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SubscriptionEvent {
    pub message: String,
}

/// VPN provisioning key issued for this device.
#[derive(Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DeviceKey {
    pub id: String,
    pub b64: String,
}

impl std::fmt::Debug for DeviceKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DeviceKey")
            .field("id", &self.id)
            .field("b64", &"[REDACTED]")
            .finish()
    }
}
