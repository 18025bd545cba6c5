use anyhow::Result;

/// VPN configuration subsystem that receives provisioned keys.
#[cfg_attr(test, mockall::automock)]
pub trait DeviceKeySink: Send + Sync {
    fn set_vpn_credentials(&self, id: &str, key_base64: &str) -> Result<()>;
}
