use std::fmt::Display;

use serde::{Deserialize, Serialize};

#[derive(Default, Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SubscriptionSource {
    /// Backed by a platform receipt attached to this device.
    Receipt,
    #[default]
    Account,
}

impl Display for SubscriptionSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let source = match self {
            SubscriptionSource::Receipt => "receipt",
            SubscriptionSource::Account => "account",
        };
        write!(f, "{}", source)
    }
}
