use std::fmt::Display;

use serde::{Deserialize, Serialize};

/// Which phrasing of a product price the caller wants.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum PriceContext {
    /// First purchase ("then $59.99 per year").
    New,
    /// Switching from another plan ("$59.99/year (~$5.00/month)").
    Upgrade,
}

impl PriceContext {
    /// Suffix appended to the product id to form the storage key.
    pub fn key_suffix(&self) -> &'static str {
        match self {
            PriceContext::New => "Price",
            PriceContext::Upgrade => "UpgradePrice",
        }
    }
}

impl Display for PriceContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PriceContext::New => f.write_str("new"),
            PriceContext::Upgrade => f.write_str("upgrade"),
        }
    }
}
