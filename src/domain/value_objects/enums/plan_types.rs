use std::{convert::Infallible, fmt::Display, str::FromStr};

use serde::{Deserialize, Serialize};

/// Canonical subscription tier. Anything the server sends that is not one of
/// the six sellable tiers (legacy or free plans) decodes as `Unsupported`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "camelCase")]
pub enum PlanType {
    AdvancedMonthly,
    AdvancedYearly,
    Monthly,
    Annual,
    ProMonthly,
    ProAnnual,
    #[serde(other)]
    Unsupported,
}

impl PlanType {
    /// Sellable tiers, lowest to highest.
    pub const SUPPORTED: [PlanType; 6] = [
        PlanType::AdvancedMonthly,
        PlanType::AdvancedYearly,
        PlanType::Monthly,
        PlanType::Annual,
        PlanType::ProMonthly,
        PlanType::ProAnnual,
    ];

    pub fn supported() -> Vec<PlanType> {
        Self::SUPPORTED.to_vec()
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PlanType::AdvancedMonthly => "advancedMonthly",
            PlanType::AdvancedYearly => "advancedYearly",
            PlanType::Monthly => "monthly",
            PlanType::Annual => "annual",
            PlanType::ProMonthly => "proMonthly",
            PlanType::ProAnnual => "proAnnual",
            PlanType::Unsupported => "unsupported",
        }
    }
}

/// Lenient wire parsing: anything unknown is `Unsupported`.
impl FromStr for PlanType {
    type Err = Infallible;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let plan = match value {
            "advancedMonthly" => PlanType::AdvancedMonthly,
            "advancedYearly" => PlanType::AdvancedYearly,
            "monthly" => PlanType::Monthly,
            "annual" => PlanType::Annual,
            "proMonthly" => PlanType::ProMonthly,
            "proAnnual" => PlanType::ProAnnual,
            _ => PlanType::Unsupported,
        };
        Ok(plan)
    }
}

impl Display for PlanType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
