use std::fmt::Display;

use serde::{Deserialize, Serialize};

use crate::domain::value_objects::enums::plan_types::PlanType;

/// Opaque catalog key used by the platform store.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(transparent)]
pub struct ProductId(String);

impl ProductId {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Plan sold under this product id, if it is one of ours.
    pub fn plan_type(&self) -> Option<PlanType> {
        PRODUCT_TABLE
            .iter()
            .find(|(_, id)| *id == self.0)
            .map(|(plan, _)| *plan)
    }
}

impl Display for ProductId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// PlanType <-> ProductId. The only place product ids are spelled out.
const PRODUCT_TABLE: [(PlanType, &str); 6] = [
    (PlanType::AdvancedMonthly, "LockdowniOSFirewallMonthly"),
    (PlanType::AdvancedYearly, "LockdowniOSFirewallAnnual"),
    (PlanType::Monthly, "LockdowniOSVpnMonthly"),
    (PlanType::Annual, "LockdowniOSVpnAnnual"),
    (PlanType::ProMonthly, "LockdowniOSVpnMonthlyPro"),
    (PlanType::ProAnnual, "LockdowniOSVpnAnnualPro"),
];

/// Every product id the catalog is asked about.
pub fn all_product_ids() -> Vec<ProductId> {
    PRODUCT_TABLE
        .iter()
        .map(|(_, id)| ProductId::new(*id))
        .collect()
}

impl PlanType {
    pub fn product_id(&self) -> Option<ProductId> {
        PRODUCT_TABLE
            .iter()
            .find(|(plan, _)| plan == self)
            .map(|(_, id)| ProductId::new(*id))
    }

    /// Outgoing edges of the upgrade graph. `None` for plans outside the
    /// supported set, which can neither be upgraded from nor compared.
    pub fn available_upgrades(&self) -> Option<Vec<PlanType>> {
        let upgrades: &[PlanType] = match self {
            PlanType::AdvancedMonthly => &[
                PlanType::AdvancedYearly,
                PlanType::Monthly,
                PlanType::Annual,
                PlanType::ProMonthly,
                PlanType::ProAnnual,
            ],
            PlanType::AdvancedYearly => &[
                PlanType::Monthly,
                PlanType::Annual,
                PlanType::ProMonthly,
                PlanType::ProAnnual,
            ],
            PlanType::Monthly => &[PlanType::Annual, PlanType::ProMonthly, PlanType::ProAnnual],
            PlanType::Annual => &[PlanType::ProMonthly, PlanType::ProAnnual],
            PlanType::ProMonthly => &[PlanType::ProAnnual],
            PlanType::ProAnnual => &[],
            PlanType::Unsupported => return None,
        };
        Some(upgrades.to_vec())
    }

    /// Supported plans that must be greyed out when `self` is current.
    pub fn unavailable_to_upgrade(&self) -> Option<Vec<PlanType>> {
        let upgrades = self.available_upgrades()?;
        Some(
            PlanType::SUPPORTED
                .into_iter()
                .filter(|plan| plan != self && !upgrades.contains(plan))
                .collect(),
        )
    }

    pub fn can_upgrade(&self, to: PlanType) -> bool {
        self.available_upgrades()
            .is_some_and(|upgrades| upgrades.contains(&to))
    }

    /// No outgoing edges: nothing left to upgrade to.
    pub fn is_terminal(&self) -> bool {
        self.available_upgrades()
            .is_some_and(|upgrades| upgrades.is_empty())
    }
}
