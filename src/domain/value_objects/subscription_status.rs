use serde::{Deserialize, Serialize};

use crate::domain::value_objects::enums::{
    api_error_codes::ApiErrorCode, plan_types::PlanType,
};

/// What the upgrade button should do.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum UpgradeAction {
    /// Current plan is already the top tier.
    Disabled,
    /// Exchange the current plan for one of `offers`.
    Upgrade { offers: Vec<PlanType> },
    /// No active plan; any supported plan may be bought.
    Purchase { offers: Vec<PlanType> },
    /// Resolution failed; offer the user a retry.
    Retry,
}

impl UpgradeAction {
    pub fn is_enabled(&self) -> bool {
        !matches!(self, UpgradeAction::Disabled)
    }

    pub fn offers(&self) -> &[PlanType] {
        match self {
            UpgradeAction::Upgrade { offers } | UpgradeAction::Purchase { offers } => offers,
            UpgradeAction::Disabled | UpgradeAction::Retry => &[],
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "kind", content = "code", rename_all = "snake_case")]
pub enum ResolveErrorKind {
    Transport,
    Api(ApiErrorCode),
    InvalidResponse,
}

/// Account exists but its email is not verified yet ("check your inbox").
/// Callers offer resend-confirmation and sign-out from here.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PendingConfirmation {
    pub email: String,
}

/// The only shape the UI layer sees.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SubscriptionStatus {
    pub is_signed_in: bool,
    pub is_confirmed: bool,
    pub active_plans: Vec<PlanType>,
    pub upgrade: UpgradeAction,
    pub error_kind: Option<ResolveErrorKind>,
    pub pending_confirmation: Option<PendingConfirmation>,
}

impl SubscriptionStatus {
    pub fn current_plan(&self) -> Option<PlanType> {
        self.active_plans.first().copied()
    }

    pub fn is_error(&self) -> bool {
        self.error_kind.is_some()
    }
}

impl UpgradeAction {
    /// Upgrade options for a list of active plans, first one being current.
    pub fn for_active_plans(active_plans: &[PlanType]) -> Self {
        match active_plans.first() {
            None => UpgradeAction::Purchase {
                offers: PlanType::supported(),
            },
            Some(current) if current.is_terminal() => UpgradeAction::Disabled,
            Some(current) => UpgradeAction::Upgrade {
                offers: current
                    .available_upgrades()
                    .unwrap_or_else(PlanType::supported),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_plans_offer_fresh_purchase() {
        let action = UpgradeAction::for_active_plans(&[]);
        assert_eq!(
            action,
            UpgradeAction::Purchase {
                offers: PlanType::supported()
            }
        );
        assert!(action.is_enabled());
    }

    #[test]
    fn top_tier_disables_upgrade() {
        let action = UpgradeAction::for_active_plans(&[PlanType::ProAnnual, PlanType::Monthly]);
        assert_eq!(action, UpgradeAction::Disabled);
        assert!(action.offers().is_empty());
    }

    #[test]
    fn first_plan_drives_offers() {
        let action = UpgradeAction::for_active_plans(&[PlanType::Annual, PlanType::ProAnnual]);
        assert_eq!(
            action.offers(),
            &[PlanType::ProMonthly, PlanType::ProAnnual]
        );
    }

    #[test]
    fn unsupported_current_plan_offers_everything() {
        let action = UpgradeAction::for_active_plans(&[PlanType::Unsupported]);
        assert_eq!(
            action,
            UpgradeAction::Upgrade {
                offers: PlanType::supported()
            }
        );
    }
}
