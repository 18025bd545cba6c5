use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::value_objects::enums::{
    plan_types::PlanType, subscription_sources::SubscriptionSource,
};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Subscription {
    pub plan_type: PlanType,
    pub source: SubscriptionSource,
    pub active_until: Option<DateTime<Utc>>,
}

/// Raw record returned by `active-subscriptions`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscriptionRow {
    pub plan_type: PlanType,
    #[serde(default)]
    pub receipt_id: Option<String>,
    #[serde(default)]
    pub expiration_date: Option<DateTime<Utc>>,
}

impl From<SubscriptionRow> for Subscription {
    fn from(value: SubscriptionRow) -> Self {
        let source = match value.receipt_id {
            Some(_) => SubscriptionSource::Receipt,
            None => SubscriptionSource::Account,
        };

        Self {
            plan_type: value.plan_type,
            source,
            active_until: value.expiration_date,
        }
    }
}
