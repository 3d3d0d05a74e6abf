//! Subscription plans and the feature gates / monthly limits they unlock.

use serde::{Deserialize, Serialize};

const UPGRADE_PROMPT: &str = "Upgrade to Premium for auto-send and unlimited applications";
pub const UPGRADE_URL: &str = "/upgrade";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Plan {
    #[default]
    Free,
    Starter,
    Pro,
    Premium,
}

impl Plan {
    /// Parses the `subscriptions.plan` column. Unknown values are treated as free.
    pub fn from_db(value: &str) -> Plan {
        match value.trim().to_ascii_lowercase().as_str() {
            "starter" => Plan::Starter,
            "pro" => Plan::Pro,
            "premium" => Plan::Premium,
            _ => Plan::Free,
        }
    }

    /// Pro and Premium unlock every gated feature.
    pub fn is_premium_tier(self) -> bool {
        matches!(self, Plan::Pro | Plan::Premium)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FeatureGates {
    pub auto_send: bool,
    pub unlimited_applications: bool,
    pub advanced_analytics: bool,
    pub priority_support: bool,
    pub custom_templates: bool,
}

/// Monthly quotas. `None` (serialized as null) means unlimited.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanLimits {
    pub applications_per_month: Option<u32>,
    pub ai_refactors_per_month: Option<u32>,
    pub cover_letters_per_month: Option<u32>,
}

/// Gates embedded in the workflow report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MonetizationGates {
    pub plan: Plan,
    pub gates: FeatureGates,
    pub upgrade_prompt: Option<&'static str>,
}

/// Full plan description served by `GET /monetization-gates/:userId`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanOverview {
    pub plan: Plan,
    pub features: FeatureGates,
    pub limits: PlanLimits,
    pub upgrade_url: &'static str,
}

pub fn feature_gates(plan: Plan) -> FeatureGates {
    let premium = plan.is_premium_tier();
    FeatureGates {
        auto_send: premium,
        unlimited_applications: premium,
        advanced_analytics: premium,
        priority_support: premium,
        custom_templates: premium,
    }
}

pub fn plan_limits(plan: Plan) -> PlanLimits {
    match plan {
        Plan::Free => PlanLimits {
            applications_per_month: Some(5),
            ai_refactors_per_month: Some(3),
            cover_letters_per_month: Some(3),
        },
        Plan::Starter => PlanLimits {
            applications_per_month: Some(25),
            ai_refactors_per_month: Some(10),
            cover_letters_per_month: Some(10),
        },
        Plan::Pro | Plan::Premium => PlanLimits {
            applications_per_month: None,
            ai_refactors_per_month: None,
            cover_letters_per_month: None,
        },
    }
}

pub fn monetization_gates(plan: Plan) -> MonetizationGates {
    MonetizationGates {
        plan,
        gates: feature_gates(plan),
        upgrade_prompt: (plan == Plan::Free).then_some(UPGRADE_PROMPT),
    }
}

pub fn plan_overview(plan: Plan) -> PlanOverview {
    PlanOverview {
        plan,
        features: feature_gates(plan),
        limits: plan_limits(plan),
        upgrade_url: UPGRADE_URL,
    }
}
