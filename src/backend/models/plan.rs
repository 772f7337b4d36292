// src/backend/models/plan.rs
use crate::models::common::{BillingInterval, FeatureKey, PlanTier};
use crate::models::subscription::SubscriptionInfo;
use candid::CandidType;
use serde::{Deserialize, Serialize};

/// Catalog entry for one plan tier. `None` limits mean unbounded.
#[derive(CandidType, Deserialize, Serialize, Clone, Debug, PartialEq, Eq)]
pub struct PlanDefinition {
    pub tier: PlanTier,
    pub max_children: Option<u32>,
    pub monthly_chore_quota: Option<u32>,
    pub features: Vec<FeatureKey>,
    pub price_monthly_cents: Option<u64>,
    pub price_yearly_cents: Option<u64>,
}

const STARTER_MAX_CHILDREN: u32 = 2;
const STARTER_MONTHLY_CHORE_QUOTA: u32 = 10;
const PREMIUM_PRICE_MONTHLY_CENTS: u64 = 299;
const PREMIUM_PRICE_YEARLY_CENTS: u64 = 2_499;

const PREMIUM_FEATURES: [FeatureKey; 5] = [
    FeatureKey::AiHelper,
    FeatureKey::VirtualPet,
    FeatureKey::Donations,
    FeatureKey::Themes,
    FeatureKey::FamilyGoalsManagement,
];

/// Static catalog lookup. Total: every tier has a definition.
pub fn plan_definition(tier: PlanTier) -> PlanDefinition {
    match tier {
        PlanTier::Starter => PlanDefinition {
            tier: PlanTier::Starter,
            max_children: Some(STARTER_MAX_CHILDREN),
            monthly_chore_quota: Some(STARTER_MONTHLY_CHORE_QUOTA),
            features: Vec::new(),
            price_monthly_cents: None, // Free tier
            price_yearly_cents: None,
        },
        PlanTier::Premium => PlanDefinition {
            tier: PlanTier::Premium,
            max_children: None,
            monthly_chore_quota: None,
            features: PREMIUM_FEATURES.to_vec(),
            price_monthly_cents: Some(PREMIUM_PRICE_MONTHLY_CENTS),
            price_yearly_cents: Some(PREMIUM_PRICE_YEARLY_CENTS),
        },
    }
}

/// Resolves the tier that governs gating. Families without any recorded
/// subscription fall back to Starter; this default guards every downstream
/// gate, so it must hold for missing data too.
pub fn active_plan(subscription: Option<&SubscriptionInfo>) -> PlanTier {
    subscription.map(|s| s.plan).unwrap_or(PlanTier::Starter)
}

/// Price of a tier for a billing interval, if the tier is purchasable at all.
pub fn price_for_interval(tier: PlanTier, interval: BillingInterval) -> Option<u64> {
    let definition = plan_definition(tier);
    match interval {
        BillingInterval::Monthly => definition.price_monthly_cents,
        BillingInterval::Yearly => definition.price_yearly_cents,
    }
}

/// Whether the active plan of `subscription` includes `feature`.
pub fn has_feature(subscription: Option<&SubscriptionInfo>, feature: FeatureKey) -> bool {
    plan_definition(active_plan(subscription))
        .features
        .contains(&feature)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::common::SubscriptionStatus;

    fn premium_subscription() -> SubscriptionInfo {
        SubscriptionInfo {
            plan: PlanTier::Premium,
            status: SubscriptionStatus::Active,
            interval: Some(BillingInterval::Monthly),
            renewal_date: None,
            last_payment_at: None,
            order_id: None,
        }
    }

    #[test]
    fn missing_subscription_resolves_to_starter() {
        assert_eq!(active_plan(None), PlanTier::Starter);
    }

    #[test]
    fn recorded_plan_wins() {
        let sub = premium_subscription();
        assert_eq!(active_plan(Some(&sub)), PlanTier::Premium);
    }

    #[test]
    fn starter_has_no_premium_features() {
        assert!(!has_feature(None, FeatureKey::Donations));
        assert!(!has_feature(None, FeatureKey::AiHelper));
    }

    #[test]
    fn premium_has_every_feature() {
        let sub = premium_subscription();
        for feature in PREMIUM_FEATURES {
            assert!(has_feature(Some(&sub), feature));
        }
    }

    #[test]
    fn starter_is_not_purchasable() {
        assert_eq!(price_for_interval(PlanTier::Starter, BillingInterval::Monthly), None);
        assert_eq!(price_for_interval(PlanTier::Starter, BillingInterval::Yearly), None);
    }

    #[test]
    fn premium_prices_per_interval() {
        assert_eq!(
            price_for_interval(PlanTier::Premium, BillingInterval::Monthly),
            Some(PREMIUM_PRICE_MONTHLY_CENTS)
        );
        assert_eq!(
            price_for_interval(PlanTier::Premium, BillingInterval::Yearly),
            Some(PREMIUM_PRICE_YEARLY_CENTS)
        );
    }

    #[test]
    fn starter_limits_are_finite_premium_unbounded() {
        let starter = plan_definition(PlanTier::Starter);
        assert_eq!(starter.max_children, Some(STARTER_MAX_CHILDREN));
        assert_eq!(starter.monthly_chore_quota, Some(STARTER_MONTHLY_CHORE_QUOTA));

        let premium = plan_definition(PlanTier::Premium);
        assert_eq!(premium.max_children, None);
        assert_eq!(premium.monthly_chore_quota, None);
    }
}
