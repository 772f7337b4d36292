// src/backend/models/subscription.rs
use crate::models::common::{
    BillingInterval, OrderId, PlanTier, SubscriptionStatus, Timestamp, NANOS_PER_SECOND,
};
use candid::CandidType;
use serde::{Deserialize, Serialize};

const DAYS_PER_MONTH: u64 = 30;
const DAYS_PER_YEAR: u64 = 365;
const SECONDS_PER_DAY: u64 = 24 * 60 * 60;

/// Billing state of one family. Owned by the family document and mutated
/// only by the checkout confirmation flow.
#[derive(CandidType, Deserialize, Serialize, Clone, Debug, PartialEq, Eq)]
pub struct SubscriptionInfo {
    pub plan: PlanTier,
    pub status: SubscriptionStatus,
    pub interval: Option<BillingInterval>,
    pub renewal_date: Option<Timestamp>,
    pub last_payment_at: Option<Timestamp>,
    pub order_id: Option<OrderId>,
}

impl SubscriptionInfo {
    /// The subscription every family starts on: the free tier, active.
    pub fn starter() -> Self {
        SubscriptionInfo {
            plan: PlanTier::Starter,
            status: SubscriptionStatus::Active,
            interval: None,
            renewal_date: None,
            last_payment_at: None,
            order_id: None,
        }
    }

    /// The subscription after a gateway-confirmed premium payment. When the
    /// gateway did not report a renewal date, one is computed from the
    /// billing interval.
    pub fn premium_activated(
        interval: BillingInterval,
        gateway_renewal_date: Option<Timestamp>,
        order_id: OrderId,
        now: Timestamp,
    ) -> Self {
        let renewal_date =
            gateway_renewal_date.unwrap_or_else(|| now.saturating_add(interval_nanos(interval)));
        SubscriptionInfo {
            plan: PlanTier::Premium,
            status: SubscriptionStatus::Active,
            interval: Some(interval),
            renewal_date: Some(renewal_date),
            last_payment_at: Some(now),
            order_id: Some(order_id),
        }
    }
}

fn interval_nanos(interval: BillingInterval) -> u64 {
    let days = match interval {
        BillingInterval::Monthly => DAYS_PER_MONTH,
        BillingInterval::Yearly => DAYS_PER_YEAR,
    };
    days * SECONDS_PER_DAY * NANOS_PER_SECOND
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starter_subscription_has_no_billing_bookkeeping() {
        let sub = SubscriptionInfo::starter();
        assert_eq!(sub.plan, PlanTier::Starter);
        assert_eq!(sub.status, SubscriptionStatus::Active);
        assert!(sub.interval.is_none());
        assert!(sub.order_id.is_none());
    }

    #[test]
    fn activation_prefers_gateway_renewal_date() {
        let sub = SubscriptionInfo::premium_activated(
            BillingInterval::Monthly,
            Some(42),
            "order-1".to_string(),
            1_000,
        );
        assert_eq!(sub.renewal_date, Some(42));
        assert_eq!(sub.last_payment_at, Some(1_000));
        assert_eq!(sub.order_id.as_deref(), Some("order-1"));
    }

    #[test]
    fn activation_computes_renewal_from_interval_when_gateway_is_silent() {
        let now = 1_000;
        let monthly =
            SubscriptionInfo::premium_activated(BillingInterval::Monthly, None, "o".into(), now);
        let yearly =
            SubscriptionInfo::premium_activated(BillingInterval::Yearly, None, "o".into(), now);
        assert_eq!(
            monthly.renewal_date,
            Some(now + DAYS_PER_MONTH * SECONDS_PER_DAY * NANOS_PER_SECOND)
        );
        assert_eq!(
            yearly.renewal_date,
            Some(now + DAYS_PER_YEAR * SECONDS_PER_DAY * NANOS_PER_SECOND)
        );
    }
}
