// src/backend/models/checkout.rs
use crate::models::common::{BillingInterval, FamilyId, OrderId, PlanTier, Timestamp};
use candid::CandidType;
use serde::{Deserialize, Serialize};

#[derive(CandidType, Deserialize, Serialize, Clone, Debug, PartialEq, Eq, Copy)]
pub enum CheckoutState {
    Issued,    // Order created at the gateway, waiting for the parent to pay
    Confirmed, // Gateway reported the payment as completed; plan upgraded
    Failed,    // Gateway reported a definitive failure
    Expired,   // Session timed out before confirmation
}

/// One premium checkout attempt, kept in memory while it is in flight. The
/// family document is only touched once the gateway explicitly confirms the
/// order; everything before that lives here.
#[derive(CandidType, Deserialize, Serialize, Clone, Debug)]
pub struct CheckoutSession {
    pub order_id: OrderId,
    pub family_id: FamilyId,
    pub plan: PlanTier,
    pub interval: BillingInterval,
    pub amount_cents: u64,
    pub payment_url: String,
    pub state: CheckoutState,
    pub created_at: Timestamp,
    pub expires_at: Timestamp,
    pub confirmed_at: Option<Timestamp>,
    pub error_message: Option<String>,
}

impl CheckoutSession {
    /// An issued session past its deadline that can no longer confirm.
    pub fn is_expired(&self, now: Timestamp) -> bool {
        self.state == CheckoutState::Issued && now > self.expires_at
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use candid::Principal;

    fn session(state: CheckoutState) -> CheckoutSession {
        CheckoutSession {
            order_id: "order-1".into(),
            family_id: Principal::anonymous(),
            plan: PlanTier::Premium,
            interval: BillingInterval::Monthly,
            amount_cents: 299,
            payment_url: "https://pay.example/order-1".into(),
            state,
            created_at: 100,
            expires_at: 200,
            confirmed_at: None,
            error_message: None,
        }
    }

    #[test]
    fn only_issued_sessions_expire() {
        assert!(session(CheckoutState::Issued).is_expired(201));
        assert!(!session(CheckoutState::Issued).is_expired(200));
        assert!(!session(CheckoutState::Confirmed).is_expired(500));
        assert!(!session(CheckoutState::Failed).is_expired(500));
    }
}
