// src/backend/storage/checkout.rs
use crate::error::FamilyError;
use crate::models::checkout::CheckoutSession;
use crate::models::common::{OrderId, Timestamp};
use std::cell::RefCell;
use std::collections::HashMap;

// In-memory store for in-flight checkout sessions. Cleared on upgrade; an
// interrupted checkout is simply restarted by the parent.
thread_local! {
    static CHECKOUT_SESSIONS: RefCell<HashMap<OrderId, CheckoutSession>> = RefCell::new(HashMap::new());
}

/// Stores (or replaces) a checkout session keyed by its gateway order id.
pub fn store_checkout_session(session: CheckoutSession) {
    CHECKOUT_SESSIONS.with(|map| {
        map.borrow_mut().insert(session.order_id.clone(), session);
    });
}

/// Runs `f` against an immutable view of a checkout session.
pub fn with_checkout_session<F, R>(order_id: &str, f: F) -> Result<R, FamilyError>
where
    F: FnOnce(&CheckoutSession) -> Result<R, FamilyError>,
{
    CHECKOUT_SESSIONS.with(|map| {
        let borrowed = map.borrow();
        let session = borrowed
            .get(order_id)
            .ok_or_else(|| FamilyError::PaymentError(format!("Unknown order {order_id}")))?;
        f(session)
    })
}

/// Runs `f` against a mutable checkout session.
pub fn with_checkout_session_mut<F, R>(order_id: &str, f: F) -> Result<R, FamilyError>
where
    F: FnOnce(&mut CheckoutSession) -> Result<R, FamilyError>,
{
    CHECKOUT_SESSIONS.with(|map| {
        let mut borrowed = map.borrow_mut();
        let session = borrowed
            .get_mut(order_id)
            .ok_or_else(|| FamilyError::PaymentError(format!("Unknown order {order_id}")))?;
        f(session)
    })
}

/// Marks every issued session past its deadline as expired; returns how many
/// were swept. Called from the maintenance timer.
pub fn expire_stale_sessions(now: Timestamp) -> u32 {
    use crate::models::checkout::CheckoutState;
    CHECKOUT_SESSIONS.with(|map| {
        let mut expired = 0;
        for session in map.borrow_mut().values_mut() {
            if session.is_expired(now) {
                session.state = CheckoutState::Expired;
                session.error_message = Some("Session expired before confirmation".to_string());
                expired += 1;
            }
        }
        expired
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::checkout::CheckoutState;
    use crate::models::common::{BillingInterval, PlanTier};
    use candid::Principal;

    fn session(order_id: &str, expires_at: Timestamp) -> CheckoutSession {
        CheckoutSession {
            order_id: order_id.into(),
            family_id: Principal::anonymous(),
            plan: PlanTier::Premium,
            interval: BillingInterval::Monthly,
            amount_cents: 299,
            payment_url: format!("https://pay.example/{order_id}"),
            state: CheckoutState::Issued,
            created_at: 0,
            expires_at,
            confirmed_at: None,
            error_message: None,
        }
    }

    #[test]
    fn unknown_order_is_a_payment_error() {
        let err = with_checkout_session("missing", |s| Ok(s.state)).unwrap_err();
        assert!(matches!(err, FamilyError::PaymentError(_)));
    }

    #[test]
    fn stale_sweep_only_touches_overdue_issued_sessions() {
        store_checkout_session(session("o-fresh", 1_000));
        store_checkout_session(session("o-stale", 10));
        let mut confirmed = session("o-done", 10);
        confirmed.state = CheckoutState::Confirmed;
        store_checkout_session(confirmed);

        assert_eq!(expire_stale_sessions(500), 1);
        let stale = with_checkout_session("o-stale", |s| Ok(s.state)).unwrap();
        assert_eq!(stale, CheckoutState::Expired);
        let fresh = with_checkout_session("o-fresh", |s| Ok(s.state)).unwrap();
        assert_eq!(fresh, CheckoutState::Issued);
        let done = with_checkout_session("o-done", |s| Ok(s.state)).unwrap();
        assert_eq!(done, CheckoutState::Confirmed);
    }
}
