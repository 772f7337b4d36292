// src/backend/services/scheduler.rs
use crate::error::FamilyError;
use crate::metrics;
use crate::models::common::Timestamp;
use crate::storage::checkout;
use std::time::Duration;

const MAINTENANCE_INTERVAL_SECONDS: u64 = 60 * 60; // Hourly

/// Installs the recurring maintenance timer. Called from canister init and
/// post_upgrade.
pub fn start_maintenance_timer() {
    ic_cdk_timers::set_timer_interval(Duration::from_secs(MAINTENANCE_INTERVAL_SECONDS), || {
        let now = crate::utils::time::now_ns();
        if let Err(e) = run_maintenance(now) {
            ic_cdk::eprintln!("ERROR: Scheduled maintenance failed: {}", e);
        }
    });
}

/// Performs periodic maintenance. Also reachable through the guarded
/// `run_maintenance` endpoint for an external cron trigger.
pub fn run_maintenance(now: Timestamp) -> Result<(), FamilyError> {
    ic_cdk::println!("INFO: SCHEDULER: Starting maintenance at {}", now);

    let expired = checkout::expire_stale_sessions(now);
    if expired > 0 {
        ic_cdk::println!("INFO: SCHEDULER: Expired {} stale checkout sessions", expired);
    }

    metrics::record_maintenance_run(now);
    ic_cdk::println!("INFO: SCHEDULER: Maintenance completed.");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::checkout::{CheckoutSession, CheckoutState};
    use crate::models::common::{BillingInterval, PlanTier};
    use crate::storage::checkout::{store_checkout_session, with_checkout_session};
    use candid::Principal;

    #[test]
    fn maintenance_expires_overdue_sessions_and_stamps_metrics() {
        store_checkout_session(CheckoutSession {
            order_id: "order-stale".into(),
            family_id: Principal::anonymous(),
            plan: PlanTier::Premium,
            interval: BillingInterval::Monthly,
            amount_cents: 299,
            payment_url: "https://pay.example/order-stale".into(),
            state: CheckoutState::Issued,
            created_at: 0,
            expires_at: 10,
            confirmed_at: None,
            error_message: None,
        });

        run_maintenance(500).unwrap();

        let state = with_checkout_session("order-stale", |s| Ok(s.state)).unwrap();
        assert_eq!(state, CheckoutState::Expired);
        assert_eq!(
            crate::storage::metrics::get_metrics().maintenance_last_run,
            Some(500)
        );
    }
}
