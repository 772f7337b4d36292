// src/backend/services/payment_service.rs
use crate::adapter::psp_adapter::{self, CreateOrderRequest, OrderStatus, OrderStatusResponse};
use crate::error::FamilyError;
use crate::metrics;
use crate::models::checkout::{CheckoutSession, CheckoutState};
use crate::models::common::{BillingInterval, FamilyId, PlanTier, Timestamp, NANOS_PER_SECOND};
use crate::models::plan;
use crate::models::subscription::SubscriptionInfo;
use crate::services::family_service::with_family_mut;
use crate::storage::checkout::{store_checkout_session, with_checkout_session_mut};
use crate::storage::families;
use candid::CandidType;
use serde::Deserialize;

const CHECKOUT_SESSION_TIMEOUT_SECONDS: u64 = 30 * 60; // 30 minutes

/// What a confirmation attempt concluded. Pending is a normal, non-fatal
/// answer: the parent simply has not finished paying yet.
#[derive(CandidType, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct ConfirmCheckoutResponse {
    pub state: CheckoutState,
    pub message: String,
}

/// Starts a premium checkout: prices the requested interval, creates the
/// order at the gateway and records the in-flight session. The family
/// document is not touched until the gateway confirms.
pub async fn start_checkout(
    family_id: FamilyId,
    interval: BillingInterval,
    now: Timestamp,
) -> Result<CheckoutSession, FamilyError> {
    let family = families::get_family(&family_id)
        .ok_or_else(|| FamilyError::FamilyNotFound(family_id.to_text()))?;

    // Price check comes before any gateway traffic: unpriced tiers (the
    // free one) cannot start a checkout at all.
    let amount_cents = plan::price_for_interval(PlanTier::Premium, interval).ok_or_else(|| {
        FamilyError::PaymentError(format!("No price configured for {interval:?} billing"))
    })?;

    let order = psp_adapter::create_order(CreateOrderRequest {
        family_id: family_id.to_text(),
        email: family.email.clone(),
        plan: PlanTier::Premium,
        interval,
        amount_cents,
    })
    .await?;

    let session = CheckoutSession {
        order_id: order.order_id.clone(),
        family_id,
        plan: PlanTier::Premium,
        interval,
        amount_cents,
        payment_url: order.payment_url,
        state: CheckoutState::Issued,
        created_at: now,
        expires_at: now + CHECKOUT_SESSION_TIMEOUT_SECONDS * NANOS_PER_SECOND,
        confirmed_at: None,
        error_message: None,
    };
    store_checkout_session(session.clone());
    metrics::record_checkout_started();

    ic_cdk::println!(
        "INFO: Checkout {} started for family {} ({:?}, {} cents). Pay at {}",
        session.order_id,
        family_id.to_text(),
        interval,
        amount_cents,
        session.payment_url
    );
    Ok(session)
}

/// Confirms a checkout against the gateway. Repeated calls are cheap and
/// safe; each one reports the current state instead of blocking until the
/// gateway makes up its mind.
pub async fn confirm_checkout(
    family_id: FamilyId,
    order_id: &str,
    now: Timestamp,
) -> Result<ConfirmCheckoutResponse, FamilyError> {
    // 1. Session checks before any gateway traffic.
    let precheck = with_checkout_session_mut(order_id, |session| {
        if session.family_id != family_id {
            return Err(FamilyError::NotAuthorized(
                "Order belongs to a different family".to_string(),
            ));
        }
        match session.state {
            CheckoutState::Confirmed => Ok(Some(ConfirmCheckoutResponse {
                state: CheckoutState::Confirmed,
                message: "Payment already confirmed.".to_string(),
            })),
            CheckoutState::Failed => Err(FamilyError::PaymentError(
                session
                    .error_message
                    .clone()
                    .unwrap_or_else(|| "Payment failed".to_string()),
            )),
            CheckoutState::Expired => Err(FamilyError::PaymentError(
                "Checkout session has expired.".to_string(),
            )),
            CheckoutState::Issued => {
                if session.is_expired(now) {
                    session.state = CheckoutState::Expired;
                    session.error_message =
                        Some("Session expired before confirmation".to_string());
                    Err(FamilyError::PaymentError(
                        "Checkout session has expired.".to_string(),
                    ))
                } else {
                    Ok(None)
                }
            }
        }
    })?;
    if let Some(already_done) = precheck {
        return Ok(already_done);
    }

    // 2. Ask the gateway.
    let status = psp_adapter::order_status(order_id).await?;

    // 3. Apply whatever it said.
    apply_order_status(family_id, order_id, status, now)
}

/// Applies a gateway status report to the session and, only for an explicit
/// `Completed`, to the family's subscription. Everything else leaves the
/// family untouched.
fn apply_order_status(
    family_id: FamilyId,
    order_id: &str,
    status: OrderStatusResponse,
    now: Timestamp,
) -> Result<ConfirmCheckoutResponse, FamilyError> {
    match status.status {
        OrderStatus::Completed => {
            let session_interval =
                with_checkout_session_mut(order_id, |session| Ok(session.interval))?;
            let interval = status.interval.unwrap_or(session_interval);

            with_family_mut(&family_id, |family| {
                family.subscription = Some(SubscriptionInfo::premium_activated(
                    interval,
                    status.renewal_date,
                    order_id.to_string(),
                    now,
                ));
                Ok(())
            })?;

            with_checkout_session_mut(order_id, |session| {
                session.state = CheckoutState::Confirmed;
                session.confirmed_at = Some(now);
                session.error_message = None;
                Ok(())
            })?;

            metrics::record_premium_activated();
            ic_cdk::println!(
                "INFO: Payment confirmed for order {}; family {} is now Premium ({:?})",
                order_id,
                family_id.to_text(),
                interval
            );
            Ok(ConfirmCheckoutResponse {
                state: CheckoutState::Confirmed,
                message: "Payment confirmed. Welcome to Premium!".to_string(),
            })
        }
        OrderStatus::Pending => Ok(ConfirmCheckoutResponse {
            state: CheckoutState::Issued,
            message: "Payment not completed yet. Try again in a moment.".to_string(),
        }),
        OrderStatus::Failed => {
            with_checkout_session_mut(order_id, |session| {
                session.state = CheckoutState::Failed;
                session.error_message = Some("Gateway reported the payment as failed".to_string());
                Ok(())
            })?;
            ic_cdk::println!("WARNING: Payment failed for order {}", order_id);
            Ok(ConfirmCheckoutResponse {
                state: CheckoutState::Failed,
                message: "Payment failed. No changes were made to your plan.".to_string(),
            })
        }
        OrderStatus::Expired => {
            with_checkout_session_mut(order_id, |session| {
                session.state = CheckoutState::Expired;
                session.error_message = Some("Gateway reported the order as expired".to_string());
                Ok(())
            })?;
            Ok(ConfirmCheckoutResponse {
                state: CheckoutState::Expired,
                message: "The checkout expired. Start a new one to upgrade.".to_string(),
            })
        }
    }
}
