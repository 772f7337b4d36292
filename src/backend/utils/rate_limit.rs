// src/backend/utils/rate_limit.rs
use crate::error::FamilyError;
use crate::models::common::Timestamp;
use candid::Principal;
use std::cell::RefCell;
use std::collections::HashMap;

// Token bucket per caller. Sized for a family poking at the app, not an
// API integration: short bursts are fine, sustained hammering is not.
const RATE_LIMIT_CAPACITY: u32 = 20;
const RATE_LIMIT_REFILL_RATE_PER_SEC: f64 = 1.0;

struct TokenBucket {
    tokens: f64,
    last_refill_time_ns: Timestamp,
}

impl TokenBucket {
    fn new(now_ns: Timestamp) -> Self {
        TokenBucket {
            tokens: RATE_LIMIT_CAPACITY as f64,
            last_refill_time_ns: now_ns,
        }
    }

    fn refill(&mut self, now_ns: Timestamp) {
        let elapsed_secs =
            (now_ns.saturating_sub(self.last_refill_time_ns)) as f64 / 1_000_000_000.0;
        let tokens_to_add = elapsed_secs * RATE_LIMIT_REFILL_RATE_PER_SEC;
        self.tokens = (self.tokens + tokens_to_add).min(RATE_LIMIT_CAPACITY as f64);
        self.last_refill_time_ns = now_ns;
    }

    fn take(&mut self, now_ns: Timestamp) -> bool {
        self.refill(now_ns);
        if self.tokens >= 1.0 {
            self.tokens -= 1.0;
            true
        } else {
            false
        }
    }
}

thread_local! {
    // In-memory map for rate limiting. Cleared on upgrade.
    static PRINCIPAL_BUCKETS: RefCell<HashMap<Principal, TokenBucket>> = RefCell::new(HashMap::new());
}

/// Takes one token from `principal`'s bucket at time `now_ns`.
pub fn check_rate(principal: Principal, now_ns: Timestamp) -> Result<(), FamilyError> {
    PRINCIPAL_BUCKETS.with(|buckets_refcell| {
        let mut buckets = buckets_refcell.borrow_mut();
        let bucket = buckets
            .entry(principal)
            .or_insert_with(|| TokenBucket::new(now_ns));
        if bucket.take(now_ns) {
            Ok(())
        } else {
            Err(FamilyError::RateLimitExceeded(format!(
                "Too many requests from {principal}. Please try again later."
            )))
        }
    })
}

/// Guard function for rate limiting canister calls.
pub fn rate_guard() -> Result<(), String> {
    check_rate(ic_cdk::caller(), ic_cdk::api::time()).map_err(|e| e.to_string())
}
