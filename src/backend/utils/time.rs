// src/backend/utils/time.rs
use crate::models::common::Timestamp;

/// Returns the current Internet Computer time as nanoseconds since epoch.
pub fn now_ns() -> Timestamp {
    ic_cdk::api::time()
}
