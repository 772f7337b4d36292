// src/backend/metrics.rs
use crate::storage::metrics::update_metrics;
use candid::CandidType;
use ic_stable_structures::{storable::Bound, Storable};
use serde::{Deserialize, Serialize};
use std::borrow::Cow;

/// Operational counters for the whole canister, kept in one stable cell and
/// exposed to the admin dashboard.
#[derive(CandidType, Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
pub struct AppMetrics {
    pub total_families: u64,
    pub total_children: u64,
    pub chores_submitted_total: u64,
    pub chores_approved_total: u64,
    pub chores_rejected_total: u64,
    pub points_awarded_total: u64,
    pub points_redeemed_total: u64,
    pub rewards_redeemed_total: u64,
    pub premium_activations_total: u64,
    pub checkout_sessions_total: u64,
    pub maintenance_last_run: Option<u64>,
}

impl Storable for AppMetrics {
    fn to_bytes(&self) -> Cow<[u8]> {
        let mut writer = Vec::new();
        ciborium::into_writer(&self, &mut writer).expect("Failed to serialize AppMetrics");
        Cow::Owned(writer)
    }

    fn from_bytes(bytes: Cow<[u8]>) -> Self {
        ciborium::from_reader(bytes.as_ref()).unwrap_or_default()
    }

    const BOUND: Bound = Bound::Unbounded;
}

pub fn record_family_registered() {
    update_metrics(|m| m.total_families = m.total_families.saturating_add(1));
}

pub fn record_family_removed() {
    update_metrics(|m| m.total_families = m.total_families.saturating_sub(1));
}

pub fn record_child_added() {
    update_metrics(|m| m.total_children = m.total_children.saturating_add(1));
}

pub fn record_child_removed() {
    update_metrics(|m| m.total_children = m.total_children.saturating_sub(1));
}

pub fn record_chore_submitted() {
    update_metrics(|m| m.chores_submitted_total = m.chores_submitted_total.saturating_add(1));
}

pub fn record_chore_approved(points: u32) {
    update_metrics(|m| {
        m.chores_approved_total = m.chores_approved_total.saturating_add(1);
        m.points_awarded_total = m.points_awarded_total.saturating_add(points as u64);
    });
}

pub fn record_chore_rejected() {
    update_metrics(|m| m.chores_rejected_total = m.chores_rejected_total.saturating_add(1));
}

pub fn record_reward_redeemed(points: u32) {
    update_metrics(|m| {
        m.rewards_redeemed_total = m.rewards_redeemed_total.saturating_add(1);
        m.points_redeemed_total = m.points_redeemed_total.saturating_add(points as u64);
    });
}

pub fn record_checkout_started() {
    update_metrics(|m| m.checkout_sessions_total = m.checkout_sessions_total.saturating_add(1));
}

pub fn record_premium_activated() {
    update_metrics(|m| m.premium_activations_total = m.premium_activations_total.saturating_add(1));
}

pub fn record_maintenance_run(now: u64) {
    update_metrics(|m| m.maintenance_last_run = Some(now));
}
