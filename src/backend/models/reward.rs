// src/backend/models/reward.rs
use crate::models::common::{
    assigned_to_includes, ChildId, PendingRewardId, RewardId, RewardKind, Timestamp,
};
use candid::CandidType;
use serde::{Deserialize, Serialize};

/// One reward in the family's shop. Donation-kind rewards require the
/// donations feature on the family's plan, enforced at creation/edit time
/// (never retroactively against already-created rewards).
#[derive(CandidType, Deserialize, Serialize, Clone, Debug, PartialEq, Eq)]
pub struct Reward {
    pub id: RewardId,
    pub name: String,
    pub points: u32,
    pub kind: RewardKind,
    pub assigned_to: Vec<ChildId>, // Empty = every child
}

impl Reward {
    pub fn is_assigned_to(&self, child_id: &str) -> bool {
        assigned_to_includes(&self.assigned_to, child_id)
    }
}

/// A reward a child has paid points for but the parent has not physically
/// handed over yet. Name and price are snapshots taken at redemption time so
/// later edits to the child or reward do not rewrite history. Removed
/// outright once marked as given; no history is retained.
#[derive(CandidType, Deserialize, Serialize, Clone, Debug, PartialEq, Eq)]
pub struct PendingReward {
    pub id: PendingRewardId,
    pub child_id: ChildId,
    pub child_name: String,
    pub reward_id: RewardId,
    pub reward_name: String,
    pub points: u32,
    pub redeemed_at: Timestamp,
}
