// src/backend/models/common.rs
use candid::{CandidType, Principal};
use serde::{Deserialize, Serialize};

// One family per registered parent account: the family id IS the parent's
// identity principal.
pub type FamilyId = Principal;
pub type PrincipalId = Principal;

// Item ids inside a family document are short random hex strings.
pub type ChildId = String;
pub type ChoreId = String;
pub type RewardId = String;
pub type PendingRewardId = String;
pub type OrderId = String;

pub type Timestamp = u64; // Nanoseconds since epoch
pub type Points = u64;

pub const NANOS_PER_SECOND: u64 = 1_000_000_000;

#[derive(CandidType, Deserialize, Serialize, Clone, Debug, PartialEq, Eq, Copy)]
pub enum ChoreStatus {
    Available, // Waiting for a child to pick it up
    Submitted, // Done, waiting for a parent's verdict
    Approved,  // Terminal; points credited exactly once
}

#[derive(CandidType, Deserialize, Serialize, Clone, Debug, PartialEq, Eq, Copy)]
pub enum RewardKind {
    Privilege,
    Experience,
    Donation, // Requires the donations feature on the family's plan
    Money,
}

#[derive(CandidType, Deserialize, Serialize, Clone, Debug, PartialEq, Eq, Copy, PartialOrd, Ord)]
pub enum PlanTier {
    Starter,
    Premium,
}

#[derive(CandidType, Deserialize, Serialize, Clone, Debug, PartialEq, Eq, Copy)]
pub enum FeatureKey {
    AiHelper,
    VirtualPet,
    Donations,
    Themes,
    FamilyGoalsManagement,
}

#[derive(CandidType, Deserialize, Serialize, Clone, Debug, PartialEq, Eq, Copy)]
pub enum SubscriptionStatus {
    Inactive,
    Active,
    PastDue,
    Canceled,
}

#[derive(CandidType, Deserialize, Serialize, Clone, Debug, PartialEq, Eq, Copy)]
pub enum BillingInterval {
    Monthly,
    Yearly,
}

/// Collections inside a family document that support delete-by-id.
#[derive(CandidType, Deserialize, Serialize, Clone, Debug, PartialEq, Eq, Copy)]
pub enum ItemCollection {
    Children,
    Chores,
    Rewards,
}

/// Empty `assigned_to` means the item is for every child in the family;
/// otherwise only the listed child ids. Chore availability and the reward
/// shop filter with this same rule.
pub fn assigned_to_includes(assigned_to: &[ChildId], child_id: &str) -> bool {
    assigned_to.is_empty() || assigned_to.iter().any(|id| id == child_id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_assignment_matches_every_child() {
        assert!(assigned_to_includes(&[], "c1"));
        assert!(assigned_to_includes(&[], "anyone"));
    }

    #[test]
    fn explicit_assignment_matches_only_listed_children() {
        let assigned = vec!["c1".to_string()];
        assert!(assigned_to_includes(&assigned, "c1"));
        assert!(!assigned_to_includes(&assigned, "c2"));
    }
}
