// src/backend/models/family.rs
use crate::error::FamilyError;
use crate::models::child::Child;
use crate::models::chore::Chore;
use crate::models::common::{
    ChildId, ChoreId, ChoreStatus, FamilyId, ItemCollection, PendingRewardId, RewardId, Timestamp,
};
use crate::models::reward::{PendingReward, Reward};
use crate::models::subscription::SubscriptionInfo;
use candid::CandidType;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Root aggregate: everything the app knows about one family lives in this
/// single document, keyed by the parent's identity principal. Entities are
/// kept in id-keyed maps so an update touches one entry instead of rewriting
/// a whole array; a read of the document is still one consistent snapshot.
///
/// Every operation below is a pure transition: it either mutates `self` and
/// returns `Ok`, or returns an error leaving `self` untouched. Time is always
/// passed in by the caller. Plan gates are the caller's responsibility and
/// are checked before these transitions run; the transitions themselves only
/// enforce ledger invariants (balance, state machine).
#[derive(CandidType, Deserialize, Serialize, Clone, Debug, PartialEq, Eq)]
pub struct Family {
    pub id: FamilyId,
    pub family_code: String, // Unique, human-shareable; child devices join with it
    pub family_name: String,
    pub city: String,
    pub email: String,
    pub recovery_email: Option<String>,
    pub created_at: Timestamp,
    pub children: BTreeMap<ChildId, Child>,
    pub chores: BTreeMap<ChoreId, Chore>,
    pub rewards: BTreeMap<RewardId, Reward>,
    pub pending_rewards: BTreeMap<PendingRewardId, PendingReward>,
    pub subscription: Option<SubscriptionInfo>,
    /// Optimistic-concurrency revision, bumped by the storage layer on every
    /// successful commit.
    pub version: u64,
}

impl Family {
    pub fn new(
        id: FamilyId,
        family_code: String,
        family_name: String,
        city: String,
        email: String,
        recovery_email: Option<String>,
        now: Timestamp,
    ) -> Self {
        Family {
            id,
            family_code,
            family_name,
            city,
            email,
            recovery_email,
            created_at: now,
            children: BTreeMap::new(),
            chores: BTreeMap::new(),
            rewards: BTreeMap::new(),
            pending_rewards: BTreeMap::new(),
            subscription: Some(SubscriptionInfo::starter()),
            version: 0,
        }
    }

    // --- Creation ---

    /// Appends a new child with a zeroed ledger. The PIN format is validated
    /// at the API boundary and stored verbatim here.
    pub fn add_child(
        &mut self,
        id: ChildId,
        name: String,
        pin: String,
        avatar: String,
    ) -> Result<(), FamilyError> {
        if self.children.contains_key(&id) {
            return Err(FamilyError::InternalError(format!(
                "duplicate child id {id}"
            )));
        }
        self.children.insert(id.clone(), Child::new(id, name, pin, avatar));
        Ok(())
    }

    pub fn add_chore(
        &mut self,
        id: ChoreId,
        name: String,
        points: u32,
        assigned_to: Vec<ChildId>,
        now: Timestamp,
    ) -> Result<(), FamilyError> {
        if self.chores.contains_key(&id) {
            return Err(FamilyError::InternalError(format!(
                "duplicate chore id {id}"
            )));
        }
        self.chores
            .insert(id.clone(), Chore::new(id, name, points, assigned_to, now));
        Ok(())
    }

    pub fn add_reward(&mut self, reward: Reward) -> Result<(), FamilyError> {
        if self.rewards.contains_key(&reward.id) {
            return Err(FamilyError::InternalError(format!(
                "duplicate reward id {}",
                reward.id
            )));
        }
        self.rewards.insert(reward.id.clone(), reward);
        Ok(())
    }

    // --- Chore lifecycle: Available -> Submitted -> Approved, with
    // --- Submitted -> Available on rejection. Approved is terminal.

    /// A child hands in a chore with how it made them feel and an optional
    /// proof photo. Re-submitting overwrites the previous submission fields;
    /// an already-approved chore cannot be handed in again.
    pub fn submit_chore(
        &mut self,
        chore_id: &str,
        child_id: &str,
        emotion: String,
        photo_url: Option<String>,
        now: Timestamp,
    ) -> Result<(), FamilyError> {
        if !self.children.contains_key(child_id) {
            return Err(FamilyError::not_found("child", child_id));
        }
        let chore = self
            .chores
            .get_mut(chore_id)
            .ok_or_else(|| FamilyError::not_found("chore", chore_id))?;
        if chore.status == ChoreStatus::Approved {
            return Err(FamilyError::InvalidState(format!(
                "chore {chore_id} is already approved"
            )));
        }
        chore.record_submission(child_id.to_string(), emotion, photo_url, now);
        Ok(())
    }

    /// Parent approves a submitted chore: the chore becomes terminal and the
    /// submitting child is credited exactly once, both balance and lifetime
    /// counter. If the submitter has since been deleted the approval fails
    /// with no state change rather than crediting the wrong ledger.
    pub fn approve_chore(&mut self, chore_id: &str) -> Result<u32, FamilyError> {
        let (points, submitter) = {
            let chore = self
                .chores
                .get(chore_id)
                .ok_or_else(|| FamilyError::not_found("chore", chore_id))?;
            if chore.status != ChoreStatus::Submitted {
                return Err(FamilyError::InvalidState(format!(
                    "chore {chore_id} is not awaiting approval"
                )));
            }
            let submitter = chore
                .submitted_by
                .clone()
                .ok_or_else(|| FamilyError::InvalidState(format!(
                    "chore {chore_id} has no submitter recorded"
                )))?;
            (chore.points, submitter)
        };

        // Both effects or neither: resolve the child before mutating anything.
        let child = match self.children.get_mut(&submitter) {
            Some(child) => child,
            None => return Err(FamilyError::not_found("child", submitter)),
        };
        child.credit(points as u64);
        if let Some(chore) = self.chores.get_mut(chore_id) {
            chore.status = ChoreStatus::Approved;
        }
        Ok(points)
    }

    /// Parent rejects a submitted chore: back to Available with the
    /// submission fields cleared. Points are untouched.
    pub fn reject_chore(&mut self, chore_id: &str) -> Result<(), FamilyError> {
        let chore = self
            .chores
            .get_mut(chore_id)
            .ok_or_else(|| FamilyError::not_found("chore", chore_id))?;
        if chore.status != ChoreStatus::Submitted {
            return Err(FamilyError::InvalidState(format!(
                "chore {chore_id} is not awaiting approval"
            )));
        }
        chore.clear_submission();
        Ok(())
    }

    // --- Reward redemption ---

    /// A child buys a reward from the shop. The balance check here is the
    /// core ledger invariant (points never go negative) and is enforced
    /// server-side regardless of what the client already verified. On
    /// success the balance is debited and a pending reward snapshot is
    /// appended, atomically.
    pub fn redeem_reward(
        &mut self,
        reward_id: &str,
        child_id: &str,
        pending_id: PendingRewardId,
        now: Timestamp,
    ) -> Result<(), FamilyError> {
        let reward = self
            .rewards
            .get(reward_id)
            .ok_or_else(|| FamilyError::not_found("reward", reward_id))?
            .clone();
        let child = self
            .children
            .get_mut(child_id)
            .ok_or_else(|| FamilyError::not_found("child", child_id))?;

        child.debit(reward.points as u64)?;

        let pending = PendingReward {
            id: pending_id.clone(),
            child_id: child.id.clone(),
            child_name: child.name.clone(),
            reward_id: reward.id.clone(),
            reward_name: reward.name.clone(),
            points: reward.points,
            redeemed_at: now,
        };
        self.pending_rewards.insert(pending_id, pending);
        Ok(())
    }

    /// Parent hands the reward over. The pending entry is removed and
    /// nothing else changes; no re-credit, no re-debit, no history.
    pub fn mark_reward_given(&mut self, pending_id: &str) -> Result<(), FamilyError> {
        self.pending_rewards
            .remove(pending_id)
            .map(|_| ())
            .ok_or_else(|| FamilyError::not_found("pending reward", pending_id))
    }

    // --- Deletion ---

    /// Removes one item by id. Deleting a child does not cascade: chores,
    /// rewards and pending rewards that reference the removed child stay in
    /// place with a dangling reference.
    pub fn remove_item(
        &mut self,
        collection: ItemCollection,
        item_id: &str,
    ) -> Result<(), FamilyError> {
        let removed = match collection {
            ItemCollection::Children => self.children.remove(item_id).is_some(),
            ItemCollection::Chores => self.chores.remove(item_id).is_some(),
            ItemCollection::Rewards => self.rewards.remove(item_id).is_some(),
        };
        if removed {
            Ok(())
        } else {
            Err(FamilyError::not_found("item", item_id))
        }
    }

    // --- Views ---

    pub fn child(&self, child_id: &str) -> Option<&Child> {
        self.children.get(child_id)
    }

    /// Chores a child can pick up right now: available and assigned to them
    /// (empty assignment = everyone).
    pub fn available_chores_for(&self, child_id: &str) -> Vec<&Chore> {
        self.chores
            .values()
            .filter(|c| c.status == ChoreStatus::Available && c.is_assigned_to(child_id))
            .collect()
    }

    /// The reward shop as one child sees it; same assignment rule as chores.
    pub fn rewards_for(&self, child_id: &str) -> Vec<&Reward> {
        self.rewards
            .values()
            .filter(|r| r.is_assigned_to(child_id))
            .collect()
    }
}
