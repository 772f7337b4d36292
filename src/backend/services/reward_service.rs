// src/backend/services/reward_service.rs
use crate::error::FamilyError;
use crate::metrics;
use crate::models::common::{ChildId, FamilyId, FeatureKey, RewardKind, Timestamp};
use crate::models::family::Family;
use crate::models::gate;
use crate::models::notification::NotificationEvent;
use crate::models::reward::Reward;
use crate::services::family_service::with_family_mut;
use crate::services::notification_service;
use crate::storage::families;
use crate::utils::rng;

/// Creates a reward. Donation rewards are gated on the donations feature at
/// creation time; existing rewards are never re-checked retroactively.
pub fn add_reward(
    family_id: &FamilyId,
    name: String,
    points: u32,
    kind: RewardKind,
    assigned_to: Vec<ChildId>,
) -> Result<Family, FamilyError> {
    let reward_id = rng::generate_id();
    with_family_mut(family_id, |family| {
        if kind == RewardKind::Donation && !gate::has_feature(family, FeatureKey::Donations) {
            return Err(FamilyError::GateDenied(
                "Donation rewards are a Premium feature. Upgrade to create them.".to_string(),
            ));
        }
        family.add_reward(Reward {
            id: reward_id.clone(),
            name: name.clone(),
            points,
            kind,
            assigned_to: assigned_to.clone(),
        })?;
        Ok(family.clone())
    })
}

/// A child spends points on a reward from their device. The balance check
/// lives in the aggregate and is authoritative regardless of what the
/// client showed. The parent gets a heads-up mail, best effort.
pub fn redeem_reward(
    family_code: &str,
    reward_id: &str,
    child_id: &str,
    now: Timestamp,
) -> Result<(), FamilyError> {
    let family = families::get_family_by_code(family_code)
        .ok_or_else(|| FamilyError::FamilyNotFound(family_code.to_string()))?;

    let pending_id = rng::generate_id();
    let (parent_email, child_name, reward_name, points) =
        with_family_mut(&family.id, |family| {
            family.redeem_reward(reward_id, child_id, pending_id.clone(), now)?;
            let pending = &family.pending_rewards[&pending_id];
            Ok((
                family.email.clone(),
                pending.child_name.clone(),
                pending.reward_name.clone(),
                pending.points,
            ))
        })?;

    metrics::record_reward_redeemed(points);
    ic_cdk::println!(
        "INFO: Reward {} redeemed by child {} in family {} ({} points)",
        reward_id,
        child_id,
        family.id.to_text(),
        points
    );
    notification_service::send(NotificationEvent::reward_redeemed(
        parent_email,
        &child_name,
        &reward_name,
        points,
    ));
    Ok(())
}

/// Parent hands the reward over; the pending entry disappears and nothing
/// is credited or debited.
pub fn mark_reward_given(family_id: &FamilyId, pending_id: &str) -> Result<Family, FamilyError> {
    let family = with_family_mut(family_id, |family| {
        family.mark_reward_given(pending_id)?;
        Ok(family.clone())
    })?;
    ic_cdk::println!(
        "INFO: Pending reward {} marked as given in family {}",
        pending_id,
        family_id.to_text()
    );
    Ok(family)
}
