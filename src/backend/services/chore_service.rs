// src/backend/services/chore_service.rs
use crate::adapter::idea_adapter::{self, ChoreIdea};
use crate::error::FamilyError;
use crate::metrics;
use crate::models::common::{ChildId, FamilyId, FeatureKey, Timestamp};
use crate::models::family::Family;
use crate::models::gate;
use crate::models::notification::NotificationEvent;
use crate::services::family_service::with_family_mut;
use crate::services::notification_service;
use crate::storage::families;
use crate::utils::rng;

/// Creates a chore, bounded by the plan's monthly quota. The quota is
/// evaluated against the same snapshot the chore is added to.
pub fn add_chore(
    family_id: &FamilyId,
    name: String,
    points: u32,
    assigned_to: Vec<ChildId>,
    now: Timestamp,
) -> Result<Family, FamilyError> {
    let chore_id = rng::generate_id();
    with_family_mut(family_id, |family| {
        let gate = gate::can_add_chore(family, now);
        if !gate.allowed {
            return Err(FamilyError::GateDenied(
                gate.reason
                    .unwrap_or_else(|| "Monthly chore quota reached".to_string()),
            ));
        }
        family.add_chore(chore_id.clone(), name.clone(), points, assigned_to.clone(), now)?;
        Ok(family.clone())
    })
}

/// A child hands in a chore from their device (identified by family code).
/// The parent gets a heads-up mail, best effort.
pub fn submit_chore(
    family_code: &str,
    chore_id: &str,
    child_id: &str,
    emotion: String,
    photo_url: Option<String>,
    now: Timestamp,
) -> Result<(), FamilyError> {
    let family = families::get_family_by_code(family_code)
        .ok_or_else(|| FamilyError::FamilyNotFound(family_code.to_string()))?;

    let (parent_email, child_name, chore_name, points) =
        with_family_mut(&family.id, |family| {
            family.submit_chore(chore_id, child_id, emotion.clone(), photo_url.clone(), now)?;
            let child_name = family
                .child(child_id)
                .map(|c| c.name.clone())
                .unwrap_or_default();
            let chore = &family.chores[chore_id];
            Ok((
                family.email.clone(),
                child_name,
                chore.name.clone(),
                chore.points,
            ))
        })?;

    metrics::record_chore_submitted();
    ic_cdk::println!(
        "INFO: Chore {} submitted by child {} in family {}",
        chore_id,
        child_id,
        family.id.to_text()
    );
    notification_service::send(NotificationEvent::chore_submitted(
        parent_email,
        &child_name,
        &chore_name,
        points,
    ));
    Ok(())
}

/// Parent approves a submitted chore; the submitting child is credited.
pub fn approve_chore(family_id: &FamilyId, chore_id: &str) -> Result<Family, FamilyError> {
    let mut credited_points = 0;
    let family = with_family_mut(family_id, |family| {
        credited_points = family.approve_chore(chore_id)?;
        Ok(family.clone())
    })?;
    metrics::record_chore_approved(credited_points);
    ic_cdk::println!(
        "INFO: Chore {} approved in family {} ({} points credited)",
        chore_id,
        family_id.to_text(),
        credited_points
    );
    Ok(family)
}

/// Parent rejects a submitted chore; it goes back up for grabs.
pub fn reject_chore(family_id: &FamilyId, chore_id: &str) -> Result<Family, FamilyError> {
    let family = with_family_mut(family_id, |family| {
        family.reject_chore(chore_id)?;
        Ok(family.clone())
    })?;
    metrics::record_chore_rejected();
    ic_cdk::println!(
        "INFO: Chore {} rejected in family {}",
        chore_id,
        family_id.to_text()
    );
    Ok(family)
}

/// Fetches chore suggestions from the idea service. Premium-only; accepted
/// suggestions are created through `add_chore` and hit the same quota gate
/// as manually entered chores.
pub async fn suggest_chores(
    family_id: &FamilyId,
    keyword: &str,
) -> Result<Vec<ChoreIdea>, FamilyError> {
    let family = families::get_family(family_id)
        .ok_or_else(|| FamilyError::FamilyNotFound(family_id.to_text()))?;
    if !gate::has_feature(&family, FeatureKey::AiHelper) {
        return Err(FamilyError::GateDenied(
            "The chore idea helper is a Premium feature. Upgrade to use it.".to_string(),
        ));
    }
    idea_adapter::generate_chore_ideas(keyword).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::common::ChoreStatus;
    use crate::storage::families::{get_family, insert_family};
    use candid::Principal;

    // 2024-03-10T12:00:00Z.
    const NOW: Timestamp = 1_710_072_000 * 1_000_000_000;

    fn seed_family(id_byte: u8, code: &str) -> Family {
        let mut family = Family::new(
            Principal::from_slice(&[id_byte]),
            code.to_string(),
            "Bakker".into(),
            "Zwolle".into(),
            "ouders@bakker.example".into(),
            None,
            NOW,
        );
        family
            .add_child("c1".into(), "Noor".into(), "1234".into(), "fox".into())
            .unwrap();
        insert_family(&family).unwrap();
        family
    }

    #[test]
    fn quota_gate_blocks_then_premium_unblocks() {
        use crate::models::common::BillingInterval;
        use crate::models::subscription::SubscriptionInfo;

        crate::utils::rng::seed_rng([1u8; 32]);
        let family = seed_family(20, "BAK-001");

        for _ in 0..10 {
            add_chore(&family.id, "Chore".into(), 5, vec![], NOW).unwrap();
        }
        let err = add_chore(&family.id, "One too many".into(), 5, vec![], NOW).unwrap_err();
        assert!(matches!(err, FamilyError::GateDenied(_)));
        assert_eq!(get_family(&family.id).unwrap().chores.len(), 10);

        // After a premium upgrade the identical call goes through.
        with_family_mut(&family.id, |f| {
            f.subscription = Some(SubscriptionInfo::premium_activated(
                BillingInterval::Monthly,
                None,
                "order-1".into(),
                NOW,
            ));
            Ok(())
        })
        .unwrap();
        add_chore(&family.id, "One too many".into(), 5, vec![], NOW).unwrap();
        assert_eq!(get_family(&family.id).unwrap().chores.len(), 11);
    }

    #[test]
    fn approve_persists_the_credit() {
        crate::utils::rng::seed_rng([2u8; 32]);
        let family = seed_family(21, "BAK-002");
        add_chore(&family.id, "Dishes".into(), 25, vec![], NOW).unwrap();
        let chore_id = get_family(&family.id)
            .unwrap()
            .chores
            .keys()
            .next()
            .unwrap()
            .clone();

        with_family_mut(&family.id, |f| {
            f.submit_chore(&chore_id, "c1", "proud".into(), None, NOW)
        })
        .unwrap();
        approve_chore(&family.id, &chore_id).unwrap();

        let stored = get_family(&family.id).unwrap();
        assert_eq!(stored.chores[&chore_id].status, ChoreStatus::Approved);
        assert_eq!(stored.child("c1").unwrap().points, 25);
    }
}
