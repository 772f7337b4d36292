// src/backend/services/family_service.rs
use crate::error::FamilyError;
use crate::metrics;
use crate::models::common::{FamilyId, ItemCollection, Timestamp};
use crate::models::family::Family;
use crate::models::gate;
use crate::models::notification::NotificationEvent;
use crate::services::notification_service;
use crate::storage::families;
use crate::utils::rng;

// A conflict means another writer slipped in between our read and commit;
// the whole read-modify-write is repeated against the fresh snapshot.
const COMMIT_ATTEMPTS: u32 = 3;
const FAMILY_CODE_ATTEMPTS: u32 = 16;

/// Runs one read-modify-write cycle against the authoritative family record
/// with optimistic concurrency: read snapshot, apply `op`, commit with a
/// version compare-and-swap, retry on conflict. `op` must be free of side
/// effects outside the family value, since it may run more than once.
pub fn with_family_mut<R>(
    family_id: &FamilyId,
    mut op: impl FnMut(&mut Family) -> Result<R, FamilyError>,
) -> Result<R, FamilyError> {
    for attempt in 0..COMMIT_ATTEMPTS {
        let mut family = families::get_family(family_id)
            .ok_or_else(|| FamilyError::FamilyNotFound(family_id.to_text()))?;
        let result = op(&mut family)?;
        match families::commit_family(&family) {
            Ok(_) => return Ok(result),
            Err(FamilyError::VersionConflict) => {
                ic_cdk::println!(
                    "WARNING: Version conflict committing family {} (attempt {})",
                    family_id.to_text(),
                    attempt + 1
                );
            }
            Err(e) => return Err(e),
        }
    }
    Err(FamilyError::VersionConflict)
}

/// Creates the family document for a newly registered parent account and
/// sends the welcome mail. One family per identity principal.
pub fn register_family(
    caller: FamilyId,
    family_name: String,
    city: String,
    email: String,
    recovery_email: Option<String>,
    now: Timestamp,
) -> Result<Family, FamilyError> {
    if families::get_family(&caller).is_some() {
        return Err(FamilyError::AlreadyExists(caller.to_text()));
    }

    let family_code = unique_family_code()?;
    let family = Family::new(
        caller,
        family_code,
        family_name,
        city,
        email,
        recovery_email,
        now,
    );
    families::insert_family(&family)?;
    metrics::record_family_registered();
    ic_cdk::println!(
        "INFO: Family {} registered with code {}",
        family.id.to_text(),
        family.family_code
    );

    notification_service::send(NotificationEvent::welcome_parent(
        family.email.clone(),
        &family.family_name,
        &family.family_code,
    ));
    Ok(family)
}

fn unique_family_code() -> Result<String, FamilyError> {
    for _ in 0..FAMILY_CODE_ATTEMPTS {
        let code = rng::generate_family_code();
        if !families::family_code_taken(&code) {
            return Ok(code);
        }
    }
    Err(FamilyError::InternalError(
        "Could not generate an unused family code".to_string(),
    ))
}

/// Adds a child, bounded by the plan's child limit. The PIN arrives already
/// format-validated from the API layer and is stored verbatim.
pub fn add_child(
    family_id: &FamilyId,
    name: String,
    pin: String,
    avatar: String,
) -> Result<Family, FamilyError> {
    let child_id = rng::generate_id();
    let family = with_family_mut(family_id, |family| {
        let gate = gate::can_add_child(family);
        if !gate.allowed {
            return Err(FamilyError::GateDenied(
                gate.reason.unwrap_or_else(|| "Child limit reached".to_string()),
            ));
        }
        family.add_child(child_id.clone(), name.clone(), pin.clone(), avatar.clone())?;
        Ok(family.clone())
    })?;
    metrics::record_child_added();
    Ok(family)
}

/// Removes one item from a family collection. Deliberately no cascade on
/// child deletion; see the aggregate documentation.
pub fn delete_item(
    family_id: &FamilyId,
    collection: ItemCollection,
    item_id: &str,
) -> Result<Family, FamilyError> {
    let family = with_family_mut(family_id, |family| {
        family.remove_item(collection, item_id)?;
        Ok(family.clone())
    })?;
    if collection == ItemCollection::Children {
        metrics::record_child_removed();
    }
    ic_cdk::println!(
        "INFO: Removed {:?} item {} from family {}",
        collection,
        item_id,
        family_id.to_text()
    );
    Ok(family)
}

/// Verifies a child's PIN against the family identified by its code.
/// Callers rate-limit this; a wrong PIN is an authorization error, not a
/// crash or a boolean.
pub fn verify_child_pin(
    family_code: &str,
    child_id: &str,
    pin: &str,
) -> Result<(), FamilyError> {
    let family = families::get_family_by_code(family_code)
        .ok_or_else(|| FamilyError::FamilyNotFound(family_code.to_string()))?;
    let child = family
        .child(child_id)
        .ok_or_else(|| FamilyError::not_found("child", child_id))?;
    if child.pin == pin {
        Ok(())
    } else {
        Err(FamilyError::NotAuthorized("Incorrect PIN".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::families::{commit_family, get_family, insert_family};
    use candid::Principal;

    const NOW: Timestamp = 1_700_000_000 * 1_000_000_000;

    fn seed_family(id: Principal, code: &str) -> Family {
        let mut family = Family::new(
            id,
            code.to_string(),
            "Jansen".into(),
            "Leiden".into(),
            "ouders@jansen.example".into(),
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
    fn with_family_mut_commits_the_mutation() {
        let family = seed_family(Principal::from_slice(&[10]), "JAN-001");
        with_family_mut(&family.id, |f| {
            f.add_chore("h1".into(), "Dishes".into(), 5, vec![], NOW)
        })
        .unwrap();
        let stored = get_family(&family.id).unwrap();
        assert!(stored.chores.contains_key("h1"));
        assert_eq!(stored.version, 1);
    }

    #[test]
    fn with_family_mut_retries_do_not_apply_a_failed_op() {
        let family = seed_family(Principal::from_slice(&[11]), "JAN-002");
        let err = with_family_mut(&family.id, |f| {
            f.remove_item(ItemCollection::Chores, "missing")
        })
        .unwrap_err();
        assert!(matches!(err, FamilyError::NotFound(_, _)));
        assert_eq!(get_family(&family.id).unwrap().version, 0);
    }

    #[test]
    fn with_family_mut_survives_one_interleaved_writer() {
        let family = seed_family(Principal::from_slice(&[12]), "JAN-003");

        // Simulate a writer that lands between our read and commit exactly
        // once: the helper's second attempt sees the fresh version.
        let mut interfered = false;
        with_family_mut(&family.id, |f| {
            if !interfered {
                interfered = true;
                let mut other = get_family(&family.id).unwrap();
                other
                    .add_chore("h-other".into(), "Laundry".into(), 5, vec![], NOW)
                    .unwrap();
                commit_family(&other).unwrap();
            }
            f.add_chore("h-mine".into(), "Dishes".into(), 5, vec![], NOW)
        })
        .unwrap();

        let stored = get_family(&family.id).unwrap();
        assert!(stored.chores.contains_key("h-other"));
        assert!(stored.chores.contains_key("h-mine"));
        assert_eq!(stored.version, 2);
    }

    #[test]
    fn pin_verification_accepts_only_the_exact_pin() {
        seed_family(Principal::from_slice(&[13]), "JAN-004");
        assert!(verify_child_pin("JAN-004", "c1", "1234").is_ok());
        assert!(matches!(
            verify_child_pin("JAN-004", "c1", "4321"),
            Err(FamilyError::NotAuthorized(_))
        ));
        assert!(matches!(
            verify_child_pin("JAN-004", "ghost", "1234"),
            Err(FamilyError::NotFound(_, _))
        ));
        assert!(matches!(
            verify_child_pin("XXX-000", "c1", "1234"),
            Err(FamilyError::FamilyNotFound(_))
        ));
    }
}
