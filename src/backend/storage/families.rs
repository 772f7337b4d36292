// src/backend/storage/families.rs
use crate::error::FamilyError;
use crate::models::common::FamilyId;
use crate::models::family::Family;
use crate::storage::memory::{get_families_memory, get_family_codes_memory, Memory};
use crate::storage::storable::{Cbor, StorableString};
use ic_stable_structures::StableBTreeMap;
use std::cell::RefCell;

type StorableFamily = Cbor<Family>;

thread_local! {
    /// Families: Key = family id (parent principal as text), Value = Family.
    pub static FAMILIES: RefCell<StableBTreeMap<StorableString, StorableFamily, Memory>> = RefCell::new(
        StableBTreeMap::init(get_families_memory())
    );

    /// Secondary index: family code -> family id text, for child-device
    /// lookups that only know the shared code.
    static FAMILY_CODES: RefCell<StableBTreeMap<StorableString, StorableString, Memory>> = RefCell::new(
        StableBTreeMap::init(get_family_codes_memory())
    );
}

/// Retrieves a family by its id (the parent principal).
pub fn get_family(family_id: &FamilyId) -> Option<Family> {
    let key = Cbor(family_id.to_text());
    FAMILIES.with(|map_ref| map_ref.borrow().get(&key).map(|cbor| cbor.0))
}

/// Resolves a family code to the family it belongs to.
pub fn get_family_by_code(family_code: &str) -> Option<Family> {
    let id_text = FAMILY_CODES.with(|map_ref| {
        map_ref
            .borrow()
            .get(&Cbor(family_code.to_string()))
            .map(|cbor| cbor.0)
    })?;
    FAMILIES.with(|map_ref| map_ref.borrow().get(&Cbor(id_text)).map(|cbor| cbor.0))
}

pub fn family_code_taken(family_code: &str) -> bool {
    FAMILY_CODES.with(|map_ref| {
        map_ref
            .borrow()
            .contains_key(&Cbor(family_code.to_string()))
    })
}

/// Inserts a brand-new family and its code index entry. Fails if the id is
/// already registered; registration is the only caller.
pub fn insert_family(family: &Family) -> Result<(), FamilyError> {
    let key = Cbor(family.id.to_text());
    let exists = FAMILIES.with(|map_ref| map_ref.borrow().contains_key(&key));
    if exists {
        return Err(FamilyError::AlreadyExists(family.id.to_text()));
    }
    FAMILIES.with(|map_ref| {
        map_ref.borrow_mut().insert(key, Cbor(family.clone()));
    });
    FAMILY_CODES.with(|map_ref| {
        map_ref.borrow_mut().insert(
            Cbor(family.family_code.clone()),
            Cbor(family.id.to_text()),
        );
    });
    Ok(())
}

/// Commits a modified family with a compare-and-swap on the version counter.
/// The caller's snapshot must carry the version it was read at; a mismatch
/// means another writer got in between, and the whole read-modify-write has
/// to be retried against a fresh snapshot.
pub fn commit_family(family: &Family) -> Result<u64, FamilyError> {
    let key = Cbor(family.id.to_text());
    FAMILIES.with(|map_ref| {
        let mut map = map_ref.borrow_mut();
        let stored = map
            .get(&key)
            .ok_or_else(|| FamilyError::FamilyNotFound(family.id.to_text()))?;
        if stored.0.version != family.version {
            return Err(FamilyError::VersionConflict);
        }
        let mut committed = family.clone();
        committed.version = family.version + 1;
        let new_version = committed.version;
        map.insert(key, Cbor(committed));
        Ok(new_version)
    })
}

/// Removes a family and its code index entry.
pub fn remove_family(family_id: &FamilyId) -> Option<Family> {
    let key = Cbor(family_id.to_text());
    let removed = FAMILIES.with(|map_ref| map_ref.borrow_mut().remove(&key).map(|cbor| cbor.0));
    if let Some(family) = &removed {
        FAMILY_CODES.with(|map_ref| {
            map_ref
                .borrow_mut()
                .remove(&Cbor(family.family_code.clone()));
        });
    }
    removed
}

/// All families, paginated, for the admin listing.
pub fn list_families(offset: u64, limit: usize) -> (Vec<Family>, u64) {
    FAMILIES.with(|map_ref| {
        let map = map_ref.borrow();
        let total = map.len();
        let families = map
            .iter()
            .skip(offset as usize)
            .take(limit)
            .map(|(_key, value)| value.0)
            .collect();
        (families, total)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::common::Timestamp;
    use candid::Principal;

    const NOW: Timestamp = 1_700_000_000 * 1_000_000_000;

    fn fresh_family(id_byte: u8, code: &str) -> Family {
        let mut family = Family::new(
            Principal::from_slice(&[id_byte]),
            code.to_string(),
            "De Vries".into(),
            "Utrecht".into(),
            "ouders@devries.example".into(),
            None,
            NOW,
        );
        family
            .add_child("c1".into(), "Noor".into(), "1234".into(), "fox".into())
            .unwrap();
        family
    }

    #[test]
    fn insert_then_lookup_by_id_and_code() {
        let family = fresh_family(1, "ZON-0001");
        insert_family(&family).unwrap();

        let by_id = get_family(&family.id).unwrap();
        assert_eq!(by_id, family);
        let by_code = get_family_by_code("ZON-0001").unwrap();
        assert_eq!(by_code.id, family.id);
        assert!(family_code_taken("ZON-0001"));
        assert!(!family_code_taken("ZON-9999"));
    }

    #[test]
    fn double_registration_is_rejected() {
        let family = fresh_family(2, "ZON-0002");
        insert_family(&family).unwrap();
        assert!(matches!(
            insert_family(&family),
            Err(FamilyError::AlreadyExists(_))
        ));
    }

    #[test]
    fn commit_bumps_the_version() {
        let family = fresh_family(3, "ZON-0003");
        insert_family(&family).unwrap();

        let mut snapshot = get_family(&family.id).unwrap();
        snapshot
            .add_chore("h1".into(), "Dishes".into(), 10, vec![], NOW)
            .unwrap();
        let new_version = commit_family(&snapshot).unwrap();
        assert_eq!(new_version, 1);

        let stored = get_family(&family.id).unwrap();
        assert_eq!(stored.version, 1);
        assert!(stored.chores.contains_key("h1"));
    }

    #[test]
    fn racing_commits_from_the_same_snapshot_conflict() {
        let family = fresh_family(4, "ZON-0004");
        insert_family(&family).unwrap();

        // Set up a submitted chore, then race two approvals read from the
        // same stored version.
        let mut setup = get_family(&family.id).unwrap();
        setup
            .add_chore("h1".into(), "Dishes".into(), 25, vec![], NOW)
            .unwrap();
        setup
            .submit_chore("h1", "c1", "proud".into(), None, NOW)
            .unwrap();
        commit_family(&setup).unwrap();

        let mut first = get_family(&family.id).unwrap();
        let mut second = get_family(&family.id).unwrap();

        first.approve_chore("h1").unwrap();
        commit_family(&first).unwrap();

        second.approve_chore("h1").unwrap();
        let err = commit_family(&second).unwrap_err();
        assert_eq!(err, FamilyError::VersionConflict);

        // The stored state reflects exactly one approval.
        let stored = get_family(&family.id).unwrap();
        assert_eq!(stored.child("c1").unwrap().points, 25);
        assert_eq!(stored.child("c1").unwrap().total_points_ever, 25);
    }

    #[test]
    fn commit_of_unknown_family_reports_not_found() {
        let family = fresh_family(5, "ZON-0005");
        assert!(matches!(
            commit_family(&family),
            Err(FamilyError::FamilyNotFound(_))
        ));
    }

    #[test]
    fn remove_clears_the_code_index() {
        let family = fresh_family(6, "ZON-0006");
        insert_family(&family).unwrap();
        let removed = remove_family(&family.id).unwrap();
        assert_eq!(removed.family_code, "ZON-0006");
        assert!(get_family(&family.id).is_none());
        assert!(!family_code_taken("ZON-0006"));
    }
}
