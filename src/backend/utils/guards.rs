// src/backend/utils/guards.rs
use crate::error::FamilyError;
use crate::storage::config;
use ic_cdk::api::canister_balance128;

/// Checks if the canister has sufficient cycles for the operation.
///
/// # Errors
///
/// Returns `FamilyError::CycleLow` if the balance is below the configured
/// threshold.
pub fn check_cycles() -> Result<(), FamilyError> {
    let balance = canister_balance128();
    let threshold = config::get_min_cycles_threshold();
    if balance < threshold {
        ic_cdk::println!(
            "WARNING: Cycle balance low: {} cycles, threshold: {}",
            balance,
            threshold
        );
        Err(FamilyError::CycleLow)
    } else {
        Ok(())
    }
}

/// Checks if the caller is the configured admin principal.
pub fn check_admin() -> Result<(), FamilyError> {
    let caller = ic_cdk::caller();
    if caller == config::get_admin_principal() {
        Ok(())
    } else {
        Err(FamilyError::NotAuthorized(
            "Caller is not the admin principal.".to_string(),
        ))
    }
}

/// Checks if the caller is the configured cron trigger OR the admin.
pub fn check_cron_or_admin() -> Result<(), FamilyError> {
    let caller = ic_cdk::caller();
    if caller == config::get_admin_principal() || caller == config::get_cron_principal() {
        Ok(())
    } else {
        Err(FamilyError::NotAuthorized(
            "Caller is not the authorized cron trigger or an admin.".to_string(),
        ))
    }
}
