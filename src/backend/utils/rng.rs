// src/backend/utils/rng.rs
use crate::error::FamilyError;
use ic_cdk::api::management_canister::main::raw_rand;
use rand::{Rng, RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;
use std::cell::RefCell;

// Family codes avoid lookalike characters so they survive being read aloud
// or scribbled on a fridge note.
const FAMILY_CODE_ALPHABET: &[u8] = b"ABCDEFGHJKLMNPQRSTUVWXYZ23456789";
const FAMILY_CODE_LEN: usize = 6;

thread_local! {
    static INTERNAL_RNG: RefCell<Option<ChaCha8Rng>> = const { RefCell::new(None) };
}

/// Seeds the thread-local RNG from the IC's `raw_rand`. Called from canister
/// init and post_upgrade (via a zero-delay timer, since init cannot await).
pub async fn initialize_rng() -> Result<(), FamilyError> {
    let (bytes,) = raw_rand().await.map_err(|(code, msg)| {
        FamilyError::InternalError(format!("raw_rand failed: [{code:?}] {msg}"))
    })?;
    let seed: [u8; 32] = bytes
        .get(..32)
        .and_then(|slice| slice.try_into().ok())
        .ok_or_else(|| {
            FamilyError::InternalError("raw_rand returned insufficient bytes for seed".to_string())
        })?;
    seed_rng(seed);
    ic_cdk::println!("INFO: Internal RNG initialized.");
    Ok(())
}

/// Installs a concrete seed. Exposed separately so tests can run without the
/// management canister.
pub fn seed_rng(seed: [u8; 32]) {
    INTERNAL_RNG.with(|rng| {
        *rng.borrow_mut() = Some(ChaCha8Rng::from_seed(seed));
    });
}

fn with_rng<F, R>(f: F) -> R
where
    F: FnOnce(&mut ChaCha8Rng) -> R,
{
    INTERNAL_RNG.with(|rng| {
        let mut borrowed = rng.borrow_mut();
        let rng_instance = borrowed
            .as_mut()
            .expect("Internal RNG accessed before initialization");
        f(rng_instance)
    })
}

/// Generates a new item id: 16 hex characters.
pub fn generate_id() -> String {
    let mut bytes = [0u8; 8];
    with_rng(|rng| rng.fill_bytes(&mut bytes));
    hex::encode(bytes)
}

/// Generates a shareable family code, e.g. `K7WQ2M`.
pub fn generate_family_code() -> String {
    with_rng(|rng| {
        (0..FAMILY_CODE_LEN)
            .map(|_| {
                let idx = rng.gen_range(0..FAMILY_CODE_ALPHABET.len());
                FAMILY_CODE_ALPHABET[idx] as char
            })
            .collect()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_hex_and_distinct() {
        seed_rng([7u8; 32]);
        let a = generate_id();
        let b = generate_id();
        assert_eq!(a.len(), 16);
        assert!(a.chars().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(a, b);
    }

    #[test]
    fn family_codes_use_the_restricted_alphabet() {
        seed_rng([9u8; 32]);
        for _ in 0..50 {
            let code = generate_family_code();
            assert_eq!(code.len(), FAMILY_CODE_LEN);
            assert!(code.bytes().all(|b| FAMILY_CODE_ALPHABET.contains(&b)));
        }
    }
}
