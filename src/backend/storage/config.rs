// src/backend/storage/config.rs
use crate::models::init::InitArgs;
use crate::storage::memory::{
    get_admin_principal_memory, get_cron_principal_memory, get_idea_api_url_memory,
    get_mail_api_url_memory, get_min_cycles_threshold_memory, get_psp_api_url_memory, Memory,
};
use crate::storage::storable::Cbor;
use candid::Principal;
use ic_stable_structures::StableCell;
use std::cell::RefCell;

const DEFAULT_MIN_CYCLES_THRESHOLD: u128 = 10_000_000_000; // 10B cycles
const DEFAULT_PSP_API_URL: &str = "https://psp.example.com/api/v1";
const DEFAULT_MAIL_API_URL: &str = "https://mail.example.com/api/send";
const DEFAULT_IDEA_API_URL: &str = "https://ideas.example.com/api/generate";

thread_local! {
    static ADMIN_PRINCIPAL: RefCell<StableCell<Cbor<Principal>, Memory>> = RefCell::new(
        StableCell::init(get_admin_principal_memory(), Cbor(Principal::management_canister()))
            .expect("Failed to initialize admin principal stable cell")
    );

    static CRON_PRINCIPAL: RefCell<StableCell<Cbor<Principal>, Memory>> = RefCell::new(
        StableCell::init(get_cron_principal_memory(), Cbor(Principal::management_canister()))
            .expect("Failed to initialize cron principal stable cell")
    );

    static MIN_CYCLES_THRESHOLD: RefCell<StableCell<u128, Memory>> = RefCell::new(
        StableCell::init(get_min_cycles_threshold_memory(), DEFAULT_MIN_CYCLES_THRESHOLD)
            .expect("Failed to initialize min cycles threshold stable cell")
    );

    static PSP_API_URL: RefCell<StableCell<Cbor<String>, Memory>> = RefCell::new(
        StableCell::init(get_psp_api_url_memory(), Cbor(DEFAULT_PSP_API_URL.to_string()))
            .expect("Failed to initialize PSP url stable cell")
    );

    static MAIL_API_URL: RefCell<StableCell<Cbor<String>, Memory>> = RefCell::new(
        StableCell::init(get_mail_api_url_memory(), Cbor(DEFAULT_MAIL_API_URL.to_string()))
            .expect("Failed to initialize mail url stable cell")
    );

    static IDEA_API_URL: RefCell<StableCell<Cbor<String>, Memory>> = RefCell::new(
        StableCell::init(get_idea_api_url_memory(), Cbor(DEFAULT_IDEA_API_URL.to_string()))
            .expect("Failed to initialize idea url stable cell")
    );
}

/// Applies configuration from init args. Called from canister init and
/// post-upgrade only.
pub fn init_config(args: InitArgs) {
    ADMIN_PRINCIPAL.with(|cell| {
        cell.borrow_mut()
            .set(Cbor(args.admin_principal))
            .expect("Failed to set admin principal");
    });
    CRON_PRINCIPAL.with(|cell| {
        cell.borrow_mut()
            .set(Cbor(args.cron_principal))
            .expect("Failed to set cron principal");
    });
    MIN_CYCLES_THRESHOLD.with(|cell| {
        cell.borrow_mut()
            .set(args.min_cycles_threshold)
            .expect("Failed to set min cycles threshold");
    });
    PSP_API_URL.with(|cell| {
        cell.borrow_mut()
            .set(Cbor(args.psp_api_url))
            .expect("Failed to set PSP url");
    });
    MAIL_API_URL.with(|cell| {
        cell.borrow_mut()
            .set(Cbor(args.mail_api_url))
            .expect("Failed to set mail url");
    });
    IDEA_API_URL.with(|cell| {
        cell.borrow_mut()
            .set(Cbor(args.idea_api_url))
            .expect("Failed to set idea url");
    });
}

pub fn get_admin_principal() -> Principal {
    ADMIN_PRINCIPAL.with(|cell| cell.borrow().get().0)
}

pub fn get_cron_principal() -> Principal {
    CRON_PRINCIPAL.with(|cell| cell.borrow().get().0)
}

pub fn get_min_cycles_threshold() -> u128 {
    MIN_CYCLES_THRESHOLD.with(|cell| *cell.borrow().get())
}

pub fn get_psp_api_url() -> String {
    PSP_API_URL.with(|cell| cell.borrow().get().0.clone())
}

pub fn get_mail_api_url() -> String {
    MAIL_API_URL.with(|cell| cell.borrow().get().0.clone())
}

pub fn get_idea_api_url() -> String {
    IDEA_API_URL.with(|cell| cell.borrow().get().0.clone())
}
