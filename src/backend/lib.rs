// src/backend/lib.rs

pub mod adapter;
pub mod api;
pub mod error;
pub mod metrics;
pub mod models;
pub mod services;
pub mod storage;
pub mod utils;

use crate::models::init::InitArgs;
use std::time::Duration;

// Bring the Candid endpoint types into scope for `export_candid!`, which
// references them by bare name at this call site.
use crate::adapter::idea_adapter::ChoreIdea;
use crate::api::*;
use crate::error::FamilyError;
use crate::metrics::AppMetrics;
use crate::models::checkout::CheckoutSession;
use crate::models::family::Family;
use crate::services::payment_service::ConfirmCheckoutResponse;

fn bootstrap(args: Option<InitArgs>) {
    if let Some(args) = args {
        storage::config::init_config(args);
    }
    // Init hooks cannot await; seed the RNG from raw_rand on a zero-delay
    // timer right after installation.
    ic_cdk_timers::set_timer(Duration::ZERO, || {
        ic_cdk::spawn(async {
            if let Err(e) = utils::rng::initialize_rng().await {
                ic_cdk::eprintln!("ERROR: RNG initialization failed: {}", e);
            }
        });
    });
    services::scheduler::start_maintenance_timer();
}

#[ic_cdk::init]
fn init(args: Option<InitArgs>) {
    ic_cdk::println!("INFO: KlusjesKoning backend canister initialized.");
    bootstrap(args);
}

#[ic_cdk::post_upgrade]
fn post_upgrade(args: Option<InitArgs>) {
    ic_cdk::println!("INFO: KlusjesKoning backend canister upgraded.");
    bootstrap(args);
}

// Export Candid interface
ic_cdk::export_candid!();
