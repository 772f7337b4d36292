// src/backend/api.rs
// Candid endpoint definitions: request validation, guards, and the mapping
// onto the service layer. The caller principal is the parent's identity;
// child devices act through the shared family code plus a per-child PIN.
use crate::{
    adapter::idea_adapter::ChoreIdea,
    error::FamilyError,
    metrics::AppMetrics,
    models::checkout::CheckoutSession,
    models::common::*,
    models::family::Family,
    models::gate::{self, GateResult},
    models::plan,
    services::{
        chore_service, family_service,
        payment_service::{self, ConfirmCheckoutResponse},
        reward_service, scheduler,
    },
    storage::{families, metrics as metrics_storage},
    utils::guards::{check_admin, check_cron_or_admin, check_cycles},
    utils::rate_limit::rate_guard,
    utils::time::now_ns,
};
use candid::CandidType;
use ic_cdk::caller;
use ic_cdk_macros::{query, update};
use serde::Deserialize;
use validator::{Validate, ValidationError};

// --- Guard functions (attribute guards must return Result<(), String>) ---

fn admin_guard() -> Result<(), String> {
    check_admin().map_err(|e| e.to_string())
}

fn cron_or_admin_guard() -> Result<(), String> {
    check_cron_or_admin().map_err(|e| e.to_string())
}

// --- Validation helpers ---

fn validate_request<T: Validate>(req: &T) -> Result<(), FamilyError> {
    req.validate()
        .map_err(|e| FamilyError::InvalidInput(e.to_string()))
}

/// A PIN is exactly four ASCII digits. Checked here once; the aggregate
/// stores whatever passed this check, verbatim.
fn validate_pin(pin: &str) -> Result<(), ValidationError> {
    if pin.len() == 4 && pin.bytes().all(|b| b.is_ascii_digit()) {
        Ok(())
    } else {
        Err(ValidationError::new("pin_must_be_four_digits"))
    }
}

// --- Request/Response structs ---

#[derive(CandidType, Deserialize, Clone, Debug, Validate)]
pub struct RegisterFamilyRequest {
    #[validate(length(min = 1, max = 100))]
    pub family_name: String,
    #[validate(length(min = 1, max = 100))]
    pub city: String,
    #[validate(email)]
    pub email: String,
    #[validate(email)]
    pub recovery_email: Option<String>,
}

#[derive(CandidType, Deserialize, Clone, Debug, Validate)]
pub struct AddChildRequest {
    #[validate(length(min = 1, max = 50))]
    pub name: String,
    #[validate(custom(function = "validate_pin"))]
    pub pin: String,
    #[validate(length(min = 1, max = 50))]
    pub avatar: String,
}

#[derive(CandidType, Deserialize, Clone, Debug, Validate)]
pub struct AddChoreRequest {
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    #[validate(range(min = 1))]
    pub points: u32,
    pub assigned_to: Vec<ChildId>,
}

#[derive(CandidType, Deserialize, Clone, Debug, Validate)]
pub struct AddRewardRequest {
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    #[validate(range(min = 1))]
    pub points: u32,
    pub kind: RewardKind,
    pub assigned_to: Vec<ChildId>,
}

#[derive(CandidType, Deserialize, Clone, Debug, Validate)]
pub struct DeleteItemRequest {
    pub collection: ItemCollection,
    #[validate(length(min = 1))]
    pub item_id: String,
}

#[derive(CandidType, Deserialize, Clone, Debug, Validate)]
pub struct ChoreActionRequest {
    #[validate(length(min = 1))]
    pub chore_id: ChoreId,
}

#[derive(CandidType, Deserialize, Clone, Debug, Validate)]
pub struct SubmitChoreRequest {
    #[validate(length(min = 1, max = 16))]
    pub family_code: String,
    #[validate(length(min = 1))]
    pub child_id: ChildId,
    #[validate(length(min = 1))]
    pub chore_id: ChoreId,
    #[validate(length(min = 1, max = 50))]
    pub emotion: String,
    #[validate(length(max = 500))]
    pub photo_url: Option<String>,
}

#[derive(CandidType, Deserialize, Clone, Debug, Validate)]
pub struct RedeemRewardRequest {
    #[validate(length(min = 1, max = 16))]
    pub family_code: String,
    #[validate(length(min = 1))]
    pub child_id: ChildId,
    #[validate(length(min = 1))]
    pub reward_id: RewardId,
}

#[derive(CandidType, Deserialize, Clone, Debug, Validate)]
pub struct MarkRewardGivenRequest {
    #[validate(length(min = 1))]
    pub pending_reward_id: PendingRewardId,
}

#[derive(CandidType, Deserialize, Clone, Debug, Validate)]
pub struct ChildBoardRequest {
    #[validate(length(min = 1, max = 16))]
    pub family_code: String,
    #[validate(length(min = 1))]
    pub child_id: ChildId,
}

#[derive(CandidType, Deserialize, Clone, Debug, Validate)]
pub struct VerifyChildPinRequest {
    #[validate(length(min = 1, max = 16))]
    pub family_code: String,
    #[validate(length(min = 1))]
    pub child_id: ChildId,
    #[validate(custom(function = "validate_pin"))]
    pub pin: String,
}

#[derive(CandidType, Deserialize, Clone, Debug, Validate)]
pub struct SuggestChoreIdeasRequest {
    #[validate(length(min = 1, max = 100))]
    pub keyword: String,
}

#[derive(CandidType, Deserialize, Clone, Debug)]
pub struct StartCheckoutRequest {
    pub interval: BillingInterval,
}

#[derive(CandidType, Deserialize, Clone, Debug, Validate)]
pub struct ConfirmCheckoutRequest {
    #[validate(length(min = 1))]
    pub order_id: OrderId,
}

#[derive(CandidType, Deserialize, Validate)]
pub struct ListRequest {
    pub offset: Option<u32>,
    #[validate(range(min = 1, max = 100))]
    pub limit: Option<u32>,
}

/// What a child's device shows after unlocking with the family code: their
/// balance, the chores they can do, and the reward shop as they see it.
#[derive(CandidType, Deserialize, Clone, Debug)]
pub struct ChildBoardView {
    pub child_id: ChildId,
    pub name: String,
    pub avatar: String,
    pub points: Points,
    pub total_points_ever: Points,
    pub chores: Vec<crate::models::chore::Chore>,
    pub rewards: Vec<crate::models::reward::Reward>,
}

/// Plan state for the parent dashboard: which gates are currently open and
/// which features the plan carries.
#[derive(CandidType, Deserialize, Clone, Debug)]
pub struct PlanOverview {
    pub plan: PlanTier,
    pub can_add_child: GateResult,
    pub can_add_chore: GateResult,
    pub chores_this_month: u32,
    pub features: Vec<FeatureKey>,
}

#[derive(CandidType, Deserialize, Clone, Debug)]
pub struct FamilySummary {
    pub family_id: FamilyId,
    pub family_name: String,
    pub city: String,
    pub plan: PlanTier,
    pub children_count: u64,
    pub created_at: Timestamp,
}

#[derive(CandidType, Deserialize, Clone, Debug)]
pub struct ListFamiliesResponse {
    pub families: Vec<FamilySummary>,
    pub total: u64,
}

// --- Family endpoints (parent identity) ---

#[update]
fn register_family(req: RegisterFamilyRequest) -> Result<Family, FamilyError> {
    validate_request(&req)?;
    check_cycles()?;
    family_service::register_family(
        caller(),
        req.family_name,
        req.city,
        req.email,
        req.recovery_email,
        now_ns(),
    )
}

#[query]
fn get_family() -> Result<Family, FamilyError> {
    families::get_family(&caller())
        .ok_or_else(|| FamilyError::FamilyNotFound(caller().to_text()))
}

#[query]
fn get_plan_overview() -> Result<PlanOverview, FamilyError> {
    let family = families::get_family(&caller())
        .ok_or_else(|| FamilyError::FamilyNotFound(caller().to_text()))?;
    let now = now_ns();
    let definition = plan::plan_definition(plan::active_plan(family.subscription.as_ref()));
    Ok(PlanOverview {
        plan: definition.tier,
        can_add_child: gate::can_add_child(&family),
        can_add_chore: gate::can_add_chore(&family, now),
        chores_this_month: gate::chores_created_in_month(&family, now),
        features: definition.features,
    })
}

#[update]
fn add_child(req: AddChildRequest) -> Result<Family, FamilyError> {
    validate_request(&req)?;
    check_cycles()?;
    family_service::add_child(&caller(), req.name, req.pin, req.avatar)
}

#[update]
fn add_chore(req: AddChoreRequest) -> Result<Family, FamilyError> {
    validate_request(&req)?;
    check_cycles()?;
    chore_service::add_chore(&caller(), req.name, req.points, req.assigned_to, now_ns())
}

#[update]
fn add_reward(req: AddRewardRequest) -> Result<Family, FamilyError> {
    validate_request(&req)?;
    check_cycles()?;
    reward_service::add_reward(&caller(), req.name, req.points, req.kind, req.assigned_to)
}

#[update]
fn delete_item(req: DeleteItemRequest) -> Result<Family, FamilyError> {
    validate_request(&req)?;
    check_cycles()?;
    family_service::delete_item(&caller(), req.collection, &req.item_id)
}

#[update]
fn approve_chore(req: ChoreActionRequest) -> Result<Family, FamilyError> {
    validate_request(&req)?;
    check_cycles()?;
    chore_service::approve_chore(&caller(), &req.chore_id)
}

#[update]
fn reject_chore(req: ChoreActionRequest) -> Result<Family, FamilyError> {
    validate_request(&req)?;
    check_cycles()?;
    chore_service::reject_chore(&caller(), &req.chore_id)
}

#[update]
fn mark_reward_given(req: MarkRewardGivenRequest) -> Result<Family, FamilyError> {
    validate_request(&req)?;
    check_cycles()?;
    reward_service::mark_reward_given(&caller(), &req.pending_reward_id)
}

#[update]
async fn suggest_chore_ideas(req: SuggestChoreIdeasRequest) -> Result<Vec<ChoreIdea>, FamilyError> {
    validate_request(&req)?;
    check_cycles()?;
    chore_service::suggest_chores(&caller(), &req.keyword).await
}

// --- Child-device endpoints (family code + PIN, rate limited) ---

#[query(guard = "rate_guard")]
fn verify_child_pin(req: VerifyChildPinRequest) -> Result<(), FamilyError> {
    validate_request(&req)?;
    family_service::verify_child_pin(&req.family_code, &req.child_id, &req.pin)
}

#[query(guard = "rate_guard")]
fn get_child_board(req: ChildBoardRequest) -> Result<ChildBoardView, FamilyError> {
    validate_request(&req)?;
    let family = families::get_family_by_code(&req.family_code)
        .ok_or_else(|| FamilyError::FamilyNotFound(req.family_code.clone()))?;
    let child = family
        .child(&req.child_id)
        .ok_or_else(|| FamilyError::not_found("child", req.child_id.clone()))?;
    Ok(ChildBoardView {
        child_id: child.id.clone(),
        name: child.name.clone(),
        avatar: child.avatar.clone(),
        points: child.points,
        total_points_ever: child.total_points_ever,
        chores: family
            .available_chores_for(&req.child_id)
            .into_iter()
            .cloned()
            .collect(),
        rewards: family
            .rewards_for(&req.child_id)
            .into_iter()
            .cloned()
            .collect(),
    })
}

#[update(guard = "rate_guard")]
fn submit_chore(req: SubmitChoreRequest) -> Result<(), FamilyError> {
    validate_request(&req)?;
    check_cycles()?;
    chore_service::submit_chore(
        &req.family_code,
        &req.chore_id,
        &req.child_id,
        req.emotion,
        req.photo_url,
        now_ns(),
    )
}

#[update(guard = "rate_guard")]
fn redeem_reward(req: RedeemRewardRequest) -> Result<(), FamilyError> {
    validate_request(&req)?;
    check_cycles()?;
    reward_service::redeem_reward(&req.family_code, &req.reward_id, &req.child_id, now_ns())
}

// --- Billing endpoints ---

#[update]
async fn start_checkout(req: StartCheckoutRequest) -> Result<CheckoutSession, FamilyError> {
    check_cycles()?;
    payment_service::start_checkout(caller(), req.interval, now_ns()).await
}

#[update]
async fn confirm_checkout(
    req: ConfirmCheckoutRequest,
) -> Result<ConfirmCheckoutResponse, FamilyError> {
    validate_request(&req)?;
    check_cycles()?;
    payment_service::confirm_checkout(caller(), &req.order_id, now_ns()).await
}

// --- Admin & maintenance endpoints ---

#[query(guard = "admin_guard")]
fn list_families(req: ListRequest) -> Result<ListFamiliesResponse, FamilyError> {
    validate_request(&req)?;
    let offset = req.offset.unwrap_or(0) as u64;
    let limit = req.limit.unwrap_or(10) as usize;
    let (families, total) = families::list_families(offset, limit);
    let summaries = families
        .into_iter()
        .map(|family| FamilySummary {
            family_id: family.id,
            family_name: family.family_name.clone(),
            city: family.city.clone(),
            plan: plan::active_plan(family.subscription.as_ref()),
            children_count: family.children.len() as u64,
            created_at: family.created_at,
        })
        .collect();
    Ok(ListFamiliesResponse {
        families: summaries,
        total,
    })
}

#[query(guard = "admin_guard")]
fn get_metrics() -> Result<AppMetrics, FamilyError> {
    Ok(metrics_storage::get_metrics())
}

#[update(guard = "cron_or_admin_guard")]
fn run_maintenance() -> Result<(), FamilyError> {
    check_cycles()?;
    scheduler::run_maintenance(now_ns())
}
