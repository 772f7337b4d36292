// src/backend/adapter/psp_adapter.rs
// HTTP client for the external payment service provider. The PSP owns the
// actual checkout page; this canister only creates orders and polls their
// status.
use crate::error::FamilyError;
use crate::models::common::{BillingInterval, OrderId, PlanTier, Timestamp};
use crate::storage::config;
use candid::CandidType;
use ic_cdk::api::management_canister::http_request::{
    http_request, CanisterHttpRequestArgument, HttpHeader, HttpMethod,
};
use serde::{Deserialize, Serialize};

const CREATE_ORDER_PATH: &str = "/orders";
const ORDER_STATUS_PATH: &str = "/orders/status";

const HTTP_OUTCALL_CYCLES: u128 = 100_000_000;
const MAX_RESPONSE_BYTES: u64 = 1024 * 10; // Max 10KiB response

#[derive(CandidType, Serialize, Deserialize, Debug, Clone)]
pub struct CreateOrderRequest {
    pub family_id: String,
    pub email: String,
    pub plan: PlanTier,
    pub interval: BillingInterval,
    pub amount_cents: u64,
}

#[derive(CandidType, Serialize, Deserialize, Debug, Clone)]
pub struct CreateOrderResponse {
    pub order_id: OrderId,
    pub payment_url: String, // Where the parent finishes the payment
}

#[derive(CandidType, Serialize, Deserialize, Debug, Clone)]
pub struct OrderStatusRequest {
    pub order_id: OrderId,
}

#[derive(CandidType, Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    Completed, // Paid and settled; the only status that upgrades a plan
    Pending,   // Checkout page open or payment still processing
    Failed,
    Expired,
}

#[derive(CandidType, Serialize, Deserialize, Debug, Clone)]
pub struct OrderStatusResponse {
    pub order_id: OrderId,
    pub status: OrderStatus,
    pub interval: Option<BillingInterval>,
    /// Next renewal in nanoseconds since epoch, when the PSP reports one.
    pub renewal_date: Option<Timestamp>,
}

/// Creates an order at the PSP and returns the hosted payment URL.
pub async fn create_order(req: CreateOrderRequest) -> Result<CreateOrderResponse, FamilyError> {
    ic_cdk::println!(
        "INFO: Creating PSP order for family {} ({:?}/{:?}, {} cents)",
        req.family_id,
        req.plan,
        req.interval,
        req.amount_cents
    );
    post_json(CREATE_ORDER_PATH, &req).await
}

/// Polls the PSP for the state of an order.
pub async fn order_status(order_id: &str) -> Result<OrderStatusResponse, FamilyError> {
    let req = OrderStatusRequest {
        order_id: order_id.to_string(),
    };
    post_json(ORDER_STATUS_PATH, &req).await
}

async fn post_json<Req, Resp>(path: &str, req: &Req) -> Result<Resp, FamilyError>
where
    Req: Serialize,
    Resp: for<'de> Deserialize<'de>,
{
    let request_body = serde_json::to_vec(req)
        .map_err(|e| FamilyError::SerializationError(format!("Failed to serialize request: {e}")))?;

    let request_arg = CanisterHttpRequestArgument {
        url: format!("{}{}", config::get_psp_api_url(), path),
        method: HttpMethod::POST,
        body: Some(request_body),
        max_response_bytes: Some(MAX_RESPONSE_BYTES),
        transform: None,
        headers: vec![HttpHeader {
            name: String::from("Content-Type"),
            value: String::from("application/json"),
        }],
    };

    match http_request(request_arg, HTTP_OUTCALL_CYCLES).await {
        Ok((response,)) => {
            if response.status >= candid::Nat::from(200u32)
                && response.status < candid::Nat::from(300u32)
            {
                serde_json::from_slice::<Resp>(&response.body).map_err(|e| {
                    FamilyError::SerializationError(format!(
                        "Failed to deserialize PSP response: {e}"
                    ))
                })
            } else {
                Err(FamilyError::HttpError(format!(
                    "PSP {} returned status {}: {}",
                    path,
                    response.status,
                    String::from_utf8_lossy(&response.body)
                )))
            }
        }
        Err((code, msg)) => {
            ic_cdk::eprintln!("ERROR: PSP outcall failed: {:?} - {}", code, msg);
            Err(FamilyError::HttpError(format!(
                "Failed to call PSP {path}: {code:?} - {msg}"
            )))
        }
    }
}
