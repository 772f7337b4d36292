// src/backend/adapter/mail_adapter.rs
// HTTP client for the transactional mail service. Callers treat delivery as
// fire-and-forget; this module only reports the outcome so it can be logged.
use crate::error::FamilyError;
use crate::models::notification::NotificationEvent;
use crate::storage::config;
use ic_cdk::api::management_canister::http_request::{
    http_request, CanisterHttpRequestArgument, HttpHeader, HttpMethod,
};
use serde::Serialize;

const HTTP_OUTCALL_CYCLES: u128 = 100_000_000;
const MAX_RESPONSE_BYTES: u64 = 1024 * 4;

#[derive(Serialize, Debug)]
struct MailPayload<'a> {
    template: &'static str,
    to: &'a str,
    data: &'a serde_json::Value,
}

/// Delivers one notification event to the mail service.
pub async fn deliver(event: &NotificationEvent) -> Result<(), FamilyError> {
    let request_body = serde_json::to_vec(&MailPayload {
        template: event.kind.as_str(),
        to: &event.to,
        data: &event.data,
    })
    .map_err(|e| FamilyError::SerializationError(format!("Failed to serialize mail payload: {e}")))?;

    let request_arg = CanisterHttpRequestArgument {
        url: config::get_mail_api_url(),
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
                Ok(())
            } else {
                Err(FamilyError::HttpError(format!(
                    "Mail service returned status {}: {}",
                    response.status,
                    String::from_utf8_lossy(&response.body)
                )))
            }
        }
        Err((code, msg)) => Err(FamilyError::HttpError(format!(
            "Failed to call mail service: {code:?} - {msg}"
        ))),
    }
}
