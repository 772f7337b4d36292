// src/backend/adapter/idea_adapter.rs
// HTTP client for the chore-idea generation service. Purely advisory:
// whatever comes back still goes through the normal chore creation gate.
use crate::error::FamilyError;
use crate::storage::config;
use candid::CandidType;
use ic_cdk::api::management_canister::http_request::{
    http_request, CanisterHttpRequestArgument, HttpHeader, HttpMethod,
};
use serde::{Deserialize, Serialize};

const HTTP_OUTCALL_CYCLES: u128 = 100_000_000;
const MAX_RESPONSE_BYTES: u64 = 1024 * 10;
const MAX_IDEAS: usize = 10;

#[derive(Serialize, Debug, Clone)]
struct IdeaRequest<'a> {
    keyword: &'a str,
    max_ideas: usize,
}

#[derive(CandidType, Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ChoreIdea {
    pub name: String,
    pub points: u32,
}

#[derive(Deserialize, Debug)]
struct IdeaResponse {
    ideas: Vec<ChoreIdea>,
}

/// Asks the generator for chore suggestions around `keyword`.
pub async fn generate_chore_ideas(keyword: &str) -> Result<Vec<ChoreIdea>, FamilyError> {
    let request_body = serde_json::to_vec(&IdeaRequest {
        keyword,
        max_ideas: MAX_IDEAS,
    })
    .map_err(|e| FamilyError::SerializationError(format!("Failed to serialize request: {e}")))?;

    let request_arg = CanisterHttpRequestArgument {
        url: config::get_idea_api_url(),
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
                let parsed: IdeaResponse = serde_json::from_slice(&response.body).map_err(|e| {
                    FamilyError::SerializationError(format!(
                        "Failed to deserialize idea response: {e}"
                    ))
                })?;
                // Drop unusable suggestions instead of failing the call.
                Ok(parsed
                    .ideas
                    .into_iter()
                    .filter(|idea| idea.points > 0 && !idea.name.trim().is_empty())
                    .take(MAX_IDEAS)
                    .collect())
            } else {
                Err(FamilyError::HttpError(format!(
                    "Idea service returned status {}: {}",
                    response.status,
                    String::from_utf8_lossy(&response.body)
                )))
            }
        }
        Err((code, msg)) => {
            ic_cdk::eprintln!("ERROR: Idea service outcall failed: {:?} - {}", code, msg);
            Err(FamilyError::HttpError(format!(
                "Failed to call idea service: {code:?} - {msg}"
            )))
        }
    }
}
