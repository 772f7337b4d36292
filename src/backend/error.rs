// src/backend/error.rs
use candid::CandidType;
use serde::Deserialize;
use thiserror::Error;

#[derive(CandidType, Deserialize, Error, Debug, Clone, PartialEq, Eq)]
pub enum FamilyError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Not authorized: {0}")]
    NotAuthorized(String),

    #[error("Family not found: {0}")]
    FamilyNotFound(String),

    #[error("{0} not found: {1}")]
    NotFound(String, String),

    #[error("A family is already registered for {0}")]
    AlreadyExists(String),

    #[error("Plan limit reached: {0}")]
    GateDenied(String),

    #[error("Insufficient points: balance {balance}, required {required}")]
    InsufficientPoints { balance: u64, required: u64 },

    #[error("Invalid state: {0}")]
    InvalidState(String),

    #[error("Family record was modified concurrently; retry the operation")]
    VersionConflict,

    #[error("Payment error: {0}")]
    PaymentError(String),

    #[error("Outbound call failed: {0}")]
    HttpError(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("Storage error: {0}")]
    StorageError(String),

    #[error("Rate limit exceeded: {0}")]
    RateLimitExceeded(String),

    #[error("Canister cycle balance too low for operation")]
    CycleLow,

    #[error("Internal canister error: {0}")]
    InternalError(String),
}

impl FamilyError {
    /// Shorthand for a missing item inside a family document.
    pub fn not_found(kind: &str, id: impl Into<String>) -> Self {
        FamilyError::NotFound(kind.to_string(), id.into())
    }
}
