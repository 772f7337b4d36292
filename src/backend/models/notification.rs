// src/backend/models/notification.rs
use candid::CandidType;
use serde::{Deserialize, Serialize};

#[derive(CandidType, Deserialize, Serialize, Clone, Debug, PartialEq, Eq, Copy)]
pub enum NotificationKind {
    WelcomeParent,
    ChoreSubmitted,
    RewardRedeemed,
}

impl NotificationKind {
    /// Wire name used by the mail sender's template router.
    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationKind::WelcomeParent => "welcome_parent",
            NotificationKind::ChoreSubmitted => "chore_submitted",
            NotificationKind::RewardRedeemed => "reward_redeemed",
        }
    }
}

/// Fire-and-forget email event. Dispatch failures are logged and swallowed;
/// they never fail the operation that produced the event.
#[derive(Clone, Debug)]
pub struct NotificationEvent {
    pub kind: NotificationKind,
    pub to: String,
    pub data: serde_json::Value,
}

impl NotificationEvent {
    pub fn welcome_parent(to: impl Into<String>, family_name: &str, family_code: &str) -> Self {
        NotificationEvent {
            kind: NotificationKind::WelcomeParent,
            to: to.into(),
            data: serde_json::json!({
                "family_name": family_name,
                "family_code": family_code,
            }),
        }
    }

    pub fn chore_submitted(
        to: impl Into<String>,
        child_name: &str,
        chore_name: &str,
        points: u32,
    ) -> Self {
        NotificationEvent {
            kind: NotificationKind::ChoreSubmitted,
            to: to.into(),
            data: serde_json::json!({
                "child_name": child_name,
                "chore_name": chore_name,
                "points": points,
            }),
        }
    }

    pub fn reward_redeemed(
        to: impl Into<String>,
        child_name: &str,
        reward_name: &str,
        points: u32,
    ) -> Self {
        NotificationEvent {
            kind: NotificationKind::RewardRedeemed,
            to: to.into(),
            data: serde_json::json!({
                "child_name": child_name,
                "reward_name": reward_name,
                "points": points,
            }),
        }
    }
}
