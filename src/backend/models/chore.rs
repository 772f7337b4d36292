// src/backend/models/chore.rs
use crate::models::common::{assigned_to_includes, ChildId, ChoreId, ChoreStatus, Timestamp};
use candid::CandidType;
use serde::{Deserialize, Serialize};

/// One chore. The submission fields (`submitted_by`, `submitted_at`,
/// `emotion`, `photo_url`) are only meaningful while `status` is
/// `Submitted`; a rejection clears them again.
///
/// `created_at` can be absent for records carried over from before creation
/// timestamps were recorded; such chores are skipped by the monthly quota
/// count and never make it crash.
#[derive(CandidType, Deserialize, Serialize, Clone, Debug, PartialEq, Eq)]
pub struct Chore {
    pub id: ChoreId,
    pub name: String,
    pub points: u32,
    pub assigned_to: Vec<ChildId>, // Empty = every child
    pub status: ChoreStatus,
    pub submitted_by: Option<ChildId>,
    pub submitted_at: Option<Timestamp>,
    pub emotion: Option<String>,
    pub photo_url: Option<String>,
    pub created_at: Option<Timestamp>,
}

impl Chore {
    pub fn new(
        id: ChoreId,
        name: String,
        points: u32,
        assigned_to: Vec<ChildId>,
        created_at: Timestamp,
    ) -> Self {
        Chore {
            id,
            name,
            points,
            assigned_to,
            status: ChoreStatus::Available,
            submitted_by: None,
            submitted_at: None,
            emotion: None,
            photo_url: None,
            created_at: Some(created_at),
        }
    }

    pub fn is_assigned_to(&self, child_id: &str) -> bool {
        assigned_to_includes(&self.assigned_to, child_id)
    }

    /// Records a child's submission. Overwrites any prior submission fields;
    /// only one outstanding submission exists per chore.
    pub fn record_submission(
        &mut self,
        child_id: ChildId,
        emotion: String,
        photo_url: Option<String>,
        now: Timestamp,
    ) {
        self.status = ChoreStatus::Submitted;
        self.submitted_by = Some(child_id);
        self.submitted_at = Some(now);
        self.emotion = Some(emotion);
        self.photo_url = photo_url;
    }

    /// Clears the submission and puts the chore back up for grabs.
    pub fn clear_submission(&mut self) {
        self.status = ChoreStatus::Available;
        self.submitted_by = None;
        self.submitted_at = None;
        self.emotion = None;
        self.photo_url = None;
    }
}
