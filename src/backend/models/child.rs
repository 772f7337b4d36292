// src/backend/models/child.rs
use crate::error::FamilyError;
use crate::models::common::{ChildId, Points};
use candid::CandidType;
use serde::{Deserialize, Serialize};

/// One child profile. `points` is the spendable balance; `total_points_ever`
/// is a lifetime counter that only grows (on chore approval) and is never
/// touched by redemptions, so `points <= total_points_ever` at all times.
#[derive(CandidType, Deserialize, Serialize, Clone, Debug, PartialEq, Eq)]
pub struct Child {
    pub id: ChildId,
    pub name: String,
    pub pin: String, // 4 digits, validated at the API boundary, stored verbatim
    pub avatar: String,
    pub points: Points,
    pub total_points_ever: Points,
}

impl Child {
    pub fn new(id: ChildId, name: String, pin: String, avatar: String) -> Self {
        Child {
            id,
            name,
            pin,
            avatar,
            points: 0,
            total_points_ever: 0,
        }
    }

    /// Credits earned points to both the balance and the lifetime counter.
    pub fn credit(&mut self, points: Points) {
        self.points = self.points.saturating_add(points);
        self.total_points_ever = self.total_points_ever.saturating_add(points);
    }

    /// Debits the spendable balance. The lifetime counter is untouched.
    pub fn debit(&mut self, points: Points) -> Result<(), FamilyError> {
        if self.points < points {
            return Err(FamilyError::InsufficientPoints {
                balance: self.points,
                required: points,
            });
        }
        self.points -= points;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn child() -> Child {
        Child::new("c1".into(), "Noor".into(), "1234".into(), "fox".into())
    }

    #[test]
    fn credit_raises_balance_and_lifetime_counter() {
        let mut c = child();
        c.credit(25);
        assert_eq!(c.points, 25);
        assert_eq!(c.total_points_ever, 25);
    }

    #[test]
    fn debit_leaves_lifetime_counter_untouched() {
        let mut c = child();
        c.credit(100);
        c.debit(40).unwrap();
        assert_eq!(c.points, 60);
        assert_eq!(c.total_points_ever, 100);
    }

    #[test]
    fn debit_beyond_balance_is_rejected_without_change() {
        let mut c = child();
        c.credit(10);
        let err = c.debit(11).unwrap_err();
        assert_eq!(
            err,
            FamilyError::InsufficientPoints {
                balance: 10,
                required: 11
            }
        );
        assert_eq!(c.points, 10);
        assert_eq!(c.total_points_ever, 10);
    }
}
