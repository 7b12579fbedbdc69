use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::FromRow;

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Participation {
    pub id: String,
    pub user_id: String,
    pub event_id: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub donation_amount: Decimal,
    pub registration_date: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewParticipation {
    pub id: String,
    pub user_id: String,
    pub event_id: String,
    pub donation_amount: Decimal,
}

/// The slice of an event row that registration decides on, read under lock.
#[derive(Debug, Clone, FromRow)]
pub struct EventCapacity {
    pub id: String,
    pub target_volunteer_count: i32,
    pub current_volunteer_count: i32,
}

impl EventCapacity {
    pub fn is_full(&self) -> bool {
        self.current_volunteer_count >= self.target_volunteer_count
    }
}

/// Why a registration was turned away.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    AlreadyRegistered,
    EventFull,
}

/// Admission rule shared by every store. A duplicate is reported before
/// capacity, so a registered user retrying on a full event learns they are
/// already in.
pub fn admit(capacity: &EventCapacity, already_registered: bool) -> Result<(), Rejection> {
    if already_registered {
        return Err(Rejection::AlreadyRegistered);
    }
    if capacity.is_full() {
        return Err(Rejection::EventFull);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn capacity(target: i32, current: i32) -> EventCapacity {
        EventCapacity {
            id: "event_1".to_string(),
            target_volunteer_count: target,
            current_volunteer_count: current,
        }
    }

    #[test]
    fn test_admit_with_room() {
        assert_eq!(admit(&capacity(3, 2), false), Ok(()));
    }

    #[test]
    fn test_admit_rejects_full_event() {
        assert_eq!(admit(&capacity(2, 2), false), Err(Rejection::EventFull));
        assert_eq!(admit(&capacity(1, 5), false), Err(Rejection::EventFull));
    }

    #[test]
    fn test_duplicate_wins_over_full() {
        assert_eq!(
            admit(&capacity(1, 1), true),
            Err(Rejection::AlreadyRegistered)
        );
        assert_eq!(
            admit(&capacity(5, 0), true),
            Err(Rejection::AlreadyRegistered)
        );
    }
}
