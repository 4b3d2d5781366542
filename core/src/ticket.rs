//! The persisted ticket record.

use crate::types::TicketId;
use chrono::{DateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// How often [`generate_ticket_number`] is retried before giving up.
pub const MAX_NUMBER_ATTEMPTS: usize = 100;

/// Review state of a ticket.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TicketState {
    /// Waiting for a staff member
    Open,
    /// Accepted, work in progress
    Pending,
    /// Done
    Closed,
}

impl TicketState {
    /// Returns the persisted representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::Pending => "pending",
            Self::Closed => "closed",
        }
    }
}

impl fmt::Display for TicketState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TicketState {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "open" => Ok(Self::Open),
            "pending" => Ok(Self::Pending),
            "closed" => Ok(Self::Closed),
            other => Err(format!("unknown ticket state: {other}")),
        }
    }
}

/// A ticket tracks one citizen workflow through staff review.
///
/// Tickets are never deleted. `title` and `group` are snapshots taken from
/// the handler so listings remain readable once the underlying object is
/// gone.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ticket {
    /// Ticket id
    pub id: TicketId,
    /// Display number, `CODE-NNNN-NNNN`
    pub number: String,
    /// Handler type code (`FRM`, `RSV`, `EVN`)
    pub handler_code: String,
    /// Opaque reference to the underlying object
    pub handler_id: String,
    /// Review state
    pub state: TicketState,
    /// Staff member who accepted the ticket
    pub user: Option<String>,
    /// Title snapshot
    pub title: String,
    /// Group snapshot
    pub group: String,
    /// When the ticket was opened
    pub created: DateTime<Utc>,
    /// Time of the last transition
    pub last_state_change: Option<DateTime<Utc>>,
    /// Seconds between opening and first acceptance
    pub reaction_time: Option<i64>,
    /// Seconds spent pending, accumulated over reopenings
    pub process_time: Option<i64>,
}

impl Ticket {
    /// Creates an open ticket.
    #[must_use]
    pub fn open(
        number: String,
        handler_code: impl Into<String>,
        handler_id: impl Into<String>,
        created: DateTime<Utc>,
    ) -> Self {
        Self {
            id: TicketId::new(),
            number,
            handler_code: handler_code.into(),
            handler_id: handler_id.into(),
            state: TicketState::Open,
            user: None,
            title: String::new(),
            group: String::new(),
            created,
            last_state_change: None,
            reaction_time: None,
            process_time: None,
        }
    }
}

/// Generates a random ticket number such as `FRM-4711-0815`.
///
/// Uniqueness is not checked here; callers retry against the ticket
/// collection.
pub fn generate_ticket_number<R: Rng + ?Sized>(handler_code: &str, rng: &mut R) -> String {
    format!(
        "{}-{:04}-{:04}",
        handler_code,
        rng.gen_range(0..10_000),
        rng.gen_range(0..10_000)
    )
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn new_ticket_is_open_without_user() {
        let ticket = Ticket::open("EVN-0001-0002".into(), "EVN", "abc", Utc::now());
        assert_eq!(ticket.state, TicketState::Open);
        assert!(ticket.user.is_none());
        assert!(ticket.last_state_change.is_none());
    }

    #[test]
    fn state_serializes_lowercase() {
        let json = serde_json::to_string(&TicketState::Pending).unwrap();
        assert_eq!(json, "\"pending\"");
        assert_eq!("closed".parse::<TicketState>().unwrap(), TicketState::Closed);
        assert!("archived".parse::<TicketState>().is_err());
    }

    proptest! {
        #[test]
        fn ticket_numbers_have_code_and_four_digit_groups(seed in any::<u64>()) {
            let mut rng = StdRng::seed_from_u64(seed);
            let number = generate_ticket_number("RSV", &mut rng);
            let parts: Vec<&str> = number.split('-').collect();

            prop_assert_eq!(parts.len(), 3);
            prop_assert_eq!(parts[0], "RSV");
            prop_assert_eq!(parts[1].len(), 4);
            prop_assert_eq!(parts[2].len(), 4);
            prop_assert!(parts[1].chars().all(|c| c.is_ascii_digit()));
            prop_assert!(parts[2].chars().all(|c| c.is_ascii_digit()));
        }
    }
}
