//! Identifiers and the viewer identity.
//!
//! Every record the ticket subsystem touches is addressed by a UUID newtype.
//! Tickets reference their underlying objects through an opaque string
//! (`handler_id`), which is always the simple (un-hyphenated) form of one of
//! these UUIDs.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

macro_rules! uuid_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(Uuid);

        impl $name {
            #[doc = concat!("Creates a new random `", stringify!($name), "`")]
            #[must_use]
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }

            #[doc = concat!("Create a `", stringify!($name), "` from a `Uuid`")]
            #[must_use]
            pub const fn from_uuid(uuid: Uuid) -> Self {
                Self(uuid)
            }

            /// Get the inner UUID
            #[must_use]
            pub const fn as_uuid(&self) -> &Uuid {
                &self.0
            }

            /// The opaque form stored in `Ticket::handler_id`.
            #[must_use]
            pub fn handler_id(&self) -> String {
                self.0.simple().to_string()
            }

            /// Parses a handler id back into the identifier.
            ///
            /// Returns `None` for malformed ids, which callers treat the
            /// same as a missing object.
            #[must_use]
            pub fn parse_handler_id(handler_id: &str) -> Option<Self> {
                Uuid::parse_str(handler_id).ok().map(Self)
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<Uuid> for $name {
            fn from(uuid: Uuid) -> Self {
                Self(uuid)
            }
        }
    };
}

uuid_id!(
    /// Unique identifier for a ticket
    TicketId
);
uuid_id!(
    /// Unique identifier for a form submission
    SubmissionId
);
uuid_id!(
    /// Unique identifier for a bookable resource (room, day pass)
    ResourceId
);
uuid_id!(
    /// Unique identifier for an allocation (bookable slot)
    AllocationId
);
uuid_id!(
    /// Unique identifier for a single reservation row
    ReservationId
);
uuid_id!(
    /// Token shared by all reservations created by one booking request
    ReservationToken
);
uuid_id!(
    /// Unique identifier for an event
    EventId
);

/// Who is looking at a page or triggering an action.
#[derive(Clone, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Identity {
    /// A visitor without a staff login.
    #[default]
    Anonymous,
    /// A logged-in member of staff.
    Staff {
        /// Login name, recorded on tickets the member accepts.
        username: String,
    },
}

impl Identity {
    /// Creates a staff identity.
    #[must_use]
    pub fn staff(username: impl Into<String>) -> Self {
        Self::Staff {
            username: username.into(),
        }
    }

    /// Whether the viewer is logged in as staff.
    #[must_use]
    pub const fn is_staff(&self) -> bool {
        matches!(self, Self::Staff { .. })
    }

    /// Login name of the staff member, if any.
    #[must_use]
    pub fn username(&self) -> Option<&str> {
        match self {
            Self::Anonymous => None,
            Self::Staff { username } => Some(username),
        }
    }
}
