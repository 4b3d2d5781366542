//! Domain records owned by the external collections.
//!
//! Tickets never own these records; they only hold a handler id pointing at
//! one of them.

use crate::types::{AllocationId, EventId, ReservationId, ReservationToken, ResourceId, SubmissionId};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A form that citizens can fill out.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormDefinition {
    /// Unique, URL-safe name
    pub name: String,
    /// Human readable title, used as the ticket group
    pub title: String,
    /// Short introduction shown above the form
    pub lead: Option<String>,
}

/// Whether a submission has been finalised by the citizen.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubmissionState {
    /// Stored but not yet confirmed
    Pending,
    /// Confirmed, a ticket exists
    Complete,
}

impl SubmissionState {
    /// Returns the persisted representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Complete => "complete",
        }
    }
}

impl FromStr for SubmissionState {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "complete" => Ok(Self::Complete),
            other => Err(format!("unknown submission state: {other}")),
        }
    }
}

/// A single answered field of a submission.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmissionField {
    /// Field label as shown on the form
    pub label: String,
    /// Submitted value
    pub value: String,
}

impl SubmissionField {
    /// Creates a new field
    #[must_use]
    pub fn new(label: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            value: value.into(),
        }
    }
}

/// A citizen's answers to a form.
///
/// Submissions created for reservations ("external" submissions) are keyed
/// by the reservation token instead of a fresh id and record that token in
/// `reservation`. They are completed by finalizing the reservation, never on
/// their own.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormSubmission {
    /// Submission id
    pub id: SubmissionId,
    /// Name of the [`FormDefinition`] this answers
    pub name: String,
    /// Title derived from the answers
    pub title: String,
    /// Contact address of the submitter
    pub email: String,
    /// Pending or complete
    pub state: SubmissionState,
    /// Answers in form order
    pub fields: Vec<SubmissionField>,
    /// Reservation whose details this submission collects
    #[serde(default)]
    pub reservation: Option<ReservationToken>,
}

impl FormSubmission {
    /// Creates a pending submission with a fresh id.
    #[must_use]
    pub fn pending(
        name: impl Into<String>,
        title: impl Into<String>,
        email: impl Into<String>,
        fields: Vec<SubmissionField>,
    ) -> Self {
        Self {
            id: SubmissionId::new(),
            name: name.into(),
            title: title.into(),
            email: email.into(),
            state: SubmissionState::Pending,
            fields,
            reservation: None,
        }
    }

    /// Whether this submission collects the details of a reservation
    #[must_use]
    pub const fn is_reservation_details(&self) -> bool {
        self.reservation.is_some()
    }
}

/// Kind of bookable resource.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    /// Day pass, booked by quota
    Daypass,
    /// Room, booked by time range
    Room,
    /// Anything else. Tickets cannot title these.
    Other(String),
}

impl ResourceKind {
    /// Returns the persisted representation.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Daypass => "daypass",
            Self::Room => "room",
            Self::Other(other) => other,
        }
    }

    /// Whether reservations of this kind can be finalized into a ticket
    #[must_use]
    pub const fn is_bookable(&self) -> bool {
        matches!(self, Self::Daypass | Self::Room)
    }
}

impl From<&str> for ResourceKind {
    fn from(value: &str) -> Self {
        match value {
            "daypass" => Self::Daypass,
            "room" => Self::Room,
            other => Self::Other(other.to_string()),
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for ResourceKind {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for ResourceKind {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = String::deserialize(deserializer)?;
        Ok(Self::from(value.as_str()))
    }
}

/// A bookable resource.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resource {
    /// Resource id
    pub id: ResourceId,
    /// URL-safe name
    pub name: String,
    /// Display title, used as the ticket group
    pub title: String,
    /// Day pass, room or other
    pub resource_type: ResourceKind,
    /// Name of a form collecting extra data per reservation
    pub definition: Option<String>,
}

/// A bookable slot of a resource.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Allocation {
    /// Allocation id
    pub id: AllocationId,
    /// Owning resource
    pub resource: ResourceId,
    /// Slot start (local time)
    pub start: NaiveDateTime,
    /// Slot end (local time)
    pub end: NaiveDateTime,
    /// Number of spots available
    pub quota: u32,
    /// Whether a sub-range of the slot may be reserved
    pub partly_available: bool,
}

/// Approval state of a reservation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReservationStatus {
    /// Reserved but not yet confirmed by the citizen
    Pending,
    /// Confirmed by the citizen
    Approved,
}

impl ReservationStatus {
    /// Returns the persisted representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
        }
    }
}

impl FromStr for ReservationStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "approved" => Ok(Self::Approved),
            other => Err(format!("unknown reservation status: {other}")),
        }
    }
}

/// One reserved slot. Several reservations may share a token.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reservation {
    /// Row id
    pub id: ReservationId,
    /// Booking request this reservation belongs to
    pub token: ReservationToken,
    /// Reserved resource
    pub resource: ResourceId,
    /// Contact address, identical across a token
    pub email: String,
    /// Reserved start (local time)
    pub start: NaiveDateTime,
    /// Reserved end (local time)
    pub end: NaiveDateTime,
    /// Number of spots
    pub quota: u32,
    /// Pending or approved
    pub status: ReservationStatus,
    /// Set once staff accepted the reservation
    pub accepted: bool,
    /// Browser session allowed to finalise the booking anonymously
    pub session_id: Option<String>,
}

/// Lifecycle state of a submitted event.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventState {
    /// Created, not yet submitted for review
    Initiated,
    /// Waiting for review
    Submitted,
    /// Publicly visible
    Published,
    /// Hidden again after publication
    Withdrawn,
}

impl EventState {
    /// Returns the persisted representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Initiated => "initiated",
            Self::Submitted => "submitted",
            Self::Published => "published",
            Self::Withdrawn => "withdrawn",
        }
    }
}

impl FromStr for EventState {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "initiated" => Ok(Self::Initiated),
            "submitted" => Ok(Self::Submitted),
            "published" => Ok(Self::Published),
            "withdrawn" => Ok(Self::Withdrawn),
            other => Err(format!("unknown event state: {other}")),
        }
    }
}

/// A citizen-submitted event.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    /// Event id
    pub id: EventId,
    /// Title, used as the ticket title
    pub title: String,
    /// Free text description
    pub description: String,
    /// Where it takes place
    pub location: String,
    /// Start (local time)
    pub start: NaiveDateTime,
    /// End (local time)
    pub end: NaiveDateTime,
    /// Review state
    pub state: EventState,
    /// Address of the submitter, never shown on the ticket
    pub submitter_email: Option<String>,
}
