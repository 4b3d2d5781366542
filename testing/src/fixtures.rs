//! Builders for domain records with sensible test defaults.

#![allow(clippy::unwrap_used)] // Fixed, valid dates
#![allow(clippy::missing_panics_doc)]

use chrono::{NaiveDate, NaiveDateTime, Utc};
use std::sync::atomic::{AtomicU32, Ordering};
use town_core::models::{
    Allocation, Event, EventState, FormDefinition, FormSubmission, Reservation, ReservationStatus,
    Resource, ResourceKind, SubmissionField,
};
use town_core::ticket::Ticket;
use town_core::types::{AllocationId, EventId, ReservationId, ReservationToken, ResourceId};

/// Local date and time
#[must_use]
pub fn at(year: i32, month: u32, day: u32, hour: u32, minute: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(year, month, day)
        .unwrap()
        .and_hms_opt(hour, minute, 0)
        .unwrap()
}

/// A form definition named `name`
#[must_use]
pub fn form(name: &str, title: &str) -> FormDefinition {
    FormDefinition {
        name: name.to_string(),
        title: title.to_string(),
        lead: None,
    }
}

/// A pending submission of `form`
#[must_use]
pub fn submission(form: &FormDefinition, title: &str) -> FormSubmission {
    FormSubmission::pending(
        &form.name,
        title,
        "citizen@example.org",
        vec![
            SubmissionField::new("Name", "Jane Citizen"),
            SubmissionField::new("Message", "Please repair the street light."),
        ],
    )
}

/// A resource of the given type
#[must_use]
pub fn resource(kind: ResourceKind, title: &str) -> Resource {
    Resource {
        id: ResourceId::new(),
        name: title.to_lowercase().replace(' ', "-"),
        title: title.to_string(),
        resource_type: kind,
        definition: None,
    }
}

/// The "SBB Day Pass" resource
#[must_use]
pub fn daypass() -> Resource {
    resource(ResourceKind::Daypass, "SBB Day Pass")
}

/// The "Conference Room" resource
#[must_use]
pub fn room() -> Resource {
    resource(ResourceKind::Room, "Conference Room")
}

/// An allocation of `resource` between `start` and `end`
#[must_use]
pub fn allocation(
    resource: &Resource,
    start: NaiveDateTime,
    end: NaiveDateTime,
    quota: u32,
) -> Allocation {
    Allocation {
        id: AllocationId::new(),
        resource: resource.id,
        start,
        end,
        quota,
        partly_available: false,
    }
}

/// A whole-day reservation of `resource` on `(year, month, day)`
#[must_use]
pub fn reservation(
    resource: &Resource,
    token: ReservationToken,
    (year, month, day): (i32, u32, u32),
    quota: u32,
) -> Reservation {
    reservation_between(
        resource,
        token,
        at(year, month, day, 0, 0),
        at(year, month, day, 23, 59),
        quota,
    )
}

/// A reservation of `resource` between `start` and `end`
#[must_use]
pub fn reservation_between(
    resource: &Resource,
    token: ReservationToken,
    start: NaiveDateTime,
    end: NaiveDateTime,
    quota: u32,
) -> Reservation {
    Reservation {
        id: ReservationId::new(),
        token,
        resource: resource.id,
        email: "citizen@example.org".to_string(),
        start,
        end,
        quota,
        status: ReservationStatus::Pending,
        accepted: false,
        session_id: Some("session".to_string()),
    }
}

/// An event in `state`
#[must_use]
pub fn event(state: EventState) -> Event {
    Event {
        id: EventId::new(),
        title: "Open Air Concert".to_string(),
        description: "Brass band on the market square".to_string(),
        location: "Market Square".to_string(),
        start: at(2025, 6, 21, 19, 0),
        end: at(2025, 6, 21, 22, 0),
        state,
        submitter_email: Some("organiser@example.org".to_string()),
    }
}

static NEXT_NUMBER: AtomicU32 = AtomicU32::new(1);

/// An open ticket for `(code, handler_id)` with a unique sequential number
#[must_use]
pub fn ticket(code: &str, handler_id: &str) -> Ticket {
    let n = NEXT_NUMBER.fetch_add(1, Ordering::Relaxed);
    let number = format!("{code}-{:04}-{:04}", n / 10_000, n % 10_000);
    Ticket::open(number, code, handler_id, Utc::now())
}
