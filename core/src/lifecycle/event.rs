//! Event review lifecycle.
//!
//! `initiated --submit--> submitted --publish--> published --withdraw-->
//! withdrawn --publish--> published`. Submitting is open to anyone,
//! publishing and withdrawing require staff.

use crate::error::TransitionError;
use crate::models::{Event, EventState};
use crate::reducer::{Effect, Effects, Reducer};
use crate::types::Identity;
use smallvec::smallvec;

/// Actions for the event lifecycle
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum EventAction {
    // Commands
    /// Citizen hands the event in for review
    Submit,
    /// Staff makes the event visible
    Publish {
        /// Who is publishing
        actor: Identity,
    },
    /// Staff hides a published event
    Withdraw {
        /// Who is withdrawing
        actor: Identity,
    },

    // Events
    /// Event is waiting for review
    Submitted,
    /// Event is visible
    Published,
    /// Event is hidden again
    Withdrawn,
    /// A command was refused
    TransitionFailed {
        /// Why
        error: TransitionError,
    },
}

/// An event plus the outcome of the last command.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EventLifecycle {
    /// The event being transitioned
    pub event: Event,
    /// Set when the last command was refused
    pub last_error: Option<TransitionError>,
}

impl EventLifecycle {
    /// Wraps an event loaded from the collection
    #[must_use]
    pub const fn new(event: Event) -> Self {
        Self {
            event,
            last_error: None,
        }
    }
}

/// Reducer for event transitions. Needs no environment.
#[derive(Clone, Copy, Debug, Default)]
pub struct EventReducer;

impl EventReducer {
    /// Creates a new `EventReducer`
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    fn validate(
        state: &EventState,
        actor: Option<&Identity>,
        action: &'static str,
        allowed: &[EventState],
    ) -> Result<(), TransitionError> {
        if let Some(actor) = actor {
            if !actor.is_staff() {
                return Err(TransitionError::NotPermitted(format!(
                    "anonymous users cannot {action} events"
                )));
            }
        }
        if allowed.contains(state) {
            Ok(())
        } else {
            Err(TransitionError::InvalidTransition {
                action,
                state: state.as_str(),
            })
        }
    }

    fn apply_event(state: &mut EventLifecycle, action: &EventAction) {
        match action {
            EventAction::Submitted => {
                state.event.state = EventState::Submitted;
                state.last_error = None;
            }
            EventAction::Published => {
                state.event.state = EventState::Published;
                state.last_error = None;
            }
            EventAction::Withdrawn => {
                state.event.state = EventState::Withdrawn;
                state.last_error = None;
            }
            EventAction::TransitionFailed { error } => {
                state.last_error = Some(error.clone());
            }
            EventAction::Submit | EventAction::Publish { .. } | EventAction::Withdraw { .. } => {}
        }
    }

    fn transition(
        state: &mut EventLifecycle,
        check: Result<(), TransitionError>,
        event: &EventAction,
    ) -> Effects<Event> {
        match check {
            Ok(()) => {
                Self::apply_event(state, event);
                smallvec![Effect::Persist(state.event.clone())]
            }
            Err(error) => {
                Self::apply_event(state, &EventAction::TransitionFailed { error });
                Effects::new()
            }
        }
    }
}

impl Reducer for EventReducer {
    type State = EventLifecycle;
    type Action = EventAction;
    type Environment = ();
    type Record = Event;

    fn reduce(
        &self,
        state: &mut Self::State,
        action: Self::Action,
        _env: &Self::Environment,
    ) -> Effects<Event> {
        match action {
            EventAction::Submit => {
                let check =
                    Self::validate(&state.event.state, None, "submit", &[EventState::Initiated]);
                Self::transition(state, check, &EventAction::Submitted)
            }
            EventAction::Publish { actor } => {
                let check = Self::validate(
                    &state.event.state,
                    Some(&actor),
                    "publish",
                    &[EventState::Submitted, EventState::Withdrawn],
                );
                Self::transition(state, check, &EventAction::Published)
            }
            EventAction::Withdraw { actor } => {
                let check = Self::validate(
                    &state.event.state,
                    Some(&actor),
                    "withdraw",
                    &[EventState::Published],
                );
                Self::transition(state, check, &EventAction::Withdrawn)
            }
            event @ (EventAction::Submitted
            | EventAction::Published
            | EventAction::Withdrawn
            | EventAction::TransitionFailed { .. }) => {
                Self::apply_event(state, &event);
                Effects::new()
            }
        }
    }
}
