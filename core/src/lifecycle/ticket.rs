//! Ticket lifecycle: `open -> pending -> closed -> open`.

use crate::error::TransitionError;
use crate::reducer::{Clock, Effect, Effects, Reducer};
use crate::ticket::{Ticket, TicketState};
use crate::types::Identity;
use chrono::{DateTime, Utc};
use smallvec::smallvec;
use std::sync::Arc;

// ============================================================================
// Actions (Commands + Events)
// ============================================================================

/// Actions for the ticket lifecycle
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TicketAction {
    // Commands
    /// Staff member takes over an open ticket
    Accept {
        /// Who is accepting
        actor: Identity,
    },
    /// Staff member finishes a pending ticket
    Close {
        /// Who is closing
        actor: Identity,
    },
    /// Staff member reopens a closed ticket
    Reopen {
        /// Who is reopening
        actor: Identity,
    },

    // Events
    /// Ticket was accepted
    Accepted {
        /// Username recorded on the ticket
        user: String,
        /// When
        at: DateTime<Utc>,
    },
    /// Ticket was closed
    Closed {
        /// When
        at: DateTime<Utc>,
    },
    /// Ticket was reopened
    Reopened {
        /// When
        at: DateTime<Utc>,
    },
    /// A command was refused
    TransitionFailed {
        /// Why
        error: TransitionError,
    },
}

// ============================================================================
// State
// ============================================================================

/// A ticket plus the outcome of the last command.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TicketLifecycle {
    /// The ticket being transitioned
    pub ticket: Ticket,
    /// Set when the last command was refused
    pub last_error: Option<TransitionError>,
}

impl TicketLifecycle {
    /// Wraps a ticket loaded from the collection
    #[must_use]
    pub const fn new(ticket: Ticket) -> Self {
        Self {
            ticket,
            last_error: None,
        }
    }
}

// ============================================================================
// Environment
// ============================================================================

/// Environment dependencies for the ticket lifecycle
#[derive(Clone)]
pub struct TicketEnvironment {
    /// Clock for timestamps
    pub clock: Arc<dyn Clock>,
}

impl TicketEnvironment {
    /// Creates a new `TicketEnvironment`
    #[must_use]
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self { clock }
    }
}

// ============================================================================
// Reducer
// ============================================================================

/// Reducer for ticket transitions
#[derive(Clone, Copy, Debug, Default)]
pub struct TicketReducer;

impl TicketReducer {
    /// Creates a new `TicketReducer`
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    fn require_staff(actor: &Identity, action: &str) -> Result<String, TransitionError> {
        actor.username().map(str::to_string).ok_or_else(|| {
            TransitionError::NotPermitted(format!("anonymous users cannot {action} tickets"))
        })
    }

    fn require_state(
        current: TicketState,
        expected: TicketState,
        action: &'static str,
    ) -> Result<(), TransitionError> {
        if current == expected {
            Ok(())
        } else {
            Err(TransitionError::InvalidTransition {
                action,
                state: current.as_str(),
            })
        }
    }

    /// Applies an event to state
    fn apply_event(state: &mut TicketLifecycle, action: &TicketAction) {
        let ticket = &mut state.ticket;
        match action {
            TicketAction::Accepted { user, at } => {
                if ticket.reaction_time.is_none() {
                    ticket.reaction_time = Some((*at - ticket.created).num_seconds());
                }
                ticket.user = Some(user.clone());
                ticket.state = TicketState::Pending;
                ticket.last_state_change = Some(*at);
                state.last_error = None;
            }
            TicketAction::Closed { at } => {
                let since = ticket.last_state_change.unwrap_or(ticket.created);
                let spent = (*at - since).num_seconds();
                ticket.process_time = Some(ticket.process_time.unwrap_or(0) + spent);
                ticket.state = TicketState::Closed;
                ticket.last_state_change = Some(*at);
                state.last_error = None;
            }
            TicketAction::Reopened { at } => {
                ticket.user = None;
                ticket.state = TicketState::Open;
                ticket.last_state_change = Some(*at);
                state.last_error = None;
            }
            TicketAction::TransitionFailed { error } => {
                state.last_error = Some(error.clone());
            }
            // Commands don't modify state
            TicketAction::Accept { .. }
            | TicketAction::Close { .. }
            | TicketAction::Reopen { .. } => {}
        }
    }

    fn fail(state: &mut TicketLifecycle, error: TransitionError) -> Effects<Ticket> {
        tracing::debug!(ticket = %state.ticket.number, %error, "ticket transition refused");
        Self::apply_event(state, &TicketAction::TransitionFailed { error });
        Effects::new()
    }

    fn commit(state: &mut TicketLifecycle, event: &TicketAction) -> Effects<Ticket> {
        Self::apply_event(state, event);
        smallvec![Effect::Persist(state.ticket.clone())]
    }
}

impl Reducer for TicketReducer {
    type State = TicketLifecycle;
    type Action = TicketAction;
    type Environment = TicketEnvironment;
    type Record = Ticket;

    fn reduce(
        &self,
        state: &mut Self::State,
        action: Self::Action,
        env: &Self::Environment,
    ) -> Effects<Ticket> {
        match action {
            // ========== Commands ==========
            TicketAction::Accept { actor } => {
                let user = match Self::require_staff(&actor, "accept").and_then(|user| {
                    Self::require_state(state.ticket.state, TicketState::Open, "accept")
                        .map(|()| user)
                }) {
                    Ok(user) => user,
                    Err(error) => return Self::fail(state, error),
                };

                let event = TicketAction::Accepted {
                    user,
                    at: env.clock.now(),
                };
                Self::commit(state, &event)
            }

            TicketAction::Close { actor } => {
                if let Err(error) = Self::require_staff(&actor, "close").and_then(|_| {
                    Self::require_state(state.ticket.state, TicketState::Pending, "close")
                }) {
                    return Self::fail(state, error);
                }

                let event = TicketAction::Closed {
                    at: env.clock.now(),
                };
                Self::commit(state, &event)
            }

            TicketAction::Reopen { actor } => {
                if let Err(error) = Self::require_staff(&actor, "reopen") {
                    return Self::fail(state, error);
                }

                // Reopening an open ticket is a no-op
                if state.ticket.state == TicketState::Open {
                    state.last_error = None;
                    return Effects::new();
                }

                if let Err(error) =
                    Self::require_state(state.ticket.state, TicketState::Closed, "reopen")
                {
                    return Self::fail(state, error);
                }

                let event = TicketAction::Reopened {
                    at: env.clock.now(),
                };
                Self::commit(state, &event)
            }

            // ========== Events ==========
            event @ (TicketAction::Accepted { .. }
            | TicketAction::Closed { .. }
            | TicketAction::Reopened { .. }
            | TicketAction::TransitionFailed { .. }) => {
                Self::apply_event(state, &event);
                Effects::new()
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    struct Frozen(DateTime<Utc>);

    impl Clock for Frozen {
        fn now(&self) -> DateTime<Utc> {
            self.0
        }
    }

    fn created() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 1, 1, 8, 0, 0).unwrap()
    }

    fn env_at(offset: Duration) -> TicketEnvironment {
        TicketEnvironment::new(Arc::new(Frozen(created() + offset)))
    }

    fn lifecycle(state: TicketState) -> TicketLifecycle {
        let mut ticket = Ticket::open("FRM-1234-5678".into(), "FRM", "deadbeef", created());
        ticket.state = state;
        TicketLifecycle::new(ticket)
    }

    #[test]
    fn accept_records_user_and_reaction_time() {
        let mut state = lifecycle(TicketState::Open);
        let effects = TicketReducer::new().reduce(
            &mut state,
            TicketAction::Accept {
                actor: Identity::staff("editor"),
            },
            &env_at(Duration::minutes(5)),
        );

        assert_eq!(state.ticket.state, TicketState::Pending);
        assert_eq!(state.ticket.user.as_deref(), Some("editor"));
        assert_eq!(state.ticket.reaction_time, Some(300));
        assert_eq!(effects.len(), 1);
        assert!(matches!(&effects[0], Effect::Persist(t) if t.state == TicketState::Pending));
    }

    #[test]
    fn close_accumulates_process_time() {
        let mut state = lifecycle(TicketState::Pending);
        state.ticket.last_state_change = Some(created() + Duration::minutes(10));
        state.ticket.process_time = Some(60);

        TicketReducer::new().reduce(
            &mut state,
            TicketAction::Close {
                actor: Identity::staff("editor"),
            },
            &env_at(Duration::minutes(20)),
        );

        assert_eq!(state.ticket.state, TicketState::Closed);
        assert_eq!(state.ticket.process_time, Some(660));
    }

    #[test]
    fn anonymous_actor_is_rejected() {
        let mut state = lifecycle(TicketState::Open);
        let effects = TicketReducer::new().reduce(
            &mut state,
            TicketAction::Accept {
                actor: Identity::Anonymous,
            },
            &env_at(Duration::zero()),
        );

        assert!(effects.is_empty());
        assert_eq!(state.ticket.state, TicketState::Open);
        assert!(matches!(
            state.last_error,
            Some(TransitionError::NotPermitted(_))
        ));
    }

    #[test]
    fn reopen_on_open_ticket_is_a_no_op() {
        let mut state = lifecycle(TicketState::Open);
        let before = state.ticket.clone();
        let effects = TicketReducer::new().reduce(
            &mut state,
            TicketAction::Reopen {
                actor: Identity::staff("editor"),
            },
            &env_at(Duration::hours(1)),
        );

        assert!(effects.is_empty());
        assert!(state.last_error.is_none());
        assert_eq!(state.ticket, before);
    }

    #[test]
    fn close_from_open_is_an_invalid_transition() {
        let mut state = lifecycle(TicketState::Open);
        let effects = TicketReducer::new().reduce(
            &mut state,
            TicketAction::Close {
                actor: Identity::staff("editor"),
            },
            &env_at(Duration::zero()),
        );

        assert!(effects.is_empty());
        assert_eq!(
            state.last_error,
            Some(TransitionError::InvalidTransition {
                action: "close",
                state: "open",
            })
        );
    }
}
