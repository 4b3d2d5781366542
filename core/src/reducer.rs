//! The reducer shape shared by the lifecycle state machines.
//!
//! Reducers are pure: `(state, action, env) -> effects`. They never touch a
//! store themselves; persisting the changed record is described by an
//! [`Effect`] and carried out by the service layer.

use chrono::{DateTime, Utc};
use smallvec::SmallVec;

/// Side effects a reducer asks the caller to perform.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Effect<R> {
    /// Write the record back to its collection
    Persist(R),
}

/// Effects returned by a single `reduce` call.
pub type Effects<R> = SmallVec<[Effect<R>; 2]>;

/// The Reducer trait
///
/// # Type Parameters
///
/// - `State`: The state this reducer mutates
/// - `Action`: Commands and events it processes
/// - `Environment`: Injected dependencies (clock)
/// - `Record`: The persisted record carried by [`Effect::Persist`]
pub trait Reducer {
    /// The state type this reducer operates on
    type State;

    /// The action type this reducer processes
    type Action;

    /// The environment type with injected dependencies
    type Environment;

    /// The record type persisted through effects
    type Record;

    /// Reduce an action into state changes and effects.
    fn reduce(
        &self,
        state: &mut Self::State,
        action: Self::Action,
        env: &Self::Environment,
    ) -> Effects<Self::Record>;
}

/// Clock trait, abstracts time for testability
pub trait Clock: Send + Sync {
    /// Get the current time
    fn now(&self) -> DateTime<Utc>;
}

/// Clock backed by the system time
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}
