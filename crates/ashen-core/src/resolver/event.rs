//! Event resolver for presentation and UI sinks.
//!
//! The `EventResolver` captures event outputs without mutating the arena.
//! The simulation also records the feedback events produced by the other
//! resolvers here, so one drain via `take_events()` yields everything that
//! happened during a tick in resolution order.

use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::arena::Arena;
use crate::output::{Event, OutputEnvelope, OutputKind};

use super::{ResolveContext, Resolver};

/// Resolver that records event outputs.
///
/// # Thread Safety
///
/// The log sits behind a `Mutex` to satisfy the `Send + Sync` bound of
/// [`Resolver`], although it is only touched from the simulation thread.
///
/// # Example
///
/// ```
/// use ashen_core::resolver::{EventResolver, Resolver};
/// use ashen_core::output::OutputKind;
///
/// let resolver = EventResolver::new();
/// assert!(resolver.handles().contains(&OutputKind::Event));
/// assert!(resolver.take_events().is_empty());
/// ```
#[derive(Debug, Default)]
pub struct EventResolver {
    event_log: Mutex<Vec<OutputEnvelope>>,
}

impl EventResolver {
    /// Creates a new event resolver with an empty log.
    #[must_use]
    pub fn new() -> Self {
        Self {
            event_log: Mutex::new(Vec::new()),
        }
    }

    fn log(&self) -> MutexGuard<'_, Vec<OutputEnvelope>> {
        // The log holds plain data; a panic mid-push cannot break it.
        self.event_log
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Appends envelopes that did not come from the decide phase.
    pub fn record(&self, envelopes: impl IntoIterator<Item = OutputEnvelope>) {
        self.log().extend(envelopes);
    }

    /// Drains and returns all recorded events in recording order.
    pub fn take_events(&self) -> Vec<OutputEnvelope> {
        std::mem::take(&mut *self.log())
    }

    /// Returns the number of events currently in the log.
    #[must_use]
    pub fn event_count(&self) -> usize {
        self.log().len()
    }

    /// Returns true if the event log is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.log().is_empty()
    }

    /// Clears all events from the log without returning them.
    pub fn clear(&self) {
        self.log().clear();
    }
}

impl Resolver for EventResolver {
    fn handles(&self) -> &[OutputKind] {
        &[OutputKind::Event]
    }

    fn resolve(
        &self,
        _ctx: &ResolveContext,
        outputs: &[&OutputEnvelope],
        _arena: &mut Arena,
        _emitted: &mut Vec<Event>,
    ) {
        self.record(
            outputs
                .iter()
                .filter(|e| e.kind() == OutputKind::Event)
                .map(|e| (*e).clone()),
        );
    }
}
