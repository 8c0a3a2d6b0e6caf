//! Presentation and UI sinks.
//!
//! The simulation never talks to an animator or a HUD directly. It records
//! [`Event`]s, and the host forwards them to a [`CombatSink`] with
//! [`dispatch`]. Cues are fire-and-forget: a sink that ignores them changes
//! nothing about the simulation.

use crate::actor::ActorId;
use crate::output::{Cue, Event, OutputEnvelope};
use crate::vitals::VitalFractions;

/// Receiver for presentation cues and vitals pushes.
///
/// # Example
///
/// ```
/// use ashen_core::actor::ActorId;
/// use ashen_core::output::{Cue, Event};
/// use ashen_core::sink::{dispatch_events, CombatSink};
/// use ashen_core::vitals::VitalFractions;
///
/// #[derive(Default)]
/// struct Animator {
///     played: Vec<String>,
/// }
///
/// impl CombatSink for Animator {
///     fn play_cue(&mut self, _actor: ActorId, cue: Cue) {
///         self.played.push(cue.to_string());
///     }
///
///     fn vitals_changed(&mut self, _actor: ActorId, _fractions: VitalFractions) {}
/// }
///
/// let mut animator = Animator::default();
/// dispatch_events(&mut animator, &[Event::cue(ActorId::new(0), Cue::Roll)]);
/// assert_eq!(animator.played, vec!["Rolling"]);
/// ```
pub trait CombatSink {
    /// Plays a cue on `actor`'s presentation.
    fn play_cue(&mut self, actor: ActorId, cue: Cue);

    /// Pushes new health/poise/stamina fractions for `actor` to the UI.
    fn vitals_changed(&mut self, actor: ActorId, fractions: VitalFractions);

    /// Receives every other event. Ignored by default.
    fn other_event(&mut self, _event: &Event) {}
}

/// Forwards events to `sink` in order.
pub fn dispatch_events<'a, S>(sink: &mut S, events: impl IntoIterator<Item = &'a Event>)
where
    S: CombatSink + ?Sized,
{
    for event in events {
        match *event {
            Event::Cue { actor, cue } => sink.play_cue(actor, cue),
            Event::VitalsChanged { actor, fractions } => sink.vitals_changed(actor, fractions),
            ref other => sink.other_event(other),
        }
    }
}

/// Forwards recorded envelopes to `sink` in order.
pub fn dispatch<S>(sink: &mut S, envelopes: &[OutputEnvelope])
where
    S: CombatSink + ?Sized,
{
    dispatch_events(
        sink,
        envelopes.iter().filter_map(|e| e.output().as_event()),
    );
}
