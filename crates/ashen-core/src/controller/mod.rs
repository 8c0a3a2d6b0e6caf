//! Controllers decide what an actor does each tick.
//!
//! A controller reads the frozen [`crate::world_view::WorldView`], requests
//! transitions on its actor's action machine through [`crate::actor::Body`]
//! and emits movement commands and presentation events as
//! [`crate::output::Output`]s.
//!
//! - [`PlayerBrain`] turns latched [`PlayerInput`] into actions.
//! - [`BossBrain`] runs the boss's priority-ordered decision policy.

pub mod boss;
pub mod player;

use serde::{Deserialize, Serialize};

use crate::actor::ActorId;
use crate::output::{Cue, Event, Output};

pub use boss::{BossBrain, BossConfig, Strafe};
pub use player::{LockOnConfig, PlayerBrain, PlayerConfig, PlayerInput};

/// Below this speed difference the locomotion cue is not re-sent.
const SPEED_CUE_TOLERANCE: f32 = 1e-3;

/// Squared length under which a movement vector counts as "no input".
pub(crate) const MOVE_DEADZONE_SQ: f32 = 1e-6;

/// Emits a [`Cue::Locomotion`] only when the commanded speed changes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SpeedCue {
    last: Option<f32>,
}

impl SpeedCue {
    /// Last speed sent to the presentation layer.
    #[must_use]
    pub const fn last(&self) -> Option<f32> {
        self.last
    }

    /// Pushes a locomotion cue for `actor` if `speed` differs from the last one.
    pub fn update(&mut self, actor: ActorId, speed: f32, out: &mut Vec<Output>) {
        if self
            .last
            .is_some_and(|last| (last - speed).abs() < SPEED_CUE_TOLERANCE)
        {
            return;
        }
        self.last = Some(speed);
        out.push(Event::cue(actor, Cue::Locomotion { speed }).into());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn speed_cue_fires_on_change_only() {
        let mut cue = SpeedCue::default();
        let mut out = Vec::new();
        let id = ActorId::new(1);

        cue.update(id, 0.0, &mut out);
        cue.update(id, 0.0, &mut out);
        cue.update(id, 6.0, &mut out);
        cue.update(id, 6.0, &mut out);

        assert_eq!(out.len(), 2);
        assert_eq!(cue.last(), Some(6.0));
    }
}
