//! Spatial components shared by every actor.

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Planar position, facing and velocity.
///
/// Headings are radians counter-clockwise from +X. The arena owns this state
/// on behalf of the host's transform system; movement is only ever applied
/// through a [`crate::resolver::Locomotion`] implementation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct TransformState {
    /// World position.
    pub position: Vec2,
    /// Facing in radians.
    pub heading: f32,
    /// Velocity applied by the last locomotion command, in units per second.
    pub velocity: Vec2,
}

impl TransformState {
    /// Creates a stationary transform.
    #[must_use]
    pub const fn at(position: Vec2, heading: f32) -> Self {
        Self {
            position,
            heading,
            velocity: Vec2::ZERO,
        }
    }

    /// Unit vector along the facing.
    #[must_use]
    pub fn forward(&self) -> Vec2 {
        Vec2::from_angle(self.heading)
    }

    /// Unit vector 90 degrees clockwise of the facing.
    #[must_use]
    pub fn right(&self) -> Vec2 {
        -self.forward().perp()
    }

    /// Unit direction towards `point`, or zero when already there.
    #[must_use]
    pub fn direction_to(&self, point: Vec2) -> Vec2 {
        (point - self.position).normalize_or_zero()
    }

    /// Distance to `point`.
    #[must_use]
    pub fn distance_to(&self, point: Vec2) -> f32 {
        self.position.distance(point)
    }
}
