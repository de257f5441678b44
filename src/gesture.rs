//! Flick detection from controller angular velocity.
//!
//! A flick is a single-sample threshold test: one angular velocity reading past
//! the threshold on the chosen axis is enough to trigger. There is no debounce
//! window, so a single noisy sample can also trigger.

use bevy::prelude::*;

use crate::types::GestureAxis;

/// Default angular velocity (rad/s) a flick must drop below.
pub const DEFAULT_FLICK_THRESHOLD: f32 = -4.0;

/// Classifies angular velocity samples as attraction gestures.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GestureDetector {
    /// Axis of the angular velocity vector that is sampled.
    pub axis: GestureAxis,
    /// The sampled component must be strictly below this value.
    pub threshold: f32,
}

impl GestureDetector {
    /// Creates a detector for the given axis and threshold.
    pub fn new(axis: GestureAxis, threshold: f32) -> Self {
        Self { axis, threshold }
    }

    /// Whether this sample counts as a flick.
    pub fn is_attraction_gesture(&self, angular_velocity: Vec3) -> bool {
        is_attraction_gesture(angular_velocity, self.axis, self.threshold)
    }
}

impl Default for GestureDetector {
    fn default() -> Self {
        Self {
            axis: GestureAxis::X,
            threshold: DEFAULT_FLICK_THRESHOLD,
        }
    }
}

/// True iff the `axis` component of `angular_velocity` is below `threshold`.
pub fn is_attraction_gesture(angular_velocity: Vec3, axis: GestureAxis, threshold: f32) -> bool {
    axis.component(angular_velocity) < threshold
}
