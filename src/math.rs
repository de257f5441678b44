//! Math utilities for aim-cone tests and distance ranking.

use bevy::prelude::*;

/// Threshold for considering vectors as zero-length.
const EPSILON: f32 = 1e-6;

/// Angle in degrees between `a` and `b`.
///
/// Returns `None` when either vector is (near) zero-length, since the angle is
/// undefined there.
pub fn angle_between_degrees(a: Vec3, b: Vec3) -> Option<f32> {
    let a = a.normalize_or_zero();
    let b = b.normalize_or_zero();
    if a.length_squared() < EPSILON || b.length_squared() < EPSILON {
        return None;
    }

    // Clamp so rounding on nearly parallel vectors cannot push acos out of range.
    Some(a.dot(b).clamp(-1.0, 1.0).acos().to_degrees())
}

/// Distance between two points, compared against a radius without a square root.
pub fn closer_than(a: Vec3, b: Vec3, radius: f32) -> bool {
    a.distance_squared(b) < radius * radius
}

/// Distance between two points is strictly greater than `radius`.
pub fn farther_than(a: Vec3, b: Vec3, radius: f32) -> bool {
    a.distance_squared(b) > radius * radius
}
