//! Target selection from spatial query results.
//!
//! A cast returns every body near the aim ray. Selection narrows that down to
//! one candidate and then resolves the entity that actually carries the
//! [`Interactable`](crate::Interactable) capability, which may sit one level
//! up the hierarchy from the collider that was hit.

use bevy::log::debug;
use bevy::prelude::*;

use crate::math::angle_between_degrees;

/// Default maximum angle (degrees) between the aim direction and a target.
pub const DEFAULT_MAX_ANGLE_DEGREES: f32 = 20.0;

/// How many parent levels are searched for the interactable capability.
///
/// Only the immediate parent is searched by default.
pub const DEFAULT_PARENT_SEARCH_DEPTH: usize = 1;

/// A body reported by a spatial query, with its world position.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Candidate {
    /// The body (collider) that was hit.
    pub body: Entity,
    /// World-space position of the body.
    pub position: Vec3,
}

impl Candidate {
    /// Creates a candidate.
    pub fn new(body: Entity, position: Vec3) -> Self {
        Self { body, position }
    }
}

/// Read access to the scene facts needed to resolve a candidate.
pub trait CapabilityLookup {
    /// Whether `entity` itself can be targeted and grabbed.
    fn is_interactable(&self, entity: Entity) -> bool;

    /// The structural parent of `entity`, if it has one.
    fn parent(&self, entity: Entity) -> Option<Entity>;
}

/// Picks the closest candidate within `max_angle_degrees` of `forward`.
///
/// Candidates whose direction from `origin` is undefined (coincident with the
/// origin) or when `forward` is zero are skipped. Equal distances keep the
/// earliest candidate.
pub fn nearest_in_cone(
    candidates: &[Candidate],
    origin: Vec3,
    forward: Vec3,
    max_angle_degrees: f32,
) -> Option<&Candidate> {
    let mut best: Option<&Candidate> = None;
    let mut best_distance = f32::INFINITY;

    for candidate in candidates {
        let to_target = candidate.position - origin;
        let Some(angle) = angle_between_degrees(to_target, forward) else {
            continue;
        };
        if angle > max_angle_degrees {
            debug!(
                "body {:?} outside of hand influence ({angle:.1}° > {max_angle_degrees:.1}°)",
                candidate.body
            );
            continue;
        }

        let distance = to_target.length_squared();
        if distance < best_distance {
            best_distance = distance;
            best = Some(candidate);
        }
    }

    best
}

/// Picks the candidate closest to `point`, with no angular filter.
pub fn nearest_to_point(candidates: &[Candidate], point: Vec3) -> Option<&Candidate> {
    let mut best: Option<&Candidate> = None;
    let mut best_distance = f32::INFINITY;

    for candidate in candidates {
        let distance = candidate.position.distance_squared(point);
        if distance < best_distance {
            best_distance = distance;
            best = Some(candidate);
        }
    }

    best
}

/// Finds the interactable for `body`, checking the body and then up to
/// `max_depth` ancestors.
pub fn resolve_interactable(
    lookup: &impl CapabilityLookup,
    body: Entity,
    max_depth: usize,
) -> Option<Entity> {
    let mut entity = body;
    for _ in 0..max_depth {
        if lookup.is_interactable(entity) {
            return Some(entity);
        }
        entity = lookup.parent(entity)?;
    }
    lookup.is_interactable(entity).then_some(entity)
}

/// Angular/distance policy for picking the hovered interactable.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TargetSelector {
    /// Candidates further off-axis than this are ignored.
    pub max_angle_degrees: f32,
    /// Parent levels searched when the hit body is not interactable itself.
    pub parent_search_depth: usize,
}

impl Default for TargetSelector {
    fn default() -> Self {
        Self {
            max_angle_degrees: DEFAULT_MAX_ANGLE_DEGREES,
            parent_search_depth: DEFAULT_PARENT_SEARCH_DEPTH,
        }
    }
}

impl TargetSelector {
    /// Best interactable inside the aim cone, or `None`.
    pub fn select(
        &self,
        candidates: &[Candidate],
        origin: Vec3,
        forward: Vec3,
        lookup: &impl CapabilityLookup,
    ) -> Option<Entity> {
        let winner = nearest_in_cone(candidates, origin, forward, self.max_angle_degrees)?;
        resolve_interactable(lookup, winner.body, self.parent_search_depth)
    }

    /// Best interactable around a ray hit point, or `None`.
    pub fn select_near_point(
        &self,
        candidates: &[Candidate],
        point: Vec3,
        lookup: &impl CapabilityLookup,
    ) -> Option<Entity> {
        let winner = nearest_to_point(candidates, point)?;
        resolve_interactable(lookup, winner.body, self.parent_search_depth)
    }
}
