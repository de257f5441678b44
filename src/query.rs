//! Boundary to the physics engine's volumetric casts.
//!
//! Each hand publishes a [`CastRequest`] describing what it wants to look at.
//! The application answers it through a [`SpatialQuery`] implementation (see
//! [`cast_with`](crate::cast_with)) or by writing [`CastHits`] from its own
//! physics bridge before [`FlickGrabSet::Targeting`](crate::FlickGrabSet).

use bevy::prelude::*;

use crate::selection::Candidate;

/// Default sweep radius of the aim cast.
pub const DEFAULT_CAST_RADIUS: f32 = 0.5;

/// Default length of the aim cast.
pub const DEFAULT_CAST_DISTANCE: f32 = 4.0;

/// Volume swept along the aim ray.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CastShape {
    /// A sphere of the given radius.
    Sphere {
        /// Sphere radius.
        radius: f32,
    },
    /// A cone opening from the origin.
    Cone {
        /// Half-angle of the cone, in degrees.
        half_angle_degrees: f32,
    },
    /// An axis-aligned box.
    Box {
        /// Half-size of the box on each axis.
        half_extents: Vec3,
    },
}

impl Default for CastShape {
    fn default() -> Self {
        CastShape::Sphere {
            radius: DEFAULT_CAST_RADIUS,
        }
    }
}

/// The cast a hand wants answered this tick.
#[derive(Component, Debug, Clone, Copy, PartialEq)]
pub struct CastRequest {
    /// World-space start of the cast.
    pub origin: Vec3,
    /// Unit direction of the cast. Zero when the aim pose is degenerate.
    pub direction: Vec3,
    /// Swept volume.
    pub shape: CastShape,
    /// Maximum travel along `direction`.
    pub max_distance: f32,
    /// Collision layer mask.
    pub layers: u32,
}

impl Default for CastRequest {
    fn default() -> Self {
        Self {
            origin: Vec3::ZERO,
            direction: Vec3::ZERO,
            shape: CastShape::default(),
            max_distance: DEFAULT_CAST_DISTANCE,
            layers: u32::MAX,
        }
    }
}

impl CastRequest {
    /// Whether the request has a usable direction.
    pub fn is_valid(&self) -> bool {
        self.direction.length_squared() > 0.0 && self.max_distance > 0.0
    }
}

/// Bodies found by the latest cast.
#[derive(Component, Debug, Clone, Default, PartialEq)]
pub struct CastHits {
    /// Everything the cast touched, in the order the engine reported it.
    pub candidates: Vec<Candidate>,
    /// Where the aim ray itself first hit, for ray-overlap targeting.
    pub hit_point: Option<Vec3>,
}

impl CastHits {
    /// Hits with the given candidates and no ray hit point.
    pub fn from_candidates(candidates: Vec<Candidate>) -> Self {
        Self {
            candidates,
            hit_point: None,
        }
    }

    /// Drops all results.
    pub fn clear(&mut self) {
        self.candidates.clear();
        self.hit_point = None;
    }
}

/// A physics backend able to answer [`CastRequest`]s.
pub trait SpatialQuery {
    /// Runs the cast. Must never fail; an empty result means nothing was hit.
    fn cast(&self, request: &CastRequest) -> CastHits;
}
