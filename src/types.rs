//! Core types for the flick-grab plugin.
//!
//! This module contains the components, settings and enums used to configure
//! hands and interactables and to talk to the physics bridge.

use bevy::prelude::*;
use std::fmt;

use crate::attraction::{AttractionTuning, BodyProxy, HandLink};
use crate::gesture::GestureDetector;
use crate::query::{CastHits, CastRequest, CastShape, DEFAULT_CAST_DISTANCE};
use crate::rig::HandRig;
use crate::selection::{DEFAULT_MAX_ANGLE_DEGREES, DEFAULT_PARENT_SEARCH_DEPTH};

/// Which hand a controller is held in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Handedness {
    /// The left hand.
    Left,
    /// The right hand.
    #[default]
    Right,
}

impl fmt::Display for Handedness {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Handedness::Left => f.write_str("Left"),
            Handedness::Right => f.write_str("Right"),
        }
    }
}

/// Identifies which axis (X, Y, or Z) of a vector is sampled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GestureAxis {
    /// The X axis (controller pitch for most runtimes).
    X,
    /// The Y axis.
    Y,
    /// The Z axis.
    Z,
}

impl GestureAxis {
    /// The component of `v` along this axis.
    pub fn component(self, v: Vec3) -> f32 {
        match self {
            GestureAxis::X => v.x,
            GestureAxis::Y => v.y,
            GestureAxis::Z => v.z,
        }
    }
}

/// How a force is applied to a body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ForceMode {
    /// Continuous acceleration, independent of mass. Gravity and contacts
    /// still act on the body.
    Acceleration,
    /// Instant change of velocity, independent of mass.
    VelocityChange,
}

/// How hands find their hover target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TargetingMode {
    /// Nearest candidate inside the aim cone around the hand.
    #[default]
    Cone,
    /// Nearest candidate around the point the aim ray hits. Hover changes
    /// also hover-lock the new target.
    RayOverlap,
}

impl fmt::Display for TargetingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TargetingMode::Cone => f.write_str("Cone"),
            TargetingMode::RayOverlap => f.write_str("RayOverlap"),
        }
    }
}

/// Digital inputs relevant to flick-grab, resolved for one hand.
///
/// Unbound actions stay `false`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct HandInput {
    /// The pinch/grab action is held.
    pub grab: bool,
    /// The teleport action is held; targeting pauses meanwhile.
    pub teleport: bool,
}

/// A tracked hand that can flick-grab interactables.
///
/// The aim pose is read from the entity's [`GlobalTransform`]: translation is
/// the ray origin and [`GlobalTransform::forward`] the aim direction. Everything
/// except the hover-lock slot is owned by the application's XR/input layer and
/// only read here.
///
/// # Example
///
/// ```ignore
/// commands.spawn((
///     Transform::default(),
///     GrabHand::new(Handedness::Left),
/// ));
/// ```
#[derive(Component, Debug, Clone, Default)]
#[require(HandRig, CastRequest, CastHits)]
pub struct GrabHand {
    /// Which hand this is.
    pub handedness: Handedness,
    /// Current input state.
    pub input: HandInput,
    /// Angular velocity of the controller, in rad/s, in tracking space.
    pub angular_velocity: Vec3,
    /// What the hand is holding through a regular grab.
    pub attached_object: Option<Entity>,
    /// What the hand's own proximity hover currently points at.
    pub hovering: Option<Entity>,
    hover_lock: Option<Entity>,
}

impl GrabHand {
    /// Creates an empty hand.
    pub fn new(handedness: Handedness) -> Self {
        Self {
            handedness,
            ..default()
        }
    }

    /// The entity this hand has hover-locked, if any.
    pub fn hover_locked(&self) -> Option<Entity> {
        self.hover_lock
    }
}

impl HandLink for GrabHand {
    fn attached_object(&self) -> Option<Entity> {
        self.attached_object
    }

    fn hover_lock(&mut self, entity: Entity) {
        self.hover_lock = Some(entity);
        self.hovering = Some(entity);
    }

    /// Drops the lock only. `hovering` is the hand's own proximity hover and
    /// stays as it is, so [`HandLink::is_still_hovering`] keeps answering for it.
    fn hover_unlock(&mut self, entity: Entity) {
        if self.hover_lock == Some(entity) {
            self.hover_lock = None;
        }
    }

    fn is_still_hovering(&self, entity: Entity) -> bool {
        self.hovering == Some(entity)
    }
}

/// Marks an entity as something a hand can target and grab.
///
/// Colliders may sit on a child entity; the parent is checked when the hit
/// body itself has no `Interactable`.
#[derive(Component, Debug, Clone, Copy, Default)]
pub struct Interactable;

/// A request recorded on an [`AttractableBody`] for the physics bridge.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BodyCommand {
    /// Replace the linear velocity.
    SetVelocity(Vec3),
    /// Apply a force.
    AddForce {
        /// Force vector.
        force: Vec3,
        /// How to apply it.
        mode: ForceMode,
    },
}

/// Physics proxy of an interactable that can be attracted.
///
/// The physics bridge mirrors the engine velocity into `linear_velocity`
/// before [`FlickGrabSet::Attraction`] runs and applies the queued
/// [`BodyCommand`]s after it. The queue grows on every fixed tick of a
/// session, so the bridge must call [`AttractableBody::drain_commands`] once
/// per frame.
#[derive(Component, Debug, Clone, Default)]
pub struct AttractableBody {
    /// Linear velocity as last reported by the physics engine.
    pub linear_velocity: Vec3,
    commands: Vec<BodyCommand>,
}

impl AttractableBody {
    /// Commands queued since the last drain.
    pub fn pending(&self) -> &[BodyCommand] {
        &self.commands
    }

    /// Removes and returns the queued commands, oldest first.
    pub fn drain_commands(&mut self) -> std::vec::Drain<'_, BodyCommand> {
        self.commands.drain(..)
    }
}

/// An [`AttractableBody`] paired with the world position of its entity.
pub struct BodyHandle<'a> {
    position: Vec3,
    body: &'a mut AttractableBody,
}

impl<'a> BodyHandle<'a> {
    /// Wraps `body` located at `transform`.
    pub fn new(transform: &GlobalTransform, body: &'a mut AttractableBody) -> Self {
        Self {
            position: transform.translation(),
            body,
        }
    }
}

impl BodyProxy for BodyHandle<'_> {
    fn position(&self) -> Vec3 {
        self.position
    }

    fn velocity(&self) -> Vec3 {
        self.body.linear_velocity
    }

    fn set_velocity(&mut self, velocity: Vec3) {
        self.body.linear_velocity = velocity;
        self.body.commands.push(BodyCommand::SetVelocity(velocity));
    }

    fn apply_force(&mut self, force: Vec3, mode: ForceMode) {
        if mode == ForceMode::VelocityChange {
            self.body.linear_velocity += force;
        }
        self.body.commands.push(BodyCommand::AddForce { force, mode });
    }
}

/// System sets used by the plugin in `Update`, in execution order.
#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub enum FlickGrabSet {
    /// Cast requests are published and answered.
    Cast,
    /// Hover targets are selected and hover notices sent.
    Targeting,
    /// Flicks are detected and sessions advanced.
    Attraction,
}

/// Tuning for targeting, gesture detection and attraction.
///
/// Modify this resource at runtime to change behaviour for all hands.
#[derive(Resource, Clone, Debug)]
pub struct FlickGrabSettings {
    /// How hover targets are found.
    pub targeting: TargetingMode,
    /// Volume swept along the aim ray.
    pub cast_shape: CastShape,
    /// Length of the aim cast (in world units).
    pub max_distance: f32,
    /// Collision layer mask for the aim cast.
    pub layers: u32,
    /// Targets further off the aim direction are ignored (in degrees).
    /// Only used by [`TargetingMode::Cone`].
    pub max_angle_degrees: f32,
    /// Parent levels searched for [`Interactable`] above the hit body.
    pub parent_search_depth: usize,
    /// Flick detection.
    pub gesture: GestureDetector,
    /// Pull and capture tuning.
    pub attraction: AttractionTuning,
}

impl Default for FlickGrabSettings {
    fn default() -> Self {
        Self {
            targeting: TargetingMode::default(),
            cast_shape: CastShape::default(),
            max_distance: DEFAULT_CAST_DISTANCE,
            layers: u32::MAX,
            max_angle_degrees: DEFAULT_MAX_ANGLE_DEGREES,
            parent_search_depth: DEFAULT_PARENT_SEARCH_DEPTH,
            gesture: GestureDetector::default(),
            attraction: AttractionTuning::default(),
        }
    }
}
