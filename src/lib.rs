//! Flick-to-grab plugin for Bevy 0.18.
//!
//! This crate lets a tracked VR hand aim at a distant object, get hover
//! feedback on it, and pull it in with a quick wrist flick so a regular grab
//! can take over once it arrives.
//!
//! # Quick Start
//!
//! ```ignore
//! use bevy::prelude::*;
//! use bevy_flick_grab::{
//!     AttractableBody, FlickGrabPlugin, GrabHand, Handedness, Interactable, SpatialQueryPlugin,
//! };
//!
//! fn main() {
//!     App::new()
//!         .add_plugins(DefaultPlugins)
//!         .add_plugins(FlickGrabPlugin)
//!         // `MyPhysicsQuery` implements `SpatialQuery` on top of your physics engine.
//!         .add_plugins(SpatialQueryPlugin::<MyPhysicsQuery>::default())
//!         .add_systems(Startup, setup)
//!         .run();
//! }
//!
//! fn setup(mut commands: Commands) {
//!     // A controller; your XR layer keeps its transform, input and
//!     // angular velocity up to date.
//!     commands.spawn((Transform::default(), GrabHand::new(Handedness::Right)));
//!
//!     // Something that can be pulled in.
//!     commands.spawn((
//!         // ... your mesh, collider and rigid body ...
//!         Transform::from_xyz(0.0, 0.5, -3.0),
//!         Interactable,
//!         AttractableBody::default(),
//!     ));
//! }
//! ```
//!
//! # How it works
//!
//! Every frame each [`GrabHand`] publishes a [`CastRequest`]. The physics
//! backend answers it with [`CastHits`]. The best hit becomes the hand's hover
//! target, and every change is announced through [`HoverNotice`]. While the
//! grab input is held, a flick past the [`GestureDetector`] threshold launches
//! the hovered body at the hand. The body is pulled on the fixed tick until it
//! gets close, then hover-locked on arrival. The session always ends on a
//! regular grab or after the let-go timeout.
//!
//! # Configuration
//!
//! - [`FlickGrabSettings`]: targeting mode, cast shape, aim cone, gesture and pull tuning
//! - [`HoverListeners`]: callbacks for hover changes outside the ECS schedule

#![warn(missing_docs)]

use bevy::prelude::*;

mod attraction;
mod gesture;
mod hover;
mod interaction;
mod listeners;
mod math;
mod query;
mod rig;
mod selection;
mod types;

// Re-export all public types
pub use attraction::{
    AttractionController, AttractionSession, AttractionState, AttractionStep, AttractionTuning,
    BodyProxy, HandLink, ReleaseReason,
};
pub use gesture::{is_attraction_gesture, GestureDetector};
pub use hover::{HoverTracker, HoverTransition};
pub use interaction::{cast_with, publish_cast_requests, SpatialQueryPlugin};
pub use listeners::{AttractionNotice, HoverListeners, HoverNotice, ListenerId};
pub use query::{CastHits, CastRequest, CastShape, SpatialQuery};
pub use rig::{AimPose, HandRig};
pub use selection::{
    nearest_in_cone, nearest_to_point, resolve_interactable, Candidate, CapabilityLookup,
    TargetSelector,
};
pub use types::{
    AttractableBody, BodyCommand, BodyHandle, FlickGrabSet, FlickGrabSettings, ForceMode,
    GestureAxis, GrabHand, HandInput, Handedness, Interactable, TargetingMode,
};

use crate::interaction::{drive_attraction, pull_attracted_bodies, update_hover_targets};

/// Plugin that enables flick-to-grab for every [`GrabHand`].
///
/// Registers the settings and listener resources, the notice messages and
/// the targeting/attraction systems. Cast results still have to come from
/// the application, either through [`SpatialQueryPlugin`] or by writing
/// [`CastHits`] in [`FlickGrabSet::Cast`].
///
/// # Example
///
/// ```ignore
/// use bevy::prelude::*;
/// use bevy_flick_grab::FlickGrabPlugin;
///
/// App::new()
///     .add_plugins(DefaultPlugins)
///     .add_plugins(FlickGrabPlugin)
///     .run();
/// ```
pub struct FlickGrabPlugin;

impl Plugin for FlickGrabPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<FlickGrabSettings>()
            .init_resource::<HoverListeners>()
            .add_message::<HoverNotice>()
            .add_message::<AttractionNotice>()
            .configure_sets(
                Update,
                (
                    FlickGrabSet::Cast,
                    FlickGrabSet::Targeting,
                    FlickGrabSet::Attraction,
                )
                    .chain(),
            )
            .add_systems(
                Update,
                (
                    publish_cast_requests.in_set(FlickGrabSet::Cast),
                    update_hover_targets.in_set(FlickGrabSet::Targeting),
                    drive_attraction.in_set(FlickGrabSet::Attraction),
                ),
            )
            .add_systems(FixedUpdate, pull_attracted_bodies);
    }
}
