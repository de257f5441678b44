//! Hand interaction systems.
//!
//! This module wires [`HandRig`] into the schedule: publishing cast requests,
//! turning cast hits into hover notices, detecting flicks, advancing sessions
//! and pulling bodies on the fixed tick.

use std::marker::PhantomData;

use bevy::log::debug;
use bevy::prelude::*;

use crate::attraction::ReleaseReason;
use crate::listeners::{AttractionNotice, HoverListeners, HoverNotice};
use crate::query::{CastHits, CastRequest, SpatialQuery};
use crate::rig::{AimPose, HandRig};
use crate::selection::CapabilityLookup;
use crate::types::{
    AttractableBody, BodyHandle, FlickGrabSet, FlickGrabSettings, GrabHand, Interactable,
};

/// Scene hierarchy and markers, seen through system queries.
struct SceneCapabilities<'a, 'w, 's> {
    interactables: &'a Query<'w, 's, (), With<Interactable>>,
    parents: &'a Query<'w, 's, &'static ChildOf>,
}

impl CapabilityLookup for SceneCapabilities<'_, '_, '_> {
    fn is_interactable(&self, entity: Entity) -> bool {
        self.interactables.contains(entity)
    }

    fn parent(&self, entity: Entity) -> Option<Entity> {
        self.parents.get(entity).ok().map(|child_of| child_of.parent())
    }
}

/// Describe this tick's aim cast on every hand.
pub fn publish_cast_requests(
    settings: Res<FlickGrabSettings>,
    mut hands: Query<(&GlobalTransform, &mut CastRequest), With<GrabHand>>,
) {
    for (transform, mut request) in hands.iter_mut() {
        let aim = AimPose::from_transform(transform);
        *request = CastRequest {
            origin: aim.position,
            direction: aim.forward.normalize_or_zero(),
            shape: settings.cast_shape,
            max_distance: settings.max_distance,
            layers: settings.layers,
        };
    }
}

/// Answer every hand's [`CastRequest`] with the `Q` resource.
pub fn cast_with<Q: SpatialQuery + Resource>(
    query: Res<Q>,
    mut hands: Query<(&CastRequest, &mut CastHits), With<GrabHand>>,
) {
    for (request, mut hits) in hands.iter_mut() {
        if request.is_valid() {
            *hits = query.cast(request);
        } else {
            hits.clear();
        }
    }
}

/// Plugin answering cast requests through a [`SpatialQuery`] resource `Q`.
///
/// The application inserts `Q` itself; this only schedules [`cast_with`]
/// right after the requests are published.
pub struct SpatialQueryPlugin<Q>(PhantomData<fn() -> Q>);

impl<Q> Default for SpatialQueryPlugin<Q> {
    fn default() -> Self {
        Self(PhantomData)
    }
}

impl<Q: SpatialQuery + Resource> Plugin for SpatialQueryPlugin<Q> {
    fn build(&self, app: &mut App) {
        app.add_systems(
            Update,
            cast_with::<Q>
                .in_set(FlickGrabSet::Cast)
                .after(publish_cast_requests),
        );
    }
}

/// Select each hand's hover target and broadcast enter/exit changes.
pub fn update_hover_targets(
    settings: Res<FlickGrabSettings>,
    listeners: Res<HoverListeners>,
    mut notices: MessageWriter<HoverNotice>,
    mut hands: Query<(Entity, &GlobalTransform, &mut GrabHand, &mut HandRig, &CastHits)>,
    interactables: Query<(), With<Interactable>>,
    parents: Query<&'static ChildOf>,
) {
    let lookup = SceneCapabilities {
        interactables: &interactables,
        parents: &parents,
    };

    for (hand_entity, transform, mut hand, mut rig, hits) in hands.iter_mut() {
        let input = hand.input;
        let transition = rig.update_hover(
            &settings,
            AimPose::from_transform(transform),
            hits,
            input,
            &mut *hand,
            &lookup,
        );

        if let Some(entity) = transition.exited {
            let notice = HoverNotice::End {
                entity,
                hand: hand_entity,
            };
            listeners.notify(&notice);
            notices.write(notice);
        }
        if let Some(entity) = transition.entered {
            debug!("{} hand hovering {entity:?}", hand.handedness);
            let notice = HoverNotice::Begin {
                entity,
                hand: hand_entity,
            };
            listeners.notify(&notice);
            notices.write(notice);
        }
    }
}

/// Start sessions on flicks and advance running sessions.
pub fn drive_attraction(
    settings: Res<FlickGrabSettings>,
    time: Res<Time>,
    mut notices: MessageWriter<AttractionNotice>,
    mut hands: Query<(Entity, &GlobalTransform, &mut GrabHand, &mut HandRig)>,
    mut bodies: Query<(&GlobalTransform, &mut AttractableBody)>,
) {
    let now = time.elapsed_secs_f64();

    for (hand_entity, transform, mut hand, mut rig) in hands.iter_mut() {
        let hand_position = transform.translation();

        if let Some(target) =
            rig.flick_target(&settings, hand.input, hand.angular_velocity, &*hand)
        {
            let started = match bodies.get_mut(target) {
                Ok((body_transform, mut body)) => {
                    let mut handle = BodyHandle::new(body_transform, &mut body);
                    rig.start_attraction(&settings, target, Some(&mut handle), hand_position, now)
                }
                Err(_) => rig.start_attraction(&settings, target, None, hand_position, now),
            };
            if started {
                notices.write(AttractionNotice::Started {
                    target,
                    hand: hand_entity,
                });
            }
        }

        let Some(target) = rig.attraction().target() else {
            continue;
        };
        let step = match bodies.get_mut(target) {
            Ok((body_transform, mut body)) => {
                let handle = BodyHandle::new(body_transform, &mut body);
                rig.update_attraction(&settings, &mut *hand, hand_position, Some(&handle), now)
            }
            Err(_) => rig.update_attraction(&settings, &mut *hand, hand_position, None, now),
        };

        if let Some(target) = step.arrived {
            notices.write(AttractionNotice::Arrived {
                target,
                hand: hand_entity,
            });
        }
        if let Some((target, reason)) = step.released {
            notices.write(AttractionNotice::Released {
                target,
                hand: hand_entity,
                reason,
            });
        }
    }
}

/// Keep pulling attracted bodies toward their hands on the fixed tick.
pub fn pull_attracted_bodies(
    settings: Res<FlickGrabSettings>,
    mut notices: MessageWriter<AttractionNotice>,
    mut hands: Query<(Entity, &GlobalTransform, &mut GrabHand, &mut HandRig)>,
    mut bodies: Query<(&GlobalTransform, &mut AttractableBody)>,
) {
    for (hand_entity, transform, mut hand, mut rig) in hands.iter_mut() {
        let Some(target) = rig.attraction().target() else {
            continue;
        };
        let hand_position = transform.translation();

        match bodies.get_mut(target) {
            Ok((body_transform, mut body)) => {
                let mut handle = BodyHandle::new(body_transform, &mut body);
                rig.pull(&settings, &mut *hand, hand_position, Some(&mut handle));
            }
            Err(_) => {
                rig.pull(&settings, &mut *hand, hand_position, None);
                notices.write(AttractionNotice::Released {
                    target,
                    hand: hand_entity,
                    reason: ReleaseReason::TargetLost,
                });
            }
        }
    }
}
