//! Per-hand orchestration of targeting, hover and attraction.
//!
//! [`HandRig`] owns the hover tracker and attraction controller of one hand
//! and exposes the steps of a tick in the order they must run:
//!
//! 1. [`HandRig::update_hover`] (variable rate)
//! 2. [`HandRig::flick_target`] + [`HandRig::start_attraction`] (variable rate)
//! 3. [`HandRig::update_attraction`] (variable rate)
//! 4. [`HandRig::pull`] (fixed rate)
//!
//! Running hover before the flick check means a target entered this tick can
//! be flicked this tick.

use bevy::prelude::*;

use crate::attraction::{AttractionController, AttractionStep, BodyProxy, HandLink};
use crate::hover::{HoverTracker, HoverTransition};
use crate::query::CastHits;
use crate::selection::{CapabilityLookup, TargetSelector};
use crate::types::{FlickGrabSettings, HandInput, TargetingMode};

/// Origin and direction a hand aims along.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AimPose {
    /// World-space position of the hand.
    pub position: Vec3,
    /// World-space aim direction.
    pub forward: Vec3,
}

impl AimPose {
    /// Aim pose of an entity: its translation, looking down its forward axis.
    pub fn from_transform(transform: &GlobalTransform) -> Self {
        Self {
            position: transform.translation(),
            forward: *transform.forward(),
        }
    }
}

/// Targeting and attraction state of one hand.
#[derive(Component, Debug, Clone, Default)]
pub struct HandRig {
    hover: HoverTracker,
    attraction: AttractionController,
}

impl HandRig {
    /// The hover tracker.
    pub fn hover(&self) -> &HoverTracker {
        &self.hover
    }

    /// The attraction controller.
    pub fn attraction(&self) -> &AttractionController {
        &self.attraction
    }

    /// The currently hovered interactable.
    pub fn hovered(&self) -> Option<Entity> {
        self.hover.last()
    }

    /// Whether targeting may change the hover target right now.
    ///
    /// Holding grab freezes the target so it can be flicked; teleport aiming,
    /// a held object or a running session also pause targeting.
    pub fn accepts_targeting(&self, input: HandInput, hand: &dyn HandLink) -> bool {
        !self.attraction.is_active()
            && hand.attached_object().is_none()
            && !input.grab
            && !input.teleport
    }

    /// Picks this tick's hover target from `hits` and records the transition.
    pub fn update_hover(
        &mut self,
        settings: &FlickGrabSettings,
        aim: AimPose,
        hits: &CastHits,
        input: HandInput,
        hand: &mut dyn HandLink,
        lookup: &impl CapabilityLookup,
    ) -> HoverTransition {
        if !self.accepts_targeting(input, hand) {
            return HoverTransition::default();
        }

        let selector = TargetSelector {
            max_angle_degrees: settings.max_angle_degrees,
            parent_search_depth: settings.parent_search_depth,
        };

        match settings.targeting {
            TargetingMode::Cone => {
                let current = selector.select(&hits.candidates, aim.position, aim.forward, lookup);
                self.hover.transition(current)
            }
            TargetingMode::RayOverlap => {
                let transition = match hits.hit_point {
                    Some(point) => {
                        let current = selector.select_near_point(&hits.candidates, point, lookup);
                        self.hover.transition(current)
                    }
                    // Only drop the target if the hand has not moved its hover elsewhere.
                    None => match self.hover.last() {
                        Some(last) if hand.is_still_hovering(last) => self.hover.transition(None),
                        _ => HoverTransition::default(),
                    },
                };

                if let Some(exited) = transition.exited {
                    hand.hover_unlock(exited);
                }
                if let Some(entered) = transition.entered {
                    hand.hover_lock(entered);
                }
                transition
            }
        }
    }

    /// The entity a flick would attract this tick, if the flick conditions hold.
    pub fn flick_target(
        &self,
        settings: &FlickGrabSettings,
        input: HandInput,
        angular_velocity: Vec3,
        hand: &dyn HandLink,
    ) -> Option<Entity> {
        if self.attraction.is_active() || !input.grab || hand.attached_object().is_some() {
            return None;
        }
        let target = self.hover.last()?;
        settings
            .gesture
            .is_attraction_gesture(angular_velocity)
            .then_some(target)
    }

    /// Starts attracting `target`. See [`AttractionController::trigger`].
    pub fn start_attraction(
        &mut self,
        settings: &FlickGrabSettings,
        target: Entity,
        body: Option<&mut dyn BodyProxy>,
        hand_position: Vec3,
        now: f64,
    ) -> bool {
        self.attraction
            .trigger(target, body, hand_position, now, &settings.attraction)
    }

    /// Advances the session. See [`AttractionController::update`].
    pub fn update_attraction(
        &mut self,
        settings: &FlickGrabSettings,
        hand: &mut dyn HandLink,
        hand_position: Vec3,
        body: Option<&dyn BodyProxy>,
        now: f64,
    ) -> AttractionStep {
        let step = self
            .attraction
            .update(hand, hand_position, body, now, &settings.attraction);
        if step.released.is_some() {
            self.restore_hover_lock(settings, hand);
        }
        step
    }

    /// Pulls the attracted body. See [`AttractionController::fixed_update`].
    pub fn pull(
        &mut self,
        settings: &FlickGrabSettings,
        hand: &mut dyn HandLink,
        hand_position: Vec3,
        body: Option<&mut dyn BodyProxy>,
    ) -> bool {
        let was_active = self.attraction.is_active();
        let pulled = self
            .attraction
            .fixed_update(hand, hand_position, body, &settings.attraction);
        if was_active && !self.attraction.is_active() {
            self.restore_hover_lock(settings, hand);
        }
        pulled
    }

    /// Ray-overlap targeting holds a lock on its hover target. Releasing a
    /// session drops that lock, so take it back while the hand still hovers it.
    fn restore_hover_lock(&self, settings: &FlickGrabSettings, hand: &mut dyn HandLink) {
        if settings.targeting != TargetingMode::RayOverlap {
            return;
        }
        if let Some(hovered) = self.hover.last() {
            if hand.is_still_hovering(hovered) {
                hand.hover_lock(hovered);
            }
        }
    }
}
