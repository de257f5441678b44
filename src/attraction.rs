//! The attraction state machine.
//!
//! Once a flick is recognised on a hovered target, the controller owns a
//! short-lived session: it launches the body toward the hand, keeps pulling it
//! on the fixed tick while it is far away, hover-locks it once it arrives and
//! always releases it again, either when the hand grabs something or when the
//! let-go timeout runs out.

use std::fmt;

use bevy::log::{debug, info};
use bevy::prelude::*;

use crate::math::{closer_than, farther_than};
use crate::types::ForceMode;

/// Default distance below which an attracted body counts as arrived.
pub const DEFAULT_CAPTURE_RADIUS: f32 = 0.5;

/// Default distance below which the continuous pull stops.
pub const DEFAULT_PULL_START_RADIUS: f32 = 1.0;

/// Default session length in seconds.
pub const DEFAULT_LET_GO_TIMEOUT: f32 = 1.0;

/// Physical body of an interactable, as seen by the controller.
pub trait BodyProxy {
    /// World-space position of the body.
    fn position(&self) -> Vec3;

    /// Current linear velocity.
    fn velocity(&self) -> Vec3;

    /// Overrides the linear velocity.
    fn set_velocity(&mut self, velocity: Vec3);

    /// Applies a force in the given mode.
    fn apply_force(&mut self, force: Vec3, mode: ForceMode);
}

/// The hand a controller belongs to.
pub trait HandLink {
    /// What the hand is currently holding through a regular grab.
    fn attached_object(&self) -> Option<Entity>;

    /// Claims exclusive hover focus on `entity`.
    fn hover_lock(&mut self, entity: Entity);

    /// Gives up hover focus on `entity`.
    fn hover_unlock(&mut self, entity: Entity);

    /// Whether the hand still considers `entity` hovered.
    fn is_still_hovering(&self, entity: Entity) -> bool;
}

/// Tunables for the pull.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AttractionTuning {
    /// Distance below which the body is considered arrived and hover-locked.
    pub capture_radius: f32,
    /// Distance below which no more pulling force is applied.
    pub pull_start_radius: f32,
    /// Seconds after the flick at which the session always ends.
    pub let_go_timeout: f32,
    /// Added to the launch velocity to lift the body off the ground.
    pub vertical_boost: Vec3,
}

impl Default for AttractionTuning {
    fn default() -> Self {
        Self {
            capture_radius: DEFAULT_CAPTURE_RADIUS,
            pull_start_radius: DEFAULT_PULL_START_RADIUS,
            let_go_timeout: DEFAULT_LET_GO_TIMEOUT,
            vertical_boost: Vec3::Y * 4.0,
        }
    }
}

/// Where a hand is in the attraction cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AttractionState {
    /// No session.
    #[default]
    Idle,
    /// The body has been launched and is being pulled.
    Attracting,
    /// The body reached the capture radius and is hover-locked.
    Arrived,
    /// The session just ended; reported once, then the controller is idle.
    Released,
}

impl fmt::Display for AttractionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttractionState::Idle => f.write_str("Idle"),
            AttractionState::Attracting => f.write_str("Attracting"),
            AttractionState::Arrived => f.write_str("Arrived"),
            AttractionState::Released => f.write_str("Released"),
        }
    }
}

/// Why a session ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReleaseReason {
    /// The let-go timeout elapsed.
    Timeout,
    /// The hand picked up an object through a regular grab.
    Attached,
    /// The target body disappeared mid-session.
    TargetLost,
}

impl fmt::Display for ReleaseReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReleaseReason::Timeout => f.write_str("timeout"),
            ReleaseReason::Attached => f.write_str("attached"),
            ReleaseReason::TargetLost => f.write_str("target lost"),
        }
    }
}

/// Bookkeeping for one pull.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AttractionSession {
    /// The interactable being pulled.
    pub target: Entity,
    /// Either [`AttractionState::Attracting`] or [`AttractionState::Arrived`].
    pub state: AttractionState,
    /// Time of the flick, in seconds since startup.
    pub started_at: f64,
    /// Whether the hand currently holds a hover-lock on `target`.
    pub hover_lock_acquired: bool,
}

/// What happened during one variable-rate step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AttractionStep {
    /// The target that just arrived at the hand.
    pub arrived: Option<Entity>,
    /// The target released this step, and why.
    pub released: Option<(Entity, ReleaseReason)>,
}

/// Per-hand attraction state machine.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct AttractionController {
    session: Option<AttractionSession>,
    just_released: bool,
}

impl AttractionController {
    /// Current state.
    ///
    /// [`AttractionState::Released`] is reported until the next step, after
    /// which the controller is [`AttractionState::Idle`].
    pub fn state(&self) -> AttractionState {
        match self.session {
            Some(session) => session.state,
            None if self.just_released => AttractionState::Released,
            None => AttractionState::Idle,
        }
    }

    /// The active session, if any.
    pub fn session(&self) -> Option<&AttractionSession> {
        self.session.as_ref()
    }

    /// The entity being pulled, if any.
    pub fn target(&self) -> Option<Entity> {
        self.session.map(|session| session.target)
    }

    /// Whether a session is running.
    pub fn is_active(&self) -> bool {
        self.session.is_some()
    }

    /// Starts a session on `target`.
    ///
    /// Returns `false` and changes nothing when a session is already running
    /// or the target has no body.
    pub fn trigger(
        &mut self,
        target: Entity,
        body: Option<&mut dyn BodyProxy>,
        hand_position: Vec3,
        now: f64,
        tuning: &AttractionTuning,
    ) -> bool {
        if self.session.is_some() {
            return false;
        }
        let Some(body) = body else {
            debug!("flick on {target:?} ignored: no physical body");
            return false;
        };

        body.set_velocity(hand_position - body.position() + tuning.vertical_boost);
        self.just_released = false;
        self.session = Some(AttractionSession {
            target,
            state: AttractionState::Attracting,
            started_at: now,
            hover_lock_acquired: false,
        });
        info!("flick: attracting {target:?}");
        true
    }

    /// Variable-rate step: arrival and release checks.
    ///
    /// `body` must be the target's body, or `None` if it no longer exists.
    pub fn update(
        &mut self,
        hand: &mut dyn HandLink,
        hand_position: Vec3,
        body: Option<&dyn BodyProxy>,
        now: f64,
        tuning: &AttractionTuning,
    ) -> AttractionStep {
        let mut step = AttractionStep::default();
        self.just_released = false;
        let Some(session) = self.session.as_mut() else {
            return step;
        };

        let Some(body) = body else {
            step.released = self.release(hand, ReleaseReason::TargetLost);
            return step;
        };

        if session.state == AttractionState::Attracting
            && closer_than(hand_position, body.position(), tuning.capture_radius)
        {
            hand.hover_lock(session.target);
            session.hover_lock_acquired = true;
            session.state = AttractionState::Arrived;
            step.arrived = Some(session.target);
            debug!("{:?} in range of hand", session.target);
        }

        let elapsed = now - session.started_at;
        if hand.attached_object().is_some() {
            step.released = self.release(hand, ReleaseReason::Attached);
        } else if elapsed >= f64::from(tuning.let_go_timeout) {
            step.released = self.release(hand, ReleaseReason::Timeout);
        }
        step
    }

    /// Fixed-rate step: pulls the body toward the hand while it is far away.
    ///
    /// Returns whether a force was applied. A missing body ends the session.
    pub fn fixed_update(
        &mut self,
        hand: &mut dyn HandLink,
        hand_position: Vec3,
        body: Option<&mut dyn BodyProxy>,
        tuning: &AttractionTuning,
    ) -> bool {
        let Some(session) = self.session else {
            return false;
        };
        let Some(body) = body else {
            self.release(hand, ReleaseReason::TargetLost);
            return false;
        };
        if session.state != AttractionState::Attracting {
            return false;
        }

        let position = body.position();
        if !farther_than(hand_position, position, tuning.pull_start_radius) {
            return false;
        }
        body.apply_force(hand_position - position, ForceMode::Acceleration);
        true
    }

    fn release(
        &mut self,
        hand: &mut dyn HandLink,
        reason: ReleaseReason,
    ) -> Option<(Entity, ReleaseReason)> {
        let session = self.session.take()?;
        self.just_released = true;
        if session.hover_lock_acquired {
            hand.hover_unlock(session.target);
        }
        info!("letting go of {:?} ({reason})", session.target);
        Some((session.target, reason))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct TestBody {
        position: Vec3,
        velocity: Vec3,
        forces: Vec<(Vec3, ForceMode)>,
    }

    impl BodyProxy for TestBody {
        fn position(&self) -> Vec3 {
            self.position
        }

        fn velocity(&self) -> Vec3 {
            self.velocity
        }

        fn set_velocity(&mut self, velocity: Vec3) {
            self.velocity = velocity;
        }

        fn apply_force(&mut self, force: Vec3, mode: ForceMode) {
            self.forces.push((force, mode));
        }
    }

    #[derive(Default)]
    struct TestHand {
        attached: Option<Entity>,
        locked: Option<Entity>,
        locks: usize,
        unlocks: usize,
    }

    impl HandLink for TestHand {
        fn attached_object(&self) -> Option<Entity> {
            self.attached
        }

        fn hover_lock(&mut self, entity: Entity) {
            self.locked = Some(entity);
            self.locks += 1;
        }

        fn hover_unlock(&mut self, entity: Entity) {
            if self.locked == Some(entity) {
                self.locked = None;
            }
            self.unlocks += 1;
        }

        fn is_still_hovering(&self, entity: Entity) -> bool {
            self.locked == Some(entity)
        }
    }

    /// Distinct entities from one world.
    fn entities(n: usize) -> Vec<Entity> {
        let mut world = World::new();
        (0..n).map(|_| world.spawn_empty().id()).collect()
    }

    fn started(body: &mut TestBody, tuning: &AttractionTuning) -> (AttractionController, Entity) {
        let target = entities(1)[0];
        let mut controller = AttractionController::default();
        assert!(controller.trigger(target, Some(body), Vec3::ZERO, 0.0, tuning));
        (controller, target)
    }

    #[test]
    fn trigger_launches_body_toward_hand_with_boost() {
        let tuning = AttractionTuning::default();
        let mut body = TestBody {
            position: Vec3::new(0.0, 0.0, 2.0),
            ..default()
        };
        let (controller, target) = started(&mut body, &tuning);

        assert_eq!(body.velocity, Vec3::new(0.0, 4.0, -2.0));
        assert_eq!(controller.state(), AttractionState::Attracting);
        assert_eq!(controller.target(), Some(target));
        assert!(!controller.session().unwrap().hover_lock_acquired);
    }

    #[test]
    fn trigger_without_body_is_ignored() {
        let mut controller = AttractionController::default();
        let tuning = AttractionTuning::default();
        assert!(!controller.trigger(entities(1)[0], None, Vec3::ZERO, 0.0, &tuning));
        assert_eq!(controller.state(), AttractionState::Idle);
    }

    #[test]
    fn second_trigger_during_session_is_rejected() {
        let tuning = AttractionTuning::default();
        let mut body = TestBody {
            position: Vec3::new(0.0, 0.0, 2.0),
            ..default()
        };
        let e = entities(2);
        let (first, second) = (e[0], e[1]);
        let mut controller = AttractionController::default();
        assert!(controller.trigger(first, Some(&mut body), Vec3::ZERO, 0.0, &tuning));

        let mut other = TestBody::default();
        assert!(!controller.trigger(second, Some(&mut other), Vec3::ZERO, 0.1, &tuning));
        assert_eq!(controller.target(), Some(first));
        assert_eq!(controller.session().unwrap().started_at, 0.0);
        assert_eq!(other.velocity, Vec3::ZERO);
    }

    #[test]
    fn full_cycle_released_by_grab() {
        let tuning = AttractionTuning::default();
        let mut hand = TestHand::default();
        let mut body = TestBody {
            position: Vec3::new(0.0, 0.0, 2.0),
            ..default()
        };
        let (mut controller, target) = started(&mut body, &tuning);

        body.position = Vec3::new(0.0, 0.0, 0.4);
        let step = controller.update(&mut hand, Vec3::ZERO, Some(&body), 0.3, &tuning);
        assert_eq!(step.arrived, Some(target));
        assert_eq!(step.released, None);
        assert_eq!(controller.state(), AttractionState::Arrived);
        assert_eq!(hand.locked, Some(target));

        // Arrival is only reported once.
        let step = controller.update(&mut hand, Vec3::ZERO, Some(&body), 0.45, &tuning);
        assert_eq!(step, AttractionStep::default());
        assert_eq!(hand.locks, 1);

        hand.attached = Some(target);
        let step = controller.update(&mut hand, Vec3::ZERO, Some(&body), 0.6, &tuning);
        assert_eq!(step.released, Some((target, ReleaseReason::Attached)));
        assert_eq!(controller.state(), AttractionState::Released);
        assert_eq!(controller.session(), None);
        assert_eq!(hand.locked, None);
        assert_eq!(hand.unlocks, 1);

        let step = controller.update(&mut hand, Vec3::ZERO, Some(&body), 0.7, &tuning);
        assert_eq!(step, AttractionStep::default());
        assert_eq!(controller.state(), AttractionState::Idle);
    }

    #[test]
    fn arrived_session_still_times_out() {
        let tuning = AttractionTuning::default();
        let mut hand = TestHand::default();
        let mut body = TestBody {
            position: Vec3::new(0.0, 0.0, 2.0),
            ..default()
        };
        let (mut controller, target) = started(&mut body, &tuning);

        body.position = Vec3::new(0.0, 0.0, 0.2);
        controller.update(&mut hand, Vec3::ZERO, Some(&body), 0.3, &tuning);
        assert_eq!(controller.state(), AttractionState::Arrived);

        let step = controller.update(&mut hand, Vec3::ZERO, Some(&body), 0.99, &tuning);
        assert_eq!(step.released, None);

        let step = controller.update(&mut hand, Vec3::ZERO, Some(&body), 1.0, &tuning);
        assert_eq!(step.released, Some((target, ReleaseReason::Timeout)));
        assert_eq!(hand.locked, None);
    }

    #[test]
    fn timeout_is_independent_of_distance() {
        let tuning = AttractionTuning::default();
        let mut hand = TestHand::default();
        let mut body = TestBody {
            position: Vec3::new(0.0, 0.0, 10.0),
            ..default()
        };
        let (mut controller, target) = started(&mut body, &tuning);

        for now in [0.25, 0.5, 0.75] {
            let step = controller.update(&mut hand, Vec3::ZERO, Some(&body), now, &tuning);
            assert_eq!(step, AttractionStep::default());
        }
        let step = controller.update(&mut hand, Vec3::ZERO, Some(&body), 1.0, &tuning);
        assert_eq!(step.released, Some((target, ReleaseReason::Timeout)));
        // Never locked, so never unlocked.
        assert_eq!(hand.unlocks, 0);
    }

    #[test]
    fn arrival_and_timeout_on_the_same_tick_release_the_lock() {
        let tuning = AttractionTuning::default();
        let mut hand = TestHand::default();
        let mut body = TestBody {
            position: Vec3::new(0.0, 0.0, 2.0),
            ..default()
        };
        let (mut controller, target) = started(&mut body, &tuning);

        body.position = Vec3::new(0.0, 0.0, 0.1);
        let step = controller.update(&mut hand, Vec3::ZERO, Some(&body), 1.2, &tuning);
        assert_eq!(step.arrived, Some(target));
        assert_eq!(step.released, Some((target, ReleaseReason::Timeout)));
        assert_eq!((hand.locks, hand.unlocks), (1, 1));
        assert_eq!(hand.locked, None);
    }

    #[test]
    fn vanished_target_forces_release() {
        let tuning = AttractionTuning::default();
        let mut hand = TestHand::default();
        let mut body = TestBody {
            position: Vec3::new(0.0, 0.0, 0.3),
            ..default()
        };
        let (mut controller, target) = started(&mut body, &tuning);
        controller.update(&mut hand, Vec3::ZERO, Some(&body), 0.1, &tuning);
        assert_eq!(hand.locked, Some(target));

        let step = controller.update(&mut hand, Vec3::ZERO, None, 0.2, &tuning);
        assert_eq!(step.released, Some((target, ReleaseReason::TargetLost)));
        assert_eq!(hand.locked, None);
        assert!(!controller.is_active());
    }

    #[test]
    fn pull_applies_acceleration_only_outside_pull_radius() {
        let tuning = AttractionTuning::default();
        let mut hand = TestHand::default();
        let mut body = TestBody {
            position: Vec3::new(0.0, 0.0, 2.0),
            ..default()
        };
        let (mut controller, _) = started(&mut body, &tuning);

        assert!(controller.fixed_update(&mut hand, Vec3::ZERO, Some(&mut body), &tuning));
        assert_eq!(
            body.forces,
            vec![(Vec3::new(0.0, 0.0, -2.0), ForceMode::Acceleration)]
        );

        body.position = Vec3::new(0.0, 0.0, 0.8);
        assert!(!controller.fixed_update(&mut hand, Vec3::ZERO, Some(&mut body), &tuning));
        assert_eq!(body.forces.len(), 1);
    }

    #[test]
    fn pull_stops_once_arrived_and_when_idle() {
        let tuning = AttractionTuning::default();
        let mut hand = TestHand::default();
        let mut body = TestBody {
            position: Vec3::new(0.0, 0.0, 0.2),
            ..default()
        };
        let (mut controller, _) = started(&mut body, &tuning);
        controller.update(&mut hand, Vec3::ZERO, Some(&body), 0.1, &tuning);

        // Even if the body drifts back out, an arrived session does not pull.
        body.position = Vec3::new(0.0, 0.0, 3.0);
        assert!(!controller.fixed_update(&mut hand, Vec3::ZERO, Some(&mut body), &tuning));

        let mut idle = AttractionController::default();
        assert!(!idle.fixed_update(&mut hand, Vec3::ZERO, Some(&mut body), &tuning));
        assert!(body.forces.is_empty());
    }

    #[test]
    fn vanished_target_on_fixed_tick_forces_release() {
        let tuning = AttractionTuning::default();
        let mut hand = TestHand::default();
        let mut body = TestBody {
            position: Vec3::new(0.0, 0.0, 0.3),
            ..default()
        };
        let (mut controller, target) = started(&mut body, &tuning);
        controller.update(&mut hand, Vec3::ZERO, Some(&body), 0.1, &tuning);
        assert_eq!(hand.locked, Some(target));

        assert!(!controller.fixed_update(&mut hand, Vec3::ZERO, None, &tuning));
        assert!(!controller.is_active());
        assert_eq!(controller.state(), AttractionState::Released);
        assert_eq!((hand.locked, hand.unlocks), (None, 1));

        // Nothing left to release on the next variable step.
        let step = controller.update(&mut hand, Vec3::ZERO, None, 0.2, &tuning);
        assert_eq!(step, AttractionStep::default());
        assert_eq!(controller.state(), AttractionState::Idle);
    }

    #[test]
    fn new_session_after_release_starts_clean() {
        let tuning = AttractionTuning::default();
        let mut hand = TestHand::default();
        let mut body = TestBody {
            position: Vec3::new(0.0, 0.0, 0.2),
            ..default()
        };
        let e = entities(2);
        let (first, next) = (e[0], e[1]);
        let mut controller = AttractionController::default();
        assert!(controller.trigger(first, Some(&mut body), Vec3::ZERO, 0.0, &tuning));
        controller.update(&mut hand, Vec3::ZERO, Some(&body), 1.5, &tuning);
        assert_eq!(controller.state(), AttractionState::Released);
        assert_eq!(hand.locked, None);

        body.position = Vec3::new(0.0, 0.0, 3.0);
        assert!(controller.trigger(next, Some(&mut body), Vec3::ZERO, 2.0, &tuning));
        let session = controller.session().unwrap();
        assert_ne!(next, first);
        assert_eq!(session.target, next);
        assert_eq!(controller.target(), Some(next));
        assert_eq!(session.started_at, 2.0);
        assert!(!session.hover_lock_acquired);
        assert_eq!(session.state, AttractionState::Attracting);
    }
}
