//! Hover transition tracking.
//!
//! Targeting produces a best entity every tick. [`HoverTracker`] turns that
//! stream into enter/exit pairs so listeners hear about each change once.

use bevy::prelude::*;

/// The enter/exit pair produced by a single [`HoverTracker::transition`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct HoverTransition {
    /// Entity that just started being hovered.
    pub entered: Option<Entity>,
    /// Entity that just stopped being hovered.
    pub exited: Option<Entity>,
}

impl HoverTransition {
    /// True when neither an enter nor an exit happened.
    pub fn is_empty(&self) -> bool {
        self.entered.is_none() && self.exited.is_none()
    }
}

/// Remembers the last notified hover target of one hand.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HoverTracker {
    last: Option<Entity>,
}

impl HoverTracker {
    /// The entity listeners were last told is hovered.
    pub fn last(&self) -> Option<Entity> {
        self.last
    }

    /// Feed this tick's best target.
    ///
    /// Selecting the same entity again yields no events.
    pub fn transition(&mut self, current: Option<Entity>) -> HoverTransition {
        if current == self.last {
            return HoverTransition::default();
        }

        let transition = HoverTransition {
            entered: current,
            exited: self.last,
        };
        self.last = current;
        transition
    }
}
