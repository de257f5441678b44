//! Notifications sent to feedback systems.
//!
//! Hover changes are published twice: as a [`HoverNotice`] message for ECS
//! systems, and to any callbacks registered in [`HoverListeners`] for code
//! that lives outside the schedule (outline shaders, haptics bridges, ...).
//! Nobody is required to listen.

use bevy::prelude::*;

use crate::attraction::ReleaseReason;

/// A hand started or stopped hovering an interactable.
#[derive(Message, Debug, Clone, Copy, PartialEq, Eq)]
pub enum HoverNotice {
    /// `entity` became the hovered target of `hand`.
    Begin {
        /// The interactable.
        entity: Entity,
        /// The hand entity.
        hand: Entity,
    },
    /// `entity` is no longer the hovered target of `hand`.
    End {
        /// The interactable.
        entity: Entity,
        /// The hand entity.
        hand: Entity,
    },
}

impl HoverNotice {
    /// The interactable this notice is about.
    pub fn entity(&self) -> Entity {
        match *self {
            HoverNotice::Begin { entity, .. } | HoverNotice::End { entity, .. } => entity,
        }
    }

    /// The hand this notice is about.
    pub fn hand(&self) -> Entity {
        match *self {
            HoverNotice::Begin { hand, .. } | HoverNotice::End { hand, .. } => hand,
        }
    }
}

/// Progress of an attraction session.
#[derive(Message, Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttractionNotice {
    /// A flick launched `target` toward `hand`.
    Started {
        /// The attracted interactable.
        target: Entity,
        /// The hand entity.
        hand: Entity,
    },
    /// `target` reached the capture radius and is hover-locked.
    Arrived {
        /// The attracted interactable.
        target: Entity,
        /// The hand entity.
        hand: Entity,
    },
    /// The session on `target` ended.
    Released {
        /// The attracted interactable.
        target: Entity,
        /// The hand entity.
        hand: Entity,
        /// Why it ended.
        reason: ReleaseReason,
    },
}

/// Handle returned by [`HoverListeners::register`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

type HoverCallback = Box<dyn Fn(&HoverNotice) + Send + Sync>;

/// Registry of hover callbacks.
#[derive(Resource, Default)]
pub struct HoverListeners {
    next_id: u64,
    listeners: Vec<(ListenerId, HoverCallback)>,
}

impl HoverListeners {
    /// Adds a callback invoked for every hover notice.
    pub fn register(
        &mut self,
        callback: impl Fn(&HoverNotice) + Send + Sync + 'static,
    ) -> ListenerId {
        let id = ListenerId(self.next_id);
        self.next_id += 1;
        self.listeners.push((id, Box::new(callback)));
        id
    }

    /// Removes a callback. Returns whether it was registered.
    pub fn unregister(&mut self, id: ListenerId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(listener, _)| *listener != id);
        self.listeners.len() != before
    }

    /// Number of registered callbacks.
    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    /// Whether no callbacks are registered.
    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }

    /// Calls every registered callback in registration order.
    pub fn notify(&self, notice: &HoverNotice) {
        for (_, callback) in &self.listeners {
            callback(notice);
        }
    }
}
