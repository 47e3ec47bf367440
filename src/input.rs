//! Keyboard bindings and the queue of key presses waiting for the next tick.

use std::collections::HashMap;

use glam::Vec3;
use serde::{Deserialize, Serialize};

/// Keys the scene reacts to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Key {
    ArrowLeft,
    ArrowRight,
    ArrowUp,
    ArrowDown,
    Space,
    R,
    Escape,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Axis {
    X,
    Y,
    Z,
}

impl Axis {
    pub fn unit(self) -> Vec3 {
        match self {
            Axis::X => Vec3::X,
            Axis::Y => Vec3::Y,
            Axis::Z => Vec3::Z,
        }
    }
}

/// What a key press does to the controlled body or the loop
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum KeyAction {
    /// Add `delta` to one component of the body's linear velocity
    Nudge { axis: Axis, delta: f32 },
    /// Put the body back at its starting pose, at rest
    Reset,
    /// Stop the run loop
    Quit,
}

impl KeyAction {
    /// Velocity change for nudges
    pub fn velocity_delta(&self) -> Option<Vec3> {
        match *self {
            KeyAction::Nudge { axis, delta } => Some(axis.unit() * delta),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct KeyBinding {
    pub key: Key,
    pub action: KeyAction,
}

impl KeyBinding {
    pub fn new(key: Key, action: KeyAction) -> Self {
        Self { key, action }
    }
}

/// Key to action lookup
#[derive(Debug, Clone, Default)]
pub struct InputMap {
    actions: HashMap<Key, KeyAction>,
}

impl InputMap {
    pub fn new(bindings: impl IntoIterator<Item = KeyBinding>) -> Self {
        let mut map = Self::default();
        for binding in bindings {
            map.bind(binding.key, binding.action);
        }
        map
    }

    /// Binds a key, replacing any previous action
    pub fn bind(&mut self, key: Key, action: KeyAction) {
        self.actions.insert(key, action);
    }

    pub fn action(&self, key: Key) -> Option<KeyAction> {
        self.actions.get(&key).copied()
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }
}

/// Key presses captured between ticks, in arrival order.
///
/// Presses are applied at the start of the next tick, before the physics
/// step, so an event arriving between two ticks affects the later one.
#[derive(Debug, Clone, Default)]
pub struct InputQueue {
    pending: Vec<Key>,
}

impl InputQueue {
    pub fn push(&mut self, key: Key) {
        self.pending.push(key);
    }

    pub fn extend(&mut self, keys: impl IntoIterator<Item = Key>) {
        self.pending.extend(keys);
    }

    /// Removes and returns all pending presses
    pub fn drain(&mut self) -> Vec<Key> {
        std::mem::take(&mut self.pending)
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nudge_delta() {
        let action = KeyAction::Nudge { axis: Axis::X, delta: 10.0 };
        assert_eq!(action.velocity_delta(), Some(Vec3::new(10.0, 0.0, 0.0)));
        assert_eq!(KeyAction::Reset.velocity_delta(), None);
    }

    #[test]
    fn test_rebinding_replaces() {
        let mut map = InputMap::new([KeyBinding::new(Key::Space, KeyAction::Reset)]);
        map.bind(Key::Space, KeyAction::Quit);

        assert_eq!(map.len(), 1);
        assert_eq!(map.action(Key::Space), Some(KeyAction::Quit));
        assert_eq!(map.action(Key::ArrowUp), None);
    }

    #[test]
    fn test_queue_drains_in_order() {
        let mut queue = InputQueue::default();
        queue.push(Key::ArrowLeft);
        queue.extend([Key::ArrowUp, Key::R]);

        assert_eq!(queue.drain(), vec![Key::ArrowLeft, Key::ArrowUp, Key::R]);
        assert!(queue.is_empty());
    }
}
