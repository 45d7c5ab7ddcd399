use std::collections::BTreeSet;

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// What the player can ask for, independent of the device that asked.
///
/// Input sources map to actions and actions map to commands, so keyboard and
/// voice drive the same world logic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum PlayerAction {
    MoveUp,
    MoveDown,
    MoveLeft,
    MoveRight,
    MeleeAttack,
    RangedAttack,
    MagicAttack,
    SpecialAttack,
    Inventory,
    Map,
}

impl PlayerAction {
    pub const ALL: [PlayerAction; 10] = [
        Self::MoveUp,
        Self::MoveDown,
        Self::MoveLeft,
        Self::MoveRight,
        Self::MeleeAttack,
        Self::RangedAttack,
        Self::MagicAttack,
        Self::SpecialAttack,
        Self::Inventory,
        Self::Map,
    ];

    /// Realtime actions repeat every frame while their key is held; the rest
    /// fire once per key press.
    pub fn is_realtime(self) -> bool {
        self.direction().is_some()
    }

    /// Unit direction for movement actions (y grows downward).
    pub fn direction(self) -> Option<Vec2> {
        match self {
            Self::MoveUp => Some(Vec2::NEG_Y),
            Self::MoveDown => Some(Vec2::Y),
            Self::MoveLeft => Some(Vec2::NEG_X),
            Self::MoveRight => Some(Vec2::X),
            _ => None,
        }
    }
}

/// Physical keys the game binds. Platform key codes are translated into these
/// by whatever window layer hosts the game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Key {
    Up,
    Down,
    Left,
    Right,
    W,
    A,
    S,
    D,
    J,
    K,
    L,
    I,
    M,
    Space,
    Escape,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputEvent {
    KeyPressed(Key),
    KeyReleased(Key),
}

/// Realtime keyboard query.
pub trait KeyboardState {
    fn is_key_held(&self, key: Key) -> bool;
}

/// Keyboard state built from press/release events.
#[derive(Debug, Clone, Default)]
pub struct HeldKeys {
    held: BTreeSet<Key>,
}

impl HeldKeys {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn press(&mut self, key: Key) {
        self.held.insert(key);
    }

    pub fn release(&mut self, key: Key) {
        self.held.remove(&key);
    }

    pub fn apply(&mut self, event: &InputEvent) {
        match *event {
            InputEvent::KeyPressed(key) => self.press(key),
            InputEvent::KeyReleased(key) => self.release(key),
        }
    }
}

impl KeyboardState for HeldKeys {
    fn is_key_held(&self, key: Key) -> bool {
        self.held.contains(&key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_movement_is_realtime() {
        let realtime: Vec<_> = PlayerAction::ALL
            .into_iter()
            .filter(|a| a.is_realtime())
            .collect();
        assert_eq!(
            realtime,
            vec![
                PlayerAction::MoveUp,
                PlayerAction::MoveDown,
                PlayerAction::MoveLeft,
                PlayerAction::MoveRight
            ]
        );
    }

    #[test]
    fn directions_are_unit_length() {
        for action in PlayerAction::ALL {
            if let Some(dir) = action.direction() {
                assert_eq!(dir.length(), 1.0);
            }
        }
        assert_eq!(PlayerAction::MoveUp.direction(), Some(Vec2::new(0.0, -1.0)));
    }

    #[test]
    fn held_keys_track_events() {
        let mut keys = HeldKeys::new();
        keys.apply(&InputEvent::KeyPressed(Key::Left));
        keys.apply(&InputEvent::KeyPressed(Key::Up));
        assert!(keys.is_key_held(Key::Left));
        keys.apply(&InputEvent::KeyReleased(Key::Left));
        assert!(!keys.is_key_held(Key::Left));
        assert!(keys.is_key_held(Key::Up));
    }
}
