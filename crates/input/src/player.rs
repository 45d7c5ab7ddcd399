use std::collections::BTreeMap;

use campus_common::Category;
use campus_kernel::{Command, CommandQueue};
use serde::{Deserialize, Serialize};

use crate::action::{InputEvent, Key, KeyboardState, PlayerAction};
use crate::voice::{VoiceInput, VoiceKey};

/// Progress of the current level, set by gameplay and read by the game state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum LevelStatus {
    #[default]
    InProgress,
    Success,
    Failure,
}

/// Turns keyboard and voice input into commands for the player creature.
///
/// # Invariants
/// - A key is bound to at most one action and an action to at most one key.
/// - Every action has a command bound.
#[derive(Debug)]
pub struct PlayerController {
    key_bindings: BTreeMap<Key, PlayerAction>,
    voice_bindings: BTreeMap<VoiceKey, PlayerAction>,
    action_bindings: BTreeMap<PlayerAction, Command>,
    level_status: LevelStatus,
}

impl Default for PlayerController {
    fn default() -> Self {
        Self::new()
    }
}

impl PlayerController {
    pub fn new() -> Self {
        let key_bindings = BTreeMap::from([
            (Key::Up, PlayerAction::MoveUp),
            (Key::Down, PlayerAction::MoveDown),
            (Key::Left, PlayerAction::MoveLeft),
            (Key::Right, PlayerAction::MoveRight),
            (Key::J, PlayerAction::MeleeAttack),
            (Key::K, PlayerAction::RangedAttack),
            (Key::L, PlayerAction::MagicAttack),
            (Key::Space, PlayerAction::SpecialAttack),
            (Key::I, PlayerAction::Inventory),
            (Key::M, PlayerAction::Map),
        ]);
        let voice_bindings = BTreeMap::from([
            (VoiceKey::Up, PlayerAction::MoveUp),
            (VoiceKey::Down, PlayerAction::MoveDown),
            (VoiceKey::Left, PlayerAction::MoveLeft),
            (VoiceKey::Right, PlayerAction::MoveRight),
        ]);
        let action_bindings = PlayerAction::ALL
            .into_iter()
            .map(|action| (action, default_command(action)))
            .collect();
        Self {
            key_bindings,
            voice_bindings,
            action_bindings,
            level_status: LevelStatus::default(),
        }
    }

    /// One-shot actions on key press.
    pub fn handle_event(&self, event: &InputEvent, commands: &mut CommandQueue) {
        let InputEvent::KeyPressed(key) = *event else {
            return;
        };
        if let Some(&action) = self.key_bindings.get(&key) {
            if !action.is_realtime() {
                self.push_action(action, commands);
            }
        }
    }

    /// Realtime actions for every bound key currently held.
    pub fn handle_realtime_input(&self, keyboard: &dyn KeyboardState, commands: &mut CommandQueue) {
        for (&key, &action) in &self.key_bindings {
            if action.is_realtime() && keyboard.is_key_held(key) {
                self.push_action(action, commands);
            }
        }
    }

    /// Consume at most one heard key per frame, so a phrase like "up up left"
    /// plays out over consecutive frames.
    pub fn handle_voice_input(&self, voice: &mut VoiceInput, commands: &mut CommandQueue) {
        let Some(key) = voice.pop_key() else {
            return;
        };
        if let Some(&action) = self.voice_bindings.get(&key) {
            tracing::debug!(?key, ?action, "voice action");
            self.push_action(action, commands);
        }
    }

    /// Bind `key` to `action`, dropping any previous binding of either.
    pub fn assign_key(&mut self, action: PlayerAction, key: Key) {
        self.key_bindings.retain(|&k, &mut a| k != key && a != action);
        self.key_bindings.insert(key, action);
    }

    pub fn assigned_key(&self, action: PlayerAction) -> Option<Key> {
        self.key_bindings
            .iter()
            .find_map(|(&k, &a)| (a == action).then_some(k))
    }

    pub fn bind_command(&mut self, action: PlayerAction, command: Command) {
        self.action_bindings.insert(action, command);
    }

    pub fn level_status(&self) -> LevelStatus {
        self.level_status
    }

    pub fn set_level_status(&mut self, status: LevelStatus) {
        self.level_status = status;
    }

    fn push_action(&self, action: PlayerAction, commands: &mut CommandQueue) {
        if let Some(command) = self.action_bindings.get(&action) {
            commands.push(command.clone());
        }
    }
}

fn default_command(action: PlayerAction) -> Command {
    if let Some(direction) = action.direction() {
        return Command::for_creatures(Category::PLAYER, move |creature, _| {
            let speed = creature.speed();
            creature.accelerate(direction * speed);
        });
    }
    match action {
        PlayerAction::Inventory | PlayerAction::Map => {
            Command::new(Category::PLAYER, move |_, _| {
                tracing::debug!(?action, "screen requested");
            })
        }
        _ => Command::for_creatures(Category::PLAYER, move |creature, _| {
            if creature.try_attack() {
                tracing::debug!(?action, "attack");
            }
        }),
    }
}
