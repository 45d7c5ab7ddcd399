//! Player input: keyboard and voice mapped to one set of player actions,
//! each bound to a command for the world's queue.
//!
//! # Invariants
//! - Keyboard and voice share the action and command bindings.
//! - Voice failures disable the voice channel and never reach the game loop.

pub mod action;
pub mod player;
pub mod voice;

pub use action::{HeldKeys, InputEvent, Key, KeyboardState, PlayerAction};
pub use player::{LevelStatus, PlayerController};
pub use voice::{
    parse_tokens, ScriptedTranscriber, Transcriber, VoiceConfig, VoiceError, VoiceInput, VoiceKey,
    VoiceTask,
};

pub fn crate_info() -> &'static str {
    "campus-input v0.1.0"
}
