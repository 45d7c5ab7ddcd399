//! Rendering adapter: renderer-agnostic interface over the world's draw pass.
//!
//! # Invariants
//! - Renderers cannot mutate the world.
//! - Output derives from world state and the world's viewport only.
//!
//! Ships a recording target and a debug text renderer. A windowed backend
//! implements `DrawTarget` and plugs in without changing consumers.

mod renderer;

pub use renderer::{DebugTextRenderer, DrawCall, RecordingRenderer, RecordingTarget, Renderer};

pub fn crate_info() -> &'static str {
    "campus-render v0.1.0"
}
