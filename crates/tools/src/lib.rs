//! Developer tooling: world inspector for the CLI and debugging.
//!
//! # Invariants
//! - Tools only read the world.

mod inspector;

pub use inspector::{NodeInfo, WorldInspector, WorldSummary};

pub fn crate_info() -> &'static str {
    "campus-tools v0.1.0"
}
