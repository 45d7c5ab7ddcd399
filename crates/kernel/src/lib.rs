//! Campus kernel: the scene graph, command dispatch and the per-frame world
//! pipeline (commands, collisions, spawning, camera, map edges).
//!
//! # Invariants
//! - Every node is exclusively owned by its parent; the world owns the root.
//! - Commands are routed by category mask, never addressed to a node.
//! - Nodes are only detached by the removal sweep, never during a traversal.

pub mod collision;
pub mod command;
pub mod config;
pub mod creature;
pub mod data;
pub mod scene;
pub mod view;
pub mod world;

pub use collision::{Collision, CollisionKind, CollisionPair, CollisionResponse};
pub use command::{Command, CommandQueue};
pub use config::{ConfigError, WorldConfig};
pub use creature::{creature_node, Creature};
pub use data::{CreatureData, CreatureKind, CAMPUS_MAP_ASSETS};
pub use scene::{DrawTarget, NodeKind, SceneNode, SpriteNode, TextNode};
pub use view::Viewport;
pub use world::{Layer, SpawnPoint, World, WorldEvent, LAYER_COUNT};
