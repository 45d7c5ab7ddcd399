use std::collections::BTreeSet;

use campus_assets::{TextureId, TextureRegistry};
use campus_common::{Category, NodeId};
use glam::{Affine2, Vec2};
use serde::{Deserialize, Serialize};

use crate::collision::{
    four_sided_nudge, minimum_penetration, Collision, CollisionKind, CollisionPair,
    CollisionResponse,
};
use crate::command::{Command, CommandQueue};
use crate::config::{ConfigError, WorldConfig};
use crate::creature::{creature_node, Creature};
use crate::data::{CreatureKind, CAMPUS_MAP_ASSETS};
use crate::scene::{DrawTarget, SceneNode};
use crate::view::Viewport;

/// Direct children of the root, drawn in declaration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Layer {
    Background,
    Foreground,
}

pub const LAYER_COUNT: usize = 2;

/// A creature waiting to be materialized by `World::spawn_pending`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpawnPoint {
    pub kind: CreatureKind,
    pub position: Vec2,
}

/// Structural changes to the scene, for tools and logs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum WorldEvent {
    Spawned {
        id: NodeId,
        kind: CreatureKind,
        position: Vec2,
    },
    /// A removal sweep detached `count` subtrees.
    Removed { count: usize },
    PlayerRespawned { id: NodeId },
}

/// Owns the scene graph and runs the per-frame pipeline over it.
///
/// Both layers sit at the world origin, so the parent space of anything
/// attached to a layer is world space.
///
/// # Invariants
/// - The player id always refers to a node in the foreground layer. When the
///   player dies a fresh one is spawned at `player_spawn` in the same tick the
///   old one is swept.
/// - After `update` returns the viewport lies inside the world bounds and the
///   player position is finite and inside them too.
pub struct World {
    config: WorldConfig,
    textures: TextureRegistry,
    scene_graph: SceneNode,
    layers: [NodeId; LAYER_COUNT],
    command_queue: CommandQueue,
    view: Viewport,
    player: NodeId,
    spawn_points: Vec<SpawnPoint>,
    last_collisions: Vec<Collision>,
    tick: u64,
    event_log: Vec<WorldEvent>,
}

impl World {
    /// Build the layers, the background and the player from a validated config.
    ///
    /// # Panics
    /// Panics if `textures` lacks the grass or player texture.
    pub fn new(config: WorldConfig, textures: TextureRegistry) -> Result<Self, ConfigError> {
        config.validate()?;

        let mut scene_graph = SceneNode::new(Category::empty());
        let mut background = SceneNode::new(Category::empty());
        let foreground = SceneNode::new(Category::SCENE_GROUND_LAYER);
        let layers = [background.id(), foreground.id()];

        let bounds = config.world_bounds;
        let mut grass = SceneNode::sprite(TextureId::Grass, bounds.size());
        grass.set_position(Vec2::new(bounds.left, bounds.top));
        background.attach_child(grass);
        scene_graph.attach_child(background);
        scene_graph.attach_child(foreground);

        let mut view = Viewport::new(config.player_spawn, config.view_size);
        view.clamp_to(&bounds);

        let mut world = Self {
            config,
            textures,
            scene_graph,
            layers,
            command_queue: CommandQueue::new(),
            view,
            player: NodeId::default(),
            spawn_points: Vec::new(),
            last_collisions: Vec::new(),
            tick: 0,
            event_log: Vec::new(),
        };
        world.player = world.spawn(SpawnPoint {
            kind: CreatureKind::Player,
            position: world.config.player_spawn,
        });
        Ok(world)
    }

    /// Advance one frame. A negative or non-finite `dt` runs the frame with
    /// no elapsed time.
    pub fn update(&mut self, dt: f32) {
        self.tick += 1;
        let _span = tracing::info_span!("world_update", tick = self.tick).entered();
        let dt = if dt.is_finite() && dt >= 0.0 {
            dt
        } else {
            tracing::warn!(dt, "frame time is not a finite non-negative number, using 0");
            0.0
        };

        self.view.move_by(self.config.scroll_speed * dt);
        self.view.clamp_to(&self.config.world_bounds);
        if let Some(player) = self.player_mut() {
            player.set_velocity(Vec2::ZERO);
        }

        let cull = self.chunk_cull_command();
        self.command_queue.push(cull);
        while let Some(command) = self.command_queue.pop() {
            tracing::trace!(category = ?command.category, "dispatching command");
            self.scene_graph.on_command(&command, dt);
        }
        self.adapt_player_velocity();

        self.handle_collisions(dt);

        self.remove_destroyed();
        self.spawn_pending();

        self.scene_graph.update(dt, &mut self.command_queue);

        self.adapt_player_position();
        self.handle_map_edges();
    }

    pub fn draw(&self, target: &mut dyn DrawTarget) {
        target.set_view(&self.view);
        self.scene_graph.draw(target, &Affine2::IDENTITY);
    }

    /// Queue an NPC at an offset from the player spawn.
    pub fn add_npc(&mut self, kind: CreatureKind, relative: Vec2) {
        self.spawn_points.push(SpawnPoint {
            kind,
            position: self.config.player_spawn + relative,
        });
    }

    /// Queue a building at absolute world coordinates.
    pub fn add_map_asset(&mut self, kind: CreatureKind, position: Vec2) {
        debug_assert!(kind.is_map_asset(), "{kind:?} is not a map asset");
        self.spawn_points.push(SpawnPoint { kind, position });
    }

    pub fn add_campus_map_assets(&mut self) {
        for (kind, position) in CAMPUS_MAP_ASSETS {
            self.add_map_asset(kind, position);
        }
    }

    /// Materialize every pending spawn point, most recently added first.
    /// Returns how many nodes were spawned.
    pub fn spawn_pending(&mut self) -> usize {
        let mut spawned = 0;
        while let Some(point) = self.spawn_points.pop() {
            self.spawn(point);
            spawned += 1;
        }
        spawned
    }

    /// Reduce diagonal movement to the speed of straight movement.
    pub fn normalize_diagonal(velocity: Vec2) -> Vec2 {
        if velocity.x != 0.0 && velocity.y != 0.0 {
            velocity / std::f32::consts::SQRT_2
        } else {
            velocity
        }
    }

    pub fn tick(&self) -> u64 {
        self.tick
    }

    pub fn config(&self) -> &WorldConfig {
        &self.config
    }

    pub fn textures(&self) -> &TextureRegistry {
        &self.textures
    }

    pub fn view(&self) -> &Viewport {
        &self.view
    }

    pub fn view_mut(&mut self) -> &mut Viewport {
        &mut self.view
    }

    pub fn command_queue_mut(&mut self) -> &mut CommandQueue {
        &mut self.command_queue
    }

    pub fn scene_graph(&self) -> &SceneNode {
        &self.scene_graph
    }

    pub fn scene_graph_mut(&mut self) -> &mut SceneNode {
        &mut self.scene_graph
    }

    pub fn layer_id(&self, layer: Layer) -> NodeId {
        self.layers[layer as usize]
    }

    pub fn player_id(&self) -> NodeId {
        self.player
    }

    pub fn player(&self) -> Option<&Creature> {
        self.scene_graph.find(self.player)?.creature()
    }

    pub fn player_mut(&mut self) -> Option<&mut Creature> {
        self.scene_graph.find_mut(self.player)?.creature_mut()
    }

    pub fn player_position(&self) -> Option<Vec2> {
        self.scene_graph
            .world_transform_of(self.player)
            .map(|t| t.translation)
    }

    pub fn pending_spawns(&self) -> &[SpawnPoint] {
        &self.spawn_points
    }

    /// Pairs found and classified during the most recent `update`.
    pub fn last_collisions(&self) -> &[Collision] {
        &self.last_collisions
    }

    pub fn node_count(&self) -> usize {
        self.scene_graph.node_count()
    }

    pub fn events(&self) -> &[WorldEvent] {
        &self.event_log
    }

    pub fn drain_events(&mut self) -> Vec<WorldEvent> {
        std::mem::take(&mut self.event_log)
    }

    fn spawn(&mut self, point: SpawnPoint) -> NodeId {
        let node = creature_node(point.kind, &self.textures, point.position);
        let id = node.id();
        self.attach_to_layer(Layer::Foreground, node);
        tracing::info!(
            id = %id.short(),
            kind = ?point.kind,
            x = point.position.x,
            y = point.position.y,
            "spawned"
        );
        self.event_log.push(WorldEvent::Spawned {
            id,
            kind: point.kind,
            position: point.position,
        });
        id
    }

    fn attach_to_layer(&mut self, layer: Layer, node: SceneNode) {
        let id = self.layers[layer as usize];
        match self.scene_graph.find_mut(id) {
            Some(parent) => parent.attach_child(node),
            None => {
                tracing::warn!(?layer, "layer missing, attaching to root");
                self.scene_graph.attach_child(node);
            }
        }
    }

    /// Destroys enemies that wandered outside the view grown by the chunk margin.
    fn chunk_cull_command(&self) -> Command {
        let chunk = self.config.chunk_bounds(&self.view.bounds());
        Command::new(Category::ENEMY_NPC, move |node, _| {
            if let Some(bounds) = node.bounds_in_parent() {
                if !bounds.intersects(&chunk) {
                    node.destroy();
                }
            }
        })
    }

    fn adapt_player_velocity(&mut self) {
        let scroll = self.config.scroll_speed;
        if let Some(player) = self.player_mut() {
            let velocity = Self::normalize_diagonal(player.velocity());
            player.set_velocity(velocity + scroll);
        }
    }

    fn handle_collisions(&mut self, dt: f32) {
        let mut pairs = BTreeSet::new();
        self.scene_graph
            .check_scene_collision(&self.scene_graph, &mut pairs);

        self.last_collisions.clear();
        let mut push = Vec2::ZERO;
        for mut pair in pairs {
            let kind = self.classify(&mut pair);
            tracing::debug!(
                first = %pair.first.short(),
                second = %pair.second.short(),
                ?kind,
                "collision"
            );
            match kind {
                CollisionKind::PlayerMapAsset => self.push_player_out(pair, &mut push),
                CollisionKind::PlayerEnemy => self.player_hit_by(pair),
                CollisionKind::Unhandled => {}
            }
            self.last_collisions.push(Collision { pair, kind });
        }
        if push != Vec2::ZERO {
            self.apply_push(push, dt);
        }
    }

    fn classify(&self, pair: &mut CollisionPair) -> CollisionKind {
        let (Some(a), Some(b)) = (
            self.scene_graph.find(pair.first),
            self.scene_graph.find(pair.second),
        ) else {
            return CollisionKind::Unhandled;
        };
        let (a, b) = (a.category(), b.category());
        if pair.match_categories(a, b, Category::PLAYER, Category::MAP_ASSET) {
            CollisionKind::PlayerMapAsset
        } else if pair.match_categories(a, b, Category::PLAYER, Category::ENEMY_NPC) {
            CollisionKind::PlayerEnemy
        } else {
            CollisionKind::Unhandled
        }
    }

    /// `pair.first` is the player, `pair.second` a building. Minimum
    /// penetration pushes are merged into `push`, keeping the deepest one per
    /// axis, so overlapping buildings do not add up.
    fn push_player_out(&mut self, pair: CollisionPair, push: &mut Vec2) {
        let (Some(player), Some(asset)) = (
            self.scene_graph.world_bounds_of(pair.first),
            self.scene_graph.world_bounds_of(pair.second),
        ) else {
            return;
        };

        match self.config.collision_response {
            CollisionResponse::MinimumPenetration => {
                let p = minimum_penetration(&player, &asset);
                if p.x.abs() > push.x.abs() {
                    push.x = p.x;
                }
                if p.y.abs() > push.y.abs() {
                    push.y = p.y;
                }
            }
            CollisionResponse::FourSided => {
                if let Some(creature) = self.player_mut() {
                    creature.accelerate(four_sided_nudge(&player, &asset));
                }
            }
        }
    }

    /// Move the player out of the buildings by `push` within this frame.
    fn apply_push(&mut self, push: Vec2, dt: f32) {
        let Some(creature) = self.player_mut() else {
            return;
        };
        let mut velocity = creature.velocity();
        // Drop the part of the movement that heads into the building.
        if velocity.x * push.x < 0.0 {
            velocity.x = 0.0;
        }
        if velocity.y * push.y < 0.0 {
            velocity.y = 0.0;
        }
        if dt > 0.0 {
            velocity += push / dt;
        }
        creature.set_velocity(velocity);
    }

    /// `pair.first` is the player, `pair.second` an enemy. The enemy spends
    /// its hitpoints on the player and is destroyed.
    fn player_hit_by(&mut self, pair: CollisionPair) {
        let Some(enemy) = self.scene_graph.find_mut(pair.second) else {
            return;
        };
        if enemy.is_marked_for_removal() {
            return;
        }
        let damage = enemy.creature().map_or(0.0, Creature::hitpoints);
        enemy.destroy();

        if let Some(player) = self.player_mut() {
            player.damage(damage);
            tracing::info!(damage, hitpoints = player.hitpoints(), "player hit");
        }
    }

    /// Sweep destroyed nodes and replace the player if it was among them.
    fn remove_destroyed(&mut self) {
        let player_gone = self
            .scene_graph
            .find(self.player)
            .is_none_or(SceneNode::is_marked_for_removal);

        let count = self.scene_graph.remove_destroyed();
        if count > 0 {
            tracing::debug!(count, "removed destroyed nodes");
            self.event_log.push(WorldEvent::Removed { count });
        }

        if player_gone {
            self.player = self.spawn(SpawnPoint {
                kind: CreatureKind::Player,
                position: self.config.player_spawn,
            });
            tracing::info!(id = %self.player.short(), "player respawned");
            self.event_log
                .push(WorldEvent::PlayerRespawned { id: self.player });
        }
    }

    fn adapt_player_position(&mut self) {
        let Some(position) = self.player_position() else {
            return;
        };
        let world = self.config.world_bounds;
        if self.view.follow(position, self.config.pan_border, &world) {
            let center = self.view.center();
            tracing::debug!(x = center.x, y = center.y, "camera panned");
        }
    }

    fn handle_map_edges(&mut self) {
        let bounds = self.config.world_bounds;
        let spawn = self.config.player_spawn;
        let Some(node) = self.scene_graph.find_mut(self.player) else {
            return;
        };
        let position = node.position();
        if !position.is_finite() {
            tracing::warn!(?position, "player position is not finite, resetting to spawn");
            node.set_position(spawn);
            return;
        }
        node.set_position(Vec2::new(
            position.x.clamp(bounds.left, bounds.right()),
            position.y.clamp(bounds.top, bounds.bottom()),
        ));
    }
}
