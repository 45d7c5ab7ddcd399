use campus_common::{Category, NodeId};
use campus_kernel::{CollisionKind, CreatureKind, SceneNode, World};
use glam::Vec2;

/// Read-only queries against the world for debugging and the CLI.
pub struct WorldInspector;

impl WorldInspector {
    pub fn summary(world: &World) -> WorldSummary {
        let creatures = Self::list_creatures(world);
        let count = |category: Category| {
            creatures
                .iter()
                .filter(|c| c.category.intersects(category))
                .count()
        };
        WorldSummary {
            tick: world.tick(),
            node_count: world.node_count(),
            npc_count: count(Category::NPC),
            map_asset_count: count(Category::MAP_ASSET),
            player_hitpoints: world.player().map(|p| p.hitpoints()),
            pending_spawns: world.pending_spawns().len(),
            collisions: world.last_collisions().len(),
            player_collisions: world
                .last_collisions()
                .iter()
                .filter(|c| c.kind != CollisionKind::Unhandled)
                .count(),
            pending_events: world.events().len(),
        }
    }

    /// World position and state of a creature node.
    pub fn inspect_node(world: &World, id: NodeId) -> Option<NodeInfo> {
        let node = world.scene_graph().find(id)?;
        let position = world.scene_graph().world_transform_of(id)?.translation;
        Some(Self::node_info(node, position))
    }

    /// Every creature node, in scene order.
    pub fn list_creatures(world: &World) -> Vec<NodeInfo> {
        let mut out = Vec::new();
        collect(world.scene_graph(), Vec2::ZERO, &mut out);
        out
    }

    fn node_info(node: &SceneNode, position: Vec2) -> NodeInfo {
        let creature = node.creature();
        NodeInfo {
            id: node.id(),
            category: node.category(),
            kind: creature.map(|c| c.kind()),
            position,
            hitpoints: creature.map(|c| c.hitpoints()),
            destroyed: node.is_marked_for_removal(),
        }
    }
}

// Layers and creatures are only translated, so positions add up.
fn collect(node: &SceneNode, parent: Vec2, out: &mut Vec<NodeInfo>) {
    let position = parent + node.position();
    if node.creature().is_some() {
        out.push(WorldInspector::node_info(node, position));
    }
    for child in node.children() {
        collect(child, position, out);
    }
}

#[derive(Debug, Clone)]
pub struct WorldSummary {
    pub tick: u64,
    pub node_count: usize,
    pub npc_count: usize,
    pub map_asset_count: usize,
    pub player_hitpoints: Option<f32>,
    pub pending_spawns: usize,
    /// Pairs found in the most recent update.
    pub collisions: usize,
    pub player_collisions: usize,
    pub pending_events: usize,
}

impl std::fmt::Display for WorldSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "World: tick={} nodes={} npcs={} buildings={} pending_spawns={} collisions={} ({} handled) events={}",
            self.tick,
            self.node_count,
            self.npc_count,
            self.map_asset_count,
            self.pending_spawns,
            self.collisions,
            self.player_collisions,
            self.pending_events
        )?;
        if let Some(hp) = self.player_hitpoints {
            write!(f, " player_hp={hp}")?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct NodeInfo {
    pub id: NodeId,
    pub category: Category,
    pub kind: Option<CreatureKind>,
    pub position: Vec2,
    pub hitpoints: Option<f32>,
    pub destroyed: bool,
}

impl std::fmt::Display for NodeInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Node [{}] {:?} pos=({:.2}, {:.2})",
            self.id.short(),
            self.kind,
            self.position.x,
            self.position.y
        )?;
        if let Some(hp) = self.hitpoints {
            write!(f, " hp={hp}")?;
        }
        if self.destroyed {
            write!(f, " (destroyed)")?;
        }
        Ok(())
    }
}
