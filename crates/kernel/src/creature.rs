use campus_assets::{TextureId, TextureRegistry};
use campus_common::{NodeId, Rect, Transform2D};
use glam::Vec2;

use crate::data::CreatureKind;
use crate::scene::{NodeKind, SceneNode};

/// Gap between a creature's feet and its hitpoint label.
const HEALTH_LABEL_OFFSET: f32 = 12.0;

/// A physical scene entity: the player, NPCs and campus buildings.
#[derive(Debug, Clone, PartialEq)]
pub struct Creature {
    kind: CreatureKind,
    hitpoints: f32,
    velocity: Vec2,
    speed: f32,
    size: Vec2,
    texture: TextureId,
    attack_interval: f32,
    attack_cooldown: f32,
    health_display: Option<NodeId>,
}

impl Creature {
    pub fn new(kind: CreatureKind, textures: &TextureRegistry) -> Self {
        let data = kind.data();
        Self {
            kind,
            hitpoints: data.hitpoints,
            velocity: Vec2::ZERO,
            speed: data.speed,
            size: textures.size(data.texture),
            texture: data.texture,
            attack_interval: data.attack_interval,
            attack_cooldown: 0.0,
            health_display: None,
        }
    }

    pub fn kind(&self) -> CreatureKind {
        self.kind
    }

    pub fn texture(&self) -> TextureId {
        self.texture
    }

    pub fn size(&self) -> Vec2 {
        self.size
    }

    /// Bounds in the creature's own space; sprites are centered on the node origin.
    pub fn local_bounds(&self) -> Rect {
        Rect::centered(Vec2::ZERO, self.size)
    }

    pub fn hitpoints(&self) -> f32 {
        self.hitpoints
    }

    pub fn is_dead(&self) -> bool {
        self.hitpoints <= 0.0
    }

    pub fn damage(&mut self, amount: f32) {
        self.hitpoints -= amount;
    }

    pub fn heal(&mut self, amount: f32) {
        self.hitpoints += amount;
    }

    pub fn speed(&self) -> f32 {
        self.speed
    }

    pub fn velocity(&self) -> Vec2 {
        self.velocity
    }

    pub fn set_velocity(&mut self, velocity: Vec2) {
        self.velocity = velocity;
    }

    pub fn accelerate(&mut self, delta: Vec2) {
        self.velocity += delta;
    }

    /// Seconds until the next attack is allowed.
    pub fn attack_cooldown(&self) -> f32 {
        self.attack_cooldown
    }

    /// Start an attack if the cooldown has elapsed. Returns whether it started.
    pub fn try_attack(&mut self) -> bool {
        if self.attack_cooldown > 0.0 || self.attack_interval <= 0.0 {
            return false;
        }
        self.attack_cooldown = self.attack_interval;
        true
    }

    pub(crate) fn tick_cooldown(&mut self, dt: f32) {
        self.attack_cooldown = (self.attack_cooldown - dt).max(0.0);
    }

    pub(crate) fn health_display(&self) -> Option<NodeId> {
        self.health_display
    }

    pub(crate) fn health_label(&self) -> String {
        format!("{} HP", self.hitpoints.max(0.0).ceil())
    }
}

/// Build a creature node at `position`. Everything but buildings carries a
/// hitpoint label child.
pub fn creature_node(kind: CreatureKind, textures: &TextureRegistry, position: Vec2) -> SceneNode {
    let mut creature = Creature::new(kind, textures);
    let label = if kind.is_map_asset() {
        None
    } else {
        let mut label = SceneNode::text(creature.health_label());
        label.set_position(Vec2::new(0.0, creature.size.y / 2.0 + HEALTH_LABEL_OFFSET));
        creature.health_display = Some(label.id());
        Some(label)
    };

    let mut node = SceneNode::with_kind(kind.category(), NodeKind::Creature(creature));
    *node.transform_mut() = Transform2D::from_position(position);
    if let Some(label) = label {
        node.attach_child(label);
    }
    node
}
