//! The scene graph.
//!
//! Every node exclusively owns its children. Nothing points back up the
//! tree: traversals that need a world transform carry the parent's transform
//! down with them.
//!
//! # Invariants
//! - Child lists do not change during `update`, `draw` or
//!   `check_scene_collision`. Nodes are only flagged there; detaching happens
//!   in `remove_destroyed`, between traversals.
//! - A destroyed node is never drawn, updated or reported as colliding, but
//!   stays in the tree until the next sweep.

use std::collections::BTreeSet;

use campus_assets::TextureId;
use campus_common::{Category, NodeId, Rect, Transform2D};
use glam::{Affine2, Vec2};

use crate::collision::CollisionPair;
use crate::command::{Command, CommandQueue};
use crate::creature::Creature;
use crate::view::Viewport;

/// Rendering collaborator. Nodes describe what to draw; the target decides how.
pub trait DrawTarget {
    fn set_view(&mut self, view: &Viewport);
    /// `local` is the sprite rectangle in the node's own space.
    fn draw_sprite(&mut self, texture: TextureId, local: Rect, transform: &Affine2);
    fn draw_text(&mut self, text: &str, color: [u8; 4], transform: &Affine2);
}

/// A (possibly tiled) textured rectangle anchored at the node origin.
#[derive(Debug, Clone, PartialEq)]
pub struct SpriteNode {
    pub texture: TextureId,
    pub size: Vec2,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TextNode {
    text: String,
    color: [u8; 4],
}

impl TextNode {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            color: [255, 255, 255, 255],
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn set_string(&mut self, text: impl Into<String>) {
        self.text = text.into();
    }

    pub fn color(&self) -> [u8; 4] {
        self.color
    }

    pub fn set_fill_color(&mut self, r: u8, g: u8, b: u8, alpha: u8) {
        self.color = [r, g, b, alpha];
    }
}

/// Node variants. Each one decides what its `update_current` and
/// `draw_current` hooks do.
#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
    /// Groups children; draws and updates nothing itself.
    Container,
    Sprite(SpriteNode),
    Text(TextNode),
    Creature(Creature),
}

#[derive(Debug, Clone)]
pub struct SceneNode {
    id: NodeId,
    transform: Transform2D,
    category: Category,
    destroyed: bool,
    kind: NodeKind,
    children: Vec<SceneNode>,
}

impl SceneNode {
    /// An empty container node.
    pub fn new(category: Category) -> Self {
        Self::with_kind(category, NodeKind::Container)
    }

    pub fn with_kind(category: Category, kind: NodeKind) -> Self {
        Self {
            id: NodeId::new(),
            transform: Transform2D::default(),
            category,
            destroyed: false,
            kind,
            children: Vec::new(),
        }
    }

    pub fn sprite(texture: TextureId, size: Vec2) -> Self {
        Self::with_kind(Category::empty(), NodeKind::Sprite(SpriteNode { texture, size }))
    }

    pub fn text(text: impl Into<String>) -> Self {
        Self::with_kind(Category::empty(), NodeKind::Text(TextNode::new(text)))
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn category(&self) -> Category {
        self.category
    }

    pub fn set_category(&mut self, category: Category) {
        self.category = category;
    }

    pub fn transform(&self) -> &Transform2D {
        &self.transform
    }

    pub fn transform_mut(&mut self) -> &mut Transform2D {
        &mut self.transform
    }

    pub fn position(&self) -> Vec2 {
        self.transform.position
    }

    pub fn set_position(&mut self, position: Vec2) {
        self.transform.position = position;
    }

    pub fn kind(&self) -> &NodeKind {
        &self.kind
    }

    pub fn creature(&self) -> Option<&Creature> {
        match &self.kind {
            NodeKind::Creature(c) => Some(c),
            _ => None,
        }
    }

    pub fn creature_mut(&mut self) -> Option<&mut Creature> {
        match &mut self.kind {
            NodeKind::Creature(c) => Some(c),
            _ => None,
        }
    }

    pub fn text_node(&self) -> Option<&TextNode> {
        match &self.kind {
            NodeKind::Text(t) => Some(t),
            _ => None,
        }
    }

    pub fn children(&self) -> &[SceneNode] {
        &self.children
    }

    /// This node plus all descendants, destroyed ones included.
    pub fn node_count(&self) -> usize {
        1 + self.children.iter().map(SceneNode::node_count).sum::<usize>()
    }

    pub fn attach_child(&mut self, child: SceneNode) {
        self.children.push(child);
    }

    /// Detach the first child matching `predicate` and hand back ownership.
    pub fn detach_child(&mut self, predicate: impl FnMut(&SceneNode) -> bool) -> Option<SceneNode> {
        let index = self.children.iter().position(predicate)?;
        Some(self.children.remove(index))
    }

    pub fn destroy(&mut self) {
        self.destroyed = true;
    }

    pub fn is_marked_for_removal(&self) -> bool {
        self.destroyed
    }

    pub fn find(&self, id: NodeId) -> Option<&SceneNode> {
        if self.id == id {
            return Some(self);
        }
        self.children.iter().find_map(|c| c.find(id))
    }

    pub fn find_mut(&mut self, id: NodeId) -> Option<&mut SceneNode> {
        if self.id == id {
            return Some(self);
        }
        self.children.iter_mut().find_map(|c| c.find_mut(id))
    }

    /// World transform of the descendant `id`, composed from this node down.
    pub fn world_transform_of(&self, id: NodeId) -> Option<Affine2> {
        self.world_transform_from(&Affine2::IDENTITY, id)
    }

    fn world_transform_from(&self, parent: &Affine2, id: NodeId) -> Option<Affine2> {
        let world = *parent * self.transform.to_affine();
        if self.id == id {
            return Some(world);
        }
        self.children
            .iter()
            .find_map(|c| c.world_transform_from(&world, id))
    }

    /// World bounding rectangle of the descendant `id`, if it has one.
    pub fn world_bounds_of(&self, id: NodeId) -> Option<Rect> {
        let world = self.world_transform_of(id)?;
        self.find(id)?.bounding_rect(&world)
    }

    /// Bounds under the given world transform. Only creatures take up space.
    pub fn bounding_rect(&self, world: &Affine2) -> Option<Rect> {
        match &self.kind {
            NodeKind::Creature(c) => Some(c.local_bounds().transformed(world)),
            _ => None,
        }
    }

    /// Bounds in the parent's space.
    pub fn bounds_in_parent(&self) -> Option<Rect> {
        self.bounding_rect(&self.transform.to_affine())
    }

    /// Run this node's hook, then update every live child in order.
    pub fn update(&mut self, dt: f32, commands: &mut CommandQueue) {
        self.update_current(dt, commands);
        for child in self.children.iter_mut().filter(|c| !c.destroyed) {
            child.update(dt, commands);
        }
    }

    fn update_current(&mut self, dt: f32, _commands: &mut CommandQueue) {
        let NodeKind::Creature(creature) = &mut self.kind else {
            return;
        };
        if creature.is_dead() {
            self.destroyed = true;
            return;
        }
        creature.tick_cooldown(dt);
        self.transform.position += creature.velocity() * dt;

        if let Some(display) = creature.health_display() {
            let label = creature.health_label();
            let text = self
                .children
                .iter_mut()
                .find(|c| c.id == display)
                .and_then(|c| match &mut c.kind {
                    NodeKind::Text(t) => Some(t),
                    _ => None,
                });
            if let Some(text) = text {
                text.set_string(label);
            }
        }
    }

    /// Draw this subtree back to front: parents before children, earlier
    /// siblings before later ones.
    pub fn draw(&self, target: &mut dyn DrawTarget, parent: &Affine2) {
        if self.destroyed {
            return;
        }
        let world = *parent * self.transform.to_affine();
        self.draw_current(target, &world);
        for child in &self.children {
            child.draw(target, &world);
        }
    }

    fn draw_current(&self, target: &mut dyn DrawTarget, world: &Affine2) {
        match &self.kind {
            NodeKind::Container => {}
            NodeKind::Sprite(sprite) => target.draw_sprite(
                sprite.texture,
                Rect::new(0.0, 0.0, sprite.size.x, sprite.size.y),
                world,
            ),
            NodeKind::Text(text) => target.draw_text(&text.text, text.color, world),
            NodeKind::Creature(creature) => {
                target.draw_sprite(creature.texture(), creature.local_bounds(), world)
            }
        }
    }

    /// Apply `command` here if the category matches, then pass it to every child.
    pub fn on_command(&mut self, command: &Command, dt: f32) {
        command.apply(self, dt);
        for child in &mut self.children {
            child.on_command(command, dt);
        }
    }

    /// Collect every pair of distinct, live, overlapping nodes with one node
    /// from this subtree and one from `other`.
    ///
    /// All pairs are tested, O(n * m). Fine for a campus map with a few
    /// dozen bodies; a broad phase would be needed well before thousands.
    pub fn check_scene_collision(&self, other: &SceneNode, pairs: &mut BTreeSet<CollisionPair>) {
        self.check_scene_collision_from(&Affine2::IDENTITY, other, &Affine2::IDENTITY, pairs);
    }

    fn check_scene_collision_from(
        &self,
        parent: &Affine2,
        other: &SceneNode,
        other_parent: &Affine2,
        pairs: &mut BTreeSet<CollisionPair>,
    ) {
        let other_world = *other_parent * other.transform.to_affine();
        self.check_node_collision(parent, other, &other_world, pairs);
        for child in &other.children {
            self.check_scene_collision_from(parent, child, &other_world, pairs);
        }
    }

    fn check_node_collision(
        &self,
        parent: &Affine2,
        node: &SceneNode,
        node_world: &Affine2,
        pairs: &mut BTreeSet<CollisionPair>,
    ) {
        let world = *parent * self.transform.to_affine();
        if self.id != node.id && !self.destroyed && !node.destroyed {
            if let (Some(a), Some(b)) = (self.bounding_rect(&world), node.bounding_rect(node_world)) {
                if a.intersects(&b) {
                    pairs.insert(CollisionPair::new(self.id, node.id));
                }
            }
        }
        for child in &self.children {
            child.check_node_collision(&world, node, node_world, pairs);
        }
    }

    /// Drop every destroyed descendant. Returns how many subtrees were detached.
    pub fn remove_destroyed(&mut self) -> usize {
        let before = self.children.len();
        self.children.retain(|c| !c.destroyed);
        let mut removed = before - self.children.len();
        for child in &mut self.children {
            removed += child.remove_destroyed();
        }
        removed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::creature::creature_node;
    use crate::data::CreatureKind;
    use campus_assets::TextureRegistry;

    #[derive(Default)]
    struct Recorder {
        sprites: Vec<(TextureId, Vec2)>,
        texts: Vec<String>,
    }

    impl DrawTarget for Recorder {
        fn set_view(&mut self, _view: &Viewport) {}

        fn draw_sprite(&mut self, texture: TextureId, _local: Rect, transform: &Affine2) {
            self.sprites.push((texture, transform.translation));
        }

        fn draw_text(&mut self, text: &str, _color: [u8; 4], _transform: &Affine2) {
            self.texts.push(text.to_string());
        }
    }

    fn creature_at(kind: CreatureKind, x: f32, y: f32) -> SceneNode {
        creature_node(kind, &TextureRegistry::campus(), Vec2::new(x, y))
    }

    #[test]
    fn command_reaches_only_matching_nodes() {
        let mut root = SceneNode::new(Category::empty());
        let mut layer = SceneNode::new(Category::SCENE_GROUND_LAYER);
        let player = creature_at(CreatureKind::Player, 0.0, 0.0);
        let bear = creature_at(CreatureKind::Bear, 100.0, 0.0);
        let (player_id, bear_id) = (player.id(), bear.id());
        layer.attach_child(player);
        layer.attach_child(bear);
        root.attach_child(layer);

        let cmd = Command::for_creatures(Category::PLAYER, |c, _| c.set_velocity(Vec2::new(1.0, 2.0)));
        root.on_command(&cmd, 0.016);

        let player = root.find(player_id).unwrap().creature().unwrap();
        let bear = root.find(bear_id).unwrap().creature().unwrap();
        assert_eq!(player.velocity(), Vec2::new(1.0, 2.0));
        assert_eq!(bear.velocity(), Vec2::ZERO);
    }

    #[test]
    fn command_matches_at_several_depths() {
        let mut root = SceneNode::new(Category::NPC);
        let mut mid = SceneNode::new(Category::empty());
        mid.attach_child(SceneNode::new(Category::ENEMY_NPC));
        root.attach_child(mid);

        let cmd = Command::new(Category::NPC, |node, _| node.destroy());
        root.on_command(&cmd, 0.0);
        assert!(root.is_marked_for_removal());
        assert!(!root.children()[0].is_marked_for_removal());
        assert!(root.children()[0].children()[0].is_marked_for_removal());
    }

    #[test]
    fn update_integrates_velocity_and_skips_destroyed() {
        let mut root = SceneNode::new(Category::empty());
        let mut moving = creature_at(CreatureKind::Player, 0.0, 0.0);
        moving.creature_mut().unwrap().set_velocity(Vec2::new(10.0, -20.0));
        let mut frozen = creature_at(CreatureKind::Bunny, 0.0, 0.0);
        frozen.creature_mut().unwrap().set_velocity(Vec2::new(10.0, 0.0));
        frozen.destroy();
        let (moving_id, frozen_id) = (moving.id(), frozen.id());
        root.attach_child(moving);
        root.attach_child(frozen);

        let mut queue = CommandQueue::new();
        root.update(0.5, &mut queue);

        assert_eq!(root.find(moving_id).unwrap().position(), Vec2::new(5.0, -10.0));
        assert_eq!(root.find(frozen_id).unwrap().position(), Vec2::ZERO);
    }

    #[test]
    fn update_refreshes_health_label_and_flags_dead() {
        let mut bear = creature_at(CreatureKind::Bear, 0.0, 0.0);
        bear.creature_mut().unwrap().damage(15.0);
        let mut queue = CommandQueue::new();
        bear.update(0.1, &mut queue);
        assert_eq!(bear.children()[0].text_node().unwrap().text(), "45 HP");

        bear.creature_mut().unwrap().damage(100.0);
        bear.update(0.1, &mut queue);
        assert!(bear.is_marked_for_removal());
    }

    #[test]
    fn draw_is_back_to_front_and_composes_transforms() {
        let mut root = SceneNode::new(Category::empty());
        let mut background = SceneNode::sprite(TextureId::Grass, Vec2::new(100.0, 100.0));
        background.set_position(Vec2::new(5.0, 5.0));
        let mut layer = SceneNode::new(Category::SCENE_GROUND_LAYER);
        layer.set_position(Vec2::new(10.0, 0.0));
        layer.attach_child(creature_at(CreatureKind::Pool, 1.0, 2.0));
        let mut gone = creature_at(CreatureKind::Bear, 0.0, 0.0);
        gone.destroy();
        layer.attach_child(gone);
        root.attach_child(background);
        root.attach_child(layer);

        let mut target = Recorder::default();
        root.draw(&mut target, &Affine2::IDENTITY);

        assert_eq!(
            target.sprites,
            vec![
                (TextureId::Grass, Vec2::new(5.0, 5.0)),
                (TextureId::Pool, Vec2::new(11.0, 2.0)),
            ]
        );
        assert!(target.texts.is_empty());
    }

    #[test]
    fn overlapping_nodes_yield_one_pair() {
        let mut root = SceneNode::new(Category::empty());
        let a = creature_at(CreatureKind::Player, 100.0, 100.0);
        let b = creature_at(CreatureKind::Bear, 110.0, 100.0);
        let far = creature_at(CreatureKind::Bunny, 2000.0, 2000.0);
        let (a_id, b_id) = (a.id(), b.id());
        root.attach_child(a);
        root.attach_child(b);
        root.attach_child(far);

        let mut pairs = BTreeSet::new();
        root.check_scene_collision(&root, &mut pairs);
        assert_eq!(pairs.len(), 1);
        let pair = pairs.into_iter().next().unwrap();
        assert!(pair.contains(a_id) && pair.contains(b_id));
    }

    #[test]
    fn collision_uses_world_transform() {
        let mut root = SceneNode::new(Category::empty());
        let mut left = SceneNode::new(Category::empty());
        left.attach_child(creature_at(CreatureKind::Player, 0.0, 0.0));
        let mut right = SceneNode::new(Category::empty());
        right.set_position(Vec2::new(1000.0, 0.0));
        right.attach_child(creature_at(CreatureKind::Bunny, 0.0, 0.0));
        root.attach_child(left);
        root.attach_child(right);

        let mut pairs = BTreeSet::new();
        root.check_scene_collision(&root, &mut pairs);
        assert!(pairs.is_empty());
    }

    #[test]
    fn destroyed_nodes_do_not_collide() {
        let mut root = SceneNode::new(Category::empty());
        root.attach_child(creature_at(CreatureKind::Player, 0.0, 0.0));
        let mut bear = creature_at(CreatureKind::Bear, 0.0, 0.0);
        bear.destroy();
        root.attach_child(bear);

        let mut pairs = BTreeSet::new();
        root.check_scene_collision(&root, &mut pairs);
        assert!(pairs.is_empty());
    }

    #[test]
    fn removal_sweep_is_idempotent() {
        let mut root = SceneNode::new(Category::empty());
        let mut layer = SceneNode::new(Category::SCENE_GROUND_LAYER);
        let mut deep = SceneNode::new(Category::empty());
        let mut doomed = creature_at(CreatureKind::Bear, 0.0, 0.0);
        doomed.destroy();
        deep.attach_child(doomed);
        layer.attach_child(deep);
        layer.attach_child(creature_at(CreatureKind::Player, 0.0, 0.0));
        let mut gone = SceneNode::new(Category::empty());
        gone.attach_child(SceneNode::new(Category::empty()));
        gone.destroy();
        root.attach_child(layer);
        root.attach_child(gone);

        let before = root.node_count();
        assert_eq!(root.remove_destroyed(), 2);
        let after = root.node_count();
        // bear + its label, and the container with its child
        assert_eq!(before - after, 4);

        assert_eq!(root.remove_destroyed(), 0);
        assert_eq!(root.node_count(), after);
    }

    #[test]
    fn detach_child_returns_ownership() {
        let mut root = SceneNode::new(Category::empty());
        let child = SceneNode::new(Category::PLAYER);
        let id = child.id();
        root.attach_child(child);
        root.attach_child(SceneNode::new(Category::MAP_ASSET));

        let detached = root.detach_child(|c| c.id() == id).unwrap();
        assert_eq!(detached.category(), Category::PLAYER);
        assert_eq!(root.children().len(), 1);
        assert!(root.detach_child(|c| c.id() == id).is_none());
    }

    #[test]
    fn world_transform_of_descendant() {
        let mut root = SceneNode::new(Category::empty());
        let mut layer = SceneNode::new(Category::empty());
        layer.set_position(Vec2::new(10.0, 20.0));
        let player = creature_at(CreatureKind::Player, 1.0, 2.0);
        let id = player.id();
        layer.attach_child(player);
        root.attach_child(layer);

        let world = root.world_transform_of(id).unwrap();
        assert_eq!(world.translation, Vec2::new(11.0, 22.0));
        let bounds = root.world_bounds_of(id).unwrap();
        assert_eq!(bounds.center(), Vec2::new(11.0, 22.0));
        assert!(root.world_transform_of(NodeId::new()).is_none());
    }
}
