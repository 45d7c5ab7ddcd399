//! Collision pairs and the map-asset push-out responses.

use campus_common::{Category, CategoryMatch, NodeId, Rect};
use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Two distinct colliding nodes.
///
/// `new` normalizes the order so that a pair found as (a, b) and as (b, a)
/// is the same set entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CollisionPair {
    pub first: NodeId,
    pub second: NodeId,
}

impl CollisionPair {
    /// # Panics
    /// Panics if `a == b`; a node never collides with itself.
    pub fn new(a: NodeId, b: NodeId) -> Self {
        assert_ne!(a, b, "a node cannot collide with itself");
        let (first, second) = if a < b { (a, b) } else { (b, a) };
        Self { first, second }
    }

    pub fn swap(&mut self) {
        std::mem::swap(&mut self.first, &mut self.second);
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.first == id || self.second == id
    }

    /// Reorder so that `first` carries `expected_first`; false if the pair
    /// does not match the expected categories in either order.
    pub fn match_categories(
        &mut self,
        first_category: Category,
        second_category: Category,
        expected_first: Category,
        expected_second: Category,
    ) -> bool {
        match Category::match_pair(
            first_category,
            second_category,
            expected_first,
            expected_second,
        ) {
            Some(CategoryMatch::InOrder) => true,
            Some(CategoryMatch::Swapped) => {
                self.swap();
                true
            }
            None => false,
        }
    }
}

/// What a classified pair turned out to be.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CollisionKind {
    /// `first` is the player, `second` a building.
    PlayerMapAsset,
    /// `first` is the player, `second` a hostile NPC.
    PlayerEnemy,
    /// No response registered for these categories.
    Unhandled,
}

/// A pair found in one tick and how it was classified.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Collision {
    pub pair: CollisionPair,
    pub kind: CollisionKind,
}

/// How the player is pushed out of a building.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum CollisionResponse {
    /// Resolve along the single axis of least penetration.
    #[default]
    MinimumPenetration,
    /// Nudge on all four sides at once. Opposite corrections cancel, so a
    /// player centered on a building is not moved at all.
    FourSided,
}

/// Displacement that moves `mover` out of `obstacle` along the axis of least
/// penetration. Zero when they do not overlap. Ties go to the x axis and, on
/// an axis, to the positive direction.
pub fn minimum_penetration(mover: &Rect, obstacle: &Rect) -> Vec2 {
    if !mover.intersects(obstacle) {
        return Vec2::ZERO;
    }
    let push_left = mover.right() - obstacle.left;
    let push_right = obstacle.right() - mover.left;
    let push_up = mover.bottom() - obstacle.top;
    let push_down = obstacle.bottom() - mover.top;

    let x = if push_left < push_right {
        -push_left
    } else {
        push_right
    };
    let y = if push_up < push_down { -push_up } else { push_down };

    if x.abs() <= y.abs() {
        Vec2::new(x, 0.0)
    } else {
        Vec2::new(0.0, y)
    }
}

/// Velocity nudge from the overlap measured on every side of `obstacle`.
pub fn four_sided_nudge(mover: &Rect, obstacle: &Rect) -> Vec2 {
    if !mover.intersects(obstacle) {
        return Vec2::ZERO;
    }
    let mut nudge = Vec2::ZERO;
    if mover.left <= obstacle.right() {
        nudge.x -= obstacle.right() - mover.left;
    }
    if mover.right() >= obstacle.left {
        nudge.x += mover.right() - obstacle.left;
    }
    if mover.top <= obstacle.bottom() {
        nudge.y -= obstacle.bottom() - mover.top;
    }
    if mover.bottom() >= obstacle.top {
        nudge.y += mover.bottom() - obstacle.top;
    }
    nudge
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pair_is_order_normalized() {
        let a = NodeId::new();
        let b = NodeId::new();
        assert_eq!(CollisionPair::new(a, b), CollisionPair::new(b, a));
        assert!(CollisionPair::new(a, b).contains(a));
    }

    #[test]
    #[should_panic(expected = "cannot collide with itself")]
    fn self_pair_panics() {
        let a = NodeId::new();
        CollisionPair::new(a, a);
    }

    #[test]
    fn match_categories_swaps_reverse_match() {
        let a = NodeId::new();
        let b = NodeId::new();
        let mut pair = CollisionPair { first: a, second: b };
        assert!(pair.match_categories(
            Category::MAP_ASSET,
            Category::PLAYER,
            Category::PLAYER,
            Category::MAP_ASSET
        ));
        assert_eq!(pair.first, b);
        assert_eq!(pair.second, a);

        let mut pair = CollisionPair { first: a, second: b };
        assert!(!pair.match_categories(
            Category::ENEMY_NPC,
            Category::NEUTRAL_NPC,
            Category::PLAYER,
            Category::MAP_ASSET
        ));
        assert_eq!(pair.first, a);
    }

    #[test]
    fn minimum_penetration_picks_shallow_axis() {
        // Player slightly into the left side of a wide building.
        let building = Rect::new(100.0, 0.0, 400.0, 100.0);
        let player = Rect::new(90.0, 40.0, 20.0, 20.0);
        assert_eq!(minimum_penetration(&player, &building), Vec2::new(-10.0, 0.0));

        // Player slightly into the bottom.
        let player = Rect::new(300.0, 95.0, 20.0, 20.0);
        assert_eq!(minimum_penetration(&player, &building), Vec2::new(0.0, 5.0));
    }

    #[test]
    fn minimum_penetration_moves_concentric_player() {
        let building = Rect::centered(Vec2::new(900.0, 1100.0), Vec2::new(300.0, 180.0));
        let player = Rect::centered(Vec2::new(900.0, 1100.0), Vec2::new(32.0, 48.0));
        let push = minimum_penetration(&player, &building);
        assert_eq!(push, Vec2::new(0.0, 114.0));
        let moved = Rect::new(player.left + push.x, player.top + push.y, 32.0, 48.0);
        assert!(!moved.intersects(&building));
    }

    #[test]
    fn no_overlap_no_push() {
        let a = Rect::new(0.0, 0.0, 10.0, 10.0);
        let b = Rect::new(20.0, 0.0, 10.0, 10.0);
        assert_eq!(minimum_penetration(&a, &b), Vec2::ZERO);
        assert_eq!(four_sided_nudge(&a, &b), Vec2::ZERO);
    }

    #[test]
    fn four_sided_cancels_when_centered() {
        let building = Rect::centered(Vec2::new(50.0, 50.0), Vec2::new(40.0, 40.0));
        let player = Rect::centered(Vec2::new(50.0, 50.0), Vec2::new(10.0, 10.0));
        assert_eq!(four_sided_nudge(&player, &building), Vec2::ZERO);

        let off_center = Rect::centered(Vec2::new(60.0, 50.0), Vec2::new(10.0, 10.0));
        assert_eq!(four_sided_nudge(&off_center, &building), Vec2::new(20.0, 0.0));
    }
}
