use bitflags::bitflags;

bitflags! {
    /// Role flags carried by every scene node.
    ///
    /// Commands are routed to nodes whose category shares at least one bit
    /// with the command's category, and collision responses are chosen by
    /// matching the categories of both colliders. An empty category opts a
    /// node out of both.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
    pub struct Category: u32 {
        const SCENE_GROUND_LAYER = 1 << 0;
        const PLAYER = 1 << 1;
        /// Friendly to the player.
        const FRIENDLY_NPC = 1 << 2;
        /// Neutral to both sides.
        const NEUTRAL_NPC = 1 << 3;
        /// Hostile to the player.
        const ENEMY_NPC = 1 << 4;
        /// Buildings and other static campus landmarks.
        const MAP_ASSET = 1 << 5;

        const NPC = Self::FRIENDLY_NPC.bits() | Self::NEUTRAL_NPC.bits() | Self::ENEMY_NPC.bits();
        const CREATURE = Self::PLAYER.bits() | Self::NPC.bits();
    }
}

// Every named flag must fit in the backing integer.
const _: () = assert!(Category::all().bits().count_ones() < u32::BITS);

/// Which way round a collision pair matched an expected category pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CategoryMatch {
    /// `first` matched the first expected category.
    InOrder,
    /// `second` matched the first expected category; swap to normalize.
    Swapped,
}

impl Category {
    /// True when a command or query for `self` applies to a node of `other`.
    pub fn matches(self, other: Category) -> bool {
        self.intersects(other)
    }

    /// Match the categories of two colliders against an expected pair.
    ///
    /// The in-order reading wins when both readings match.
    pub fn match_pair(
        first: Category,
        second: Category,
        expected_first: Category,
        expected_second: Category,
    ) -> Option<CategoryMatch> {
        if expected_first.matches(first) && expected_second.matches(second) {
            Some(CategoryMatch::InOrder)
        } else if expected_first.matches(second) && expected_second.matches(first) {
            Some(CategoryMatch::Swapped)
        } else {
            None
        }
    }
}
