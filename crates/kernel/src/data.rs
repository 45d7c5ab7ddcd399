//! Static per-kind creature data and the campus layout.

use campus_assets::TextureId;
use campus_common::Category;
use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Everything that can be spawned as a creature node, buildings included.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum CreatureKind {
    Player,
    Bunny,
    Bear,
    StudentUnion,
    CollegeCenter,
    CampusSafety,
    Classroom,
    ClassroomFlipped,
    Pool,
    RelayPool,
    Football,
    Soccer,
    Tennis,
    Harbor,
    Mbcc,
    Maintenance,
    Starbucks,
    Track,
    Baseball,
}

/// Static traits looked up by kind.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CreatureData {
    pub hitpoints: f32,
    /// Maximum speed in pixels per second.
    pub speed: f32,
    pub texture: TextureId,
    /// Seconds between attacks.
    pub attack_interval: f32,
}

impl CreatureKind {
    pub fn category(self) -> Category {
        match self {
            Self::Player => Category::PLAYER,
            Self::Bunny => Category::NEUTRAL_NPC,
            Self::Bear => Category::ENEMY_NPC,
            _ => Category::MAP_ASSET,
        }
    }

    pub fn is_map_asset(self) -> bool {
        self.category() == Category::MAP_ASSET
    }

    pub fn data(self) -> CreatureData {
        let (hitpoints, speed, attack_interval) = match self {
            Self::Player => (100.0, 75.0, 1.0),
            Self::Bunny => (20.0, 60.0, 0.0),
            Self::Bear => (60.0, 45.0, 2.0),
            _ => (1.0, 0.0, 0.0),
        };
        CreatureData {
            hitpoints,
            speed,
            texture: self.texture(),
            attack_interval,
        }
    }

    fn texture(self) -> TextureId {
        match self {
            Self::Player => TextureId::Player,
            Self::Bunny => TextureId::Bunny,
            Self::Bear => TextureId::Bear,
            Self::StudentUnion => TextureId::StudentUnion,
            Self::CollegeCenter => TextureId::CollegeCenter,
            Self::CampusSafety => TextureId::CampusSafety,
            Self::Classroom => TextureId::Classroom,
            Self::ClassroomFlipped => TextureId::ClassroomFlipped,
            Self::Pool => TextureId::Pool,
            Self::RelayPool => TextureId::RelayPool,
            Self::Football => TextureId::Football,
            Self::Soccer => TextureId::Soccer,
            Self::Tennis => TextureId::Tennis,
            Self::Harbor => TextureId::Harbor,
            Self::Mbcc => TextureId::Mbcc,
            Self::Maintenance => TextureId::Maintenance,
            Self::Starbucks => TextureId::Starbucks,
            Self::Track => TextureId::Track,
            Self::Baseball => TextureId::Baseball,
        }
    }
}

/// Building placements on the campus map, in world pixels.
pub const CAMPUS_MAP_ASSETS: [(CreatureKind, Vec2); 21] = [
    (CreatureKind::StudentUnion, Vec2::new(4300.0, 700.0)),
    (CreatureKind::CollegeCenter, Vec2::new(3000.0, 700.0)),
    (CreatureKind::CampusSafety, Vec2::new(5500.0, 800.0)),
    (CreatureKind::Classroom, Vec2::new(3900.0, 1700.0)),
    (CreatureKind::Classroom, Vec2::new(3400.0, 2000.0)),
    (CreatureKind::Classroom, Vec2::new(2000.0, 500.0)),
    (CreatureKind::ClassroomFlipped, Vec2::new(6500.0, 1000.0)),
    (CreatureKind::ClassroomFlipped, Vec2::new(6600.0, 1700.0)),
    (CreatureKind::Pool, Vec2::new(2400.0, 1900.0)),
    (CreatureKind::RelayPool, Vec2::new(1800.0, 2250.0)),
    (CreatureKind::Football, Vec2::new(1800.0, 1250.0)),
    (CreatureKind::Soccer, Vec2::new(500.0, 1500.0)),
    (CreatureKind::Tennis, Vec2::new(500.0, 2350.0)),
    (CreatureKind::Harbor, Vec2::new(1300.0, 3500.0)),
    (CreatureKind::Harbor, Vec2::new(700.0, 3300.0)),
    (CreatureKind::Harbor, Vec2::new(100.0, 3500.0)),
    (CreatureKind::Mbcc, Vec2::new(5000.0, 1900.0)),
    (CreatureKind::Maintenance, Vec2::new(4500.0, 3000.0)),
    (CreatureKind::Starbucks, Vec2::new(2000.0, 3700.0)),
    (CreatureKind::Track, Vec2::new(3000.0, 2800.0)),
    (CreatureKind::Baseball, Vec2::new(700.0, 700.0)),
];
