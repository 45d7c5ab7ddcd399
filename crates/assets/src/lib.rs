//! Texture registry: opaque texture handles keyed by `TextureId`.
//!
//! The scene graph never touches pixel data. It holds a `TextureId` and asks
//! the registry for the sprite's pixel size; decoding the file behind the
//! path is the renderer's business.
//!
//! # Layout
//! A manifest can be persisted to disk as JSON for inspection and editing.

use glam::Vec2;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Every texture the game knows about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum TextureId {
    Player,
    Bunny,
    Bear,
    Grass,
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

/// Where a texture lives and how large it is.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextureInfo {
    pub path: PathBuf,
    /// Pixel extent of the full texture.
    pub size: Vec2,
}

/// One manifest row as stored on disk.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct ManifestEntry {
    id: TextureId,
    #[serde(flatten)]
    info: TextureInfo,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct Manifest {
    entries: Vec<ManifestEntry>,
}

/// Errors from manifest operations.
#[derive(Debug, thiserror::Error)]
pub enum AssetError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("texture {id:?} has an invalid size {size:?}")]
    InvalidSize { id: TextureId, size: Vec2 },
    #[error("texture {0:?} is listed twice")]
    Duplicate(TextureId),
}

/// Registry of texture handles.
#[derive(Debug, Clone, Default)]
pub struct TextureRegistry {
    textures: BTreeMap<TextureId, TextureInfo>,
}

impl TextureRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Textures shipped with the campus map, sized in source pixels.
    pub fn campus() -> Self {
        let mut registry = Self::new();
        registry.load(TextureId::Player, "textures/player/pete.png", Vec2::new(32.0, 48.0));
        registry.load(TextureId::Bunny, "textures/npc/bunny.png", Vec2::new(24.0, 24.0));
        registry.load(TextureId::Bear, "textures/npc/bear.png", Vec2::new(64.0, 56.0));

        let world = Path::new("textures/world");
        let buildings = [
            (TextureId::Grass, "test_grass2.png", Vec2::new(256.0, 256.0)),
            (TextureId::StudentUnion, "student-union.png", Vec2::new(520.0, 360.0)),
            (TextureId::CollegeCenter, "college-center.png", Vec2::new(480.0, 340.0)),
            (TextureId::CampusSafety, "campus-safety.png", Vec2::new(260.0, 200.0)),
            (TextureId::Classroom, "classroom.png", Vec2::new(300.0, 180.0)),
            (TextureId::ClassroomFlipped, "classroom-flipped.png", Vec2::new(180.0, 300.0)),
            (TextureId::Pool, "pool.png", Vec2::new(400.0, 220.0)),
            (TextureId::RelayPool, "relay-pool.png", Vec2::new(320.0, 200.0)),
            (TextureId::Football, "football.png", Vec2::new(720.0, 380.0)),
            (TextureId::Soccer, "soccer.png", Vec2::new(640.0, 420.0)),
            (TextureId::Tennis, "tennis.png", Vec2::new(420.0, 300.0)),
            (TextureId::Harbor, "harbor.png", Vec2::new(360.0, 240.0)),
            (TextureId::Mbcc, "mbcc.png", Vec2::new(440.0, 320.0)),
            (TextureId::Maintenance, "maintenance.png", Vec2::new(300.0, 220.0)),
            (TextureId::Starbucks, "starbucks.png", Vec2::new(160.0, 120.0)),
            (TextureId::Track, "track.png", Vec2::new(760.0, 420.0)),
            (TextureId::Baseball, "baseball.png", Vec2::new(560.0, 560.0)),
        ];
        for (id, file, size) in buildings {
            registry.load(id, world.join(file), size);
        }
        registry
    }

    /// Register (or replace) a texture handle.
    pub fn load(&mut self, id: TextureId, path: impl Into<PathBuf>, size: Vec2) {
        self.textures.insert(
            id,
            TextureInfo {
                path: path.into(),
                size,
            },
        );
    }

    pub fn get(&self, id: TextureId) -> Option<&TextureInfo> {
        self.textures.get(&id)
    }

    /// Pixel size of a registered texture.
    ///
    /// # Panics
    /// Panics if `id` was never registered: asking for an unloaded texture is
    /// a programming error, not a runtime condition.
    pub fn size(&self, id: TextureId) -> Vec2 {
        match self.textures.get(&id) {
            Some(info) => info.size,
            None => panic!("texture {id:?} requested before it was loaded"),
        }
    }

    pub fn contains(&self, id: TextureId) -> bool {
        self.textures.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.textures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.textures.is_empty()
    }

    /// Save the registry as a JSON manifest.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), AssetError> {
        let manifest = Manifest {
            entries: self
                .textures
                .iter()
                .map(|(id, info)| ManifestEntry {
                    id: *id,
                    info: info.clone(),
                })
                .collect(),
        };
        let file = std::fs::File::create(path)?;
        serde_json::to_writer_pretty(file, &manifest)?;
        Ok(())
    }

    /// Load a registry from a JSON manifest, rejecting bad sizes and duplicates.
    pub fn load_manifest(path: impl AsRef<Path>) -> Result<Self, AssetError> {
        let file = std::fs::File::open(path)?;
        let manifest: Manifest = serde_json::from_reader(file)?;
        let mut registry = Self::new();
        for entry in manifest.entries {
            let size = entry.info.size;
            if !size.is_finite() || size.x <= 0.0 || size.y <= 0.0 {
                return Err(AssetError::InvalidSize { id: entry.id, size });
            }
            if registry.textures.insert(entry.id, entry.info).is_some() {
                return Err(AssetError::Duplicate(entry.id));
            }
        }
        tracing::debug!(textures = registry.len(), "loaded texture manifest");
        Ok(registry)
    }
}

pub fn crate_info() -> &'static str {
    "campus-assets v0.1.0"
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn campus_has_every_texture() {
        let registry = TextureRegistry::campus();
        assert_eq!(registry.len(), 20);
        assert!(registry.contains(TextureId::Player));
        assert_eq!(registry.size(TextureId::Player), Vec2::new(32.0, 48.0));
        assert!(
            registry
                .get(TextureId::Harbor)
                .unwrap()
                .path
                .ends_with("harbor.png")
        );
    }

    #[test]
    fn load_replaces_existing() {
        let mut registry = TextureRegistry::new();
        registry.load(TextureId::Grass, "a.png", Vec2::splat(8.0));
        registry.load(TextureId::Grass, "b.png", Vec2::splat(16.0));
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.size(TextureId::Grass), Vec2::splat(16.0));
    }

    #[test]
    #[should_panic(expected = "requested before it was loaded")]
    fn missing_texture_panics() {
        TextureRegistry::new().size(TextureId::Bear);
    }

    #[test]
    fn save_and_load() {
        let tmp = tempfile::NamedTempFile::new().unwrap();
        let registry = TextureRegistry::campus();
        registry.save(tmp.path()).unwrap();

        let loaded = TextureRegistry::load_manifest(tmp.path()).unwrap();
        assert_eq!(loaded.len(), registry.len());
        assert_eq!(loaded.size(TextureId::Track), registry.size(TextureId::Track));
    }

    #[test]
    fn manifest_rejects_zero_size() {
        let mut tmp = tempfile::NamedTempFile::new().unwrap();
        write!(
            tmp,
            r#"{{"entries":[{{"id":"Player","path":"p.png","size":[0.0,10.0]}}]}}"#
        )
        .unwrap();
        let err = TextureRegistry::load_manifest(tmp.path()).unwrap_err();
        assert!(matches!(err, AssetError::InvalidSize { id: TextureId::Player, .. }));
    }

    #[test]
    fn manifest_rejects_duplicates() {
        let mut tmp = tempfile::NamedTempFile::new().unwrap();
        write!(
            tmp,
            r#"{{"entries":[
                {{"id":"Pool","path":"a.png","size":[1.0,1.0]}},
                {{"id":"Pool","path":"b.png","size":[2.0,2.0]}}
            ]}}"#
        )
        .unwrap();
        let err = TextureRegistry::load_manifest(tmp.path()).unwrap_err();
        assert!(matches!(err, AssetError::Duplicate(TextureId::Pool)));
    }
}
