use std::path::Path;

use campus_common::Rect;
use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::collision::CollisionResponse;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("world bounds {0:?} must be finite with positive size")]
    InvalidBounds(Rect),
    #[error("view size {0} must be finite and positive")]
    InvalidViewSize(Vec2),
    #[error("player spawn {spawn} lies outside the world {bounds:?}")]
    SpawnOutsideWorld { spawn: Vec2, bounds: Rect },
    #[error("scroll speed {0} must be finite")]
    InvalidScrollSpeed(Vec2),
    #[error("chunk margin {0} must be finite and non-negative")]
    InvalidChunkMargin(f32),
    #[error("pan border {border} must lie in [0, {limit})")]
    InvalidPanBorder { border: f32, limit: f32 },
}

/// World layout and pipeline tuning. Missing fields take the campus defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldConfig {
    pub world_bounds: Rect,
    pub view_size: Vec2,
    pub player_spawn: Vec2,
    /// Added to the player's velocity and the camera every tick.
    pub scroll_speed: Vec2,
    /// Distance from a viewport edge at which the camera pans.
    pub pan_border: f32,
    /// Enemies further than this outside the view are culled.
    pub chunk_margin: f32,
    pub collision_response: CollisionResponse,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            world_bounds: Rect::new(0.0, 0.0, 7000.0, 4000.0),
            view_size: Vec2::new(1366.0, 768.0),
            player_spawn: Vec2::new(900.0, 1100.0),
            scroll_speed: Vec2::ZERO,
            pan_border: 16.0,
            chunk_margin: 1000.0,
            collision_response: CollisionResponse::default(),
        }
    }
}

impl WorldConfig {
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a config from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let file = std::fs::File::open(path)?;
        let config: Self = serde_json::from_reader(file)?;
        config.validate()?;
        Ok(config)
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let file = std::fs::File::create(path)?;
        serde_json::to_writer_pretty(file, self)?;
        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let bounds = self.world_bounds;
        if !bounds.is_valid() || bounds.width <= 0.0 || bounds.height <= 0.0 {
            return Err(ConfigError::InvalidBounds(bounds));
        }
        if !self.view_size.is_finite() || self.view_size.cmple(Vec2::ZERO).any() {
            return Err(ConfigError::InvalidViewSize(self.view_size));
        }
        if !bounds.contains(self.player_spawn) {
            return Err(ConfigError::SpawnOutsideWorld {
                spawn: self.player_spawn,
                bounds,
            });
        }
        if !self.scroll_speed.is_finite() {
            return Err(ConfigError::InvalidScrollSpeed(self.scroll_speed));
        }
        if !self.chunk_margin.is_finite() || self.chunk_margin < 0.0 {
            return Err(ConfigError::InvalidChunkMargin(self.chunk_margin));
        }
        // A border reaching the view center would pan on every tick.
        let limit = self.view_size.min_element() / 2.0;
        if !(self.pan_border >= 0.0 && self.pan_border < limit) {
            return Err(ConfigError::InvalidPanBorder {
                border: self.pan_border,
                limit,
            });
        }
        Ok(())
    }

    /// The chunk: view bounds grown by `chunk_margin` on every side.
    pub(crate) fn chunk_bounds(&self, view: &Rect) -> Rect {
        let m = self.chunk_margin;
        Rect::new(
            view.left - m,
            view.top - m,
            view.width + 2.0 * m,
            view.height + 2.0 * m,
        )
    }
}
