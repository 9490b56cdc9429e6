//! Game tuning
//!
//! Every gameplay constant lives in `GameConfig`. The defaults reproduce
//! the shipped game; an optional RON file can override any subset of
//! fields (missing fields keep their defaults).

use std::collections::HashMap;
use std::path::Path;
use macroquad::math::Vec2;
use serde::{Deserialize, Serialize};
use crate::game::hero::HeroTuning;
use crate::world::ConfigError;

/// Default location of the optional override file.
pub const CONFIG_PATH: &str = "assets/config.ron";

/// Width and height in world units.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Size {
    pub w: f32,
    pub h: f32,
}

impl Size {
    pub const fn new(w: f32, h: f32) -> Self {
        Self { w, h }
    }

    pub fn vec2(self) -> Vec2 {
        Vec2::new(self.w, self.h)
    }
}

/// Sprite and collider sizes, in world units.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SizeConfig {
    pub tile: f32,
    pub hero: Size,
    pub spider: Size,
    pub coin: Size,
    pub key: Size,
    pub door: Size,
    pub switch: Size,
    pub pull_door: Size,
    pub water: Size,
    pub enemy_wall: Size,
    pub decoration: Size,
    /// Extra named platform images beyond `ground` and `grass:WxH`
    pub platforms: HashMap<String, Size>,
}

impl Default for SizeConfig {
    fn default() -> Self {
        Self {
            tile: 42.0,
            hero: Size::new(29.0, 42.0),
            spider: Size::new(42.0, 32.0),
            coin: Size::new(22.0, 22.0),
            key: Size::new(34.0, 30.0),
            door: Size::new(42.0, 66.0),
            switch: Size::new(42.0, 42.0),
            pull_door: Size::new(42.0, 84.0),
            water: Size::new(960.0, 42.0),
            enemy_wall: Size::new(4.0, 42.0),
            decoration: Size::new(42.0, 42.0),
            platforms: HashMap::new(),
        }
    }
}

/// Delays and durations, in milliseconds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimingConfig {
    /// How long a held jump keeps boosting
    pub jump_hold_ms: f32,
    pub door_enter_ms: f32,
    pub camera_fade_ms: f32,
    pub camera_flash_ms: f32,
    /// Wait after drowning (with lives left) before the level restarts
    pub drown_retry_ms: f32,
    /// How long the locked-door hint stays up. 0 hides it the same frame.
    pub locked_hint_ms: f32,
    /// Delay before the start menu freezes the level behind it
    pub menu_pause_ms: f32,
    /// Half-cycle of the key's up and down bob
    pub key_bob_ms: f32,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            jump_hold_ms: 200.0,
            door_enter_ms: 500.0,
            camera_fade_ms: 500.0,
            camera_flash_ms: 500.0,
            drown_retry_ms: 3000.0,
            locked_hint_ms: 3000.0,
            menu_pause_ms: 1000.0,
            key_bob_ms: 800.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub world_size: Size,
    pub gravity: f32,
    pub hero: HeroTuning,
    pub spider_speed: f32,
    pub starting_lives: u32,
    pub coin_reward: u32,
    pub stomp_reward: u32,
    /// Vertical bob amplitude of the key
    pub key_bob_amplitude: f32,
    /// Number of background tracks to pick from
    pub music_tracks: u8,
    pub timing: TimingConfig,
    pub sizes: SizeConfig,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            world_size: Size::new(960.0, 600.0),
            gravity: 1200.0,
            hero: HeroTuning::default(),
            spider_speed: 100.0,
            starting_lives: 3,
            coin_reward: 1,
            stomp_reward: 5,
            key_bob_amplitude: 3.0,
            music_tracks: 3,
            timing: TimingConfig::default(),
            sizes: SizeConfig::default(),
        }
    }
}

impl GameConfig {
    pub fn from_ron(text: &str) -> Result<Self, ConfigError> {
        let config: GameConfig = ron::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path.as_ref())?;
        Self::from_ron(&text)
    }

    /// Load overrides, falling back to defaults if the file is missing or bad.
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref();
        if !path.exists() {
            log::debug!("no config at {}, using defaults", path.display());
            return Self::default();
        }
        match Self::load(path) {
            Ok(config) => {
                log::info!("loaded config from {}", path.display());
                config
            }
            Err(e) => {
                log::warn!("failed to load {}: {}, using defaults", path.display(), e);
                Self::default()
            }
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.starting_lives == 0 {
            return Err(ConfigError::Validation("starting_lives must be at least 1".to_string()));
        }
        if self.world_size.w <= 0.0 || self.world_size.h <= 0.0 {
            return Err(ConfigError::Validation("world_size must be positive".to_string()));
        }
        if self.sizes.tile <= 0.0 {
            return Err(ConfigError::Validation("tile size must be positive".to_string()));
        }
        Ok(())
    }

    /// Size of a platform image: `ground` spans the world, `grass:WxH` is
    /// measured in tiles, anything else must be configured.
    pub fn platform_size(&self, image: &str) -> Result<Vec2, ConfigError> {
        if image == "ground" {
            return Ok(Vec2::new(self.world_size.w, self.sizes.tile));
        }
        if let Some(size) = self.sizes.platforms.get(image) {
            return Ok(size.vec2());
        }
        let tiles = image
            .strip_prefix("grass:")
            .and_then(|dims| dims.split_once('x'))
            .and_then(|(w, h)| Some((w.parse::<u32>().ok()?, h.parse::<u32>().ok()?)))
            .filter(|&(w, h)| w > 0 && h > 0);
        match tiles {
            Some((w, h)) => Ok(Vec2::new(w as f32, h as f32) * self.sizes.tile),
            None => Err(ConfigError::UnknownPlatformImage(image.to_string())),
        }
    }
}
