//! Session settings and presets
//!
//! Persisted as a JSON file next to the binary or wherever the caller points.

use std::fs;
use std::path::Path;

use glam::IVec2;
use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::error::{ConfigurationError, SettingsError};
use crate::sim::MotionConfig;

/// Built-in session presets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum Preset {
    /// Two sprites, polled once per vsync
    Pair,
    /// Full sprite swarm driven from the vsync interrupt
    #[default]
    Swarm,
}

impl Preset {
    pub fn as_str(&self) -> &'static str {
        match self {
            Preset::Pair => "Pair",
            Preset::Swarm => "Swarm",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "pair" | "two" => Some(Preset::Pair),
            "swarm" | "balls" => Some(Preset::Swarm),
            _ => None,
        }
    }

    /// Number of sprites for this preset
    pub fn entity_count(&self) -> usize {
        match self {
            Preset::Pair => 2,
            Preset::Swarm => MAX_ENTITIES,
        }
    }

    /// Motion configuration for this preset
    pub fn motion(&self) -> MotionConfig {
        MotionConfig::with_count(self.entity_count())
    }
}

/// Software vsync source parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct VsyncSettings {
    /// Signals per second
    pub refresh_hz: u32,
    /// Run the motion core every `cycle`-th signal
    pub cycle: u32,
}

impl Default for VsyncSettings {
    fn default() -> Self {
        Self {
            refresh_hz: REFRESH_HZ,
            cycle: 1,
        }
    }
}

/// Session settings
///
/// On load the preset is applied first. Fields present under `motion`,
/// `vsync` and `frames` then override the preset's values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "SettingsFile")]
pub struct Settings {
    /// Preset the motion config was derived from
    pub preset: Preset,
    pub motion: MotionConfig,
    pub vsync: VsyncSettings,
    /// Core ticks to run before the session ends
    pub frames: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self::from_preset(Preset::default())
    }
}

/// Motion fields given explicitly in a settings file
#[derive(Debug, Default, Deserialize)]
struct MotionOverrides {
    count: Option<usize>,
    capacity: Option<usize>,
    bounds: Option<IVec2>,
    sprite_size: Option<i32>,
    margin: Option<i32>,
    speed: Option<i32>,
    publish_offset: Option<i32>,
    seed: Option<u64>,
}

impl MotionOverrides {
    fn apply(self, motion: &mut MotionConfig) {
        if let Some(count) = self.count {
            motion.count = count;
        }
        if let Some(capacity) = self.capacity {
            motion.capacity = capacity;
        }
        if let Some(bounds) = self.bounds {
            motion.bounds = bounds;
        }
        if let Some(sprite_size) = self.sprite_size {
            motion.sprite_size = sprite_size;
        }
        if let Some(margin) = self.margin {
            motion.margin = margin;
        }
        if let Some(speed) = self.speed {
            motion.speed = speed;
        }
        if let Some(publish_offset) = self.publish_offset {
            motion.publish_offset = publish_offset;
        }
        if self.seed.is_some() {
            motion.seed = self.seed;
        }
    }
}

/// On-disk shape of `Settings`
#[derive(Debug, Default, Deserialize)]
struct SettingsFile {
    #[serde(default)]
    preset: Preset,
    #[serde(default)]
    motion: MotionOverrides,
    #[serde(default)]
    vsync: VsyncSettings,
    frames: Option<u64>,
}

impl From<SettingsFile> for Settings {
    fn from(file: SettingsFile) -> Self {
        let mut settings = Settings::from_preset(file.preset);
        file.motion.apply(&mut settings.motion);
        settings.vsync = file.vsync;
        if let Some(frames) = file.frames {
            settings.frames = frames;
        }
        settings
    }
}

impl Settings {
    /// Create settings from a preset (applies preset defaults)
    pub fn from_preset(preset: Preset) -> Self {
        Self {
            preset,
            motion: preset.motion(),
            vsync: VsyncSettings::default(),
            frames: 10 * REFRESH_HZ as u64,
        }
    }

    /// Check motion and vsync parameters
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        self.motion.validate()?;
        if self.vsync.cycle == 0 {
            return Err(ConfigurationError::ZeroCycle);
        }
        Ok(())
    }

    /// Parse and validate settings from JSON text
    pub fn from_json(json: &str) -> Result<Self, SettingsError> {
        let settings: Self = serde_json::from_str(json)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Load settings from a JSON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, SettingsError> {
        let path = path.as_ref();
        let json = fs::read_to_string(path).map_err(|source| SettingsError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let settings = Self::from_json(&json)?;
        log::info!("Loaded settings from {}", path.display());
        Ok(settings)
    }

    /// Load settings, falling back to defaults when the file is missing or bad
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        match Self::load(path) {
            Ok(settings) => settings,
            Err(err) => {
                log::warn!("{err}; using default settings");
                Self::default()
            }
        }
    }

    /// Save settings as pretty-printed JSON
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), SettingsError> {
        let path = path.as_ref();
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json).map_err(|source| SettingsError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        log::info!("Settings saved to {}", path.display());
        Ok(())
    }
}
