//! Motion configuration
//!
//! Replaces fixed sprite counts and register constants with one explicit,
//! validated value handed to `MotionState::initialize`.

use glam::IVec2;
use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::error::{Axis, ConfigurationError};

/// Parameters of a motion session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MotionConfig {
    /// Number of entities to create
    pub count: usize,
    /// Fixed capacity of the collection (sprite slots available)
    pub capacity: usize,
    /// Addressable display region per axis
    pub bounds: IVec2,
    /// Sprite edge length; the far reflection edge is `bounds - sprite_size`
    pub sprite_size: i32,
    /// Spawn distance from the edges of the travel field
    pub margin: i32,
    /// Per-axis speed magnitude
    pub speed: i32,
    /// Added to both coordinates on publish
    pub publish_offset: i32,
    /// RNG seed; drawn from entropy when absent
    pub seed: Option<u64>,
}

impl Default for MotionConfig {
    fn default() -> Self {
        Self {
            count: MAX_ENTITIES,
            capacity: MAX_ENTITIES,
            bounds: IVec2::splat(DISPLAY_BOUNDS),
            sprite_size: SPRITE_SIZE,
            margin: SPAWN_MARGIN,
            speed: DEFAULT_SPEED,
            publish_offset: PUBLISH_OFFSET,
            seed: None,
        }
    }
}

impl MotionConfig {
    /// Default configuration with `count` entities
    pub fn with_count(count: usize) -> Self {
        Self {
            count,
            ..Self::default()
        }
    }

    /// Far reflection edge per axis (`bounds - sprite_size`)
    #[inline]
    pub fn far_edge(&self) -> IVec2 {
        self.bounds - IVec2::splat(self.sprite_size)
    }

    /// Half-open spawn region `[low, high)` per axis
    pub fn spawn_region(&self) -> (IVec2, IVec2) {
        let low = IVec2::splat(self.margin);
        let high = self.far_edge() - IVec2::splat(self.margin);
        (low, high)
    }

    /// Check the configuration against its own bounds
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        if self.capacity > MAX_ENTITIES {
            return Err(ConfigurationError::CapacityTooLarge {
                capacity: self.capacity,
                max: MAX_ENTITIES,
            });
        }
        if self.count > self.capacity {
            return Err(ConfigurationError::CapacityExceeded {
                count: self.count,
                capacity: self.capacity,
            });
        }
        if self.speed <= 0 {
            return Err(ConfigurationError::InvalidSpeed { speed: self.speed });
        }
        // A sprite spawned on the near edge flips away from the field
        if self.margin < 1 {
            return Err(ConfigurationError::MarginTooSmall {
                margin: self.margin,
            });
        }

        for (axis, bounds) in [(Axis::X, self.bounds.x), (Axis::Y, self.bounds.y)] {
            if self.margin.saturating_mul(2) >= bounds {
                return Err(ConfigurationError::MarginTooLarge {
                    axis,
                    margin: self.margin,
                    bounds,
                });
            }
            if self.sprite_size < 0 || self.sprite_size >= bounds {
                return Err(ConfigurationError::SpriteTooLarge {
                    axis,
                    size: self.sprite_size,
                    bounds,
                });
            }
            let (low, high) = (self.margin, bounds - self.sprite_size - self.margin);
            if low >= high {
                return Err(ConfigurationError::EmptySpawnRegion { axis, low, high });
            }
        }

        Ok(())
    }
}
