//! Motion state and entity types
//!
//! The collection is built once and never grows or shrinks. Collection index
//! is the entity's identity and its output slot.

use glam::IVec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::config::MotionConfig;
use crate::consts::*;
use crate::error::ConfigurationError;
use crate::reflect_axis;

/// A moving sprite
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entity {
    position: IVec2,
    velocity: IVec2,
    pattern: u16,
    priority: u8,
}

impl Entity {
    pub fn new(position: IVec2, velocity: IVec2, pattern: u16, priority: u8) -> Self {
        Self {
            position,
            velocity,
            pattern,
            priority,
        }
    }

    #[inline]
    pub fn position(&self) -> IVec2 {
        self.position
    }

    #[inline]
    pub fn velocity(&self) -> IVec2 {
        self.velocity
    }

    /// Pattern code selecting a pre-registered sprite image
    #[inline]
    pub fn pattern(&self) -> u16 {
        self.pattern
    }

    #[inline]
    pub fn priority(&self) -> u8 {
        self.priority
    }

    /// Reflect each axis independently against the pre-step position, then move
    pub(crate) fn advance(&mut self, far: IVec2) {
        let (x, vx) = reflect_axis(self.position.x, self.velocity.x, far.x);
        let (y, vy) = reflect_axis(self.position.y, self.velocity.y, far.y);
        self.position = IVec2::new(x, y);
        self.velocity = IVec2::new(vx, vy);
    }
}

/// Pattern code for the entity at `index`: pattern 1, palette block 1 or 2
pub fn default_pattern(index: usize) -> u16 {
    BALL_PATTERN | ((((index % 2) + 1) as u16) << 8)
}

/// Front half of the collection draws above the back half
pub fn default_priority(index: usize, count: usize) -> u8 {
    if index * 2 < count {
        FRONT_PRIORITY
    } else {
        BACK_PRIORITY
    }
}

/// RNG state wrapper for serialization
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RngState {
    pub seed: u64,
}

impl RngState {
    pub fn new(seed: u64) -> Self {
        Self { seed }
    }

    pub fn to_rng(&self) -> Pcg32 {
        Pcg32::seed_from_u64(self.seed)
    }
}

/// Complete motion state for one session
#[derive(Debug, Clone, Serialize)]
pub struct MotionState {
    config: MotionConfig,
    /// Seed the collection was drawn from (None for an injected RNG or explicit entities)
    rng_state: Option<RngState>,
    /// Completed steps
    frame: u64,
    entities: Vec<Entity>,
}

impl MotionState {
    /// Build the collection from the configured seed, or from entropy
    pub fn initialize(config: MotionConfig) -> Result<Self, ConfigurationError> {
        let rng_state = RngState::new(config.seed.unwrap_or_else(rand::random));
        let mut rng = rng_state.to_rng();
        let mut state = Self::initialize_with_rng(config, &mut rng)?;
        log::info!("Motion seed {}", rng_state.seed);
        state.rng_state = Some(rng_state);
        Ok(state)
    }

    /// Build the collection drawing positions and velocity signs from `rng`
    pub fn initialize_with_rng<R: Rng + ?Sized>(
        config: MotionConfig,
        rng: &mut R,
    ) -> Result<Self, ConfigurationError> {
        config.validate()?;

        let (low, high) = config.spawn_region();
        let mut entities = Vec::with_capacity(config.capacity);
        for i in 0..config.count {
            let position = IVec2::new(
                rng.random_range(low.x..high.x),
                rng.random_range(low.y..high.y),
            );
            let velocity = IVec2::new(
                random_sign(rng) * config.speed,
                random_sign(rng) * config.speed,
            );
            entities.push(Entity::new(
                position,
                velocity,
                default_pattern(i),
                default_priority(i, config.count),
            ));
        }

        log::info!(
            "Initialized {} entities in {}x{} (capacity {}, speed {})",
            entities.len(),
            config.bounds.x,
            config.bounds.y,
            config.capacity,
            config.speed
        );

        Ok(Self {
            config,
            rng_state: None,
            frame: 0,
            entities,
        })
    }

    /// Build from explicit entities (seeded scenarios, restored snapshots)
    ///
    /// `config.count` is replaced by the number of entities given.
    pub fn from_entities(
        mut config: MotionConfig,
        entities: Vec<Entity>,
    ) -> Result<Self, ConfigurationError> {
        config.count = entities.len();
        config.validate()?;
        if let Some(index) = entities
            .iter()
            .position(|e| e.velocity.x == 0 || e.velocity.y == 0)
        {
            return Err(ConfigurationError::ZeroVelocity { index });
        }

        let mut stored = Vec::with_capacity(config.capacity);
        stored.extend(entities);
        Ok(Self {
            config,
            rng_state: None,
            frame: 0,
            entities: stored,
        })
    }

    pub fn config(&self) -> &MotionConfig {
        &self.config
    }

    pub fn seed(&self) -> Option<u64> {
        self.rng_state.as_ref().map(|r| r.seed)
    }

    /// Number of completed steps
    pub fn frame(&self) -> u64 {
        self.frame
    }

    pub fn entities(&self) -> &[Entity] {
        &self.entities
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Advance every entity by one step
    pub(crate) fn advance_all(&mut self) {
        let far = self.config.far_edge();
        for entity in &mut self.entities {
            entity.advance(far);
        }
        self.frame += 1;
    }
}

fn random_sign<R: Rng + ?Sized>(rng: &mut R) -> i32 {
    if rng.random_bool(0.5) { 1 } else { -1 }
}
