//! Sprite Motion - a vsync-driven bouncing sprite core
//!
//! Core modules:
//! - `sim`: Motion core (entity collection, publish/step/tick)
//! - `output`: Display-facing sprite slot sinks
//! - `vsync`: Tick handoff between a vsync source and the motion core
//! - `settings`: Presets and JSON-backed configuration

pub mod error;
pub mod output;
pub mod settings;
pub mod sim;
pub mod vsync;

pub use error::{ConfigurationError, SettingsError};
pub use output::{OutputSink, SpriteRegister, SpriteRegisterFile};
pub use settings::{Preset, Settings, VsyncSettings};
pub use sim::{Entity, MotionConfig, MotionState};

/// Display and sprite constants
pub mod consts {
    /// Hardware sprite slots available for moving entities
    pub const MAX_ENTITIES: usize = 30;

    /// Addressable display region (pixels per axis)
    pub const DISPLAY_BOUNDS: i32 = 256;
    /// Sprite edge length in pixels
    pub const SPRITE_SIZE: i32 = 16;
    /// Minimum distance from the display edge at spawn
    pub const SPAWN_MARGIN: i32 = 5;
    /// Per-axis speed (pixels per tick)
    pub const DEFAULT_SPEED: i32 = 2;

    /// Added to every published coordinate to move the registration point
    /// into the visible sprite plane
    pub const PUBLISH_OFFSET: i32 = 16;

    /// Default pattern code (pattern 1)
    pub const BALL_PATTERN: u16 = 0x0001;
    /// Priority for the front half of the collection
    pub const FRONT_PRIORITY: u8 = 3;
    /// Priority for the back half of the collection
    pub const BACK_PRIORITY: u8 = 1;

    /// Vertical refresh rate of the software vsync source
    pub const REFRESH_HZ: u32 = 60;
}

/// Reflect one axis off the near (0) and far boundaries, then advance it.
///
/// The boundary check uses the position *before* the move, inclusive at
/// both ends. Returns the new `(position, velocity)`.
#[inline]
pub fn reflect_axis(position: i32, velocity: i32, far: i32) -> (i32, i32) {
    let velocity = if position <= 0 || position >= far {
        velocity.wrapping_neg()
    } else {
        velocity
    };
    (position.wrapping_add(velocity), velocity)
}
