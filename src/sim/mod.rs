//! Motion core
//!
//! Owns the entity collection and advances it one step per vsync:
//! - Fixed capacity, insertion-ordered collection
//! - Collection index is the output slot
//! - Reflection checks the pre-step position, flips, then moves

pub mod config;
pub mod state;
pub mod tick;

pub use config::MotionConfig;
pub use state::{Entity, MotionState, RngState, default_pattern, default_priority};
pub use tick::{publish, register, step, tick};
