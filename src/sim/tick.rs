//! Per-vsync tick
//!
//! `publish` hands the current frame to the display, `step` computes the next
//! one. The display therefore always shows the positions from before the step.

use super::state::MotionState;
use crate::output::OutputSink;

/// Write each entity's pattern and priority into its slot
///
/// Called once before the first tick.
pub fn register<S: OutputSink + ?Sized>(state: &MotionState, sink: &mut S) {
    for (slot, entity) in state.entities().iter().enumerate() {
        sink.configure_slot(slot, entity.pattern(), entity.priority());
    }
}

/// Publish current positions, shifted by the configured offset, to the sink
///
/// Writes only to the sink. Slot `i` always receives entity `i`.
pub fn publish<S: OutputSink + ?Sized>(state: &MotionState, sink: &mut S) {
    let offset = state.config().publish_offset;
    for (slot, entity) in state.entities().iter().enumerate() {
        let pos = entity.position();
        sink.write_slot(slot, pos.x.wrapping_add(offset), pos.y.wrapping_add(offset));
    }
}

/// Advance every entity by one step with boundary reflection
pub fn step(state: &mut MotionState) {
    state.advance_all();
}

/// Publish the current frame, then compute the next one
pub fn tick<S: OutputSink + ?Sized>(state: &mut MotionState, sink: &mut S) {
    publish(state, sink);
    step(state);
}
