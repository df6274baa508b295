//! Display-facing output
//!
//! The motion core only knows slot indices and coordinate pairs. Slot layout
//! and value encoding belong to the sink.

pub mod mmio;
pub mod registers;

pub use mmio::{MmioSprites, SpriteSlotRegs};
pub use registers::{SpriteRegister, SpriteRegisterFile};

/// Destination for published sprite positions
pub trait OutputSink {
    /// Store the coordinates for `index`
    fn write_slot(&mut self, index: usize, x: i32, y: i32);

    /// Store the pattern and priority for `index`
    fn configure_slot(&mut self, index: usize, pattern: u16, priority: u8) {
        let _ = (index, pattern, priority);
    }
}

impl<S: OutputSink + ?Sized> OutputSink for &mut S {
    fn write_slot(&mut self, index: usize, x: i32, y: i32) {
        (**self).write_slot(index, x, y);
    }

    fn configure_slot(&mut self, index: usize, pattern: u16, priority: u8) {
        (**self).configure_slot(index, pattern, priority);
    }
}
