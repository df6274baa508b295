//! Memory-mapped sprite registers

use std::fmt;
use std::slice;

use volatile_register::RW;

use super::OutputSink;

/// One hardware sprite slot
///
/// Same layout as [`super::SpriteRegister`]: x, y, pattern code, priority.
#[repr(C)]
pub struct SpriteSlotRegs {
    pub x: RW<i16>,
    pub y: RW<i16>,
    pub code: RW<u16>,
    pub priority: RW<u16>,
}

/// Sprite registers at a fixed address
pub struct MmioSprites<'a> {
    regs: &'a [SpriteSlotRegs],
}

impl<'a> MmioSprites<'a> {
    /// Returns `None` for a null `base`.
    ///
    /// # Safety
    ///
    /// `base` must point to `slots` consecutive sprite register blocks that
    /// stay mapped for `'a`, and nothing may hold a Rust reference to the
    /// same memory meanwhile.
    pub unsafe fn new(base: *mut SpriteSlotRegs, slots: usize) -> Option<Self> {
        if base.is_null() {
            return None;
        }
        // SAFETY: upheld by the caller
        let regs = unsafe { slice::from_raw_parts(base, slots) };
        Some(Self { regs })
    }

    pub fn slots(&self) -> usize {
        self.regs.len()
    }

    pub fn slot(&self, index: usize) -> Option<&SpriteSlotRegs> {
        self.regs.get(index)
    }
}

impl fmt::Debug for MmioSprites<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MmioSprites")
            .field("base", &self.regs.as_ptr())
            .field("slots", &self.regs.len())
            .finish()
    }
}

impl OutputSink for MmioSprites<'_> {
    fn write_slot(&mut self, index: usize, x: i32, y: i32) {
        if let Some(reg) = self.regs.get(index) {
            // SAFETY: the block is mapped per `new`
            unsafe {
                reg.x.write(x as i16);
                reg.y.write(y as i16);
            }
        }
    }

    fn configure_slot(&mut self, index: usize, pattern: u16, priority: u8) {
        if let Some(reg) = self.regs.get(index) {
            // SAFETY: the block is mapped per `new`
            unsafe {
                reg.code.write(pattern);
                reg.priority.write(priority as u16);
            }
        }
    }
}
