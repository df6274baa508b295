//! In-memory sprite register file

use bytemuck::{Pod, Zeroable};
use glam::IVec2;

use super::OutputSink;

/// One sprite slot: four 16-bit words
///
/// Coordinates are truncated to 16 bits on write, as the device register is.
#[repr(C)]
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Pod, Zeroable)]
pub struct SpriteRegister {
    pub x: i16,
    pub y: i16,
    pub code: u16,
    pub priority: u16,
}

impl SpriteRegister {
    #[inline]
    pub fn position(&self) -> IVec2 {
        IVec2::new(self.x as i32, self.y as i32)
    }
}

/// Fixed block of sprite registers
#[derive(Debug, Clone)]
pub struct SpriteRegisterFile {
    slots: Vec<SpriteRegister>,
    dropped_writes: u64,
}

impl SpriteRegisterFile {
    pub fn new(slots: usize) -> Self {
        Self {
            slots: vec![SpriteRegister::zeroed(); slots],
            dropped_writes: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn slot(&self, index: usize) -> Option<&SpriteRegister> {
        self.slots.get(index)
    }

    pub fn slots(&self) -> &[SpriteRegister] {
        &self.slots
    }

    /// Coordinate writes that named a slot past the end of the file
    pub fn dropped_writes(&self) -> u64 {
        self.dropped_writes
    }

    /// Raw register image, ready for a device upload
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.slots)
    }
}

impl OutputSink for SpriteRegisterFile {
    fn write_slot(&mut self, index: usize, x: i32, y: i32) {
        match self.slots.get_mut(index) {
            Some(reg) => {
                reg.x = x as i16;
                reg.y = y as i16;
            }
            None => {
                if self.dropped_writes == 0 {
                    log::warn!(
                        "Dropped write to sprite slot {index} (have {}), further drops are counted only",
                        self.slots.len()
                    );
                }
                self.dropped_writes += 1;
            }
        }
    }

    fn configure_slot(&mut self, index: usize, pattern: u16, priority: u8) {
        if let Some(reg) = self.slots.get_mut(index) {
            reg.code = pattern;
            reg.priority = priority as u16;
        }
    }
}
