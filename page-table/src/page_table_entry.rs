/// Present bit is the most significant bit of the entry
pub const PRESENT_BIT_MASK: u32 = 0x8000_0000;

/// Lowest 20 bits of the entry
pub const PFRAME_MASK: u32 = 0x000F_FFFF;

/// An entry of a second level page table
///
/// | present: 1 | unused: 11 | frame number: 20 |
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageTableEntry {
    pub(super) entry: u32,
}

impl PageTableEntry {
    pub(super) fn zero() -> Self {
        PageTableEntry { entry: 0 }
    }

    pub fn is_present(&self) -> bool {
        self.entry & PRESENT_BIT_MASK != 0
    }

    pub fn get_frame_number(&self) -> u32 {
        self.entry & PFRAME_MASK
    }

    pub(super) fn map_to_frame(&mut self, frame_number: u32) {
        self.entry = PRESENT_BIT_MASK | (frame_number & PFRAME_MASK);
    }

    /// Drops the present bit, the frame bits stay behind.
    pub(super) fn clear_present(&mut self) {
        self.entry &= !PRESENT_BIT_MASK;
    }
}
