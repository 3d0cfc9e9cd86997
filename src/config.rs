use std::fmt;

use memory::MemoryError;

#[derive(Debug, PartialEq)]
pub enum MmuError {
    InvalidConfig(&'static str),
    /// VPN wider than 20 bits
    InvalidPage(u32),
    Memory(MemoryError),
}

impl fmt::Display for MmuError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MmuError::InvalidConfig(reason) => write!(f, "invalid MMU configuration: {}", reason),
            MmuError::InvalidPage(vpn) => write!(f, "page {:#x} is out of the address space", vpn),
            MmuError::Memory(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for MmuError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            MmuError::Memory(e) => Some(e),
            _ => None,
        }
    }
}

impl From<MemoryError> for MmuError {
    fn from(e: MemoryError) -> Self {
        MmuError::Memory(e)
    }
}

/// Machine parameters chosen before the MMU is built. They cannot change
/// afterwards; page geometry is fixed by the architecture.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MmuConfig {
    pub num_tlb_entries: usize,
    pub num_frames: usize,
}

impl MmuConfig {
    pub fn new(num_tlb_entries: usize, num_frames: usize) -> Self {
        Self {
            num_tlb_entries,
            num_frames,
        }
    }

    pub fn validate(&self) -> Result<(), MmuError> {
        if self.num_tlb_entries == 0 {
            return Err(MmuError::InvalidConfig("TLB needs at least one entry"));
        }
        if self.num_frames == 0 {
            return Err(MmuError::InvalidConfig("physical memory needs at least one frame"));
        }
        if self.num_frames > 1 << 20 {
            return Err(MmuError::InvalidConfig("frame numbers are limited to 20 bits"));
        }
        Ok(())
    }
}

impl Default for MmuConfig {
    /// 16 TLB entries in front of 1GB of 4KB frames
    fn default() -> Self {
        Self::new(16, 1 << 18)
    }
}
