//! MMU simulator core: virtual to physical translation through a TLB and a
//! two level page table, with R/M bit bookkeeping for physical frames.
//!
//! The page table, TLB and frame bitmaps live in their own crates and are
//! re-exported here; [`Mmu`] ties one of each together.

pub mod address;
pub mod config;
pub mod mmu;

pub use address::{physical_address, VirtualAddress, PAGE_OFFSET_BITS, PAGE_SIZE};
pub use config::{MmuConfig, MmuError};
pub use memory::{FrameBitmaps, FrameBits, MemoryError};
pub use mmu::{Mmu, Translation};
pub use page_table::{PageTable, PT_SIZE, VPN_MASK};
pub use tlb::{Operation, Tlb, TlbEntry};
