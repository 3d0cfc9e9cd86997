use std::fmt;

use page_table::{LEVEL_BITS, PFRAME_MASK, VPN_MASK};

/// Bits of an address giving the offset into a 4KB page
pub const PAGE_OFFSET_BITS: u32 = 12;

pub const PAGE_SIZE: u32 = 1 << PAGE_OFFSET_BITS;

const OFFSET_MASK: u32 = PAGE_SIZE - 1;

const SECOND_LEVEL_MASK: u32 = (1 << LEVEL_BITS) - 1;

/// The components of a 32 bit virtual address
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VirtualAddress {
    pub va: u32,
    pub vpn: u32,
    /// Index into the first level page table
    pub first: u32,
    /// Index into the second level page table
    pub second: u32,
    pub offset: u32,
}

impl VirtualAddress {
    pub fn from_raw(va: u32) -> Self {
        let vpn = (va >> PAGE_OFFSET_BITS) & VPN_MASK;
        VirtualAddress {
            va,
            vpn,
            first: vpn >> LEVEL_BITS,
            second: vpn & SECOND_LEVEL_MASK,
            offset: va & OFFSET_MASK,
        }
    }
}

impl fmt::Display for VirtualAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "VA({:#010x}) = (vpn={:#x}, first={}, second={}, offset={:#x})",
            self.va, self.vpn, self.first, self.second, self.offset
        )
    }
}

/// Glues a frame number and a page offset back into a physical address
#[inline]
pub fn physical_address(pfn: u32, offset: u32) -> u32 {
    ((pfn & PFRAME_MASK) << PAGE_OFFSET_BITS) | (offset & OFFSET_MASK)
}
