//! Two level page table of a 32 bit address space with 4KB pages.
//!
//! A virtual page number has 20 meaningful bits: the top 10 index the first
//! level table, the bottom 10 index a second level table. Second level
//! tables are allocated the first time a page in their range is mapped and
//! are never freed; an unmapped page is one whose present bit is clear.

mod iter;
mod page_table_entry;

use log::{debug, trace};

pub use iter::PageTableIterator;
pub use page_table_entry::{PageTableEntry, PFRAME_MASK, PRESENT_BIT_MASK};

/// Entries in the first level table and in each second level table
pub const PT_SIZE: usize = 1024;

/// Bits of a VPN that index a second level table
pub const LEVEL_BITS: u32 = 10;

/// Lowest 20 bits of a VPN
pub const VPN_MASK: u32 = 0x000F_FFFF;

const SECOND_LEVEL_MASK: u32 = 0x3FF;

type SecondLevelTable = [PageTableEntry; PT_SIZE];

/// Splits a VPN into its first and second level indices
#[inline]
pub fn split_vpn(vpn: u32) -> (usize, usize) {
    debug_assert!(vpn <= VPN_MASK, "VPN {:#x} is wider than 20 bits", vpn);
    let vpn = vpn & VPN_MASK;
    (
        (vpn >> LEVEL_BITS) as usize,
        (vpn & SECOND_LEVEL_MASK) as usize,
    )
}

#[derive(Debug)]
pub struct PageTable {
    first_level: Vec<Option<Box<SecondLevelTable>>>,
}

impl PageTable {
    /// Sets up the first level table with every slot absent.
    pub fn init() -> Self {
        let mut first_level = Vec::with_capacity(PT_SIZE);
        for _ in 0..PT_SIZE {
            first_level.push(None);
        }
        Self { first_level }
    }

    fn get_entry(&self, vpn: u32) -> Option<PageTableEntry> {
        let (first, second) = split_vpn(vpn);
        let second_level = self.first_level[first].as_ref()?;
        Some(second_level[second])
    }

    /// Looks up the frame backing `vpn`. `None` is a page fault.
    pub fn get_frame(&self, vpn: u32) -> Option<u32> {
        match self.get_entry(vpn) {
            Some(entry) if entry.is_present() => {
                trace!("PT hit: page {:#x} -> frame {:#x}", vpn, entry.get_frame_number());
                Some(entry.get_frame_number())
            }
            _ => {
                debug!("Page fault on page {:#x}", vpn);
                None
            }
        }
    }

    pub fn is_present(&self, vpn: u32) -> bool {
        self.get_entry(vpn).map_or(false, |entry| entry.is_present())
    }

    /// Maps `vpn` to `frame_number`, replacing whatever mapping was there.
    pub fn update(&mut self, vpn: u32, frame_number: u32) {
        let (first, second) = split_vpn(vpn);
        let second_level = self.first_level[first].get_or_insert_with(|| {
            debug!("Allocating second level table {}", first);
            Box::new([PageTableEntry::zero(); PT_SIZE])
        });
        second_level[second].map_to_frame(frame_number);
        trace!("PT update: page {:#x} -> frame {:#x}", vpn, frame_number & PFRAME_MASK);
    }

    /// Clears the present bit of `vpn`. Called when the backing frame is
    /// evicted; the frame bits are left in place.
    pub fn clear_entry(&mut self, vpn: u32) {
        let (first, second) = split_vpn(vpn);
        if let Some(second_level) = self.first_level[first].as_mut() {
            second_level[second].clear_present();
            trace!("PT clear: page {:#x}", vpn);
        }
    }

    /// Number of second level tables allocated so far
    pub fn second_level_tables(&self) -> usize {
        self.first_level.iter().filter(|slot| slot.is_some()).count()
    }

    pub fn iter(&self) -> PageTableIterator<'_> {
        PageTableIterator::new(self)
    }
}

impl Default for PageTable {
    fn default() -> Self {
        Self::init()
    }
}

#[cfg(test)]
mod tests {
    use rand::Rng;

    use super::*;

    #[test]
    fn split() {
        assert_eq!(split_vpn(0), (0, 0));
        assert_eq!(split_vpn(0x3FF), (0, 1023));
        assert_eq!(split_vpn(0x400), (1, 0));
        assert_eq!(split_vpn(0xFFFFF), (1023, 1023));
        assert_eq!(split_vpn((5 << 10) | 17), (5, 17));
    }

    #[test]
    fn create_mapping() {
        let mut table = PageTable::init();
        table.update(12, 43);
        table.update(4, 45);
        assert_eq!(table.get_frame(12), Some(43));
        assert_eq!(table.get_frame(4), Some(45));

        table.update(12, 49);
        assert_eq!(table.get_frame(12), Some(49));
    }

    #[test]
    fn fault_on_absent_first_level() {
        let table = PageTable::init();
        assert_eq!(table.get_frame(0), None);
        assert_eq!(table.get_frame(0xFFFFF), None);
        assert!(!table.is_present(0x12345));
    }

    #[test]
    fn fault_on_absent_second_level_entry() {
        let mut table = PageTable::init();
        table.update(0x400, 7);
        // same second level table, never mapped
        assert_eq!(table.get_frame(0x401), None);
        assert_eq!(table.get_frame(0x7FF), None);
        assert_eq!(table.second_level_tables(), 1);
    }

    #[test]
    fn clear_is_not_delete() {
        let mut table = PageTable::init();
        table.update(0x2345, 99);
        table.clear_entry(0x2345);
        assert_eq!(table.get_frame(0x2345), None);
        assert_eq!(
            table.get_entry(0x2345).unwrap().get_frame_number(),
            99,
            "frame bits survive the clear"
        );
        assert_eq!(table.second_level_tables(), 1);

        table.update(0x2345, 99);
        assert_eq!(table.get_frame(0x2345), Some(99));
    }

    #[test]
    fn clear_unallocated_is_noop() {
        let mut table = PageTable::init();
        table.clear_entry(0x54321);
        assert_eq!(table.second_level_tables(), 0);
        assert_eq!(table.get_frame(0x54321), None);
    }

    #[test]
    fn update_is_idempotent() {
        let mut table = PageTable::init();
        table.update(77, 5);
        table.update(77, 5);
        assert_eq!(table.get_frame(77), Some(5));
        assert_eq!(table.iter().count(), 1);
    }

    #[test]
    fn lazy_second_level_allocation() {
        let mut table = PageTable::init();
        assert_eq!(table.second_level_tables(), 0);
        table.update(0, 1);
        table.update(1023, 2);
        assert_eq!(table.second_level_tables(), 1);
        table.update(1024, 3);
        table.update(0xFFFFF, 4);
        assert_eq!(table.second_level_tables(), 3);
    }

    #[test]
    fn iterate_present_mappings() {
        let mut table = PageTable::init();
        table.update(0xFFFFF, 4);
        table.update(3, 30);
        table.update(0x800, 8);
        table.update(5, 50);
        table.clear_entry(5);
        let mappings: Vec<(u32, u32)> = table.iter().collect();
        assert_eq!(mappings, vec![(3, 30), (0x800, 8), (0xFFFFF, 4)]);
    }

    #[test]
    fn random_round_trip() {
        let mut rng = rand::thread_rng();
        let mut table = PageTable::init();
        let mut expected = std::collections::HashMap::new();
        for _ in 0..2000 {
            let vpn = rng.gen_range(0..=VPN_MASK);
            let frame = rng.gen_range(0..=PFRAME_MASK);
            table.update(vpn, frame);
            expected.insert(vpn, frame);
        }
        for (vpn, frame) in expected.iter() {
            assert_eq!(table.get_frame(*vpn), Some(*frame), "Error at page {:#x}", vpn);
        }
        assert_eq!(table.iter().count(), expected.len());
    }
}
