use std::fmt;

use log::{debug, info};
use memory::FrameBitmaps;
use page_table::{PageTable, VPN_MASK};
use tlb::{Operation, Tlb};

use crate::address::{physical_address, VirtualAddress};
use crate::config::{MmuConfig, MmuError};

/// Outcome of translating one virtual address
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Translation {
    /// The TLB held the translation
    TlbHit { pa: u32 },
    /// The TLB missed and the page table supplied the frame; the
    /// translation is now cached
    TableHit { pa: u32 },
    /// No present mapping. The kernel has to page `vpn` in and retry.
    PageFault { vpn: u32 },
}

impl Translation {
    pub fn physical_address(&self) -> Option<u32> {
        match self {
            Translation::TlbHit { pa } | Translation::TableHit { pa } => Some(*pa),
            Translation::PageFault { .. } => None,
        }
    }

    pub fn is_page_fault(&self) -> bool {
        matches!(self, Translation::PageFault { .. })
    }
}

impl fmt::Display for Translation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Translation::TlbHit { pa } => write!(f, "PA {:#010x} (TLB hit)", pa),
            Translation::TableHit { pa } => write!(f, "PA {:#010x} (TLB miss)", pa),
            Translation::PageFault { vpn } => write!(f, "page fault on page {:#x}", vpn),
        }
    }
}

/// One address space worth of translation hardware: a page table, a TLB
/// in front of it and the R/M bitmaps of physical memory.
#[derive(Debug)]
pub struct Mmu {
    config: MmuConfig,
    page_table: PageTable,
    tlb: Tlb<FrameBitmaps>,
    bitmaps: FrameBitmaps,
}

impl Mmu {
    pub fn new(config: MmuConfig) -> Result<Self, MmuError> {
        config.validate()?;
        info!(
            "Building MMU: {} TLB entries, {} frames",
            config.num_tlb_entries, config.num_frames
        );
        let bitmaps = FrameBitmaps::new(config.num_frames);
        Ok(Self {
            page_table: PageTable::init(),
            tlb: Tlb::init(config.num_tlb_entries, bitmaps.clone()),
            bitmaps,
            config,
        })
    }

    pub fn config(&self) -> &MmuConfig {
        &self.config
    }

    pub fn page_table(&self) -> &PageTable {
        &self.page_table
    }

    pub fn tlb(&self) -> &Tlb<FrameBitmaps> {
        &self.tlb
    }

    pub fn bitmaps(&self) -> &FrameBitmaps {
        &self.bitmaps
    }

    /// Translates a virtual address for a load or a store.
    ///
    /// The TLB is probed first. On a miss the page table is consulted and a
    /// present mapping is cached with its R bit set. The M bit is set for a
    /// store or when the frame is already dirty, so a later write back never
    /// turns a dirty frame clean. A page fault leaves both structures
    /// untouched.
    pub fn translate(&mut self, va: u32, operation: Operation) -> Translation {
        let va = VirtualAddress::from_raw(va);
        if let Some(pfn) = self.tlb.lookup(va.vpn, operation) {
            return Translation::TlbHit {
                pa: physical_address(pfn, va.offset),
            };
        }
        let Some(pfn) = self.page_table.get_frame(va.vpn) else {
            return Translation::PageFault { vpn: va.vpn };
        };
        let modify =
            operation == Operation::Store || self.bitmaps.is_modified(pfn).unwrap_or(false);
        self.tlb.insert(va.vpn, pfn, modify, true);
        Translation::TableHit {
            pa: physical_address(pfn, va.offset),
        }
    }

    /// Installs `vpn -> pfn` once the kernel has brought the page in.
    /// A translation of `vpn` still cached from an earlier mapping is
    /// written back and dropped.
    pub fn page_in(&mut self, vpn: u32, pfn: u32) -> Result<(), MmuError> {
        if vpn > VPN_MASK {
            return Err(MmuError::InvalidPage(vpn));
        }
        self.bitmaps.check_frame(pfn)?;
        debug!("Page in: page {:#x} -> frame {:#x}", vpn, pfn);
        self.tlb.flush_entry(vpn);
        self.page_table.update(vpn, pfn);
        Ok(())
    }

    /// Unmaps `vpn` when the kernel evicts its frame. The R/M bits the TLB
    /// gathered for it are written back first so the kernel sees them in the
    /// bitmaps. Returns the frame that backed the page.
    pub fn page_out(&mut self, vpn: u32) -> Option<u32> {
        if vpn > VPN_MASK {
            return None;
        }
        let pfn = self.page_table.get_frame(vpn)?;
        debug!("Page out: page {:#x} from frame {:#x}", vpn, pfn);
        self.tlb.flush_entry(vpn);
        self.page_table.clear_entry(vpn);
        Some(pfn)
    }

    /// Periodic clock interrupt: forgets recent use in the TLB and in the
    /// frame bitmaps.
    pub fn clock_tick(&mut self) {
        self.tlb.clear_all_reference_bits();
        self.bitmaps.clear_reference_bits();
    }

    /// Syncs the TLB's R/M bits into the frame bitmaps.
    pub fn write_back(&self) {
        self.tlb.write_back();
    }

    /// Saves the TLB's R/M bits and flushes it.
    pub fn context_switch(&mut self) {
        info!("Context switch: flushing TLB");
        self.tlb.write_back();
        self.tlb.clear_all();
    }
}
