//! Translation lookaside buffer with NRU clock replacement.
//!
//! The TLB caches recent page -> frame translations together with the
//! reference and modify bits the hardware sets on access. Those bits belong
//! to the physical frame, so whenever a valid entry is overwritten (or the
//! TLB is written back) they are pushed to a [`FrameBits`] receiver.

mod tlb_entry;

use log::{debug, info, trace};
use memory::FrameBits;

pub use tlb_entry::{TlbEntry, NUMBER_MASK};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Load,
    Store,
}

#[derive(Debug)]
pub struct Tlb<B: FrameBits> {
    entries: Vec<TlbEntry>,
    /// Next entry to consider evicting
    clock_hand: usize,
    bits: B,
}

impl<B: FrameBits> Tlb<B> {
    /// Allocates `capacity` entries, all invalid.
    pub fn init(capacity: usize, bits: B) -> Self {
        assert!(capacity > 0, "TLB capacity must be at least 1");
        info!("Initializing TLB with {} entries", capacity);
        Self {
            entries: vec![TlbEntry::default(); capacity],
            clock_hand: 0,
            bits,
        }
    }

    pub fn capacity(&self) -> usize {
        self.entries.len()
    }

    pub fn clock_hand(&self) -> usize {
        self.clock_hand
    }

    pub fn entries(&self) -> &[TlbEntry] {
        &self.entries
    }

    pub fn bits(&self) -> &B {
        &self.bits
    }

    /// Invalidates every entry.
    pub fn clear_all(&mut self) {
        debug!("Flushing TLB");
        for entry in self.entries.iter_mut() {
            entry.valid = false;
        }
    }

    pub fn clear_all_reference_bits(&mut self) {
        for entry in self.entries.iter_mut() {
            entry.reference = false;
        }
    }

    /// Invalidates the entry caching `vpn`, if any.
    pub fn clear_entry(&mut self, vpn: u32) {
        for entry in self.entries.iter_mut().filter(|entry| entry.matches(vpn)) {
            trace!("TLB clear: page {:#x}", vpn);
            entry.valid = false;
        }
    }

    /// Writes back the R/M bits of the entry caching `vpn` and invalidates
    /// it. Returns the entry that was dropped.
    pub fn flush_entry(&mut self, vpn: u32) -> Option<TlbEntry> {
        let entry = self.entries.iter_mut().find(|entry| entry.matches(vpn))?;
        entry.valid = false;
        let flushed = *entry;
        trace!("TLB flush: page {:#x} frame {:#x}", vpn, flushed.pfn);
        self.write_back_entry(&flushed);
        Some(flushed)
    }

    /// Translates `vpn`. `None` is a TLB miss.
    ///
    /// On a hit the entry's R bit is set, and its M bit too for a store.
    pub fn lookup(&mut self, vpn: u32, operation: Operation) -> Option<u32> {
        let Some(entry) = self.entries.iter_mut().find(|entry| entry.matches(vpn)) else {
            trace!("TLB miss: page {:#x}", vpn);
            return None;
        };
        entry.reference = true;
        if operation == Operation::Store {
            entry.modify = true;
        }
        trace!("TLB hit: page {:#x} -> frame {:#x}", vpn, entry.pfn);
        Some(entry.pfn)
    }

    /// Caches `vpn -> pfn`, evicting an entry with the NRU clock.
    ///
    /// Starting at the clock hand, the first entry that is invalid or has a
    /// clear R bit is taken. The scan stops at the end of the table; if it
    /// finds nothing, the entry under the hand is taken. The hand then moves
    /// one past the chosen entry. Returns the valid entry that was evicted.
    pub fn insert(&mut self, vpn: u32, pfn: u32, modify: bool, reference: bool) -> Option<TlbEntry> {
        debug_assert!(
            !self.entries.iter().any(|entry| entry.matches(vpn)),
            "page {:#x} is already cached",
            vpn
        );
        if let Some(index) =
            (self.clock_hand..self.entries.len()).find(|&i| self.entries[i].is_replaceable())
        {
            self.clock_hand = index;
        }

        let victim = self.entries[self.clock_hand];
        let evicted = if victim.valid {
            debug!(
                "TLB evict: slot {} page {:#x} frame {:#x} (R={}, M={})",
                self.clock_hand, victim.vpn, victim.pfn, victim.reference, victim.modify
            );
            self.write_back_entry(&victim);
            Some(victim)
        } else {
            None
        };

        self.entries[self.clock_hand] = TlbEntry::new(vpn, pfn, modify, reference);
        trace!("TLB insert: slot {} page {:#x} -> frame {:#x}", self.clock_hand, vpn, pfn);

        self.clock_hand += 1;
        if self.clock_hand >= self.entries.len() {
            self.clock_hand = 0;
        }
        evicted
    }

    /// Pushes the R and M bits of every valid entry to the frame bitmaps.
    /// The entries stay cached.
    pub fn write_back(&self) {
        for entry in self.entries.iter().filter(|entry| entry.valid) {
            self.write_back_entry(entry);
        }
    }

    fn write_back_entry(&self, entry: &TlbEntry) {
        self.bits.record_reference_bit(entry.pfn, entry.reference);
        self.bits.record_modify_bit(entry.pfn, entry.modify);
    }
}
