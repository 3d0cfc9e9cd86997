use super::{PageTable, PT_SIZE};

/// Walks the present mappings of a [`PageTable`] in ascending VPN order.
pub struct PageTableIterator<'a> {
    table: &'a PageTable,
    current: usize,
}

impl<'a> PageTableIterator<'a> {
    pub(super) fn new(table: &'a PageTable) -> Self {
        Self { table, current: 0 }
    }
}

impl<'a> Iterator for PageTableIterator<'a> {
    /// `(vpn, pfn)`
    type Item = (u32, u32);

    fn next(&mut self) -> Option<Self::Item> {
        while self.current < PT_SIZE * PT_SIZE {
            let first = self.current / PT_SIZE;
            let Some(second_level) = &self.table.first_level[first] else {
                // skip the whole unallocated range
                self.current = (first + 1) * PT_SIZE;
                continue;
            };
            let vpn = self.current;
            self.current += 1;
            let entry = second_level[vpn % PT_SIZE];
            if entry.is_present() {
                return Some((vpn as u32, entry.get_frame_number()));
            }
        }
        None
    }
}
