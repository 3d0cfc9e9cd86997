/// Lowest 20 bits of a page or frame number
pub const NUMBER_MASK: u32 = 0x000F_FFFF;

/// One cached translation.
///
/// Hardware keeps this in two words (valid + VPN, R + M + PFN); the
/// simulation has no binary layout to honour so the fields are kept apart.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TlbEntry {
    pub valid: bool,
    pub vpn: u32,
    pub reference: bool,
    pub modify: bool,
    pub pfn: u32,
}

impl TlbEntry {
    pub fn new(vpn: u32, pfn: u32, modify: bool, reference: bool) -> Self {
        TlbEntry {
            valid: true,
            vpn: vpn & NUMBER_MASK,
            reference,
            modify,
            pfn: pfn & NUMBER_MASK,
        }
    }

    pub fn matches(&self, vpn: u32) -> bool {
        self.valid && self.vpn == vpn & NUMBER_MASK
    }

    /// A slot the clock hand may take without a second look
    pub fn is_replaceable(&self) -> bool {
        !self.valid || !self.reference
    }
}
