//! # Table Entries
//!
//! The single 64-bit record format shared by all four paging levels.
//!
//! | Bits   | Field | Meaning |
//! |--------|-------|---------|
//! | 0–11   | flags | Permission, presence and caching bits ([`EntryFlags`]) |
//! | 12–47  | frame | Physical frame address bits `[47:12]` |
//! | 48–63  | –     | Reserved; this crate never sets them |
//!
//! An all-zero entry is the "nothing mapped here" sentinel. Address and flags
//! live in disjoint bit ranges, so writing one never disturbs the other.

use bitfield_struct::bitfield;
use kernel_info::paging::{FRAME_ADDRESS_MASK, PAGE_SHIFT};
use kernel_memory_addresses::{PhysicalAddress, PhysicalPage};

/// Mask of the twelve flag bits.
const FLAGS_MASK: u16 = 0x0FFF;

/// The low twelve bits of a table entry.
///
/// The paging core treats these as an opaque bit pattern: it stores them and
/// compares them, but never interprets individual bits. The named accessors
/// exist for callers that build flag sets.
#[bitfield(u16)]
#[derive(PartialEq, Eq, Hash)]
pub struct EntryFlags {
    /// **Present** (P, bit 0).
    pub present: bool,

    /// **Writable** (RW, bit 1).
    pub writable: bool,

    /// **User/Supervisor** (US, bit 2): user-mode access if set.
    pub user: bool,

    /// **Page Write-Through** (PWT, bit 3).
    pub write_through: bool,

    /// **Page Cache Disable** (PCD, bit 4).
    pub cache_disable: bool,

    /// **Accessed** (A, bit 5): set by the CPU on first use.
    pub accessed: bool,

    /// **Dirty** (D, bit 6): set by the CPU on first write to a leaf.
    pub dirty: bool,

    /// **Page Size** (PS, bit 7); PAT at L1.
    pub huge_page: bool,

    /// **Global** (G, bit 8).
    pub global: bool,

    /// Bits 9–11, ignored by hardware.
    #[bits(3)]
    pub os_available: u8,

    /// Bits 12–15 belong to the frame address, never to the flags.
    #[bits(4)]
    __outside: u8,
}

impl EntryFlags {
    /// Present and writable, supervisor only.
    pub const KERNEL_TABLE: Self = Self::new().with_present(true).with_writable(true);

    /// Build from a raw bit pattern, keeping only the low twelve bits.
    #[inline]
    #[must_use]
    pub const fn from_raw(raw: u16) -> Self {
        Self::from_bits(raw & FLAGS_MASK)
    }

    /// The twelve flag bits as an integer.
    #[inline]
    #[must_use]
    pub const fn raw(self) -> u16 {
        self.into_bits()
    }
}

/// A single page-table entry in hardware format.
#[bitfield(u64)]
#[derive(PartialEq, Eq)]
pub struct TableEntry {
    #[bits(12)]
    flag_bits: u16,

    /// Frame address bits `[47:12]`.
    #[bits(36)]
    frame_number: u64,

    #[bits(16)]
    __reserved: u16,
}

impl TableEntry {
    /// The not-present sentinel (all bits clear).
    #[inline]
    #[must_use]
    pub const fn unused() -> Self {
        Self::new()
    }

    /// Build an entry pointing at `addr` with `flags`.
    #[inline]
    #[must_use]
    pub const fn mapping(addr: PhysicalAddress, flags: EntryFlags) -> Self {
        let mut e = Self::new();
        e.set_address(addr);
        e.set_flags(flags);
        e
    }

    /// `true` if every bit of the entry is zero.
    #[inline]
    #[must_use]
    pub const fn is_unused(self) -> bool {
        self.into_bits() == 0
    }

    /// The physical frame this entry refers to.
    #[inline]
    #[must_use]
    pub const fn address(self) -> PhysicalPage {
        PhysicalPage::from_addr(PhysicalAddress::new(self.frame_number() << PAGE_SHIFT))
    }

    /// Replace the frame address; the low 12 bits and anything above bit 47
    /// of `addr` are dropped. Flags are left alone.
    #[inline]
    pub const fn set_address(&mut self, addr: PhysicalAddress) {
        self.set_frame_number((addr.as_u64() & FRAME_ADDRESS_MASK) >> PAGE_SHIFT);
    }

    #[inline]
    #[must_use]
    pub const fn flags(self) -> EntryFlags {
        EntryFlags::from_raw(self.flag_bits())
    }

    /// Replace the flag bits. The frame address is left alone.
    #[inline]
    pub const fn set_flags(&mut self, flags: EntryFlags) {
        self.set_flag_bits(flags.raw() & FLAGS_MASK);
    }

    /// `true` if the entry's flags are **exactly** `required`.
    ///
    /// This is an equality test, not a subset test: an entry carrying more
    /// permissions than requested does not match.
    #[inline]
    #[must_use]
    pub const fn has_flags(self, required: EntryFlags) -> bool {
        self.flag_bits() == required.raw() & FLAGS_MASK
    }
}

const _: () = {
    assert!(size_of::<TableEntry>() == kernel_info::paging::ENTRY_SIZE);
};
