use crate::{MemoryAddress, TableIndex, TableLevel};
use core::fmt;
use kernel_info::paging::{INDEX_BITS, INDEX_MASK, OFFSET_MASK, PAGE_SHIFT};

/// Virtual memory address.
///
/// A thin wrapper around [`MemoryAddress`] that denotes **virtual** addresses
/// and exposes the five fields the page walker extracts from it. It does not
/// validate canonicality; shifting and masking behave exactly like the
/// corresponding integer operations.
///
/// ### Examples
/// ```rust
/// # use kernel_memory_addresses::*;
/// let va = VirtualAddress::new(0xFFFF_FFFF_8000_1234);
/// assert_eq!(va.index(TableLevel::L4).as_usize(), 511);
/// assert_eq!(va.page_offset(), 0x234);
/// ```
#[repr(transparent)]
#[derive(Copy, Clone, Default, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct VirtualAddress(MemoryAddress);

impl VirtualAddress {
    #[inline]
    #[must_use]
    pub const fn new(v: u64) -> Self {
        Self(MemoryAddress::new(v))
    }

    #[inline]
    #[must_use]
    pub const fn zero() -> Self {
        Self::new(0)
    }

    #[inline]
    #[must_use]
    pub const fn as_u64(self) -> u64 {
        self.0.as_u64()
    }

    /// The table index this address selects at `level`.
    #[inline]
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub const fn index(self, level: TableLevel) -> TableIndex {
        TableIndex::new(((self.as_u64() >> level.shift()) & INDEX_MASK) as u16)
    }

    /// This address with the index field of `level` replaced by `index`.
    #[inline]
    #[must_use]
    pub const fn with_index(self, level: TableLevel, index: TableIndex) -> Self {
        let shift = level.shift();
        Self(self.0.with_bits(index.as_u64() << shift, INDEX_MASK << shift))
    }

    /// The in-page offset (bits `[11:0]`).
    #[inline]
    #[must_use]
    pub const fn page_offset(self) -> u64 {
        self.as_u64() & OFFSET_MASK
    }

    /// This address with the in-page offset replaced; `offset` is truncated to 12 bits.
    #[inline]
    #[must_use]
    pub const fn with_page_offset(self, offset: u64) -> Self {
        Self(self.0.with_bits(offset, OFFSET_MASK))
    }

    /// Shift every index field one level towards the root and place `index`
    /// in the L1 field.
    ///
    /// Applied to the address of a table that is reached through the
    /// recursive slot, this yields the address of the child table behind
    /// `index`: the outermost field falls off the top, every remaining field
    /// moves up by [`INDEX_BITS`], and the offset stays zero.
    #[inline]
    #[must_use]
    pub const fn descend(self, index: TableIndex) -> Self {
        Self::new((self.as_u64() << INDEX_BITS) | (index.as_u64() << PAGE_SHIFT))
    }
}

impl fmt::Debug for VirtualAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "VA(0x{:016X})", self.as_u64())
    }
}

impl fmt::Display for VirtualAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:016X}", self.as_u64())
    }
}

impl From<u64> for VirtualAddress {
    #[inline]
    fn from(v: u64) -> Self {
        Self::new(v)
    }
}
