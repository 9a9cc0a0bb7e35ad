use core::fmt;
use kernel_info::paging::{INDEX_MASK, PAGE_SHIFT, RECURSIVE_INDEX};

/// One of the four levels of the amd64 paging hierarchy, root first.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub enum TableLevel {
    /// Page Map Level 4 (PML4), the root. Index bits `[47:39]`.
    L4,
    /// Page Directory Pointer Table (PDPT). Index bits `[38:30]`.
    L3,
    /// Page Directory (PD). Index bits `[29:21]`.
    L2,
    /// Page Table (PT), the leaf level. Index bits `[20:12]`.
    L1,
}

impl TableLevel {
    /// All levels in walk order.
    pub const ALL: [Self; 4] = [Self::L4, Self::L3, Self::L2, Self::L1];

    /// Bit position of this level's index inside a virtual address.
    #[inline]
    #[must_use]
    pub const fn shift(self) -> u32 {
        match self {
            Self::L4 => PAGE_SHIFT + 27,
            Self::L3 => PAGE_SHIFT + 18,
            Self::L2 => PAGE_SHIFT + 9,
            Self::L1 => PAGE_SHIFT,
        }
    }

    /// The level the walk descends into next, or `None` at the leaf.
    #[inline]
    #[must_use]
    pub const fn next(self) -> Option<Self> {
        match self {
            Self::L4 => Some(Self::L3),
            Self::L3 => Some(Self::L2),
            Self::L2 => Some(Self::L1),
            Self::L1 => None,
        }
    }

    /// The architectural name of the table at this level.
    #[must_use]
    pub const fn table_name(self) -> &'static str {
        match self {
            Self::L4 => "PML4",
            Self::L3 => "PDPT",
            Self::L2 => "PD",
            Self::L1 => "PT",
        }
    }
}

impl fmt::Display for TableLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.table_name())
    }
}

/// Index of an entry inside a page table, always in `0..512`.
///
/// Construction silently keeps only the low 9 bits, matching how the CPU
/// masks an address while walking.
#[repr(transparent)]
#[derive(Copy, Clone, Default, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct TableIndex(u16);

impl TableIndex {
    /// The self-map slot of the root table.
    pub const RECURSIVE: Self = Self::new(RECURSIVE_INDEX);

    #[inline]
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub const fn new(v: u16) -> Self {
        Self(v & INDEX_MASK as u16)
    }

    #[inline]
    #[must_use]
    pub const fn as_usize(self) -> usize {
        self.0 as usize
    }

    #[inline]
    #[must_use]
    pub const fn as_u64(self) -> u64 {
        self.0 as u64
    }
}

impl fmt::Debug for TableIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TableIndex({})", self.0)
    }
}

impl fmt::Display for TableIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl From<u16> for TableIndex {
    #[inline]
    fn from(v: u16) -> Self {
        Self::new(v)
    }
}
