//! # Page Table (PT)
//!
//! The leaf level. Its entries map 4 KiB frames rather than further tables, so
//! instead of stepping it *translates*.

use crate::entry::{EntryFlags, TableEntry};
use crate::error::PageTableError;
use crate::platform::TableMapper;
use crate::table::TableView;
use kernel_memory_addresses::{PhysicalAddress, TableIndex, TableLevel, VirtualAddress};

/// An L1 table.
#[doc(alias = "PT")]
pub struct PageTable<'m, M: TableMapper> {
    table: TableView<'m, M>,
}

impl<'m, M: TableMapper> PageTable<'m, M> {
    pub(crate) const fn new(table: TableView<'m, M>) -> Self {
        Self { table }
    }

    #[must_use]
    pub const fn address(&self) -> VirtualAddress {
        self.table.address()
    }

    #[must_use]
    pub fn entry(&self, i: TableIndex) -> TableEntry {
        self.table.get(i)
    }

    /// Point the entry for `va` at the frame of `pa` with `flags`.
    ///
    /// Always overwrites; the offset bits of `pa` are dropped.
    pub fn map(&self, va: VirtualAddress, pa: PhysicalAddress, flags: EntryFlags) {
        self.table
            .set(va.index(TableLevel::L1), TableEntry::mapping(pa, flags));
    }

    /// Physical address `va` maps to: the entry's frame plus the page offset.
    ///
    /// # Errors
    /// [`PageTableError::NotMapped`] or [`PageTableError::PermissionsMismatch`]
    /// for the entry selected by `va`.
    pub fn translate(
        &self,
        va: VirtualAddress,
        flags: EntryFlags,
    ) -> Result<PhysicalAddress, PageTableError> {
        let e = self.table.lookup(va.index(TableLevel::L1), flags)?;
        Ok(e.address().join(va.page_offset()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::SimulatedMmu;

    fn leaf(mmu: &SimulatedMmu) -> PageTable<'_, SimulatedMmu> {
        PageTable::new(TableView::new(mmu, SimulatedMmu::frame_va(1)))
    }

    #[test]
    fn translate_adds_page_offset() {
        let mmu = SimulatedMmu::with_frames(2);
        let pt = leaf(&mmu);
        let flags = EntryFlags::from_raw(0xFFF);

        pt.map(
            VirtualAddress::new(0x0000_1234_5678_9000),
            PhysicalAddress::new(0x0000_9876_5432_1ABC),
            flags,
        );

        let pa = pt.translate(VirtualAddress::new(0x0000_1234_5678_9DEF), flags);
        assert_eq!(pa, Ok(PhysicalAddress::new(0x0000_9876_5432_1DEF)));
    }

    #[test]
    fn map_overwrites_existing_leaf() {
        let mmu = SimulatedMmu::with_frames(2);
        let pt = leaf(&mmu);
        let va = VirtualAddress::new(0x4000);

        pt.map(va, PhysicalAddress::new(0x1000), EntryFlags::from_raw(0x003));
        pt.map(va, PhysicalAddress::new(0x7000), EntryFlags::from_raw(0x001));

        let e = pt.entry(va.index(TableLevel::L1));
        assert_eq!(e.address().base(), PhysicalAddress::new(0x7000));
        assert_eq!(e.flags(), EntryFlags::from_raw(0x001));
    }

    #[test]
    fn translate_checks_entry() {
        let mmu = SimulatedMmu::with_frames(2);
        let pt = leaf(&mmu);
        let va = VirtualAddress::new(0x5000);

        assert_eq!(
            pt.translate(va, EntryFlags::from_raw(0x003)),
            Err(PageTableError::NotMapped)
        );

        pt.map(va, PhysicalAddress::new(0x9000), EntryFlags::from_raw(0x003));
        assert!(matches!(
            pt.translate(va, EntryFlags::from_raw(0x007)),
            Err(PageTableError::PermissionsMismatch { .. })
        ));
    }
}
