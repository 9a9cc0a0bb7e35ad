//! # Page Directory Pointer Table (PDPT)

use crate::entry::{EntryFlags, TableEntry};
use crate::error::PageTableError;
use crate::page_table::PageDirectory;
use crate::platform::TableMapper;
use crate::table::{Mapping, TableView};
use crate::FrameAlloc;
use kernel_memory_addresses::{PhysicalAddress, TableIndex, TableLevel, VirtualAddress};

/// An L3 table, reached from a [`PageMapLevel4`](super::PageMapLevel4) step.
#[doc(alias = "PDPT")]
pub struct PageDirectoryPointerTable<'m, M: TableMapper> {
    table: TableView<'m, M>,
}

impl<'m, M: TableMapper> PageDirectoryPointerTable<'m, M> {
    pub(crate) const fn new(table: TableView<'m, M>) -> Self {
        Self { table }
    }

    /// Recursive address of this table.
    #[must_use]
    pub const fn address(&self) -> VirtualAddress {
        self.table.address()
    }

    #[must_use]
    pub fn entry(&self, i: TableIndex) -> TableEntry {
        self.table.get(i)
    }

    /// Step into the L2 table that covers `va`.
    ///
    /// # Errors
    /// [`PageTableError::NotMapped`] or [`PageTableError::PermissionsMismatch`].
    pub fn step(
        &self,
        va: VirtualAddress,
        flags: EntryFlags,
    ) -> Result<PageDirectory<'m, M>, PageTableError> {
        let next = self.table.step(va.index(TableLevel::L3), flags)?;
        Ok(PageDirectory::new(next))
    }

    /// # Errors
    /// See [`PageMapLevel4::map`](super::PageMapLevel4::map).
    pub fn map<A: FrameAlloc + ?Sized>(
        &self,
        alloc: &mut A,
        va: VirtualAddress,
        pa: PhysicalAddress,
        flags: EntryFlags,
    ) -> Result<(), PageTableError> {
        if let Mapping::Created(frame) =
            self.table.get_mapping(va.index(TableLevel::L3), flags, alloc)?
        {
            log::trace!("created L2 table {frame} for {va}");
        }
        self.step(va, flags)?.map(alloc, va, pa, flags)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{SimulatedMmu, page};

    #[test]
    fn step_shifts_own_address() {
        let mmu = SimulatedMmu::with_frames(4);
        let l3 = PageDirectoryPointerTable::new(TableView::new(&mmu, SimulatedMmu::frame_va(2)));
        let flags = EntryFlags::from_raw(0x007);
        l3.table
            .set(TableIndex::new(0xD1), TableEntry::mapping(page(0x3000).base(), flags));

        let va = VirtualAddress::new(0x0000_1234_5678_9000);
        let pd = l3.step(va, flags).unwrap();
        assert_eq!(
            pd.address(),
            SimulatedMmu::frame_va(2).descend(TableIndex::new(0xD1))
        );
    }

    #[test]
    fn step_with_other_flags_reports_both_sets() {
        let mmu = SimulatedMmu::with_frames(4);
        let l3 = PageDirectoryPointerTable::new(TableView::new(&mmu, SimulatedMmu::frame_va(2)));
        l3.table.set(
            TableIndex::new(0xD1),
            TableEntry::mapping(page(0x3000).base(), EntryFlags::from_raw(0x003)),
        );

        let err = l3.step(VirtualAddress::new(0x0000_1234_5678_9000), EntryFlags::from_raw(0x007));
        assert_eq!(
            err.err(),
            Some(PageTableError::PermissionsMismatch {
                actual: EntryFlags::from_raw(0x003),
                requested: EntryFlags::from_raw(0x007),
            })
        );
    }
}
