//! # Page Directory (PD)

use crate::entry::{EntryFlags, TableEntry};
use crate::error::PageTableError;
use crate::page_table::PageTable;
use crate::platform::TableMapper;
use crate::table::{Mapping, TableView};
use crate::FrameAlloc;
use kernel_memory_addresses::{PhysicalAddress, TableIndex, TableLevel, VirtualAddress};

/// An L2 table.
#[doc(alias = "PD")]
pub struct PageDirectory<'m, M: TableMapper> {
    table: TableView<'m, M>,
}

impl<'m, M: TableMapper> PageDirectory<'m, M> {
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

    /// Step into the L1 table that covers `va`.
    ///
    /// # Errors
    /// [`PageTableError::NotMapped`] or [`PageTableError::PermissionsMismatch`].
    pub fn step(
        &self,
        va: VirtualAddress,
        flags: EntryFlags,
    ) -> Result<PageTable<'m, M>, PageTableError> {
        let next = self.table.step(va.index(TableLevel::L2), flags)?;
        Ok(PageTable::new(next))
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
            self.table.get_mapping(va.index(TableLevel::L2), flags, alloc)?
        {
            log::trace!("created L1 table {frame} for {va}");
        }
        self.step(va, flags)?.map(va, pa, flags);
        Ok(())
    }
}
