//! # Page Map Level 4 (PML4)
//!
//! The root of the hierarchy. Entry 511 is reserved for the self-map: it
//! points back at the PML4's own frame, which makes every table of the active
//! hierarchy visible at an address derived from [`RECURSIVE_ROOT`].
//!
//! Stepping out of the PML4 always starts from [`RECURSIVE_ROOT`], never from
//! the address the PML4 itself is accessed through. A freshly built root can
//! therefore be bootstrapped through any temporary window, while everything
//! below it is reached through the recursive slot once it is active. Until
//! then [`step`](PageMapLevel4::step) and [`map`](PageMapLevel4::map) refuse
//! with [`PageTableError::InactiveRoot`] instead of touching the tables of
//! whichever hierarchy happens to be loaded.

use crate::entry::{EntryFlags, TableEntry};
use crate::error::PageTableError;
use crate::page_table::PageDirectoryPointerTable;
use crate::platform::TableMapper;
use crate::table::{Mapping, TableView};
use crate::FrameAlloc;
use kernel_info::paging::RECURSIVE_ROOT;
use kernel_memory_addresses::{PhysicalAddress, PhysicalPage, TableIndex, TableLevel, VirtualAddress};

const ROOT: VirtualAddress = VirtualAddress::new(RECURSIVE_ROOT);

/// The top-level table (L4).
#[doc(alias = "PML4")]
pub struct PageMapLevel4<'m, M: TableMapper> {
    table: TableView<'m, M>,
}

impl<'m, M: TableMapper> PageMapLevel4<'m, M> {
    /// View the PML4 stored at `storage`.
    pub(crate) const fn new(mapper: &'m M, storage: VirtualAddress) -> Self {
        Self {
            table: TableView::new(mapper, storage),
        }
    }

    /// Address through which this table's own storage is accessed.
    #[must_use]
    pub const fn address(&self) -> VirtualAddress {
        self.table.address()
    }

    #[must_use]
    pub fn entry(&self, i: TableIndex) -> TableEntry {
        self.table.get(i)
    }

    /// Install the self-map: entry 511 points at `root` (present, writable).
    ///
    /// `root` must be the frame this table is stored in; nothing here can
    /// check that.
    pub fn bootstrap(&self, root: PhysicalPage) {
        self.table.set(
            TableIndex::RECURSIVE,
            TableEntry::mapping(root.base(), EntryFlags::KERNEL_TABLE),
        );
    }

    /// The frame recorded in the self-map entry.
    #[must_use]
    pub fn phys(&self) -> PhysicalPage {
        self.table.get(TableIndex::RECURSIVE).address()
    }

    /// `true` once [`bootstrap`](Self::bootstrap) has installed a present
    /// self-map entry.
    #[must_use]
    pub fn is_bootstrapped(&self) -> bool {
        let e = self.table.get(TableIndex::RECURSIVE);
        !e.is_unused() && e.flags().present()
    }

    /// Fails unless the self-map of the loaded hierarchy names this table's
    /// frame. A table accessed through [`RECURSIVE_ROOT`] is active by
    /// construction.
    fn ensure_active(&self) -> Result<(), PageTableError> {
        if self.table.address() == ROOT {
            return Ok(());
        }
        let root = self.phys();
        let active = self.table.at(ROOT).get(TableIndex::RECURSIVE).address();
        if root == active {
            Ok(())
        } else {
            log::warn!("refusing to touch tables below inactive root {root}");
            Err(PageTableError::InactiveRoot { root, active })
        }
    }

    /// Step into the L3 table that covers `va`.
    ///
    /// # Errors
    /// - [`PageTableError::InactiveRoot`] if this table is not the loaded root.
    /// - [`PageTableError::NotMapped`] or [`PageTableError::PermissionsMismatch`]
    ///   for the L4 entry selected by `va`.
    pub fn step(
        &self,
        va: VirtualAddress,
        flags: EntryFlags,
    ) -> Result<PageDirectoryPointerTable<'m, M>, PageTableError> {
        self.ensure_active()?;
        let next = self.table.step_from(ROOT, va.index(TableLevel::L4), flags)?;
        Ok(PageDirectoryPointerTable::new(next))
    }

    /// Map the 4 KiB page at `va` to `pa`, creating missing tables on the way.
    ///
    /// The table must be active: new child tables are cleared through the
    /// recursive window.
    ///
    /// # Errors
    /// [`PageTableError::InactiveRoot`] before anything is allocated if this
    /// table is not the loaded root. Otherwise the first error of any level,
    /// unchanged; tables created before the failure stay in place.
    pub fn map<A: FrameAlloc + ?Sized>(
        &self,
        alloc: &mut A,
        va: VirtualAddress,
        pa: PhysicalAddress,
        flags: EntryFlags,
    ) -> Result<(), PageTableError> {
        self.ensure_active()?;
        let i = va.index(TableLevel::L4);
        if let Mapping::Created(frame) = self.table.get_mapping_from(ROOT, i, flags, alloc)? {
            log::trace!("created L3 table {frame} for {va}");
        }
        self.step(va, flags)?.map(alloc, va, pa, flags)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::RootTableRegister;
    use crate::testing::{FixedAlloc, SimulatedMmu, page};

    #[test]
    fn bootstrap_then_phys_returns_root() {
        let mmu = SimulatedMmu::with_frames(4);
        let pml4 = PageMapLevel4::new(&mmu, SimulatedMmu::frame_va(1));
        assert!(!pml4.is_bootstrapped());

        pml4.bootstrap(page(0x1000));
        assert!(pml4.is_bootstrapped());
        assert_eq!(pml4.phys(), page(0x1000));
        assert_eq!(
            pml4.entry(TableIndex::RECURSIVE).flags(),
            EntryFlags::KERNEL_TABLE
        );

        // Only the self-map slot is touched.
        assert!(pml4.entry(TableIndex::new(0)).is_unused());
        assert!(pml4.entry(TableIndex::new(510)).is_unused());
    }

    #[test]
    fn phys_echoes_any_frame() {
        let mmu = SimulatedMmu::with_frames(2);
        let pml4 = PageMapLevel4::new(&mmu, SimulatedMmu::frame_va(1));
        pml4.bootstrap(page(0x0000_1234_5678_9000));
        assert_eq!(pml4.phys(), page(0x0000_1234_5678_9000));
    }

    #[test]
    fn step_ignores_storage_address() {
        let mmu = SimulatedMmu::with_frames(4);
        let pml4 = PageMapLevel4::new(&mmu, SimulatedMmu::frame_va(1));
        pml4.bootstrap(page(0x1000));
        unsafe { mmu.load_root(page(0x1000)) };
        let flags = EntryFlags::from_raw(0x003);
        pml4.table
            .set(TableIndex::new(5), TableEntry::mapping(page(0x2000).base(), flags));

        let va = VirtualAddress::zero().with_index(TableLevel::L4, TableIndex::new(5));
        let pdpt = pml4.step(va, flags).unwrap();
        assert_eq!(pdpt.address(), VirtualAddress::new(0xFFFF_FFFF_FFE0_5000));
    }

    #[test]
    fn step_through_missing_entry_fails() {
        let mmu = SimulatedMmu::with_frames(2);
        let pml4 = PageMapLevel4::new(&mmu, SimulatedMmu::frame_va(1));
        pml4.bootstrap(page(0x1000));
        unsafe { mmu.load_root(page(0x1000)) };

        let err = pml4.step(VirtualAddress::new(0x0000_1234_5678_9000), EntryFlags::KERNEL_TABLE);
        assert!(matches!(err, Err(PageTableError::NotMapped)));
    }

    #[test]
    fn unloaded_root_refuses_step_and_map() {
        let mmu = SimulatedMmu::with_frames(4);
        let active = PageMapLevel4::new(&mmu, SimulatedMmu::frame_va(1));
        active.bootstrap(page(0x1000));
        unsafe { mmu.load_root(page(0x1000)) };

        let other = PageMapLevel4::new(&mmu, SimulatedMmu::frame_va(2));
        other.bootstrap(page(0x2000));
        let flags = EntryFlags::KERNEL_TABLE;
        let va = VirtualAddress::new(0x0000_1234_5678_9000);
        let expected = PageTableError::InactiveRoot {
            root: page(0x2000),
            active: page(0x1000),
        };

        assert!(matches!(other.step(va, flags), Err(e) if e == expected));

        let mut alloc = FixedAlloc::new(page(0x3000));
        assert_eq!(other.map(&mut alloc, va, PhysicalAddress::new(0x5000), flags), Err(expected));
        assert_eq!(alloc.calls, 0);
        assert!(active.entry(va.index(TableLevel::L4)).is_unused());

        // Through the self-map the loaded root is always active.
        let through_window = PageMapLevel4::new(&mmu, ROOT);
        assert!(matches!(through_window.step(va, flags), Err(PageTableError::NotMapped)));
    }
}
