//! # Generic Page Table
//!
//! [`Table`] is the storage shared by every paging level: 512 entries filling
//! one 4 KiB frame. It provides the two primitives all level views are built
//! from:
//!
//! - [`Table::step`]: check an entry and compute the virtual address at which
//!   the child table behind it is visible through the recursive mapping.
//! - [`Table::get_mapping`]: make sure an entry refers to *some* frame,
//!   allocating one on first use and leaving existing entries untouched.
//!
//! Neither primitive dereferences the computed addresses. That is the job of
//! [`TableView`], which pairs a table address with a [`TableMapper`].

use crate::entry::{EntryFlags, TableEntry};
use crate::error::PageTableError;
use crate::platform::TableMapper;
use crate::FrameAlloc;
use kernel_info::paging::{ENTRIES_PER_TABLE, PAGE_SIZE};
use kernel_memory_addresses::{PhysicalPage, TableIndex, VirtualAddress};

/// A page table of any level: 512 entries, 4 KiB-aligned.
#[repr(C, align(4096))]
pub struct Table {
    entries: [TableEntry; ENTRIES_PER_TABLE],
}

const _: () = {
    assert!(size_of::<Table>() == PAGE_SIZE as usize);
    assert!(align_of::<Table>() == PAGE_SIZE as usize);
};

/// Outcome of [`Table::get_mapping`].
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Mapping {
    /// The entry was already mapped and has not been touched.
    Present,
    /// The entry was empty; this frame was allocated and installed.
    Created(PhysicalPage),
}

impl Table {
    /// A table with every entry unused.
    #[inline]
    #[must_use]
    pub const fn zeroed() -> Self {
        Self {
            entries: [TableEntry::unused(); ENTRIES_PER_TABLE],
        }
    }

    #[inline]
    #[must_use]
    pub const fn get(&self, i: TableIndex) -> TableEntry {
        self.entries[i.as_usize()]
    }

    /// Write the entry at `i`.
    ///
    /// Caller is responsible for any TLB invalidation required when the entry
    /// belongs to an active hierarchy.
    #[inline]
    pub const fn set(&mut self, i: TableIndex, e: TableEntry) {
        self.entries[i.as_usize()] = e;
    }

    /// Clear all entries.
    #[inline]
    pub fn zero(&mut self) {
        self.entries.fill(TableEntry::unused());
    }

    /// Fetch the entry at `i` if it is mapped with exactly `flags`.
    ///
    /// # Errors
    /// - [`PageTableError::NotMapped`] if the entry is all zero.
    /// - [`PageTableError::PermissionsMismatch`] if its flags differ from `flags`.
    pub fn lookup(&self, i: TableIndex, flags: EntryFlags) -> Result<TableEntry, PageTableError> {
        let entry = self.get(i);
        if entry.is_unused() {
            return Err(PageTableError::NotMapped);
        }
        if !entry.has_flags(flags) {
            return Err(PageTableError::PermissionsMismatch {
                actual: entry.flags(),
                requested: flags,
            });
        }
        Ok(entry)
    }

    /// Virtual address of the child table behind entry `i`, given that this
    /// table is visible at `self_va` through the recursive mapping.
    ///
    /// # Errors
    /// Same as [`lookup`](Self::lookup).
    pub fn step(
        &self,
        self_va: VirtualAddress,
        i: TableIndex,
        flags: EntryFlags,
    ) -> Result<VirtualAddress, PageTableError> {
        self.lookup(i, flags)?;
        Ok(self_va.descend(i))
    }

    /// Ensure entry `i` refers to a frame.
    ///
    /// An unused entry gets exactly one frame from `alloc` and `flags`. A
    /// mapped entry is left as it is, whatever `flags` says; repeated
    /// descents through shared intermediate tables rely on this.
    ///
    /// The new frame is **not** cleared here; the table can't see it.
    ///
    /// # Errors
    /// [`PageTableError::AllocationFailed`] carrying the allocator's error.
    pub fn get_mapping<A: FrameAlloc + ?Sized>(
        &mut self,
        i: TableIndex,
        flags: EntryFlags,
        alloc: &mut A,
    ) -> Result<Mapping, PageTableError> {
        if !self.get(i).is_unused() {
            return Ok(Mapping::Present);
        }

        let frame = alloc.alloc_frame()?;
        self.set(i, TableEntry::mapping(frame.base(), flags));
        log::trace!(
            "mapped entry {i} to frame {frame} with flags {:#05x}",
            flags.raw()
        );
        Ok(Mapping::Created(frame))
    }
}

impl Default for Table {
    fn default() -> Self {
        Self::zeroed()
    }
}

/// A table at a known virtual address, accessed through a [`TableMapper`].
///
/// References to the underlying [`Table`] are only created for the duration of
/// a single primitive, so two views never hold overlapping borrows even when
/// they name the same frame (as the self-map does).
pub(crate) struct TableView<'m, M: TableMapper> {
    va: VirtualAddress,
    mapper: &'m M,
}

impl<M: TableMapper> Clone for TableView<'_, M> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<M: TableMapper> Copy for TableView<'_, M> {}

impl<'m, M: TableMapper> TableView<'m, M> {
    pub(crate) const fn new(mapper: &'m M, va: VirtualAddress) -> Self {
        Self { va, mapper }
    }

    pub(crate) const fn address(&self) -> VirtualAddress {
        self.va
    }

    /// Another table, seen through the same mapper.
    pub(crate) const fn at(&self, va: VirtualAddress) -> Self {
        Self::new(self.mapper, va)
    }

    fn with_table<T>(&self, f: impl FnOnce(&mut Table) -> T) -> T {
        // SAFETY: views are only built from the root address handed to the
        // address space or from addresses computed by `Table::step`; the
        // reference is dropped before `with_table` returns.
        let table = unsafe { self.mapper.table_mut(self.va) };
        f(table)
    }

    pub(crate) fn get(&self, i: TableIndex) -> TableEntry {
        self.with_table(|t| t.get(i))
    }

    pub(crate) fn set(&self, i: TableIndex, e: TableEntry) {
        self.with_table(|t| t.set(i, e));
    }

    pub(crate) fn lookup(
        &self,
        i: TableIndex,
        flags: EntryFlags,
    ) -> Result<TableEntry, PageTableError> {
        self.with_table(|t| t.lookup(i, flags))
    }

    /// Step into the child behind `i`, computing its address from `base`.
    pub(crate) fn step_from(
        &self,
        base: VirtualAddress,
        i: TableIndex,
        flags: EntryFlags,
    ) -> Result<Self, PageTableError> {
        let next = self.with_table(|t| t.step(base, i, flags))?;
        Ok(Self::new(self.mapper, next))
    }

    pub(crate) fn step(&self, i: TableIndex, flags: EntryFlags) -> Result<Self, PageTableError> {
        self.step_from(self.va, i, flags)
    }

    /// [`Table::get_mapping`], then clear the child table if it is new.
    ///
    /// The child is reached at `base.descend(i)`, so the entry must be
    /// installed before it can be cleared.
    pub(crate) fn get_mapping_from<A: FrameAlloc + ?Sized>(
        &self,
        base: VirtualAddress,
        i: TableIndex,
        flags: EntryFlags,
        alloc: &mut A,
    ) -> Result<Mapping, PageTableError> {
        let mapping = self.with_table(|t| t.get_mapping(i, flags, alloc))?;
        if let Mapping::Created(_) = mapping {
            Self::new(self.mapper, base.descend(i)).with_table(Table::zero);
        }
        Ok(mapping)
    }

    pub(crate) fn get_mapping<A: FrameAlloc + ?Sized>(
        &self,
        i: TableIndex,
        flags: EntryFlags,
        alloc: &mut A,
    ) -> Result<Mapping, PageTableError> {
        self.get_mapping_from(self.va, i, flags, alloc)
    }
}
