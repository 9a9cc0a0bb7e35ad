//! # Serialized Access to an Address Space
//!
//! Table updates are unsynchronized read-modify-write sequences. Two cores
//! mapping pages below the same empty entry would both allocate a table and
//! one of them would be lost. [`LockedAddressSpace`] keeps an
//! [`AddressSpace`] and its frame allocator together inside one
//! [`SpinLock`], so a whole `map` descent runs as one critical section.
//!
//! Activation is not serialized here; each core loads its own root register.

use crate::address_space::AddressSpace;
use crate::entry::EntryFlags;
use crate::error::PageTableError;
use crate::platform::{RootTableRegister, TableMapper};
use crate::FrameAlloc;
use kernel_memory_addresses::{PhysicalAddress, PhysicalPage, VirtualAddress};
use kernel_sync::{SpinLock, SpinLockGuard};

pub struct LockedAddressSpace<'m, M: TableMapper, R: RootTableRegister, A: FrameAlloc> {
    inner: SpinLock<(AddressSpace<'m, M, R>, A)>,
}

impl<'m, M: TableMapper, R: RootTableRegister, A: FrameAlloc> LockedAddressSpace<'m, M, R, A> {
    pub const fn new(space: AddressSpace<'m, M, R>, alloc: A) -> Self {
        Self {
            inner: SpinLock::new((space, alloc)),
        }
    }

    /// Try once; returns immediately.
    #[inline]
    pub fn try_lock(&self) -> Option<AddressSpaceGuard<'_, 'm, M, R, A>> {
        self.inner.try_lock().map(|guard| AddressSpaceGuard { guard })
    }

    /// Spin until acquired, then return a guard.
    #[inline]
    pub fn lock(&self) -> AddressSpaceGuard<'_, 'm, M, R, A> {
        AddressSpaceGuard {
            guard: self.inner.lock(),
        }
    }

    /// Lock, map one page, unlock.
    ///
    /// # Errors
    /// See [`AddressSpace::map`].
    pub fn map(
        &self,
        va: VirtualAddress,
        pa: PhysicalAddress,
        flags: EntryFlags,
    ) -> Result<(), PageTableError> {
        self.lock().map(va, pa, flags)
    }

    /// Lock, walk, unlock.
    ///
    /// # Errors
    /// See [`AddressSpace::walk`].
    pub fn walk(
        &self,
        va: VirtualAddress,
        flags: EntryFlags,
    ) -> Result<PhysicalAddress, PageTableError> {
        self.lock().walk(va, flags)
    }

    /// Give back the address space and the allocator.
    pub fn into_inner(self) -> (AddressSpace<'m, M, R>, A) {
        self.inner.into_inner()
    }
}

/// Exclusive access to a [`LockedAddressSpace`]; unlocks on drop.
pub struct AddressSpaceGuard<'a, 'm, M: TableMapper, R: RootTableRegister, A: FrameAlloc> {
    guard: SpinLockGuard<'a, (AddressSpace<'m, M, R>, A)>,
}

impl<M: TableMapper, R: RootTableRegister, A: FrameAlloc> AddressSpaceGuard<'_, '_, M, R, A> {
    /// # Errors
    /// See [`AddressSpace::map`].
    pub fn map(
        &mut self,
        va: VirtualAddress,
        pa: PhysicalAddress,
        flags: EntryFlags,
    ) -> Result<(), PageTableError> {
        let (space, alloc) = &mut *self.guard;
        space.map(alloc, va, pa, flags)
    }

    /// # Errors
    /// See [`AddressSpace::walk`].
    pub fn walk(
        &self,
        va: VirtualAddress,
        flags: EntryFlags,
    ) -> Result<PhysicalAddress, PageTableError> {
        self.guard.0.walk(va, flags)
    }

    #[must_use]
    pub fn phys(&self) -> PhysicalPage {
        self.guard.0.phys()
    }

    /// The allocator new tables are taken from.
    pub fn allocator(&mut self) -> &mut A {
        &mut self.guard.1
    }
}
