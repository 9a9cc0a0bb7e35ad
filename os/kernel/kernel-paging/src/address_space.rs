//! # Address Space (recursive PML4)
//!
//! [`AddressSpace`] is the façade over one PML4 rooted hierarchy. It knows
//! where the PML4 is stored, how to turn table addresses into references
//! ([`TableMapper`]) and how to make its root the active one
//! ([`RootTableRegister`]).
//!
//! ## Lifecycle
//!
//! ```text
//! Created ──bootstrap(frame)──► Bootstrapped ──activate()──► Active
//! ```
//!
//! - **Created**: a zeroed 4 KiB frame, reachable through some temporary
//!   window (identity map, loader mapping, …).
//! - **Bootstrapped**: entry 511 points at the frame itself.
//! - **Active**: the frame is loaded into the root register. Activity is a
//!   hardware property; this type does not track it.
//!
//! [`map`](AddressSpace::map) and [`walk`](AddressSpace::walk) reach every
//! table below the PML4 through the recursive window, so they only work on the
//! **active** hierarchy. On any other space they fail with
//! [`PageTableError::InactiveRoot`] and leave every table untouched. To
//! populate a new space, activate it first.
//!
//! ## Safety
//!
//! - Changing entries of the active hierarchy may require TLB maintenance,
//!   which is left to the caller.
//! - Nothing here is synchronized; see [`LockedAddressSpace`](crate::LockedAddressSpace).

use crate::entry::EntryFlags;
use crate::error::PageTableError;
use crate::page_table::PageMapLevel4;
use crate::platform::{Cr3Register, RecursiveMapper, RootTableRegister, TableMapper};
use crate::FrameAlloc;
use kernel_info::paging::RECURSIVE_ROOT;
use kernel_memory_addresses::{PhysicalAddress, PhysicalPage, VirtualAddress};

/// The interface upper layers (fault handler, process setup) consume once an
/// address space exists.
pub trait AddressTranslation {
    /// Translate `va` by walking the hierarchy, checking every entry on the
    /// way against `flags`.
    ///
    /// # Errors
    /// The first [`PageTableError`] encountered.
    fn walk(&self, va: VirtualAddress, flags: EntryFlags) -> Result<PhysicalAddress, PageTableError>;

    /// Make this address space the active one.
    ///
    /// # Safety
    /// See [`RootTableRegister::load_root`].
    unsafe fn activate(&self);
}

/// Handle to a single address space.
pub struct AddressSpace<'m, M: TableMapper, R: RootTableRegister> {
    /// Where the PML4's own storage is visible.
    storage: VirtualAddress,
    mapper: &'m M,
    register: &'m R,
}

/// The address space of a running kernel: recursive table access, `CR3` root.
pub type KernelAddressSpace<'m> = AddressSpace<'m, RecursiveMapper, Cr3Register>;

impl<'m, M: TableMapper, R: RootTableRegister> AddressSpace<'m, M, R> {
    /// Address space whose PML4 is stored at `storage`.
    ///
    /// For a root under construction this is whatever window the caller has
    /// onto the new frame.
    #[inline]
    #[must_use]
    pub const fn new(mapper: &'m M, register: &'m R, storage: VirtualAddress) -> Self {
        Self {
            storage,
            mapper,
            register,
        }
    }

    /// The currently active address space, reached through its self-map.
    #[inline]
    #[must_use]
    pub const fn active(mapper: &'m M, register: &'m R) -> Self {
        Self::new(mapper, register, VirtualAddress::new(RECURSIVE_ROOT))
    }

    /// Typed view of the PML4.
    #[inline]
    #[must_use]
    pub const fn pml4(&self) -> PageMapLevel4<'m, M> {
        PageMapLevel4::new(self.mapper, self.storage)
    }

    /// Record `root` as this space's frame in the self-map entry.
    pub fn bootstrap(&self, root: PhysicalPage) {
        log::debug!("bootstrapping address space at {} with root {root}", self.storage);
        self.pml4().bootstrap(root);
    }

    /// Frame of the PML4, as recorded by [`bootstrap`](Self::bootstrap).
    #[must_use]
    pub fn phys(&self) -> PhysicalPage {
        self.pml4().phys()
    }

    #[must_use]
    pub fn is_bootstrapped(&self) -> bool {
        self.pml4().is_bootstrapped()
    }

    /// Map the 4 KiB page at `va` to the frame of `pa`.
    ///
    /// Missing tables are allocated from `alloc`, one frame each, and carry
    /// `flags` just like the leaf entry does.
    ///
    /// # Errors
    /// - [`PageTableError::AllocationFailed`] if `alloc` runs dry; tables created
    ///   up to that point are kept.
    /// - [`PageTableError::PermissionsMismatch`] if an existing table on the way
    ///   was created with other flags.
    pub fn map<A: FrameAlloc + ?Sized>(
        &self,
        alloc: &mut A,
        va: VirtualAddress,
        pa: PhysicalAddress,
        flags: EntryFlags,
    ) -> Result<(), PageTableError> {
        self.pml4().map(alloc, va, pa, flags)
    }

    /// Translate `va` the way the CPU would, checking `flags` at every level.
    ///
    /// # Errors
    /// The first [`PageTableError`] encountered; lower levels are not visited.
    pub fn walk(
        &self,
        va: VirtualAddress,
        flags: EntryFlags,
    ) -> Result<PhysicalAddress, PageTableError> {
        self.pml4()
            .step(va, flags)?
            .step(va, flags)?
            .step(va, flags)?
            .translate(va, flags)
    }

    /// Load this space's root into the root register.
    ///
    /// # Safety
    /// The hierarchy must map everything the CPU touches after the switch;
    /// see [`RootTableRegister::load_root`].
    pub unsafe fn activate(&self) {
        debug_assert!(self.is_bootstrapped(), "activating a root without self-map");
        let root = self.phys();
        // SAFETY: reading the root register has no side effects.
        match unsafe { self.register.current_root() } {
            Some(previous) => log::debug!("switching address space from root {previous} to {root}"),
            None => log::debug!("activating address space with root {root}"),
        }
        // SAFETY: forwarded to the caller.
        unsafe { self.register.load_root(root) };
        debug_assert_eq!(unsafe { self.register.current_root() }, Some(root));
    }
}

impl<M: TableMapper, R: RootTableRegister> AddressTranslation for AddressSpace<'_, M, R> {
    fn walk(&self, va: VirtualAddress, flags: EntryFlags) -> Result<PhysicalAddress, PageTableError> {
        Self::walk(self, va, flags)
    }

    unsafe fn activate(&self) {
        unsafe { Self::activate(self) }
    }
}
