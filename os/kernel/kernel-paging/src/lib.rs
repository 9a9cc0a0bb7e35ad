//! # Recursive Four-Level Paging
//!
//! Page-table engine for amd64 long mode. Tables are edited in place through
//! the **recursive self-map**: entry 511 of the active PML4 points back at the
//! PML4 itself, so every table of the active hierarchy appears at a fixed,
//! computable virtual address and can be read and written like any other
//! memory. No physical-to-virtual translation scheme is needed.
//!
//! ## Layers
//!
//! | Layer | Types |
//! |:------|:------|
//! | Entry codec | [`TableEntry`], [`EntryFlags`] |
//! | Generic table | [`Table`], [`Mapping`] |
//! | Level views | [`PageMapLevel4`], [`PageDirectoryPointerTable`], [`PageDirectory`], [`PageTable`] |
//! | Façade | [`AddressSpace`], [`AddressTranslation`], [`LockedAddressSpace`] |
//! | Platform seams | [`TableMapper`], [`RootTableRegister`], [`FrameAlloc`] |
//!
//! ## Recursive addresses
//!
//! A table's children are found by shifting the table's own address left by
//! nine bits and inserting the entry index as the new L1 field:
//!
//! ```text
//! child = (table << 9) | (index << 12)
//! ```
//!
//! Starting from the root, whose address is all four indices set to 511,
//! every step pushes one `511` out of the top of the 48-bit address and
//! one real index into the bottom:
//!
//! ```rust
//! # use kernel_paging::info::RECURSIVE_ROOT;
//! # use kernel_memory_addresses::{TableIndex, VirtualAddress};
//! let root = VirtualAddress::new(RECURSIVE_ROOT);
//! let l3 = root.descend(TableIndex::new(5));
//! assert_eq!(l3.as_u64(), 0xFFFF_FFFF_FFE0_5000);
//! assert_eq!(root.descend(TableIndex::RECURSIVE), root);
//! ```
//!
//! ## Flags
//!
//! Every step compares an entry's flags for **exact** equality with the
//! requested ones. Intermediate tables created by [`AddressSpace::map`] carry
//! the flags of that call, and a later walk must ask for the same flags.

#![cfg_attr(not(any(test, doctest)), no_std)]
#![allow(unsafe_code)]

pub mod address_space;
mod entry;
mod error;
pub mod page_table;
pub mod platform;
mod sync;
mod table;

#[cfg(test)]
mod testing;

pub use crate::address_space::{AddressSpace, AddressTranslation, KernelAddressSpace};
pub use crate::entry::{EntryFlags, TableEntry};
pub use crate::error::{FrameAllocError, PageTableError};
pub use crate::page_table::{PageDirectory, PageDirectoryPointerTable, PageMapLevel4, PageTable};
pub use crate::platform::{Cr3Register, RecursiveMapper, RootTableRegister, TableMapper};
pub use crate::sync::{AddressSpaceGuard, LockedAddressSpace};
pub use crate::table::{Mapping, Table};

/// Re-export constants as info module.
pub use kernel_info::paging as info;

/// Source of **physical** 4 KiB frames for new page tables.
///
/// The implementation decides where frames come from (bootloader pool,
/// bitmap, …). The engine calls it exactly once per table it creates and
/// never for entries that are already mapped. Frames need not be zeroed;
/// the engine clears new tables itself.
pub trait FrameAlloc {
    /// Allocate one frame.
    ///
    /// # Errors
    /// Whatever the allocator reports; the engine passes it on unchanged
    /// inside [`PageTableError::AllocationFailed`].
    fn alloc_frame(&mut self) -> Result<kernel_memory_addresses::PhysicalPage, FrameAllocError>;
}
