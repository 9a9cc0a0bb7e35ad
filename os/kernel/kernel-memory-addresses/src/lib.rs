//! # Virtual and Physical Memory Address Types
//!
//! Strongly typed wrappers for the addresses that flow through the amd64
//! page-table engine, plus the bit-field codec the CPU applies to a virtual
//! address during a page walk.
//!
//! ## Overview
//!
//! | Type | Description |
//! |------|-------------|
//! | [`MemoryAddress`] | A raw 64-bit address, either physical or virtual. |
//! | [`VirtualAddress`] | An address translated by the page tables; carries the index codec. |
//! | [`PhysicalAddress`] | A machine address, as stored in table entries and `CR3`. |
//! | [`PhysicalPage`] | A 4 KiB-aligned physical frame base. |
//! | [`TableLevel`] / [`TableIndex`] | Which paging level, and which of its 512 slots. |
//!
//! ## Address split
//!
//! ```text
//! | 47‒39 | 38‒30 | 29‒21 | 20‒12 | 11‒0   |
//! |  L4   |  L3   |  L2   |  L1   | Offset |
//! ```
//!
//! Every accessor replaces or extracts exactly one field and leaves every other
//! bit of the address untouched. Out-of-range inputs are truncated to the field
//! width, just as the hardware masks the address while walking.
//!
//! ```rust
//! # use kernel_memory_addresses::*;
//! let va = VirtualAddress::new(0x0000_1234_5678_9ABC);
//! let moved = va.with_index(TableLevel::L2, TableIndex::new(7));
//!
//! assert_eq!(moved.index(TableLevel::L2).as_usize(), 7);
//! assert_eq!(moved.index(TableLevel::L4), va.index(TableLevel::L4));
//! assert_eq!(moved.page_offset(), 0xABC);
//! ```

#![cfg_attr(not(any(test, doctest)), no_std)]
#![allow(unsafe_code, clippy::inline_always)]

mod memory_address;
mod physical_address;
mod physical_page;
mod table_index;
mod virtual_address;

pub use memory_address::MemoryAddress;
pub use physical_address::PhysicalAddress;
pub use physical_page::PhysicalPage;
pub use table_index::{TableIndex, TableLevel};
pub use virtual_address::VirtualAddress;

/// Split a virtual address into its four table indices, root first.
#[inline]
#[must_use]
pub const fn split_indices(va: VirtualAddress) -> (TableIndex, TableIndex, TableIndex, TableIndex) {
    (
        va.index(TableLevel::L4),
        va.index(TableLevel::L3),
        va.index(TableLevel::L2),
        va.index(TableLevel::L1),
    )
}
