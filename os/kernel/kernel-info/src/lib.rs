//! # Paging Configuration
//!
//! Layout constants shared by every crate that touches amd64 page tables.
//! Nothing in here is computed at runtime; the values mirror what the CPU's
//! page walker expects and are cross-checked at compile time.
//!
//! ## Modules
//!
//! ### Paging Layout ([`paging`])
//! * **Table geometry**: 512 entries of 8 bytes per 4 KiB table
//! * **Address split**: 9-9-9-9-12 bit fields of a 48-bit virtual address
//! * **Recursive slot**: the PML4 index reserved for the self-map and the
//!   virtual address at which the root table sees itself
//! * **Entry format**: width and mask of the physical frame field

#![cfg_attr(not(any(test, doctest)), no_std)]

pub mod paging;
