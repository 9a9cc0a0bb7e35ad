//! # Physical Frame Allocation
//!
//! Frame sources for the paging engine. Only one strategy exists so far:
//!
//! ### Bump Allocator ([`frame_alloc`])
//! * **Single cursor**: frames are handed out in ascending order from a fixed region
//! * **No reuse**: freed frames are never returned, which matches a page-table
//!   engine that has no unmap path
//! * **Early boot**: needs no heap and no bookkeeping memory
//!
//! ```rust
//! use kernel_alloc::frame_alloc::BumpFrameAlloc;
//! use kernel_memory_addresses::PhysicalAddress;
//! use kernel_paging::FrameAlloc;
//!
//! let mut frames = BumpFrameAlloc::new(
//!     PhysicalAddress::new(0x10_0000),
//!     PhysicalAddress::new(0x10_2000),
//! );
//! assert_eq!(frames.alloc_frame().unwrap().base().as_u64(), 0x10_0000);
//! assert_eq!(frames.alloc_frame().unwrap().base().as_u64(), 0x10_1000);
//! assert!(frames.alloc_frame().is_err());
//! ```

#![cfg_attr(not(any(test, doctest)), no_std)]

pub mod frame_alloc;
