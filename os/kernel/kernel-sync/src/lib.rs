//! # Kernel synchronization primitives
//!
//! Only what the paging code needs: a test-and-test-and-set [`SpinLock`]
//! whose guard releases the lock on drop.

#![cfg_attr(not(any(test, doctest)), no_std)]
#![allow(unsafe_code)]

mod spin_lock;

pub use spin_lock::{SpinLock, SpinLockGuard};
