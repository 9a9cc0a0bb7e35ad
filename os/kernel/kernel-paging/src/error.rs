use crate::entry::EntryFlags;
use kernel_memory_addresses::PhysicalPage;

/// Error returned by a [`FrameAlloc`](crate::FrameAlloc) that cannot hand out a frame.
#[derive(Debug, Copy, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FrameAllocError {
    #[error("out of physical frames")]
    OutOfFrames,
}

/// Errors produced while traversing or building a page-table hierarchy.
///
/// Every error is handed back to the immediate caller unchanged; the first
/// failure of a multi-level descent aborts the remaining levels.
#[derive(Debug, Copy, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PageTableError {
    /// The entry consulted during a step is all zero.
    #[error("no table or frame is mapped at this index")]
    NotMapped,

    /// The entry is mapped, but its flags are not exactly the requested ones.
    #[error(
        "entry flags {:#05x} do not match requested flags {:#05x}",
        .actual.raw(),
        .requested.raw()
    )]
    PermissionsMismatch {
        actual: EntryFlags,
        requested: EntryFlags,
    },

    /// The frame allocator could not provide a frame for a new table.
    #[error("frame allocation failed: {0}")]
    AllocationFailed(#[from] FrameAllocError),

    /// The hierarchy below a root is only reachable through the recursive
    /// window once that root is loaded; a root that is not active cannot be
    /// walked or populated.
    #[error("root {root} is not the active address space (active root is {active})")]
    InactiveRoot {
        root: PhysicalPage,
        active: PhysicalPage,
    },
}
