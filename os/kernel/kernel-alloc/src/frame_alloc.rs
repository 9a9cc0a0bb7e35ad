//! Simple physical frame allocator for early kernel use.

use kernel_info::paging::PAGE_SIZE;
use kernel_memory_addresses::{PhysicalAddress, PhysicalPage};
use kernel_paging::{FrameAlloc, FrameAllocError};

/// Hands out the 4 KiB frames of `[start, end)` in ascending order.
///
/// `start` is rounded up and `end` rounded down to frame boundaries, so a
/// partial frame at either edge is never handed out.
pub struct BumpFrameAlloc {
    next: u64,
    end: u64,
    exhausted: bool,
}

impl BumpFrameAlloc {
    #[must_use]
    pub const fn new(start: PhysicalAddress, end: PhysicalAddress) -> Self {
        let next = start.as_u64().next_multiple_of(PAGE_SIZE);
        let end = PhysicalPage::from_addr(end).base().as_u64();
        Self {
            next,
            end,
            exhausted: false,
        }
    }

    /// Frames left in the region.
    #[must_use]
    pub const fn remaining(&self) -> u64 {
        self.end.saturating_sub(self.next) / PAGE_SIZE
    }
}

impl FrameAlloc for BumpFrameAlloc {
    fn alloc_frame(&mut self) -> Result<PhysicalPage, FrameAllocError> {
        if self.remaining() == 0 {
            if !self.exhausted {
                self.exhausted = true;
                log::warn!("bump allocator exhausted at {:#x}", self.end);
            }
            return Err(FrameAllocError::OutOfFrames);
        }

        let frame = PhysicalPage::from_addr(PhysicalAddress::new(self.next));
        self.next += PAGE_SIZE;
        log::trace!("allocated frame {frame}, {} left", self.remaining());
        Ok(frame)
    }
}
