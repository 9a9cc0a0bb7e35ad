//! Test doubles: an in-memory MMU and two frame allocators.

use crate::entry::TableEntry;
use crate::error::FrameAllocError;
use crate::platform::{RootTableRegister, TableMapper};
use crate::table::Table;
use crate::FrameAlloc;
use core::cell::{Cell, UnsafeCell};
use kernel_info::paging::PAGE_SIZE;
use kernel_memory_addresses::{PhysicalAddress, PhysicalPage, TableIndex, TableLevel, VirtualAddress};

pub fn page(addr: u64) -> PhysicalPage {
    PhysicalPage::new_aligned(PhysicalAddress::new(addr))
}

/// Simulated physical memory plus the address translation a CPU would do.
///
/// Frame `n` lives at physical address `n * 4096`. Virtual addresses are
/// resolved in one of two ways:
///
/// - below `frames * 4096` they are identity mapped, which is how a freshly
///   allocated root is reached before it is active;
/// - everything else is translated by a four-level walk starting at the
///   simulated `CR3`, exactly as the hardware would. Flags are ignored; an
///   unused entry anywhere on the way is a simulated page fault and panics.
pub struct SimulatedMmu {
    frames: Vec<UnsafeCell<Table>>,
    cr3: Cell<Option<PhysicalPage>>,
    loads: Cell<usize>,
}

impl SimulatedMmu {
    pub fn with_frames(n: usize) -> Self {
        Self {
            frames: (0..n).map(|_| UnsafeCell::new(Table::zeroed())).collect(),
            cr3: Cell::new(None),
            loads: Cell::new(0),
        }
    }

    /// Identity address of frame `n`.
    pub fn frame_va(n: u64) -> VirtualAddress {
        VirtualAddress::new(n * PAGE_SIZE)
    }

    pub fn active_root(&self) -> Option<PhysicalPage> {
        self.cr3.get()
    }

    /// Number of root loads performed.
    pub fn loads(&self) -> usize {
        self.loads.get()
    }

    fn limit(&self) -> u64 {
        self.frames.len() as u64 * PAGE_SIZE
    }

    #[allow(clippy::cast_possible_truncation)]
    fn frame_ptr(&self, frame: PhysicalPage) -> *mut Table {
        let n = (frame.base().as_u64() / PAGE_SIZE) as usize;
        match self.frames.get(n) {
            Some(cell) => cell.get(),
            None => panic!("frame {frame} is outside simulated memory"),
        }
    }

    /// Read entry `i` of the table stored in `frame`.
    pub fn entry(&self, frame: PhysicalPage, i: TableIndex) -> TableEntry {
        // SAFETY: no reference into simulated memory outlives a single table
        // operation, so nothing aliases this read.
        unsafe { (*self.frame_ptr(frame)).get(i) }
    }

    /// Hardware translation of `va` through the active root.
    pub fn resolve(&self, va: VirtualAddress) -> Option<PhysicalAddress> {
        let mut frame = self.cr3.get()?;
        for level in TableLevel::ALL {
            let e = self.entry(frame, va.index(level));
            if e.is_unused() {
                return None;
            }
            frame = e.address();
        }
        Some(frame.join(va.page_offset()))
    }
}

impl TableMapper for SimulatedMmu {
    unsafe fn table_mut<'a>(&self, va: VirtualAddress) -> &'a mut Table {
        assert_eq!(va.page_offset(), 0, "table address {va} is not page aligned");

        let frame = if va.as_u64() < self.limit() {
            page(va.as_u64())
        } else {
            match self.resolve(va) {
                Some(pa) => pa.page(),
                None => panic!("simulated page fault at {va}"),
            }
        };

        // SAFETY: the caller guarantees exclusivity, see `TableMapper`.
        unsafe { &mut *self.frame_ptr(frame) }
    }
}

impl RootTableRegister for SimulatedMmu {
    unsafe fn load_root(&self, root: PhysicalPage) {
        self.loads.set(self.loads.get() + 1);
        self.cr3.set(Some(root));
    }

    unsafe fn current_root(&self) -> Option<PhysicalPage> {
        self.cr3.get()
    }
}

/// Hands out consecutive frames from `[next, end)`.
pub struct BumpAlloc {
    next: u64,
    end: u64,
    pub calls: usize,
}

impl BumpAlloc {
    pub const fn new(start: u64, end: u64) -> Self {
        Self {
            next: start,
            end,
            calls: 0,
        }
    }
}

impl FrameAlloc for BumpAlloc {
    fn alloc_frame(&mut self) -> Result<PhysicalPage, FrameAllocError> {
        self.calls += 1;
        if self.next + PAGE_SIZE > self.end {
            return Err(FrameAllocError::OutOfFrames);
        }
        let frame = page(self.next);
        self.next += PAGE_SIZE;
        Ok(frame)
    }
}

/// Always returns the same frame, or always fails.
pub struct FixedAlloc {
    pub frame: PhysicalPage,
    pub calls: usize,
    exhausted: bool,
}

impl FixedAlloc {
    pub const fn new(frame: PhysicalPage) -> Self {
        Self {
            frame,
            calls: 0,
            exhausted: false,
        }
    }

    pub fn exhausted() -> Self {
        Self {
            frame: PhysicalPage::default(),
            calls: 0,
            exhausted: true,
        }
    }
}

impl FrameAlloc for FixedAlloc {
    fn alloc_frame(&mut self) -> Result<PhysicalPage, FrameAllocError> {
        self.calls += 1;
        if self.exhausted {
            Err(FrameAllocError::OutOfFrames)
        } else {
            Ok(self.frame)
        }
    }
}
