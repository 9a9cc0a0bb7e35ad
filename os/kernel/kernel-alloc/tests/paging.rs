//! The bump allocator as the frame source of an address space.

use core::cell::{Cell, UnsafeCell};
use kernel_alloc::frame_alloc::BumpFrameAlloc;
use kernel_memory_addresses::{PhysicalAddress, PhysicalPage, TableLevel, VirtualAddress};
use kernel_paging::{
    AddressSpace, EntryFlags, FrameAlloc, FrameAllocError, PageTableError, RootTableRegister, Table,
    TableMapper,
};

const FRAMES: usize = 8;

/// Minimal MMU: identity for the first `FRAMES` pages, hardware walk above.
struct Memory {
    frames: Vec<UnsafeCell<Table>>,
    root: Cell<Option<PhysicalPage>>,
}

impl Memory {
    fn new() -> Self {
        Self {
            frames: (0..FRAMES).map(|_| UnsafeCell::new(Table::zeroed())).collect(),
            root: Cell::new(None),
        }
    }

    fn frame(&self, page: PhysicalPage) -> *mut Table {
        self.frames[(page.base().as_u64() >> 12) as usize].get()
    }
}

impl TableMapper for Memory {
    unsafe fn table_mut<'a>(&self, va: VirtualAddress) -> &'a mut Table {
        let mut page = PhysicalAddress::new(va.as_u64()).page();
        if va.as_u64() >= (FRAMES as u64) << 12 {
            page = self.root.get().expect("no active root");
            for level in TableLevel::ALL {
                page = unsafe { (*self.frame(page)).get(va.index(level)) }.address();
            }
        }
        unsafe { &mut *self.frame(page) }
    }
}

impl RootTableRegister for Memory {
    unsafe fn load_root(&self, root: PhysicalPage) {
        self.root.set(Some(root));
    }

    unsafe fn current_root(&self) -> Option<PhysicalPage> {
        self.root.get()
    }
}

#[test]
fn address_space_draws_tables_from_bump_allocator() {
    let mem = Memory::new();
    let mut frames = BumpFrameAlloc::new(PhysicalAddress::new(0x1000), PhysicalAddress::new(0x5000));

    let root = frames.alloc_frame().unwrap();
    let space = AddressSpace::new(&mem, &mem, VirtualAddress::new(root.base().as_u64()));
    space.bootstrap(root);
    unsafe { space.activate() };

    let flags = EntryFlags::KERNEL_TABLE;
    let va = VirtualAddress::new(0xFFFF_8000_0010_0000);
    let pa = PhysicalAddress::new(0x0000_0000_0200_0000);
    space.map(&mut frames, va, pa, flags).unwrap();

    assert_eq!(frames.remaining(), 0);
    assert_eq!(space.walk(va, flags), Ok(pa));

    // The next page needs a table in another L4 slot and there is none left.
    let far = VirtualAddress::new(0x0000_0000_0040_0000);
    assert_eq!(
        space.map(&mut frames, far, pa, flags),
        Err(PageTableError::AllocationFailed(FrameAllocError::OutOfFrames))
    );
}
