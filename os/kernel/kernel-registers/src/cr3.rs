//! # `CR3`: Page-Map Level-4 Base Register

use bitfield_struct::bitfield;
use kernel_memory_addresses::{PhysicalAddress, PhysicalPage};

/// CR3 with PCID disabled (`CR4.PCIDE = 0`).
///
/// Writing this register installs a new PML4 as the root of every subsequent
/// translation on the executing core and flushes its non-global TLB entries.
#[bitfield(u64)]
#[derive(PartialEq, Eq)]
pub struct Cr3 {
    /// Bits 0–2: reserved, written as 0.
    #[bits(3)]
    __reserved_low: u8,

    /// Bit 3: PWT, page-level write-through for accesses to the PML4.
    pub write_through: bool,

    /// Bit 4: PCD, page-level cache disable for accesses to the PML4.
    pub cache_disable: bool,

    /// Bits 5–11: reserved, written as 0.
    #[bits(7)]
    __reserved_mid: u8,

    /// Bits 12–51: PML4 frame number (physical base `>> 12`).
    #[bits(40)]
    pml4_frame: u64,

    /// Bits 52–63: reserved.
    #[bits(12)]
    __reserved_high: u16,
}

impl Cr3 {
    /// Value that selects `root` as the PML4, with default (write-back) caching.
    #[must_use]
    pub const fn with_root(root: PhysicalPage) -> Self {
        Self::new().with_pml4_frame(root.base().as_u64() >> 12)
    }

    /// Physical frame of the PML4 this value selects.
    #[must_use]
    pub const fn root(&self) -> PhysicalPage {
        PhysicalPage::from_addr(PhysicalAddress::new(self.pml4_frame() << 12))
    }
}

#[cfg(all(feature = "asm", target_arch = "x86_64"))]
impl crate::LoadRegisterUnsafe for Cr3 {
    unsafe fn load_unsafe() -> Self {
        let cr3: u64;
        unsafe {
            core::arch::asm!("mov {}, cr3", out(reg) cr3, options(nomem, nostack, preserves_flags));
        }
        Self::from_bits(cr3)
    }
}

#[cfg(all(feature = "asm", target_arch = "x86_64"))]
impl crate::StoreRegisterUnsafe for Cr3 {
    unsafe fn store_unsafe(self) {
        let cr3 = self.into_bits();
        unsafe {
            core::arch::asm!("mov cr3, {}", in(reg) cr3, options(nostack, preserves_flags));
        }
    }
}
