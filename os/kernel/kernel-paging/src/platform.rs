//! # Platform Seams
//!
//! The paging core never touches raw pointers or control registers itself.
//! Both go through the two traits in this module:
//!
//! - [`TableMapper`] turns a virtual address computed by a walk into a usable
//!   reference to a [`Table`]. [`RecursiveMapper`] does this on real hardware
//!   by plain pointer conversion, which is only meaningful because of the
//!   self-map entry.
//! - [`RootTableRegister`] installs a physical frame as the active root table.
//!   [`Cr3Register`] writes `CR3`.
//!
//! Tests substitute an MMU simulator for both.

use crate::table::Table;
use kernel_memory_addresses::{PhysicalPage, VirtualAddress};

/// Resolves the virtual address of a page table to a mutable reference.
pub trait TableMapper {
    /// Access the table visible at `va`.
    ///
    /// # Safety
    /// - `va` must be the address of a 4 KiB page table in the current view of
    ///   memory: either the storage address of a root table, or an address
    ///   produced by a recursive step through tables of the active hierarchy.
    /// - The caller must not hold another reference to the same table while the
    ///   returned one is alive. The lifetime `'a` is not tied to anything.
    unsafe fn table_mut<'a>(&self, va: VirtualAddress) -> &'a mut Table;
}

/// Installs a physical frame as the root of address translation.
pub trait RootTableRegister {
    /// Make `root` the active L4 table.
    ///
    /// # Safety
    /// `root` must hold a valid L4 table whose mappings cover the code and data
    /// the CPU is about to touch, including the self-map entry.
    unsafe fn load_root(&self, root: PhysicalPage);

    /// The root currently installed, or `None` if nothing was ever loaded
    /// through this register.
    ///
    /// # Safety
    /// Reading the register may be privileged.
    unsafe fn current_root(&self) -> Option<PhysicalPage>;
}

/// [`TableMapper`] for a running kernel: the address *is* the table.
///
/// ### Invariant
/// An address handed out by a recursive step is valid only while the table
/// hierarchy it was computed from is the active one and its self-map entry is
/// intact. Switching roots or overwriting index 511 invalidates every address
/// derived from it.
#[derive(Debug, Default, Copy, Clone)]
pub struct RecursiveMapper;

impl TableMapper for RecursiveMapper {
    #[allow(clippy::cast_possible_truncation)]
    unsafe fn table_mut<'a>(&self, va: VirtualAddress) -> &'a mut Table {
        let ptr = core::ptr::with_exposed_provenance_mut::<Table>(va.as_u64() as usize);
        debug_assert!(ptr.is_aligned(), "table address {va} is not page aligned");
        // SAFETY: forwarded to the caller, see `TableMapper::table_mut`.
        unsafe { &mut *ptr }
    }
}

/// [`RootTableRegister`] that writes `CR3` (PCID disabled, write-back caching).
#[derive(Debug, Default, Copy, Clone)]
pub struct Cr3Register;

#[cfg(target_arch = "x86_64")]
impl RootTableRegister for Cr3Register {
    unsafe fn load_root(&self, root: PhysicalPage) {
        use kernel_registers::StoreRegisterUnsafe;
        use kernel_registers::cr3::Cr3;

        // SAFETY: forwarded to the caller, see `RootTableRegister::load_root`.
        unsafe { Cr3::with_root(root).store_unsafe() };
    }

    unsafe fn current_root(&self) -> Option<PhysicalPage> {
        use kernel_registers::LoadRegisterUnsafe;
        use kernel_registers::cr3::Cr3;

        // SAFETY: forwarded to the caller.
        Some(unsafe { Cr3::load_unsafe() }.root())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entry::{EntryFlags, TableEntry};
    use kernel_memory_addresses::{PhysicalAddress, TableIndex};

    #[test]
    fn recursive_mapper_hands_out_the_table_at_the_address() {
        let mut table = Table::zeroed();
        let ptr = &raw mut table;
        let va = VirtualAddress::new(ptr.expose_provenance() as u64);
        let e = TableEntry::mapping(PhysicalAddress::new(0x5000), EntryFlags::KERNEL_TABLE);

        let view = unsafe { RecursiveMapper.table_mut(va) };
        assert!(core::ptr::eq(view, ptr));
        view.set(TableIndex::new(7), e);

        assert_eq!(table.get(TableIndex::new(7)), e);
        assert!(table.get(TableIndex::new(8)).is_unused());
    }
}
