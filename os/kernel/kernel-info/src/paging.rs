//! # Paging Layout

/// Size of a page, a page frame, and a page table, in bytes.
pub const PAGE_SIZE: u64 = 4096;

/// `log2(PAGE_SIZE)`; also the bit position of the L1 index.
pub const PAGE_SHIFT: u32 = 12;

/// Mask selecting the in-page offset of an address.
pub const OFFSET_MASK: u64 = PAGE_SIZE - 1;

/// Number of bits each table level contributes to a virtual address.
pub const INDEX_BITS: u32 = 9;

/// Mask selecting a single table index after shifting.
pub const INDEX_MASK: u64 = (1 << INDEX_BITS) - 1;

/// Number of entries in every table, at every level.
pub const ENTRIES_PER_TABLE: usize = 1 << INDEX_BITS;

/// Number of translated bits in a virtual address (four levels plus offset).
pub const VIRTUAL_ADDRESS_BITS: u32 = PAGE_SHIFT + 4 * INDEX_BITS;

/// Size of a single table entry in bytes.
pub const ENTRY_SIZE: usize = 8;

/// Number of address bits a table entry can carry (bits 0..48).
///
/// Entries store bits `[47:12]` of the frame address; the low 12 bits are
/// implicitly zero and reused for flags.
pub const PHYSICAL_ADDRESS_BITS: u32 = 48;

/// Mask of the frame address field inside a table entry (bits 12..=47).
pub const FRAME_ADDRESS_MASK: u64 = ((1 << PHYSICAL_ADDRESS_BITS) - 1) & !OFFSET_MASK;

/// The PML4 slot that maps the PML4 onto itself.
pub const RECURSIVE_INDEX: u16 = 511;

/// Bits 48..=63 of a canonical higher-half address.
const SIGN_EXTENSION: u64 = 0xFFFF_0000_0000_0000;

/// Virtual address at which the active PML4 is visible through its own
/// self-map entry: every index field set to [`RECURSIVE_INDEX`].
pub const RECURSIVE_ROOT: u64 = {
    let r = RECURSIVE_INDEX as u64;
    SIGN_EXTENSION | (r << 39) | (r << 30) | (r << 21) | (r << PAGE_SHIFT)
};

const _: () = {
    assert!(PAGE_SIZE == 1 << PAGE_SHIFT);
    assert!(ENTRIES_PER_TABLE * ENTRY_SIZE == PAGE_SIZE as usize);
    assert!((RECURSIVE_INDEX as usize) < ENTRIES_PER_TABLE);
    assert!(RECURSIVE_ROOT == 0xFFFF_FFFF_FFFF_F000);
    assert!(FRAME_ADDRESS_MASK == 0x0000_FFFF_FFFF_F000);
    assert!(VIRTUAL_ADDRESS_BITS == 48);
};
