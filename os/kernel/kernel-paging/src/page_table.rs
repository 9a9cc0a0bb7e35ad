//! # Level-Specialized Views
//!
//! Four nominal types over the same generic [`Table`](crate::table::Table)
//! view, one per paging level. They differ only in which index of the virtual
//! address they consume and in the type they step into:
//!
//! ```text
//! PageMapLevel4 ─step→ PageDirectoryPointerTable ─step→ PageDirectory ─step→ PageTable ─translate→ frame
//! ```
//!
//! Each `map` materializes its own entry, steps into the next level with the
//! same flags and hands the request down. Since every step checks for *exact*
//! flag equality, intermediate entries must carry the flags of the mapping
//! they were created for; mixing flag sets below a shared table fails with
//! [`PermissionsMismatch`](crate::PageTableError::PermissionsMismatch).

pub mod pd;
pub mod pdpt;
pub mod pml4;
pub mod pt;

pub use pd::PageDirectory;
pub use pdpt::PageDirectoryPointerTable;
pub use pml4::PageMapLevel4;
pub use pt::PageTable;
