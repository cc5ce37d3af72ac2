//! # Virtual Addresses and Page Numbers
//!
//! Strongly typed wrappers that keep *addresses* and *page numbers* apart.
//!
//! ## Overview
//!
//! The pager reasons almost exclusively in page numbers: the page table, the
//! swap store and the eviction policies are all indexed by [`PageNumber`].
//! Only the mapper ever needs a real address, and it obtains one through a
//! single conversion point, [`VirtualRange`].
//!
//! | Type | Meaning |
//! |------|---------|
//! | [`VirtualAddress`] | A raw host address, possibly outside the managed range. |
//! | [`PageNumber`] | Index of a page in `[0, NUM_PAGES)`. |
//! | [`VirtualRange`] | The managed range; translates between the two. |
//!
//! ## Typical Usage
//!
//! ```rust
//! # use uvm_addresses::*;
//! # use uvm_info::memory::PAGE_SIZE;
//! let range = VirtualRange::new(VirtualAddress::new(0x2000_0000));
//! let page = PageNumber::new(5);
//!
//! let addr = range.page_to_addr(page);
//! assert_eq!(addr.as_usize(), 0x2000_0000 + 5 * PAGE_SIZE);
//! assert_eq!(range.addr_to_page(addr + 17), Some(page));
//! assert_eq!(range.addr_to_page(VirtualAddress::new(0x1000)), None);
//! ```

#![cfg_attr(not(any(test, doctest)), no_std)]

mod page_number;
mod virtual_address;
mod virtual_range;

pub use crate::page_number::PageNumber;
pub use crate::virtual_address::VirtualAddress;
pub use crate::virtual_range::VirtualRange;
