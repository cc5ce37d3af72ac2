//! # Page Table
//!
//! A flat, single-level page table for the simulated address space: one
//! [`PageTableEntry`] per virtual page, indexed by [`PageNumber`]. There is
//! no address translation (page `i` always lives at `base + i * PAGE_SIZE`),
//! so an entry only tracks residency, usage and the protection currently
//! granted on the page.
//!
//! ## Entry state machine
//!
//! ```text
//!               bind(READ)                    write fault
//!  ┌────────────┐   ──────►   ┌───────────────┐ ──────► ┌────────────────────┐
//!  │ not        │             │ RESIDENT      │         │ RESIDENT  DIRTY    │
//!  │ resident   │ ◄───────    │ READ          │         │ READ_WRITE         │
//!  └────────────┘  clear()    └──┬─────────▲──┘         └─────────┬──────────┘
//!        ▲                 tick  │         │ read fault           │ tick
//!        │                       ▼         │                      ▼
//!        │                    ┌────────────┴──┐         ┌────────────────────┐
//!        └─────────────────── │ RESIDENT NONE │         │ RESIDENT DIRTY NONE│
//!             clear()         └───────────────┘         └────────────────────┘
//! ```
//!
//! ## Invariants
//!
//! - A non-resident entry is all zeroes: permission `NONE`, not accessed,
//!   not dirty. [`PageTable::clear`] is the only way back to that state.
//! - The permission recorded in an entry is never wider than the protection
//!   actually applied to the mapping: [`PageTable::set_permission`] applies
//!   the protection first and records it only on success.

#![cfg_attr(not(any(test, doctest)), no_std)]

mod entry;
mod permission;
mod table;

pub use crate::entry::PageTableEntry;
pub use crate::permission::Permission;
pub use crate::table::PageTable;
pub use uvm_addresses::PageNumber;
