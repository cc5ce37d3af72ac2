//! # User-Space Virtual Memory Configuration
//!
//! This crate is the single source of truth for the compile-time layout of the
//! simulated address space. Every other `uvm-*` crate sources its page size,
//! page count and timing constants from here so that the page table, the swap
//! store and the mapper can never disagree about slot sizes.
//!
//! ## Layout
//!
//! ```text
//! base                                    base + NUM_PAGES * PAGE_SIZE
//!  ┌──────────┬──────────┬──────────┬─────┬──────────┐
//!  │  page 0  │  page 1  │  page 2  │ ... │ page N-1 │   virtual range
//!  └────┬─────┴────┬─────┴────┬─────┴─────┴────┬─────┘
//!       │          │          │                │
//!  ┌────▼─────┬────▼─────┬────▼─────┬─────┬────▼─────┐
//!  │  slot 0  │  slot 1  │  slot 2  │ ... │ slot N-1 │   swap file
//!  └──────────┴──────────┴──────────┴─────┴──────────┘
//!  0                                       NUM_PAGES * PAGE_SIZE
//! ```
//!
//! Page `i` of the virtual range is always backed by slot `i` of the swap file;
//! there is no indirection between the two.

#![cfg_attr(not(any(test, doctest)), no_std)]

pub mod memory;
