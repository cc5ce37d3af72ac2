//! # User-Space Demand Pager
//!
//! Presents a process with a `NUM_PAGES * PAGE_SIZE` byte range whose pages
//! live in a swap file and are loaded on first touch, using nothing but the
//! host's page protection and its fault signal.
//!
//! ## Architecture
//!
//! ```text
//!  load/store to the range
//!        │ protection fault (SIGSEGV)
//!        ▼
//!  signals::on_fault ──► VmSystem::handle_fault
//!                           │
//!          ┌────────────────┼──────────────────┬───────────────────┐
//!          ▼                ▼                  ▼                   ▼
//!      PageTable         Mapper             SwapStore        EvictionPolicy
//!   (state per page)  (mmap/mprotect)   (one slot per page)  (victim choice)
//!                                                                  ▲
//!  interval timer (SIGALRM) ──► signals::on_timer ──► VmSystem::tick
//! ```
//!
//! ## Fault protocol
//!
//! | Page state | Resolution |
//! |---|---|
//! | not resident | evict a victim if the budget is full, load with `READ`, mark accessed |
//! | resident, `NONE` | grant `READ`, mark accessed |
//! | resident, `READ` | grant `READ_WRITE`, mark dirty and accessed |
//! | resident, `READ_WRITE` | impossible; fatal |
//!
//! A page is first loaded read-only and only promoted once it is actually
//! written, so the dirty bit is exact without instrumenting stores.
//! Evicting a dirty page writes it back to its swap slot first.
//!
//! Faults outside the range are not ours: the default disposition is put
//! back and the retried access terminates the process.
//!
//! ## Concurrency
//!
//! All state sits in one [`SpinLock`](uvm_sync::SpinLock) slot. The fault
//! handler runs with the timer signal masked and takes the lock; the timer
//! handler only tries and skips the tick when the lock is held. Methods on
//! [`Pager`] lock with the timer signal blocked on the calling thread.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use uvm_pager::{Pager, PagerConfig};
//! use uvm_policy::PolicyKind;
//!
//! let pager = Pager::init(&PagerConfig::new(16).with_policy(PolicyKind::Clock))?;
//! let mut block = pager.alloc(1 << 20).expect("range has room");
//! block.write_i32(1000, -7);
//! assert_eq!(block.read_i32(1000), -7);
//! println!("{} page loads", pager.stats().page_load_count);
//! pager.shutdown()?;
//! # Ok::<(), uvm_pager::PagerError>(())
//! ```

#![allow(unsafe_code)]

mod config;
mod error;
mod fault;
mod mapper;
mod pager;
mod signals;
mod system;

pub use config::{PagerConfig, TIMER_RESOLUTION};
pub use error::PagerError;
pub use fault::{FaultCode, FaultKind, SEGV_ACCERR, SEGV_MAPERR};
pub use mapper::{MapError, Mapper, prot_flags};
pub use pager::{Pager, VmRegion};
pub use system::{ALLOC_ALIGN, Stats, VmSystem};
