//! # Eviction Policies
//!
//! A policy decides which resident page gives up its frame when the resident
//! budget is exhausted. It observes exactly three events:
//!
//! | Event | Raised by | Effect on the policy |
//! |---|---|---|
//! | [`page_mapped`](EvictionPolicy::page_mapped) | fault handler, after a page is loaded | starts tracking the page |
//! | [`timer_tick`](EvictionPolicy::timer_tick) | interval timer | may sample and reset access bits |
//! | [`choose_and_evict_victim`](EvictionPolicy::choose_and_evict_victim) | fault handler, before a load over budget | picks a page and stops tracking it |
//!
//! The policy never maps or unmaps anything itself. Unloading the victim
//! (and flushing it if dirty) stays with the caller, so I/O and bookkeeping
//! remain decoupled. Whatever the policy tracks is therefore always exactly
//! the set of resident pages.
//!
//! Access information reaches the policy through the [`AccessTracker`]
//! capability instead of the page table itself, which keeps this crate
//! independent of the mapping layer and lets the policies be exercised
//! against a fake.
//!
//! ## Allocation
//!
//! All three events run inside signal handlers. Every policy sizes its
//! storage for `max_resident` pages when it is built and never grows it.
//!
//! ## Variants
//!
//! - [`FifoPolicy`]: evicts the page that was loaded first.
//! - [`ClockPolicy`]: second-chance approximation of LRU driven by ticks.
//! - [`RandomPolicy`]: evicts a uniformly random resident page.

mod clock;
mod fifo;
mod kind;
mod random;

#[cfg(test)]
mod testing;

pub use clock::ClockPolicy;
pub use fifo::FifoPolicy;
pub use kind::PolicyKind;
pub use random::RandomPolicy;

use std::io;
use uvm_addresses::PageNumber;

#[derive(Debug, thiserror::Error)]
pub enum PolicyError {
    #[error("a policy needs room for at least one resident page")]
    ZeroCapacity,
    #[error("unknown eviction policy `{0}` (expected fifo, clock or random)")]
    UnknownPolicy(String),
}

/// Failure to withdraw access from a page during a timer tick.
#[derive(Debug, thiserror::Error)]
#[error("failed to revoke access to {page}: {source}")]
pub struct RevokeError {
    pub page: PageNumber,
    #[source]
    pub source: io::Error,
}

/// Read and reset the access history of resident pages.
pub trait AccessTracker {
    /// Whether `page` was touched since its access bit was last cleared.
    fn is_accessed(&self, page: PageNumber) -> bool;

    /// Clears the access bit of `page` and removes all access rights, so
    /// that the next touch faults and sets the bit again.
    ///
    /// # Errors
    /// Fails when the protection change cannot be applied.
    fn revoke_access(&mut self, page: PageNumber) -> Result<(), RevokeError>;
}

pub trait EvictionPolicy: Send {
    fn kind(&self) -> PolicyKind;

    /// Records that `page` has just become resident.
    fn page_mapped(&mut self, page: PageNumber);

    /// Periodic hook; the default does nothing.
    ///
    /// # Errors
    /// Propagates a failed access revocation. Bookkeeping stays intact.
    fn timer_tick(&mut self, tracker: &mut dyn AccessTracker) -> Result<(), RevokeError> {
        let _ = tracker;
        Ok(())
    }

    /// Picks a victim and forgets it. `None` when nothing is tracked.
    fn choose_and_evict_victim(&mut self) -> Option<PageNumber>;

    /// Number of tracked pages.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Snapshot of the tracked pages in policy order.
    fn tracked_pages(&self) -> Vec<PageNumber>;
}
