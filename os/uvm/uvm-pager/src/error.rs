use std::io;
use std::time::Duration;
use uvm_addresses::PageNumber;
use uvm_info::memory::{NUM_PAGES, PAGE_SIZE};
use uvm_policy::{PolicyError, RevokeError};
use uvm_swap::SwapError;

use crate::{MapError, TIMER_RESOLUTION};

#[derive(Debug, thiserror::Error)]
pub enum PagerError {
    #[error("resident budget {requested} is outside 1..={}", NUM_PAGES)]
    ResidentBudget { requested: usize },
    #[error("timer interval {interval:?} is below the {:?} timer resolution", TIMER_RESOLUTION)]
    TimerInterval { interval: Duration },
    #[error("host page size {host} does not match the pager's {}", PAGE_SIZE)]
    PageSize { host: usize },
    #[error("a pager is already active in this process")]
    AlreadyInitialized,
    #[error("the pager has been shut down")]
    Inactive,
    #[error("failed to install the {signal} handler: {source}")]
    Signal {
        signal: &'static str,
        #[source]
        source: io::Error,
    },
    #[error("failed to program the interval timer: {0}")]
    Timer(#[source] io::Error),
    #[error("invariant violated at {page}: {what}")]
    Invariant {
        page: PageNumber,
        what: &'static str,
    },
    #[error(transparent)]
    Policy(#[from] PolicyError),
    #[error(transparent)]
    Revoke(#[from] RevokeError),
    #[error(transparent)]
    Swap(#[from] SwapError),
    #[error(transparent)]
    Map(#[from] MapError),
}

impl PagerError {
    #[must_use]
    pub(crate) fn invariant(page: PageNumber, what: &'static str) -> Self {
        Self::Invariant { page, what }
    }
}
