use crate::{EvictionPolicy, PolicyKind};
use std::collections::VecDeque;
use uvm_addresses::PageNumber;

/// First in, first out. Ignores access information and ticks entirely.
#[derive(Debug)]
pub struct FifoPolicy {
    queue: VecDeque<PageNumber>,
}

impl FifoPolicy {
    #[must_use]
    pub fn with_capacity(max_resident: usize) -> Self {
        Self {
            queue: VecDeque::with_capacity(max_resident),
        }
    }
}

impl EvictionPolicy for FifoPolicy {
    fn kind(&self) -> PolicyKind {
        PolicyKind::Fifo
    }

    fn page_mapped(&mut self, page: PageNumber) {
        debug_assert!(!self.queue.contains(&page), "{page} mapped twice");
        self.queue.push_back(page);
    }

    fn choose_and_evict_victim(&mut self) -> Option<PageNumber> {
        self.queue.pop_front()
    }

    fn len(&self) -> usize {
        self.queue.len()
    }

    fn tracked_pages(&self) -> Vec<PageNumber> {
        self.queue.iter().copied().collect()
    }
}
