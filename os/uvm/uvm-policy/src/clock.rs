use crate::{AccessTracker, EvictionPolicy, PolicyKind, RevokeError};
use std::collections::VecDeque;
use uvm_addresses::PageNumber;

/// Second-chance approximation of LRU.
///
/// Each tick makes exactly one pass over the queue as it stood when the tick
/// began. Pages seen with their access bit set get the bit cleared, lose
/// all access rights, and move to the tail; the rest keep their relative
/// order at the front:
///
/// ```text
///  before:  [ a  B  c  D ]      (upper case = accessed)
///  after:   [ a  c  B  D ]      a, c cold in order; B, D rotated behind them
/// ```
///
/// The victim is always the head, i.e. the page that has gone longest
/// without demonstrating use.
#[derive(Debug)]
pub struct ClockPolicy {
    queue: VecDeque<PageNumber>,
    /// Scratch space for pages rotated during a tick.
    hot: VecDeque<PageNumber>,
}

impl ClockPolicy {
    #[must_use]
    pub fn with_capacity(max_resident: usize) -> Self {
        Self {
            queue: VecDeque::with_capacity(max_resident),
            hot: VecDeque::with_capacity(max_resident),
        }
    }
}

impl EvictionPolicy for ClockPolicy {
    fn kind(&self) -> PolicyKind {
        PolicyKind::Clock
    }

    fn page_mapped(&mut self, page: PageNumber) {
        debug_assert!(!self.queue.contains(&page), "{page} mapped twice");
        self.queue.push_back(page);
    }

    fn timer_tick(&mut self, tracker: &mut dyn AccessTracker) -> Result<(), RevokeError> {
        let mut result = Ok(());
        for _ in 0..self.queue.len() {
            let Some(page) = self.queue.pop_front() else {
                break;
            };
            // after a failure the rest of the pass only preserves order
            if result.is_ok() && tracker.is_accessed(page) {
                match tracker.revoke_access(page) {
                    Ok(()) => {
                        self.hot.push_back(page);
                        continue;
                    }
                    Err(e) => result = Err(e),
                }
            }
            self.queue.push_back(page);
        }

        if !self.hot.is_empty() {
            log::trace!("clock tick rotated {} page(s)", self.hot.len());
        }
        self.queue.extend(self.hot.drain(..));
        result
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{FakeTracker, p};

    #[test]
    fn tick_moves_accessed_pages_behind_cold_ones() {
        let mut clock = ClockPolicy::with_capacity(4);
        let mut tracker = FakeTracker::default();
        for n in 0..4 {
            clock.page_mapped(p(n));
        }
        tracker.touch(p(1));
        tracker.touch(p(3));

        clock.timer_tick(&mut tracker).unwrap();

        assert_eq!(clock.tracked_pages(), vec![p(0), p(2), p(1), p(3)]);
        assert_eq!(tracker.revoked, vec![p(1), p(3)]);
        assert!(!tracker.is_accessed(p(1)));
    }

    #[test]
    fn each_page_is_examined_once_per_tick() {
        let mut clock = ClockPolicy::with_capacity(2);
        let mut tracker = FakeTracker::default();
        clock.page_mapped(p(0));
        clock.page_mapped(p(1));
        tracker.touch(p(0));
        tracker.touch(p(1));

        clock.timer_tick(&mut tracker).unwrap();

        assert_eq!(tracker.revoked, vec![p(0), p(1)]);
        assert_eq!(clock.tracked_pages(), vec![p(0), p(1)]);
    }

    #[test]
    fn rereferenced_page_survives() {
        // touch 0, touch 1, tick, touch 0, tick, then load 2
        let mut clock = ClockPolicy::with_capacity(2);
        let mut tracker = FakeTracker::default();

        clock.page_mapped(p(0));
        tracker.touch(p(0));
        clock.page_mapped(p(1));
        tracker.touch(p(1));
        clock.timer_tick(&mut tracker).unwrap();

        tracker.touch(p(0));
        clock.timer_tick(&mut tracker).unwrap();

        assert_eq!(clock.choose_and_evict_victim(), Some(p(1)));
    }

    #[test]
    fn failed_revocation_keeps_every_page() {
        let mut clock = ClockPolicy::with_capacity(3);
        let mut tracker = FakeTracker::default();
        for n in 0..3 {
            clock.page_mapped(p(n));
            tracker.touch(p(n));
        }
        tracker.fail_on = Some(p(1));

        let err = clock.timer_tick(&mut tracker).unwrap_err();
        assert_eq!(err.page, p(1));

        let mut pages = clock.tracked_pages();
        pages.sort();
        assert_eq!(pages, vec![p(0), p(1), p(2)]);
        assert_eq!(tracker.revoked, vec![p(0)]);
    }

    #[test]
    fn tick_never_grows_storage() {
        let mut clock = ClockPolicy::with_capacity(8);
        let mut tracker = FakeTracker::default();
        for n in 0..8 {
            clock.page_mapped(p(n));
            tracker.touch(p(n));
        }
        let before = (clock.queue.capacity(), clock.hot.capacity());
        clock.timer_tick(&mut tracker).unwrap();
        assert_eq!((clock.queue.capacity(), clock.hot.capacity()), before);
    }
}
