//! Replays access traces against each policy with a minimal resident-set
//! model and compares the number of page loads.

use std::collections::BTreeSet;
use uvm_addresses::PageNumber;
use uvm_policy::{AccessTracker, EvictionPolicy, PolicyKind, RevokeError};

#[derive(Default)]
struct Model {
    resident: BTreeSet<PageNumber>,
    accessed: BTreeSet<PageNumber>,
}

impl AccessTracker for Model {
    fn is_accessed(&self, page: PageNumber) -> bool {
        self.accessed.contains(&page)
    }

    fn revoke_access(&mut self, page: PageNumber) -> Result<(), RevokeError> {
        self.accessed.remove(&page);
        Ok(())
    }
}

/// Touches every page of `trace` in order with a tick after each access and
/// returns the number of loads.
fn replay(kind: PolicyKind, max_resident: usize, trace: &[u16]) -> usize {
    let mut policy = kind.build(max_resident, Some(5)).unwrap();
    let mut model = Model::default();
    let mut loads = 0;

    for &n in trace {
        let page = PageNumber::new(n);
        if !model.resident.contains(&page) {
            if model.resident.len() == max_resident {
                let victim = policy.choose_and_evict_victim().unwrap();
                assert!(model.resident.remove(&victim), "{victim} was not resident");
                model.accessed.remove(&victim);
            }
            model.resident.insert(page);
            policy.page_mapped(page);
            loads += 1;
        }
        model.accessed.insert(page);
        policy.timer_tick(&mut model).unwrap();

        assert!(model.resident.len() <= max_resident);
        let tracked: BTreeSet<_> = policy.tracked_pages().into_iter().collect();
        assert_eq!(tracked, model.resident);
    }
    loads
}

/// Page 0 is re-referenced between every new page.
fn hot_page_trace() -> Vec<u16> {
    let mut trace = vec![0, 1];
    for k in 2..10 {
        trace.extend([0, k]);
    }
    trace
}

#[test]
fn fifo_evicts_in_first_touch_order() {
    let mut policy = PolicyKind::Fifo.build(2, None).unwrap();
    let mut model = Model::default();
    let mut evicted = Vec::new();
    for n in 0..3 {
        if policy.len() == 2 {
            evicted.push(policy.choose_and_evict_victim().unwrap());
        }
        policy.page_mapped(PageNumber::new(n));
        policy.timer_tick(&mut model).unwrap();
    }
    evicted.push(policy.choose_and_evict_victim().unwrap());
    assert_eq!(evicted, vec![PageNumber::new(0), PageNumber::new(1)]);
    assert_eq!(replay(PolicyKind::Fifo, 2, &[0, 1, 2]), 3);
}

#[test]
fn clock_keeps_the_hot_page() {
    let trace = hot_page_trace();
    // every distinct page loads once, page 0 is never evicted
    assert_eq!(replay(PolicyKind::Clock, 2, &trace), 10);
}

#[test]
fn clock_loads_no_more_than_fifo_with_locality() {
    let trace = hot_page_trace();
    let clock = replay(PolicyKind::Clock, 2, &trace);
    let fifo = replay(PolicyKind::Fifo, 2, &trace);
    assert!(clock < fifo, "clock={clock} fifo={fifo}");
}

#[test]
fn every_policy_stays_consistent_on_a_long_trace() {
    let trace: Vec<u16> = (0..400_u16).map(|i| (i * 7 + i / 3) % 23).collect();
    let distinct = trace.iter().collect::<BTreeSet<_>>().len();
    for kind in PolicyKind::ALL {
        let loads = replay(kind, 5, &trace);
        assert!(loads >= distinct, "{kind}: {loads}");
        assert!(loads <= trace.len());
    }
}
