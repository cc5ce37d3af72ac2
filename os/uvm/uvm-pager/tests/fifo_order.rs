//! FIFO evicts in load order under real faults.

use uvm_addresses::PageNumber;
use uvm_info::memory::{PAGE_SIZE, VIRTUAL_MEMORY_SIZE};
use uvm_pager::{Pager, PagerConfig};
use uvm_policy::PolicyKind;

#[test]
fn fifo_evicts_oldest_first() {
    let config = PagerConfig::new(2)
        .with_policy(PolicyKind::Fifo)
        .without_timer();
    let pager = Pager::init(&config).unwrap();
    let mem = pager.alloc(VIRTUAL_MEMORY_SIZE).unwrap();
    let p = PageNumber::new;

    let _ = mem.read_u8(0);
    let _ = mem.read_u8(PAGE_SIZE);
    assert!(pager.is_resident(p(0)) && pager.is_resident(p(1)));

    let _ = mem.read_u8(2 * PAGE_SIZE);
    assert!(!pager.is_resident(p(0)));
    assert!(pager.is_resident(p(1)));

    let _ = mem.read_u8(3 * PAGE_SIZE);
    assert!(!pager.is_resident(p(1)));

    let stats = pager.stats();
    assert_eq!(stats.page_load_count, 4);
    assert_eq!(stats.fault_count, 4);
    assert_eq!(stats.resident_count, 2);
    // nothing was written
    assert_eq!(stats.flush_count, 0);
    assert!((0..4).all(|n| !pager.entry(p(n)).dirty()));

    pager.shutdown().unwrap();
}
