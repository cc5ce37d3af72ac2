//! A written page survives eviction byte for byte.

use uvm_addresses::PageNumber;
use uvm_info::memory::{PAGE_SIZE, VIRTUAL_MEMORY_SIZE};
use uvm_pager::{Pager, PagerConfig};
use uvm_policy::PolicyKind;

fn pattern(i: usize) -> u8 {
    // distinct neighbours across the whole page
    u8::try_from((i * 7 + i / 256) % 256).unwrap()
}

#[test]
fn page_contents_survive_two_evictions() {
    let swap_dir = tempfile::tempdir().unwrap();
    let config = PagerConfig::new(2)
        .with_policy(PolicyKind::Fifo)
        .with_swap_dir(swap_dir.path())
        .without_timer();
    let pager = Pager::init(&config).unwrap();
    let mut mem = pager.alloc(VIRTUAL_MEMORY_SIZE).unwrap();

    let page5 = 5 * PAGE_SIZE;
    for i in 0..PAGE_SIZE {
        mem.write_u8(page5 + i, pattern(i));
    }
    assert!(pager.entry(PageNumber::new(5)).dirty());

    // two unrelated pages push page 5 out
    let _ = mem.read_u8(0);
    let _ = mem.read_u8(PAGE_SIZE);
    let _ = mem.read_u8(2 * PAGE_SIZE);
    assert!(!pager.is_resident(PageNumber::new(5)));
    assert!(pager.stats().flush_count >= 1);

    for i in 0..PAGE_SIZE {
        assert_eq!(mem.read_u8(page5 + i), pattern(i), "byte {i}");
    }
    pager.check_consistency().unwrap();

    let stats = pager.shutdown().unwrap();
    // 5, 0, 1, 2, then 5 again
    assert_eq!(stats.page_load_count, 5);
    assert_eq!(stats.eviction_count, 3);
}
