//! Allocations from the managed range, including data spanning many pages
//! under a small resident budget.

use uvm_info::memory::{PAGE_SIZE, VIRTUAL_MEMORY_SIZE};
use uvm_pager::{ALLOC_ALIGN, Pager, PagerConfig};
use uvm_policy::PolicyKind;

#[test]
fn allocations_are_disjoint_and_hold_data() {
    let config = PagerConfig::new(3)
        .with_policy(PolicyKind::Fifo)
        .without_timer();
    let pager = Pager::init(&config).unwrap();

    let mut a = pager.alloc(10 * PAGE_SIZE).unwrap();
    let mut b = pager.alloc(5).unwrap();
    let mut c = pager.alloc(8 * PAGE_SIZE).unwrap();
    assert_eq!(a.start(), pager.base());
    assert!(b.start().as_usize() >= a.start().as_usize() + a.len());
    assert_eq!(c.start().as_usize() % ALLOC_ALIGN, 0);
    assert!(c.start().as_usize() >= b.start().as_usize() + b.len());

    let ints = a.len() / 4;
    for i in 0..ints {
        a.write_i32(i, i32::try_from(i).unwrap() - 5000);
    }
    for i in 0..5 {
        b.write_u8(i, 0xF0 | u8::try_from(i).unwrap());
    }
    for i in (0..c.len()).step_by(97) {
        c.write_u8(i, 0x33);
    }

    for i in 0..ints {
        assert_eq!(a.read_i32(i), i32::try_from(i).unwrap() - 5000);
    }
    assert_eq!(b.read_u8(4), 0xF4);
    let past_end = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| b.read_u8(5)));
    assert!(past_end.is_err());
    assert_eq!(c.read_u8(97 * 3), 0x33);
    assert!(pager.stats().resident_count <= 3);
    assert!(pager.stats().eviction_count > 0);
    pager.check_consistency().unwrap();

    let used = c.start().as_usize() + c.len() - pager.base().as_usize();
    assert!(pager.alloc(VIRTUAL_MEMORY_SIZE - used + 1).is_none());
    assert!(pager.alloc(VIRTUAL_MEMORY_SIZE).is_none());
    assert!(pager.alloc(PAGE_SIZE).is_some());

    pager.shutdown().unwrap();
}
