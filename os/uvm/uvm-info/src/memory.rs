//! # Memory Layout

use core::time::Duration;

/// Size of a single page in bytes.
///
/// This is dictated by the host MMU: the protection primitives only work on
/// whole pages, so the pager refuses to start if the host disagrees.
pub const PAGE_SIZE: usize = 4096;

/// log2([`PAGE_SIZE`]).
pub const PAGE_SHIFT: u32 = 12;

/// Total number of pages in the simulated address space.
///
/// Allocations beyond `NUM_PAGES * PAGE_SIZE` bytes fail.
pub const NUM_PAGES: usize = 4096;

/// Size of the simulated address space in bytes.
pub const VIRTUAL_MEMORY_SIZE: usize = NUM_PAGES * PAGE_SIZE;

/// Size of the swap file in bytes; one slot per virtual page.
pub const SWAP_FILE_SIZE: u64 = VIRTUAL_MEMORY_SIZE as u64;

/// Preferred start of the virtual range.
///
/// This is only a hint to the host. It sits above the usual program heap and
/// well below shared libraries; the host may place the range elsewhere.
pub const PREFERRED_BASE: usize = 0x2000_0000;

/// Interval of the periodic timer tick.
pub const TIMESLICE: Duration = Duration::from_millis(10);

/// Resident budget used when none is configured.
pub const DEFAULT_MAX_RESIDENT: usize = 64;

const _: () = {
    assert!(PAGE_SIZE.is_power_of_two());
    assert!(1 << PAGE_SHIFT == PAGE_SIZE);
    assert!(PREFERRED_BASE.is_multiple_of(PAGE_SIZE));
    assert!(NUM_PAGES <= u16::MAX as usize + 1);
    assert!(DEFAULT_MAX_RESIDENT <= NUM_PAGES);
};
