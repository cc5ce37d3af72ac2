use crate::signals::{self, PreviousHandlers, SYSTEM};
use crate::{PagerConfig, PagerError, Stats, VmSystem};
use core::marker::PhantomData;
use core::ptr::{read_volatile, write_volatile};
use std::time::Duration;
use uvm_addresses::{PageNumber, VirtualAddress, VirtualRange};
use uvm_info::memory::PAGE_SIZE;
use uvm_pagetable::PageTableEntry;
use uvm_policy::PolicyKind;

/// Handle to the process-wide demand pager.
///
/// Created by [`Pager::init`]; dropping it (or calling
/// [`shutdown`](Self::shutdown)) stops the timer, restores the previous
/// signal dispositions and releases the range and the swap file.
pub struct Pager {
    range: VirtualRange,
    max_resident: usize,
    policy: PolicyKind,
    timer: Option<Duration>,
    /// `None` once torn down.
    previous: Option<PreviousHandlers>,
}

impl Pager {
    /// Reserves the range, creates the swap file, installs the fault and
    /// timer handlers and starts the timer.
    ///
    /// # Errors
    /// Invalid configuration, a host page size other than `PAGE_SIZE`, an
    /// already active pager, or any failure while setting up. Nothing is
    /// left installed on error.
    pub fn init(config: &PagerConfig) -> Result<Self, PagerError> {
        config.validate()?;
        let host = host_page_size();
        if host != PAGE_SIZE {
            return Err(PagerError::PageSize { host });
        }

        let (range, policy) = {
            let mut slot = SYSTEM.lock_masked();
            if slot.is_some() {
                return Err(PagerError::AlreadyInitialized);
            }
            let system = slot.insert(VmSystem::new(config)?);
            (system.range(), system.policy_kind())
        };

        let previous = match signals::install() {
            Ok(previous) => previous,
            Err(e) => {
                SYSTEM.lock_masked().take();
                return Err(e);
            }
        };

        if let Some(interval) = config.timer_interval()
            && let Err(e) = signals::set_timer(interval)
        {
            // best effort, the timer error is what gets reported
            let _ = signals::restore(&previous);
            SYSTEM.lock_masked().take();
            return Err(e);
        }

        log::info!(
            "\"physical memory\" is in the range {}..{} ({} pages of {} bytes)",
            range.start(),
            range.end(),
            range.len() / PAGE_SIZE,
            PAGE_SIZE
        );
        log::info!(
            "resident budget {} pages, {policy} eviction, timer {:?}",
            config.max_resident(),
            config.timer_interval()
        );

        Ok(Self {
            range,
            max_resident: config.max_resident(),
            policy,
            timer: config.timer_interval(),
            previous: Some(previous),
        })
    }

    /// Start of the managed range.
    #[must_use]
    pub const fn base(&self) -> VirtualAddress {
        self.range.start()
    }

    /// One past the end of the managed range.
    #[must_use]
    pub const fn end(&self) -> VirtualAddress {
        self.range.end()
    }

    #[must_use]
    pub const fn range(&self) -> VirtualRange {
        self.range
    }

    #[must_use]
    pub const fn max_resident(&self) -> usize {
        self.max_resident
    }

    #[must_use]
    pub const fn policy(&self) -> PolicyKind {
        self.policy
    }

    #[must_use]
    pub const fn page_to_addr(&self, page: PageNumber) -> VirtualAddress {
        self.range.page_to_addr(page)
    }

    /// The page containing `addr`, if it lies inside the range.
    #[must_use]
    pub fn addr_to_page(&self, addr: VirtualAddress) -> Option<PageNumber> {
        self.range.addr_to_page(addr)
    }

    /// Snapshot of the counters.
    #[must_use]
    pub fn stats(&self) -> Stats {
        self.with_system(|s| s.stats()).unwrap_or_default()
    }

    /// Snapshot of `page`'s table entry.
    #[must_use]
    pub fn entry(&self, page: PageNumber) -> PageTableEntry {
        self.with_system(|s| s.entry(page))
            .unwrap_or_else(|_| PageTableEntry::empty())
    }

    #[must_use]
    pub fn is_resident(&self, page: PageNumber) -> bool {
        self.entry(page).resident()
    }

    /// Delivers one timer tick now.
    ///
    /// # Errors
    /// A failed access revocation, or a pager that was shut down.
    pub fn tick(&self) -> Result<(), PagerError> {
        self.with_system(VmSystem::tick)?
    }

    /// Verifies the page table against the residency budget and the policy.
    ///
    /// # Errors
    /// The first inconsistency found.
    pub fn check_consistency(&self) -> Result<(), PagerError> {
        self.with_system(|s| s.check_consistency())?
    }

    /// Bump-allocates `size` bytes from the managed range.
    ///
    /// Allocations are `ALLOC_ALIGN`-aligned, never overlap and are never
    /// reclaimed. `None` once the range is exhausted.
    #[must_use]
    pub fn alloc(&self, size: usize) -> Option<VmRegion<'_>> {
        let start = self.with_system(|s| s.bump_alloc(size)).ok().flatten()?;
        Some(VmRegion {
            start,
            len: size,
            _pager: PhantomData,
        })
    }

    /// Stops paging and returns the final counters.
    ///
    /// # Errors
    /// A failure to stop the timer or restore a signal disposition. The
    /// pager state is released regardless.
    pub fn shutdown(mut self) -> Result<Stats, PagerError> {
        self.teardown()
    }

    fn with_system<R>(&self, f: impl FnOnce(&mut VmSystem) -> R) -> Result<R, PagerError> {
        if self.previous.is_none() {
            return Err(PagerError::Inactive);
        }
        let mut slot = SYSTEM.lock_masked();
        slot.as_mut().map(f).ok_or(PagerError::Inactive)
    }

    fn teardown(&mut self) -> Result<Stats, PagerError> {
        let Some(previous) = self.previous.take() else {
            return Err(PagerError::Inactive);
        };

        let stopped = match self.timer {
            Some(_) => signals::set_timer(Duration::ZERO),
            None => Ok(()),
        };
        let restored = signals::restore(&previous);

        let system = SYSTEM.lock_masked().take();
        let stats = system.as_ref().map(VmSystem::stats).unwrap_or_default();
        if let Some(Err(e)) = system.as_ref().map(VmSystem::check_consistency) {
            log::warn!("inconsistent state at shutdown: {e}");
        }
        drop(system);

        log::info!(
            "shutdown after {} faults, {} page loads, {} evictions, {} flushes",
            stats.fault_count,
            stats.page_load_count,
            stats.eviction_count,
            stats.flush_count
        );
        stopped?;
        restored?;
        Ok(stats)
    }
}

impl Drop for Pager {
    fn drop(&mut self) {
        if self.previous.is_some()
            && let Err(e) = self.teardown()
        {
            log::error!("pager teardown failed: {e}");
        }
    }
}

fn host_page_size() -> usize {
    // SAFETY: sysconf has no preconditions.
    let size = unsafe { libc::sysconf(libc::_SC_PAGESIZE) };
    usize::try_from(size).unwrap_or(0)
}

/// A bump-allocated block of paged memory.
///
/// Every access is volatile, so each load and store really reaches the
/// protected mapping and may fault a page in.
pub struct VmRegion<'a> {
    start: VirtualAddress,
    len: usize,
    _pager: PhantomData<&'a Pager>,
}

impl VmRegion<'_> {
    #[must_use]
    pub const fn start(&self) -> VirtualAddress {
        self.start
    }

    #[must_use]
    pub const fn len(&self) -> usize {
        self.len
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    #[must_use]
    pub fn as_ptr(&self) -> *mut u8 {
        self.start.as_mut_ptr()
    }

    /// # Panics
    /// If `offset` is outside the region.
    #[must_use]
    pub fn read_u8(&self, offset: usize) -> u8 {
        let p = self.checked::<u8>(offset);
        // SAFETY: in bounds of a live allocation inside the range.
        unsafe { read_volatile(p) }
    }

    /// # Panics
    /// If `offset` is outside the region.
    pub fn write_u8(&mut self, offset: usize, value: u8) {
        let p = self.checked::<u8>(offset);
        // SAFETY: as above.
        unsafe { write_volatile(p, value) }
    }

    /// The `index`-th `i32` of the region.
    ///
    /// # Panics
    /// If the element is outside the region.
    #[must_use]
    pub fn read_i32(&self, index: usize) -> i32 {
        let p = self.checked::<i32>(index * size_of::<i32>());
        // SAFETY: in bounds; the region start is 8-aligned.
        unsafe { read_volatile(p) }
    }

    /// # Panics
    /// If the element is outside the region.
    pub fn write_i32(&mut self, index: usize, value: i32) {
        let p = self.checked::<i32>(index * size_of::<i32>());
        // SAFETY: as above.
        unsafe { write_volatile(p, value) }
    }

    fn checked<T>(&self, offset: usize) -> *mut T {
        assert!(
            offset
                .checked_add(size_of::<T>())
                .is_some_and(|end| end <= self.len),
            "offset {offset} out of bounds for a region of {} bytes",
            self.len
        );
        (self.start + offset).as_mut_ptr()
    }
}
