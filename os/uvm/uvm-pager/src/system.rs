use crate::{FaultCode, FaultKind, MapError, Mapper, PagerConfig, PagerError};
use std::collections::BTreeSet;
use uvm_addresses::{PageNumber, VirtualAddress, VirtualRange};
use uvm_info::memory::VIRTUAL_MEMORY_SIZE;
use uvm_pagetable::{PageTable, PageTableEntry, Permission};
use uvm_policy::{AccessTracker, EvictionPolicy, PolicyKind, RevokeError};
use uvm_swap::SwapStore;

/// Alignment of every bump allocation.
pub const ALLOC_ALIGN: usize = 8;

/// Counters kept by the pager.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Stats {
    /// Every classified fault, including permission upgrades.
    pub fault_count: u64,
    /// Pages actually loaded from swap.
    pub page_load_count: u64,
    /// Victims unloaded to make room.
    pub eviction_count: u64,
    /// Dirty pages written back to swap.
    pub flush_count: u64,
    /// Ticks delivered to the policy.
    pub tick_count: u64,
    /// Pages resident when the snapshot was taken.
    pub resident_count: usize,
}

/// Everything the fault and timer paths operate on.
pub struct VmSystem {
    table: PageTable,
    mapper: Mapper,
    swap: SwapStore,
    policy: Box<dyn EvictionPolicy>,
    max_resident: usize,
    stats: Stats,
    /// Offset of the next bump allocation from the start of the range.
    next_alloc: usize,
}

impl VmSystem {
    /// Builds the policy, creates the swap file and reserves the range.
    ///
    /// # Errors
    /// Invalid configuration or any host failure while setting up.
    pub fn new(config: &PagerConfig) -> Result<Self, PagerError> {
        config.validate()?;
        let policy = config
            .policy()
            .build(config.max_resident(), config.random_seed())?;
        let swap = SwapStore::create(config.swap_dir())?;
        let mapper = Mapper::reserve()?;
        Ok(Self {
            table: PageTable::new(),
            mapper,
            swap,
            policy,
            max_resident: config.max_resident(),
            stats: Stats::default(),
            next_alloc: 0,
        })
    }

    #[inline]
    #[must_use]
    pub const fn range(&self) -> VirtualRange {
        self.mapper.range()
    }

    #[must_use]
    pub const fn max_resident(&self) -> usize {
        self.max_resident
    }

    #[must_use]
    pub fn policy_kind(&self) -> PolicyKind {
        self.policy.kind()
    }

    #[must_use]
    pub const fn entry(&self, page: PageNumber) -> PageTableEntry {
        self.table.entry(page)
    }

    #[must_use]
    pub const fn stats(&self) -> Stats {
        let mut stats = self.stats;
        stats.resident_count = self.table.resident_count();
        stats
    }

    /// Resolves one fault on `page`.
    ///
    /// # Errors
    /// Invariant violations and host failures. Either leaves the system in
    /// a state that must not be continued.
    pub fn handle_fault(
        &mut self,
        page: PageNumber,
        code: FaultCode,
    ) -> Result<FaultKind, PagerError> {
        let kind = FaultKind::classify(page, self.table.entry(page), code)?;
        self.stats.fault_count += 1;
        log::trace!("fault on {page}: {}", kind.explain());

        match kind {
            FaultKind::PageIn => {
                if self.table.resident_count() >= self.max_resident {
                    self.evict_one(page)?;
                }
                self.map_page(page, Permission::Read)?;
                self.table.set_accessed(page);
                self.policy.page_mapped(page);
            }
            FaultKind::GrantRead => {
                self.protect(page, Permission::Read)?;
                self.table.set_accessed(page);
            }
            FaultKind::GrantWrite => {
                self.protect(page, Permission::ReadWrite)?;
                self.table.set_dirty(page);
                self.table.set_accessed(page);
            }
        }
        Ok(kind)
    }

    /// Delivers one timer tick to the policy.
    ///
    /// # Errors
    /// A failed access revocation.
    pub fn tick(&mut self) -> Result<(), PagerError> {
        self.stats.tick_count += 1;
        let mut tracker = Tracker {
            table: &mut self.table,
            mapper: &self.mapper,
        };
        self.policy.timer_tick(&mut tracker)?;
        Ok(())
    }

    /// Carves `size` bytes off the unallocated tail of the range.
    ///
    /// Returns `None` once the range is exhausted. Memory is never reclaimed.
    pub fn bump_alloc(&mut self, size: usize) -> Option<VirtualAddress> {
        let start = self.next_alloc.checked_next_multiple_of(ALLOC_ALIGN)?;
        let end = start.checked_add(size)?;
        if end > VIRTUAL_MEMORY_SIZE {
            log::warn!("allocation of {size} bytes does not fit, {start:#x} already in use");
            return None;
        }
        self.next_alloc = end;
        self.range().start().checked_add(start)
    }

    /// Verifies the residency bound, every entry, and that the policy tracks
    /// exactly the resident pages.
    ///
    /// # Errors
    /// The first inconsistency found.
    pub fn check_consistency(&self) -> Result<(), PagerError> {
        let first = PageNumber::new(0);
        if self.table.resident_count() > self.max_resident {
            return Err(PagerError::invariant(first, "resident budget exceeded"));
        }
        if let Some(page) =
            PageNumber::all().find(|&p| !self.table.entry(p).is_consistent())
        {
            return Err(PagerError::invariant(page, "entry state is inconsistent"));
        }
        if !self.table.is_consistent() {
            return Err(PagerError::invariant(first, "resident count disagrees with the entries"));
        }
        let tracked: BTreeSet<_> = self.policy.tracked_pages().into_iter().collect();
        let resident: BTreeSet<_> = self.table.resident_pages().collect();
        if let Some(&page) = tracked.symmetric_difference(&resident).next() {
            return Err(PagerError::invariant(page, "policy and page table disagree"));
        }
        Ok(())
    }

    /// Asks the policy for a victim and unloads it.
    fn evict_one(&mut self, faulting: PageNumber) -> Result<(), PagerError> {
        let victim = self
            .policy
            .choose_and_evict_victim()
            .ok_or_else(|| PagerError::invariant(faulting, "policy has no victim to evict"))?;
        log::debug!("evicting {victim} to make room for {faulting}");
        self.unmap_page(victim)?;
        self.stats.eviction_count += 1;
        Ok(())
    }

    /// Binds `page`, fills it from its swap slot and applies `perm`.
    fn map_page(&mut self, page: PageNumber, perm: Permission) -> Result<(), PagerError> {
        if self.table.resident_count() + 1 > self.max_resident {
            return Err(PagerError::invariant(page, "mapping would exceed the resident budget"));
        }

        self.mapper.bind(page)?;
        // SAFETY: the page was just bound read-write and nothing else refers
        // to its memory while the pager state is locked.
        let buf = unsafe { &mut *self.mapper.page_ptr(page) };
        self.swap.read_page(page, buf)?;

        self.table.set_resident(page);
        self.protect(page, perm)?;
        self.stats.page_load_count += 1;
        log::debug!("mapped {page} ({perm})");
        Ok(())
    }

    /// Writes `page` back if dirty, then unbinds it.
    fn unmap_page(&mut self, page: PageNumber) -> Result<(), PagerError> {
        if !self.table.is_resident(page) {
            return Err(PagerError::invariant(page, "evicting a page that is not resident"));
        }

        if self.table.is_dirty(page) {
            self.flush_page(page)?;
        }

        self.mapper.unbind(page)?;
        self.table.clear(page);
        log::debug!("unmapped {page}");
        Ok(())
    }

    /// Writes a dirty `page` to its slot after dropping write access. A
    /// later write faults again and marks the page dirty anew.
    fn flush_page(&mut self, page: PageNumber) -> Result<(), PagerError> {
        self.protect(page, Permission::Read)?;
        // SAFETY: the page is bound and readable.
        let buf = unsafe { &*self.mapper.page_ptr(page) };
        self.swap.write_page(page, buf)?;
        self.table.clear_dirty(page);
        self.stats.flush_count += 1;
        Ok(())
    }

    fn protect(&mut self, page: PageNumber, perm: Permission) -> Result<(), MapError> {
        let mapper = &self.mapper;
        self.table
            .set_permission(page, perm, |p, perm| mapper.reprotect(p, perm))
    }
}

/// Access bits and protection of the resident pages, as seen by a policy.
struct Tracker<'a> {
    table: &'a mut PageTable,
    mapper: &'a Mapper,
}

impl AccessTracker for Tracker<'_> {
    fn is_accessed(&self, page: PageNumber) -> bool {
        self.table.is_accessed(page)
    }

    fn revoke_access(&mut self, page: PageNumber) -> Result<(), RevokeError> {
        let mapper = self.mapper;
        self.table
            .set_permission(page, Permission::None, |p, perm| mapper.reprotect(p, perm))
            .map_err(|e| RevokeError {
                page,
                source: e.into_io(),
            })?;
        self.table.clear_accessed(page);
        Ok(())
    }
}
