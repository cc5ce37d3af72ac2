use crate::{PageTableEntry, Permission};
use uvm_addresses::PageNumber;
use uvm_info::memory::NUM_PAGES;

/// Flat page table covering every page of the simulated address space.
///
/// The table is pure bookkeeping. It never touches memory itself; applying a
/// protection to the real mapping is delegated to the caller through
/// [`set_permission`](Self::set_permission).
pub struct PageTable {
    entries: [PageTableEntry; NUM_PAGES],
    resident: usize,
}

impl Default for PageTable {
    fn default() -> Self {
        Self::new()
    }
}

impl PageTable {
    /// A table in which no page is resident.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            entries: [PageTableEntry::empty(); NUM_PAGES],
            resident: 0,
        }
    }

    /// Snapshot of the entry for `page`.
    #[inline]
    #[must_use]
    pub const fn entry(&self, page: PageNumber) -> PageTableEntry {
        self.entries[page.index()]
    }

    /// Number of entries with `RESIDENT` set.
    #[inline]
    #[must_use]
    pub const fn resident_count(&self) -> usize {
        self.resident
    }

    /// Iterate over all resident pages in ascending order.
    pub fn resident_pages(&self) -> impl Iterator<Item = PageNumber> + '_ {
        PageNumber::all().filter(|&p| self.entries[p.index()].resident())
    }

    /// Reset `page` to the all-unset, non-resident state.
    pub const fn clear(&mut self, page: PageNumber) {
        if self.entries[page.index()].resident() {
            self.resident -= 1;
        }
        self.entries[page.index()] = PageTableEntry::empty();
    }

    /// Mark `page` as resident.
    pub const fn set_resident(&mut self, page: PageNumber) {
        let e = &mut self.entries[page.index()];
        if !e.resident() {
            e.set_resident(true);
            self.resident += 1;
        }
    }

    #[inline]
    #[must_use]
    pub const fn is_resident(&self, page: PageNumber) -> bool {
        self.entries[page.index()].resident()
    }

    pub const fn set_accessed(&mut self, page: PageNumber) {
        self.entries[page.index()].set_accessed(true);
    }

    pub const fn clear_accessed(&mut self, page: PageNumber) {
        self.entries[page.index()].set_accessed(false);
    }

    #[inline]
    #[must_use]
    pub const fn is_accessed(&self, page: PageNumber) -> bool {
        self.entries[page.index()].accessed()
    }

    pub const fn set_dirty(&mut self, page: PageNumber) {
        self.entries[page.index()].set_dirty(true);
    }

    pub const fn clear_dirty(&mut self, page: PageNumber) {
        self.entries[page.index()].set_dirty(false);
    }

    #[inline]
    #[must_use]
    pub const fn is_dirty(&self, page: PageNumber) -> bool {
        self.entries[page.index()].dirty()
    }

    #[inline]
    #[must_use]
    pub const fn permission(&self, page: PageNumber) -> Permission {
        self.entries[page.index()].permission()
    }

    /// Change the permission of `page`.
    ///
    /// `protect` must apply `perm` to the page's real mapping. The entry is
    /// only updated once `protect` succeeds, so the table never records a
    /// permission that was not granted.
    ///
    /// # Errors
    /// Propagates the error returned by `protect`; the entry is left unchanged.
    pub fn set_permission<E>(
        &mut self,
        page: PageNumber,
        perm: Permission,
        protect: impl FnOnce(PageNumber, Permission) -> Result<(), E>,
    ) -> Result<(), E> {
        protect(page, perm)?;
        self.entries[page.index()].set_permission(perm);
        Ok(())
    }

    /// Whether every entry satisfies the residency invariant and the resident
    /// count matches the entries.
    #[must_use]
    pub fn is_consistent(&self) -> bool {
        self.entries.iter().all(PageTableEntry::is_consistent)
            && self.entries.iter().filter(|e| e.resident()).count() == self.resident
    }
}
