use crate::{PageNumber, VirtualAddress};
use uvm_info::memory::{NUM_PAGES, PAGE_SHIFT, PAGE_SIZE, VIRTUAL_MEMORY_SIZE};

/// The managed virtual range `[base, base + NUM_PAGES * PAGE_SIZE)`.
///
/// This is the only place where page numbers turn into addresses and back:
///
/// ```text
/// addr = base + page * PAGE_SIZE
/// page = (addr - base) / PAGE_SIZE
/// ```
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct VirtualRange {
    base: VirtualAddress,
}

impl VirtualRange {
    /// Describe the range starting at `base`.
    ///
    /// # Panics
    /// Panics if `base` is not page aligned or the range would wrap around
    /// the end of the address space.
    #[inline]
    #[must_use]
    pub const fn new(base: VirtualAddress) -> Self {
        assert!(base.is_page_aligned(), "range base not page aligned");
        assert!(
            base.checked_add(VIRTUAL_MEMORY_SIZE).is_some(),
            "range wraps around"
        );
        Self { base }
    }

    /// First address of the range.
    #[inline]
    #[must_use]
    pub const fn start(&self) -> VirtualAddress {
        self.base
    }

    /// One past the last address of the range.
    #[inline]
    #[must_use]
    pub const fn end(&self) -> VirtualAddress {
        VirtualAddress::new(self.base.as_usize() + VIRTUAL_MEMORY_SIZE)
    }

    /// Size of the range in bytes.
    #[inline]
    #[must_use]
    pub const fn len(&self) -> usize {
        VIRTUAL_MEMORY_SIZE
    }

    #[inline]
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        NUM_PAGES == 0
    }

    #[inline]
    #[must_use]
    pub fn contains(&self, addr: VirtualAddress) -> bool {
        addr >= self.start() && addr < self.end()
    }

    /// Base address of `page`.
    #[inline]
    #[must_use]
    pub const fn page_to_addr(&self, page: PageNumber) -> VirtualAddress {
        VirtualAddress::new(self.base.as_usize() + (page.index() << PAGE_SHIFT))
    }

    /// Page containing `addr`, or `None` if `addr` lies outside the range.
    #[inline]
    #[must_use]
    pub fn addr_to_page(&self, addr: VirtualAddress) -> Option<PageNumber> {
        if !self.contains(addr) {
            return None;
        }
        PageNumber::try_from((addr.as_usize() - self.base.as_usize()) / PAGE_SIZE).ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BASE: usize = 0x2000_0000;

    #[test]
    fn first_and_last_page_round_trip() {
        let range = VirtualRange::new(VirtualAddress::new(BASE));
        let first = PageNumber::new(0);
        let last = PageNumber::try_from(NUM_PAGES - 1).unwrap();

        assert_eq!(range.page_to_addr(first), range.start());
        assert_eq!(range.addr_to_page(range.start()), Some(first));
        assert_eq!(
            range.page_to_addr(last).as_usize(),
            range.end().as_usize() - PAGE_SIZE
        );
        assert_eq!(
            range.addr_to_page(VirtualAddress::new(range.end().as_usize() - 1)),
            Some(last)
        );
    }

    #[test]
    fn addresses_outside_are_rejected() {
        let range = VirtualRange::new(VirtualAddress::new(BASE));
        assert_eq!(range.addr_to_page(VirtualAddress::new(BASE - 1)), None);
        assert_eq!(range.addr_to_page(range.end()), None);
        assert_eq!(range.addr_to_page(VirtualAddress::new(0)), None);
    }

    #[test]
    fn interior_address_maps_to_containing_page() {
        let range = VirtualRange::new(VirtualAddress::new(BASE));
        let addr = VirtualAddress::new(BASE + 7 * PAGE_SIZE + 123);
        assert_eq!(range.addr_to_page(addr), Some(PageNumber::new(7)));
        assert_eq!(range.page_to_addr(PageNumber::new(7)), addr.align_down());
    }

    #[test]
    #[should_panic(expected = "not page aligned")]
    fn unaligned_base_panics() {
        let _ = VirtualRange::new(VirtualAddress::new(BASE + 1));
    }
}
