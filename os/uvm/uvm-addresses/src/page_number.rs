use core::fmt;
use uvm_info::memory::NUM_PAGES;

/// Index of a page in the simulated address space.
///
/// Valid values are `0..NUM_PAGES`. With 4096 pages the number fits into a
/// `u16`, which keeps policy bookkeeping compact.
///
/// ### Examples
/// ```rust
/// # use uvm_addresses::PageNumber;
/// # use uvm_info::memory::NUM_PAGES;
/// assert_eq!(PageNumber::try_from(3usize).map(PageNumber::index), Ok(3));
/// assert!(PageNumber::try_from(NUM_PAGES).is_err());
/// ```
#[repr(transparent)]
#[derive(Copy, Clone, Default, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct PageNumber(u16);

impl PageNumber {
    /// Create a page number.
    ///
    /// # Panics
    /// Panics if `page` is not below `NUM_PAGES`.
    #[inline]
    #[must_use]
    pub const fn new(page: u16) -> Self {
        assert!((page as usize) < NUM_PAGES, "page number out of range");
        Self(page)
    }

    #[inline]
    #[must_use]
    pub const fn as_u16(self) -> u16 {
        self.0
    }

    /// The page number as an index into per-page tables.
    #[inline]
    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }

    /// Iterate over every page of the address space in ascending order.
    pub fn all() -> impl Iterator<Item = Self> {
        #[allow(clippy::cast_possible_truncation)]
        (0..NUM_PAGES).map(|i| Self(i as u16))
    }
}

impl TryFrom<usize> for PageNumber {
    type Error = usize;

    /// Converts an index, handing it back unchanged if out of range.
    #[inline]
    fn try_from(value: usize) -> Result<Self, usize> {
        if value < NUM_PAGES {
            #[allow(clippy::cast_possible_truncation)]
            Ok(Self(value as u16))
        } else {
            Err(value)
        }
    }
}

impl From<PageNumber> for usize {
    #[inline]
    fn from(value: PageNumber) -> Self {
        value.index()
    }
}

impl fmt::Debug for PageNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Page({})", self.0)
    }
}

impl fmt::Display for PageNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}
