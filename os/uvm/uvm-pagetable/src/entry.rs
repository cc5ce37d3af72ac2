use crate::Permission;
use bitfield_struct::bitfield;

/// A single page table entry in its raw bitfield form.
///
/// ### Bit layout
///
/// | Bits | Name         | Meaning |
/// |------|--------------|---------|
/// | 0    | `resident`   | Page is backed by real memory |
/// | 1    | `accessed`   | Touched since the bit was last cleared |
/// | 2    | `dirty`      | Written since it was loaded |
/// | 3    | reserved     | |
/// | 4-5  | `permission` | [`Permission`] currently granted |
/// | 6-7  | reserved     | |
///
/// ### Example
/// ```rust
/// # use uvm_pagetable::{PageTableEntry, Permission};
/// let e = PageTableEntry::new()
///     .with_resident(true)
///     .with_permission(Permission::Read);
/// assert!(e.resident());
/// assert!(!e.dirty());
/// assert_eq!(e.permission(), Permission::Read);
/// ```
#[bitfield(u8)]
#[derive(Eq, PartialEq)]
pub struct PageTableEntry {
    /// Page is currently mapped and backed by memory.
    pub resident: bool,

    /// Set on any read or write observed through a fault since the bit was
    /// last cleared. Used by recency-approximating policies.
    pub accessed: bool,

    /// Set once write access has been granted. A dirty page must be flushed
    /// to its swap slot before it is unmapped.
    pub dirty: bool,

    #[bits(1)]
    __reserved_3: u8,

    /// Protection currently applied to the mapping.
    #[bits(2)]
    pub permission: Permission,

    #[bits(2)]
    __reserved_6: u8,
}

impl PageTableEntry {
    /// The all-unset entry of a page that is not resident.
    #[inline]
    #[must_use]
    pub const fn empty() -> Self {
        Self::new()
    }

    /// Whether this entry satisfies the residency invariant: a non-resident
    /// entry carries no permission, accessed or dirty state.
    #[inline]
    #[must_use]
    pub const fn is_consistent(&self) -> bool {
        self.resident()
            || (!self.accessed()
                && !self.dirty()
                && matches!(self.permission(), Permission::None))
    }
}
