//! Fault classification.
//!
//! The host reports a protection fault with a code that says whether the
//! address had no mapping at all or was mapped without the needed rights.
//! Because the whole range stays reserved, a non-resident page is reported
//! as "access denied" just like a downgraded one, so the page table's
//! `RESIDENT` bit is what tells the two situations apart. The host code only
//! serves as a cross-check.

use crate::PagerError;
use uvm_addresses::PageNumber;
use uvm_pagetable::{PageTableEntry, Permission};

/// `si_code` for an address without any mapping.
pub const SEGV_MAPERR: libc::c_int = 1;

/// `si_code` for a mapped address lacking the required permission.
pub const SEGV_ACCERR: libc::c_int = 2;

/// What the host said about a fault.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FaultCode {
    /// No mapping at the address.
    NotMapped,
    /// Mapping exists, access was not permitted.
    AccessDenied,
    /// Anything else the host may report.
    Other(libc::c_int),
}

impl FaultCode {
    #[must_use]
    pub const fn from_si_code(code: libc::c_int) -> Self {
        match code {
            SEGV_MAPERR => Self::NotMapped,
            SEGV_ACCERR => Self::AccessDenied,
            other => Self::Other(other),
        }
    }
}

/// What the pager does about a fault on a managed page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FaultKind {
    /// Page is not resident: load it with `READ`.
    PageIn,
    /// Resident with `NONE`: grant `READ`.
    GrantRead,
    /// Resident with `READ`: grant `READ_WRITE` and mark dirty.
    GrantWrite,
}

impl FaultKind {
    /// Decides how to resolve a fault on `page` whose entry is `entry`.
    ///
    /// # Errors
    /// [`PagerError::Invariant`] if the fault cannot legitimately happen:
    /// a resident page reported as unmapped, or any fault on a page that
    /// already allows reading and writing.
    pub fn classify(
        page: PageNumber,
        entry: PageTableEntry,
        code: FaultCode,
    ) -> Result<Self, PagerError> {
        if !entry.resident() {
            return Ok(Self::PageIn);
        }
        if matches!(code, FaultCode::NotMapped) {
            return Err(PagerError::invariant(page, "resident page reported as unmapped"));
        }
        match entry.permission() {
            Permission::None => Ok(Self::GrantRead),
            Permission::Read => Ok(Self::GrantWrite),
            Permission::ReadWrite => Err(PagerError::invariant(
                page,
                "fault on a page that is already read-write",
            )),
        }
    }

    #[must_use]
    pub const fn explain(self) -> &'static str {
        match self {
            Self::PageIn => "non-resident page, loading from swap",
            Self::GrantRead => "access to a page with its rights revoked",
            Self::GrantWrite => "write to a read-only page",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: PageNumber = PageNumber::new(1);

    fn resident(perm: Permission) -> PageTableEntry {
        PageTableEntry::new()
            .with_resident(true)
            .with_permission(perm)
    }

    #[test]
    fn host_codes() {
        assert_eq!(FaultCode::from_si_code(1), FaultCode::NotMapped);
        assert_eq!(FaultCode::from_si_code(2), FaultCode::AccessDenied);
        assert_eq!(FaultCode::from_si_code(128), FaultCode::Other(128));
    }

    #[test]
    fn non_resident_pages_are_paged_in_whatever_the_code() {
        for code in [FaultCode::NotMapped, FaultCode::AccessDenied] {
            let kind = FaultKind::classify(PAGE, PageTableEntry::empty(), code).unwrap();
            assert_eq!(kind, FaultKind::PageIn);
        }
    }

    #[test]
    fn permission_upgrades() {
        let code = FaultCode::AccessDenied;
        assert_eq!(
            FaultKind::classify(PAGE, resident(Permission::None), code).unwrap(),
            FaultKind::GrantRead
        );
        assert_eq!(
            FaultKind::classify(PAGE, resident(Permission::Read), code).unwrap(),
            FaultKind::GrantWrite
        );
    }

    #[test]
    fn impossible_faults_are_invariant_violations() {
        let rw = FaultKind::classify(PAGE, resident(Permission::ReadWrite), FaultCode::AccessDenied);
        assert!(matches!(rw, Err(PagerError::Invariant { page: PAGE, .. })));

        let unmapped = FaultKind::classify(PAGE, resident(Permission::Read), FaultCode::NotMapped);
        assert!(matches!(unmapped, Err(PagerError::Invariant { .. })));
    }
}
