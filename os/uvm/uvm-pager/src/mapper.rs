//! Host mappings behind the managed range.
//!
//! The whole range is reserved once as inaccessible anonymous memory. A page
//! becomes resident by replacing its slice of the reservation with a fresh
//! writable mapping, and stops being resident by putting an inaccessible
//! reservation back in its place. Nothing else in the host address space
//! can ever land inside the range.

use std::io;
use uvm_addresses::{PageNumber, VirtualAddress, VirtualRange};
use uvm_info::memory::{PAGE_SIZE, PREFERRED_BASE, VIRTUAL_MEMORY_SIZE};
use uvm_pagetable::Permission;
use uvm_swap::PageBuf;

#[derive(Debug, thiserror::Error)]
pub enum MapError {
    #[error("failed to reserve {len:#x} bytes of address space: {source}")]
    Reserve {
        len: usize,
        #[source]
        source: io::Error,
    },
    #[error("reservation at {0} is not page aligned")]
    Misaligned(VirtualAddress),
    #[error("failed to map {page}: {source}")]
    Bind {
        page: PageNumber,
        #[source]
        source: io::Error,
    },
    #[error("failed to unmap {page}: {source}")]
    Unbind {
        page: PageNumber,
        #[source]
        source: io::Error,
    },
    #[error("failed to set {perm} on {page}: {source}")]
    Protect {
        page: PageNumber,
        perm: Permission,
        #[source]
        source: io::Error,
    },
}

impl MapError {
    /// The underlying host error.
    #[must_use]
    pub fn into_io(self) -> io::Error {
        match self {
            Self::Misaligned(_) => io::Error::from_raw_os_error(libc::EINVAL),
            Self::Reserve { source, .. }
            | Self::Bind { source, .. }
            | Self::Unbind { source, .. }
            | Self::Protect { source, .. } => source,
        }
    }
}

/// Host protection bits for a page table permission.
#[inline]
#[must_use]
pub const fn prot_flags(perm: Permission) -> libc::c_int {
    match perm {
        Permission::None => libc::PROT_NONE,
        Permission::Read => libc::PROT_READ,
        Permission::ReadWrite => libc::PROT_READ | libc::PROT_WRITE,
    }
}

/// Owner of the reserved range; unmaps all of it on drop.
#[derive(Debug)]
pub struct Mapper {
    range: VirtualRange,
}

impl Mapper {
    /// Reserves `VIRTUAL_MEMORY_SIZE` bytes of inaccessible address space,
    /// preferably at `PREFERRED_BASE`.
    ///
    /// # Errors
    /// The host refused the reservation.
    pub fn reserve() -> Result<Self, MapError> {
        let base = reserve_at(
            PREFERRED_BASE as *mut libc::c_void,
            VIRTUAL_MEMORY_SIZE,
            0,
        )
        .map_err(|source| MapError::Reserve {
            len: VIRTUAL_MEMORY_SIZE,
            source,
        })?;

        let base = VirtualAddress::from_ptr(base);
        if !base.is_page_aligned() {
            return Err(MapError::Misaligned(base));
        }
        if base.as_usize() != PREFERRED_BASE {
            log::debug!("preferred base unavailable, reserved at {base}");
        }
        Ok(Self {
            range: VirtualRange::new(base),
        })
    }

    #[inline]
    #[must_use]
    pub const fn range(&self) -> VirtualRange {
        self.range
    }

    /// Replaces `page`'s reservation with zeroed, writable memory.
    ///
    /// # Errors
    /// The host refused the mapping.
    pub fn bind(&self, page: PageNumber) -> Result<(), MapError> {
        let addr = self.page_ptr(page).cast::<libc::c_void>();
        // SAFETY: the target lies inside our own reservation; MAP_FIXED
        // replaces only that page.
        let got = unsafe {
            libc::mmap(
                addr,
                PAGE_SIZE,
                libc::PROT_READ | libc::PROT_WRITE,
                libc::MAP_FIXED | libc::MAP_PRIVATE | libc::MAP_ANONYMOUS,
                -1,
                0,
            )
        };
        if got == libc::MAP_FAILED {
            return Err(MapError::Bind {
                page,
                source: io::Error::last_os_error(),
            });
        }
        debug_assert_eq!(got, addr);
        Ok(())
    }

    /// Discards `page`'s memory and restores the inaccessible reservation.
    ///
    /// # Errors
    /// The host refused the replacement mapping.
    pub fn unbind(&self, page: PageNumber) -> Result<(), MapError> {
        reserve_at(self.page_ptr(page).cast(), PAGE_SIZE, libc::MAP_FIXED)
            .map(drop)
            .map_err(|source| MapError::Unbind { page, source })
    }

    /// Applies `perm` to a bound page.
    ///
    /// # Errors
    /// The host refused the protection change.
    pub fn reprotect(&self, page: PageNumber, perm: Permission) -> Result<(), MapError> {
        // SAFETY: the page lies inside our reservation.
        let rc = unsafe { libc::mprotect(self.page_ptr(page).cast(), PAGE_SIZE, prot_flags(perm)) };
        if rc != 0 {
            return Err(MapError::Protect {
                page,
                perm,
                source: io::Error::last_os_error(),
            });
        }
        Ok(())
    }

    /// Start of `page` inside the range.
    #[inline]
    #[must_use]
    pub fn page_ptr(&self, page: PageNumber) -> *mut PageBuf {
        self.range.page_to_addr(page).as_mut_ptr()
    }
}

impl Drop for Mapper {
    fn drop(&mut self) {
        // SAFETY: the range was mapped by `reserve` and is owned by us.
        let rc = unsafe { libc::munmap(self.range.start().as_mut_ptr(), self.range.len()) };
        if rc != 0 {
            log::error!(
                "failed to release {}: {}",
                self.range.start(),
                io::Error::last_os_error()
            );
        }
    }
}

/// Maps inaccessible, unbacked anonymous memory at (or near) `addr`.
fn reserve_at(
    addr: *mut libc::c_void,
    len: usize,
    extra_flags: libc::c_int,
) -> io::Result<*mut libc::c_void> {
    // SAFETY: anonymous PROT_NONE memory; with MAP_FIXED the caller passes
    // an address inside its own reservation.
    let got = unsafe {
        libc::mmap(
            addr,
            len,
            libc::PROT_NONE,
            libc::MAP_PRIVATE | libc::MAP_ANONYMOUS | libc::MAP_NORESERVE | extra_flags,
            -1,
            0,
        )
    };
    if got == libc::MAP_FAILED || got.is_null() {
        return Err(io::Error::last_os_error());
    }
    Ok(got)
}
