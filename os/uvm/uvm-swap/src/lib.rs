//! # Swap Store
//!
//! The backing file for every virtual page. Slot `n` occupies the bytes
//! `[n * PAGE_SIZE, (n + 1) * PAGE_SIZE)`, so the file is laid out exactly like
//! the virtual range it backs:
//!
//! ```text
//!  offset 0        4096       8192               NUM_PAGES * 4096
//!         ┌──────────┬──────────┬──── ··· ────┬──────────┐
//!         │ page 0   │ page 1   │             │ page N-1 │
//!         └──────────┴──────────┴──── ··· ────┴──────────┘
//! ```
//!
//! The file is created anonymous (already unlinked, see
//! [`tempfile::tempfile_in`]) and extended to its full size up front. Slots
//! that were never written read back as zeros, which gives freshly touched
//! pages their zero-fill semantics.
//!
//! Transfers use positioned I/O (`pread`/`pwrite`), which keeps the store free
//! of a shared cursor and callable from the fault handler without allocating.

use std::fs::File;
use std::io;
use std::os::unix::fs::FileExt;
use std::path::Path;
use uvm_addresses::PageNumber;
use uvm_info::memory::{PAGE_SIZE, SWAP_FILE_SIZE};

/// One page worth of bytes, as moved between memory and a slot.
pub type PageBuf = [u8; PAGE_SIZE];

#[derive(Debug, thiserror::Error)]
pub enum SwapError {
    #[error("failed to create the swap file: {0}")]
    Create(#[source] io::Error),
    #[error("failed to extend the swap file to {size} bytes: {source}")]
    Extend {
        size: u64,
        #[source]
        source: io::Error,
    },
    #[error("failed to read swap slot of {page}: {source}")]
    Read {
        page: PageNumber,
        #[source]
        source: io::Error,
    },
    #[error("failed to write swap slot of {page}: {source}")]
    Write {
        page: PageNumber,
        #[source]
        source: io::Error,
    },
}

/// File-backed storage with one slot per virtual page.
#[derive(Debug)]
pub struct SwapStore {
    file: File,
}

impl SwapStore {
    /// Creates an unlinked swap file in `dir` (or the system temp directory)
    /// and extends it so that every slot exists and reads as zeros.
    ///
    /// # Errors
    /// Any failure to create or size the file.
    pub fn create(dir: Option<&Path>) -> Result<Self, SwapError> {
        let file = match dir {
            Some(dir) => tempfile::tempfile_in(dir),
            None => tempfile::tempfile(),
        }
        .map_err(SwapError::Create)?;

        file.set_len(SWAP_FILE_SIZE)
            .map_err(|source| SwapError::Extend {
                size: SWAP_FILE_SIZE,
                source,
            })?;

        log::debug!("swap store ready: {SWAP_FILE_SIZE} bytes");
        Ok(Self { file })
    }

    /// Byte offset of the slot backing `page`.
    #[inline]
    #[must_use]
    pub fn slot_offset(page: PageNumber) -> u64 {
        u64::from(page.as_u16()) * PAGE_SIZE as u64
    }

    /// Fills `dst` with the contents of `page`'s slot.
    ///
    /// # Errors
    /// Fails on an I/O error or a short read.
    pub fn read_page(&self, page: PageNumber, dst: &mut PageBuf) -> Result<(), SwapError> {
        self.file
            .read_exact_at(dst, Self::slot_offset(page))
            .map_err(|source| SwapError::Read { page, source })
    }

    /// Stores `src` into `page`'s slot.
    ///
    /// # Errors
    /// Fails on an I/O error or a short write.
    pub fn write_page(&self, page: PageNumber, src: &PageBuf) -> Result<(), SwapError> {
        self.file
            .write_all_at(src, Self::slot_offset(page))
            .map_err(|source| SwapError::Write { page, source })
    }

    /// Current size of the backing file.
    ///
    /// # Errors
    /// Fails if the file metadata cannot be read.
    pub fn len(&self) -> io::Result<u64> {
        Ok(self.file.metadata()?.len())
    }
}
