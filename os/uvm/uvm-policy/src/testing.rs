//! A page-table stand-in for exercising policies.

use crate::{AccessTracker, RevokeError};
use std::collections::BTreeSet;
use std::io;
use uvm_addresses::PageNumber;

pub fn p(n: u16) -> PageNumber {
    PageNumber::new(n)
}

#[derive(Debug, Default)]
pub struct FakeTracker {
    accessed: BTreeSet<PageNumber>,
    pub revoked: Vec<PageNumber>,
    pub fail_on: Option<PageNumber>,
}

impl FakeTracker {
    pub fn touch(&mut self, page: PageNumber) {
        self.accessed.insert(page);
    }
}

impl AccessTracker for FakeTracker {
    fn is_accessed(&self, page: PageNumber) -> bool {
        self.accessed.contains(&page)
    }

    fn revoke_access(&mut self, page: PageNumber) -> Result<(), RevokeError> {
        if self.fail_on == Some(page) {
            return Err(RevokeError {
                page,
                source: io::Error::other("protection change refused"),
            });
        }
        self.accessed.remove(&page);
        self.revoked.push(page);
        Ok(())
    }
}

