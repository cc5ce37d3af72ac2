use crate::{EvictionPolicy, PolicyKind};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use uvm_addresses::PageNumber;

/// Evicts a uniformly chosen resident page.
#[derive(Debug)]
pub struct RandomPolicy {
    pages: Vec<PageNumber>,
    rng: StdRng,
}

impl RandomPolicy {
    /// A fixed `seed` makes the victim sequence reproducible.
    #[must_use]
    pub fn with_capacity(max_resident: usize, seed: Option<u64>) -> Self {
        let rng = seed.map_or_else(StdRng::from_entropy, StdRng::seed_from_u64);
        Self {
            pages: Vec::with_capacity(max_resident),
            rng,
        }
    }
}

impl EvictionPolicy for RandomPolicy {
    fn kind(&self) -> PolicyKind {
        PolicyKind::Random
    }

    fn page_mapped(&mut self, page: PageNumber) {
        debug_assert!(!self.pages.contains(&page), "{page} mapped twice");
        self.pages.push(page);
    }

    fn choose_and_evict_victim(&mut self) -> Option<PageNumber> {
        if self.pages.is_empty() {
            return None;
        }
        let i = self.rng.gen_range(0..self.pages.len());
        Some(self.pages.swap_remove(i))
    }

    fn len(&self) -> usize {
        self.pages.len()
    }

    fn tracked_pages(&self) -> Vec<PageNumber> {
        self.pages.clone()
    }
}
