use crate::PagerError;
use std::path::{Path, PathBuf};
use std::time::Duration;
use uvm_info::memory::{DEFAULT_MAX_RESIDENT, NUM_PAGES, TIMESLICE};
use uvm_policy::PolicyKind;

/// Shortest interval the interval timer can express.
pub const TIMER_RESOLUTION: Duration = Duration::from_micros(1);

/// Runtime settings for [`Pager::init`](crate::Pager::init).
///
/// ```rust
/// # use uvm_pager::PagerConfig;
/// # use uvm_policy::PolicyKind;
/// let config = PagerConfig::new(8)
///     .with_policy(PolicyKind::Fifo)
///     .without_timer();
/// assert!(config.validate().is_ok());
/// assert_eq!(config.timer_interval(), None);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PagerConfig {
    max_resident: usize,
    policy: PolicyKind,
    timer_interval: Option<Duration>,
    swap_dir: Option<PathBuf>,
    random_seed: Option<u64>,
}

impl Default for PagerConfig {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_RESIDENT)
    }
}

impl PagerConfig {
    /// CLOCK eviction, a tick every `TIMESLICE`, swap in the temp directory.
    #[must_use]
    pub const fn new(max_resident: usize) -> Self {
        Self {
            max_resident,
            policy: PolicyKind::Clock,
            timer_interval: Some(TIMESLICE),
            swap_dir: None,
            random_seed: None,
        }
    }

    #[must_use]
    pub fn with_max_resident(mut self, max_resident: usize) -> Self {
        self.max_resident = max_resident;
        self
    }

    #[must_use]
    pub fn with_policy(mut self, policy: PolicyKind) -> Self {
        self.policy = policy;
        self
    }

    /// `None` leaves ticks to [`Pager::tick`](crate::Pager::tick).
    #[must_use]
    pub fn with_timer_interval(mut self, interval: Option<Duration>) -> Self {
        self.timer_interval = interval;
        self
    }

    #[must_use]
    pub fn without_timer(self) -> Self {
        self.with_timer_interval(None)
    }

    #[must_use]
    pub fn with_swap_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.swap_dir = Some(dir.into());
        self
    }

    #[must_use]
    pub fn with_random_seed(mut self, seed: u64) -> Self {
        self.random_seed = Some(seed);
        self
    }

    #[must_use]
    pub const fn max_resident(&self) -> usize {
        self.max_resident
    }

    #[must_use]
    pub const fn policy(&self) -> PolicyKind {
        self.policy
    }

    #[must_use]
    pub const fn timer_interval(&self) -> Option<Duration> {
        self.timer_interval
    }

    #[must_use]
    pub fn swap_dir(&self) -> Option<&Path> {
        self.swap_dir.as_deref()
    }

    #[must_use]
    pub const fn random_seed(&self) -> Option<u64> {
        self.random_seed
    }

    /// # Errors
    /// A resident budget outside `1..=NUM_PAGES`, or a timer interval too
    /// short to arm the timer.
    pub fn validate(&self) -> Result<(), PagerError> {
        if self.max_resident == 0 || self.max_resident > NUM_PAGES {
            return Err(PagerError::ResidentBudget {
                requested: self.max_resident,
            });
        }
        if let Some(interval) = self.timer_interval
            && interval < TIMER_RESOLUTION
        {
            return Err(PagerError::TimerInterval { interval });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let c = PagerConfig::default();
        assert_eq!(c.max_resident(), DEFAULT_MAX_RESIDENT);
        assert_eq!(c.policy(), PolicyKind::Clock);
        assert_eq!(c.timer_interval(), Some(TIMESLICE));
        assert!(c.swap_dir().is_none());
        assert!(c.validate().is_ok());
    }

    #[test]
    fn budget_bounds() {
        assert!(matches!(
            PagerConfig::new(0).validate(),
            Err(PagerError::ResidentBudget { requested: 0 })
        ));
        assert!(PagerConfig::new(1).validate().is_ok());
        assert!(PagerConfig::new(NUM_PAGES).validate().is_ok());
        assert!(PagerConfig::new(NUM_PAGES + 1).validate().is_err());
    }

    #[test]
    fn zero_interval_is_rejected() {
        let c = PagerConfig::new(4).with_timer_interval(Some(Duration::ZERO));
        assert!(matches!(
            c.validate(),
            Err(PagerError::TimerInterval { interval }) if interval.is_zero()
        ));
    }

    #[test]
    fn sub_microsecond_interval_is_rejected() {
        let short = Duration::from_nanos(500);
        let c = PagerConfig::new(4).with_timer_interval(Some(short));
        assert!(matches!(
            c.validate(),
            Err(PagerError::TimerInterval { interval }) if interval == short
        ));

        let c = c.with_timer_interval(Some(TIMER_RESOLUTION));
        assert!(c.validate().is_ok());
    }

    #[test]
    fn builder_sets_everything() {
        let c = PagerConfig::default()
            .with_max_resident(3)
            .with_policy(PolicyKind::Random)
            .with_random_seed(9)
            .with_swap_dir("/var/tmp")
            .without_timer();
        assert_eq!(c.max_resident(), 3);
        assert_eq!(c.policy(), PolicyKind::Random);
        assert_eq!(c.random_seed(), Some(9));
        assert_eq!(c.swap_dir(), Some(Path::new("/var/tmp")));
        assert_eq!(c.timer_interval(), None);
    }
}
