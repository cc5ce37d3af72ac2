use crate::{ClockPolicy, EvictionPolicy, FifoPolicy, PolicyError, RandomPolicy};
use core::fmt;
use core::str::FromStr;

/// The selectable eviction policies.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PolicyKind {
    Fifo,
    #[default]
    Clock,
    Random,
}

impl PolicyKind {
    pub const ALL: [Self; 3] = [Self::Fifo, Self::Clock, Self::Random];

    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Fifo => "fifo",
            Self::Clock => "clock",
            Self::Random => "random",
        }
    }

    /// Builds the policy with storage for `max_resident` pages.
    ///
    /// `seed` only affects [`PolicyKind::Random`]; without one the generator
    /// is seeded from the OS.
    ///
    /// # Errors
    /// [`PolicyError::ZeroCapacity`] when `max_resident` is zero.
    pub fn build(
        self,
        max_resident: usize,
        seed: Option<u64>,
    ) -> Result<Box<dyn EvictionPolicy>, PolicyError> {
        if max_resident == 0 {
            return Err(PolicyError::ZeroCapacity);
        }
        log::debug!("building {self} policy for {max_resident} resident pages");
        Ok(match self {
            Self::Fifo => Box::new(FifoPolicy::with_capacity(max_resident)),
            Self::Clock => Box::new(ClockPolicy::with_capacity(max_resident)),
            Self::Random => Box::new(RandomPolicy::with_capacity(max_resident, seed)),
        })
    }
}

impl fmt::Display for PolicyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for PolicyKind {
    type Err = PolicyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|k| k.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| PolicyError::UnknownPolicy(s.to_owned()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_round_trip() {
        for kind in PolicyKind::ALL {
            assert_eq!(kind.to_string().parse::<PolicyKind>().unwrap(), kind);
        }
        assert_eq!("CLOCK".parse::<PolicyKind>().unwrap(), PolicyKind::Clock);
    }

    #[test]
    fn unknown_name_is_rejected() {
        let err = "lru".parse::<PolicyKind>().unwrap_err();
        assert!(matches!(err, PolicyError::UnknownPolicy(ref s) if s == "lru"));
    }

    #[test]
    fn build_rejects_zero_capacity() {
        assert!(matches!(
            PolicyKind::Fifo.build(0, None),
            Err(PolicyError::ZeroCapacity)
        ));
    }

    #[test]
    fn build_reports_its_kind() {
        for kind in PolicyKind::ALL {
            let policy = kind.build(4, Some(1)).unwrap();
            assert_eq!(policy.kind(), kind);
            assert!(policy.is_empty());
        }
    }
}
