use log::{LevelFilter, Log, Metadata, Record, SetLoggerError};
use std::sync::OnceLock;

/// Environment variable consulted by [`StderrLogger::from_env`].
pub const LOG_LEVEL_ENV: &str = "UVM_LOG";

pub struct StderrLogger {
    max_level: LevelFilter,
}

impl StderrLogger {
    #[must_use]
    pub const fn new(max_level: LevelFilter) -> Self {
        Self { max_level }
    }

    /// Uses the level named by `UVM_LOG` (`off`, `error`, ... `trace`),
    /// falling back to `default` when unset or unparsable.
    #[must_use]
    pub fn from_env(default: LevelFilter) -> Self {
        let level = std::env::var(LOG_LEVEL_ENV)
            .ok()
            .and_then(|v| v.trim().parse().ok())
            .unwrap_or(default);
        Self::new(level)
    }

    #[must_use]
    pub const fn max_level(&self) -> LevelFilter {
        self.max_level
    }

    /// Call this once during early init.
    ///
    /// # Errors
    /// Fails if any logger has already been installed in this process.
    pub fn init(self) -> Result<(), SetLoggerError> {
        static LOGGER: OnceLock<StderrLogger> = OnceLock::new();

        let level = self.max_level;
        let logger = LOGGER.get_or_init(|| self);
        log::set_logger(logger)?;
        log::set_max_level(level);
        Ok(())
    }
}

impl Log for StderrLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.max_level
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }

        // "[LEVEL] target: message\n", one write(2) for short lines
        crate::uvm_trace!(
            "[{}] {}: {}\n",
            record.level(),
            record.target(),
            record.args()
        );
    }

    fn flush(&self) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use log::Level;

    #[test]
    fn threshold_filters_by_level() {
        let logger = StderrLogger::new(LevelFilter::Info);
        let meta = |level| Metadata::builder().level(level).target("uvm").build();
        assert!(logger.enabled(&meta(Level::Error)));
        assert!(logger.enabled(&meta(Level::Info)));
        assert!(!logger.enabled(&meta(Level::Debug)));
        assert!(!logger.enabled(&meta(Level::Trace)));
    }

    #[test]
    fn off_disables_everything() {
        let logger = StderrLogger::new(LevelFilter::Off);
        let meta = Metadata::builder().level(Level::Error).build();
        assert!(!logger.enabled(&meta));
    }
}
