//! Per-instance logging.
//!
//! A sketch reports recoverable faults and estimator decisions through a
//! [`SketchLogger`]. The default [`LogFacade`] forwards records to the `log`
//! crate facade, filtered by the level configured for that sketch; tests and
//! embedders can inject their own implementation instead.

use std::fmt;

use log::{Level, LevelFilter};

/// Target used for records emitted through the `log` facade.
pub const LOG_TARGET: &str = "two_level_sketch";

/// Logging collaborator injected into a sketch.
pub trait SketchLogger: Send + Sync {
    /// Return whether records at `level` would be kept.
    fn enabled(&self, level: Level) -> bool;
    /// Emit one record.
    fn log(&self, level: Level, args: fmt::Arguments<'_>);
}

/// Forwards records to the `log` facade.
#[derive(Debug, Clone, Copy)]
pub struct LogFacade {
    max_level: LevelFilter,
}

impl LogFacade {
    pub fn new(max_level: LevelFilter) -> Self {
        Self { max_level }
    }
}

impl Default for LogFacade {
    fn default() -> Self {
        Self::new(LevelFilter::Error)
    }
}

impl SketchLogger for LogFacade {
    #[inline]
    fn enabled(&self, level: Level) -> bool {
        level <= self.max_level
    }

    fn log(&self, level: Level, args: fmt::Arguments<'_>) {
        if self.enabled(level) {
            log::log!(target: LOG_TARGET, level, "{}", args);
        }
    }
}

/// Emit a record through a [`SketchLogger`] without formatting disabled levels.
macro_rules! sketch_log {
    ($logger:expr, $level:expr, $($arg:tt)+) => {{
        let logger: &dyn $crate::logger::SketchLogger = &*$logger;
        if logger.enabled($level) {
            logger.log($level, format_args!($($arg)+));
        }
    }};
}

pub(crate) use sketch_log;

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::sync::Mutex;

    /// Logger keeping every record in memory.
    #[derive(Default)]
    pub(crate) struct RecordingLogger {
        pub(crate) records: Mutex<Vec<(Level, String)>>,
    }

    impl RecordingLogger {
        pub(crate) fn count(&self, level: Level) -> usize {
            self.records
                .lock()
                .unwrap()
                .iter()
                .filter(|(l, _)| *l == level)
                .count()
        }
    }

    impl SketchLogger for RecordingLogger {
        fn enabled(&self, _level: Level) -> bool {
            true
        }

        fn log(&self, level: Level, args: fmt::Arguments<'_>) {
            self.records.lock().unwrap().push((level, args.to_string()));
        }
    }

    #[test]
    fn test_log_facade_filters_levels() {
        let facade = LogFacade::new(LevelFilter::Warn);
        assert!(facade.enabled(Level::Error));
        assert!(facade.enabled(Level::Warn));
        assert!(!facade.enabled(Level::Debug));
        assert!(!LogFacade::new(LevelFilter::Off).enabled(Level::Error));
    }

    #[test]
    fn test_sketch_log_macro() {
        let logger = std::sync::Arc::new(RecordingLogger::default());
        sketch_log!(logger, Level::Debug, "index {} of {}", 3, 8);
        assert_eq!(logger.count(Level::Debug), 1);
        assert_eq!(logger.records.lock().unwrap()[0].1, "index 3 of 8");
    }
}
