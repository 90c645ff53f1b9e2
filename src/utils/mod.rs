//! Utility modules for pinghosts

pub mod file_input;

use std::time::Duration;

/// Logging utilities
pub struct Logger;

impl Logger {
    /// Initialize logger with specified level
    pub fn init(level: log::LevelFilter) {
        env_logger::Builder::from_default_env()
            .filter_level(level)
            .format_timestamp_secs()
            .init();
    }

    /// Level for the number of `-v` flags given
    pub fn level_for_verbosity(verbosity: u8) -> log::LevelFilter {
        match verbosity {
            0 => log::LevelFilter::Warn,
            1 => log::LevelFilter::Info,
            2 => log::LevelFilter::Debug,
            _ => log::LevelFilter::Trace,
        }
    }

    /// Log run start
    pub fn log_run_start(hosts: usize, max_concurrency: usize, method: &str) {
        log::info!(
            "Probing {} hosts, {} at a time, using {} ping",
            hosts,
            max_concurrency,
            method
        );
    }

    /// Log run completion
    pub fn log_run_complete(duration: Duration, up: usize, total: usize) {
        log::info!(
            "Run completed in {:.2}s - {}/{} hosts up",
            duration.as_secs_f64(),
            up,
            total
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_for_verbosity() {
        assert_eq!(Logger::level_for_verbosity(0), log::LevelFilter::Warn);
        assert_eq!(Logger::level_for_verbosity(1), log::LevelFilter::Info);
        assert_eq!(Logger::level_for_verbosity(2), log::LevelFilter::Debug);
        assert_eq!(Logger::level_for_verbosity(9), log::LevelFilter::Trace);
    }
}
