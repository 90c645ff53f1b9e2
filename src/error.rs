//! Error handling for pinghosts
//!
//! Expected network failures never show up here: a host that cannot be
//! reached is reported as `down`. These types only cover the faults that
//! abort a run (a probe mechanism that cannot be started, an operator
//! interrupt) and the usual configuration and I/O problems around it.

use thiserror::Error;

/// Unexpected failure while running a single probe
#[derive(Debug, Error)]
pub enum ProbeError {
    #[error("failed to spawn `{program}`: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("ICMP socket error: {0}")]
    Socket(#[source] std::io::Error),

    #[error("probe task failed: {0}")]
    Runtime(String),
}

/// Whole-run failure of the probe pool
#[derive(Debug, Error)]
pub enum PoolError {
    #[error("interrupted")]
    Interrupted,

    #[error("worker fault while probing {host}: {source}")]
    WorkerFault {
        host: String,
        #[source]
        source: ProbeError,
    },

    #[error("probe worker panicked: {0}")]
    WorkerPanicked(String),
}

impl PoolError {
    /// True when the run was stopped by the operator rather than a fault
    pub fn is_interrupted(&self) -> bool {
        matches!(self, PoolError::Interrupted)
    }
}

/// Main error type for pinghosts
#[derive(Debug, Error)]
pub enum PingError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Output error: {0}")]
    OutputError(String),

    #[error(transparent)]
    Pool(#[from] PoolError),
}

impl From<csv::Error> for PingError {
    fn from(err: csv::Error) -> Self {
        PingError::OutputError(err.to_string())
    }
}

impl From<serde_json::Error> for PingError {
    fn from(err: serde_json::Error) -> Self {
        PingError::OutputError(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_worker_fault_message_names_host() {
        let err = PoolError::WorkerFault {
            host: "gateway.lan".to_string(),
            source: ProbeError::Runtime("boom".to_string()),
        };
        let message = err.to_string();
        assert!(message.contains("gateway.lan"));
        assert!(message.contains("boom"));
        assert!(!err.is_interrupted());
    }

    #[test]
    fn test_pool_error_converts_into_ping_error() {
        let err: PingError = PoolError::Interrupted.into();
        assert!(matches!(err, PingError::Pool(PoolError::Interrupted)));
        assert_eq!(err.to_string(), "interrupted");
    }
}
