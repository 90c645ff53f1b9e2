//! pinghosts - ping every host in a file, concurrently
//!
//! Reads a list of hostnames and IP addresses, probes each one with a single
//! ICMP echo through a bounded pool of concurrent workers, and reports which
//! hosts are up.

pub mod config;
pub mod error;
pub mod network;
pub mod output;
pub mod scanner;
pub mod utils;

// Re-export commonly used types
pub use config::PingConfig;
pub use error::{PingError, PoolError, ProbeError};
pub use network::{HostStatus, ProbeMethod, Prober};
pub use output::{OutputConfig, OutputFormat, OutputManager};
pub use scanner::{ProbePool, ProbeResult, ResultSet};

pub type Result<T> = std::result::Result<T, PingError>;
