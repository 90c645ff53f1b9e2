//! Probe mechanisms: how a single host is classified as up or down

pub mod icmp;
pub mod system;

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::config::PingConfig;
use crate::error::ProbeError;

pub use icmp::IcmpPinger;
pub use system::SystemPinger;

/// How long a probe waits for its single echo reply.
///
/// Fixed for every mechanism; not exposed as configuration.
pub const ECHO_WAIT: Duration = Duration::from_secs(2);

/// Reachability of a host
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HostStatus {
    Up,
    Down,
}

impl HostStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            HostStatus::Up => "up",
            HostStatus::Down => "down",
        }
    }

    pub fn is_up(&self) -> bool {
        matches!(self, HostStatus::Up)
    }
}

impl fmt::Display for HostStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Available probe mechanisms
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProbeMethod {
    /// Run the system `ping` binary
    System,
    /// Send the echo request ourselves over a raw ICMP socket
    Icmp,
}

impl ProbeMethod {
    pub fn name(&self) -> &'static str {
        match self {
            ProbeMethod::System => "system",
            ProbeMethod::Icmp => "icmp",
        }
    }

    /// Check if the method needs raw socket privileges
    pub fn requires_raw_socket(&self) -> bool {
        matches!(self, ProbeMethod::Icmp)
    }
}

impl std::str::FromStr for ProbeMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "system" | "ping" => Ok(ProbeMethod::System),
            "icmp" | "raw" => Ok(ProbeMethod::Icmp),
            _ => Err(format!("Unknown probe method: {}", s)),
        }
    }
}

impl fmt::Display for ProbeMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A single-host reachability check.
///
/// Implementations send exactly one echo request and wait at most
/// [`ECHO_WAIT`] for the answer. Every expected network failure (timeout,
/// unreachable, unresolved name, permission denied, malformed address) must
/// come back as `Ok(HostStatus::Down)`. `Err` is reserved for faults in the
/// probe mechanism itself, and aborts the whole pool run.
#[async_trait]
pub trait Prober: Send + Sync {
    async fn probe(&self, host: &str) -> Result<HostStatus, ProbeError>;

    fn name(&self) -> &str;
}

/// Build the prober selected by the configuration
pub fn build_prober(config: &PingConfig) -> Arc<dyn Prober> {
    match config.method {
        ProbeMethod::System => Arc::new(SystemPinger::new(config.ping_command.clone())),
        ProbeMethod::Icmp => Arc::new(IcmpPinger::new()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_display_matches_report_words() {
        assert_eq!(HostStatus::Up.to_string(), "up");
        assert_eq!(HostStatus::Down.to_string(), "down");
        assert!(HostStatus::Up.is_up());
        assert!(!HostStatus::Down.is_up());
    }

    #[test]
    fn test_probe_method_from_str() {
        assert_eq!("system".parse::<ProbeMethod>().unwrap(), ProbeMethod::System);
        assert_eq!("ICMP".parse::<ProbeMethod>().unwrap(), ProbeMethod::Icmp);
        assert!("arp".parse::<ProbeMethod>().is_err());
    }

    #[test]
    fn test_only_icmp_needs_raw_socket() {
        assert!(ProbeMethod::Icmp.requires_raw_socket());
        assert!(!ProbeMethod::System.requires_raw_socket());
    }

    #[tokio::test]
    async fn test_build_prober_uses_configured_command() {
        let config = PingConfig::default().with_ping_command("/nonexistent/pinghosts-ping");
        let err = build_prober(&config).probe("127.0.0.1").await.unwrap_err();
        match err {
            ProbeError::Spawn { program, .. } => assert_eq!(program, "/nonexistent/pinghosts-ping"),
            other => panic!("expected spawn error, got {:?}", other),
        }
    }

    #[test]
    fn test_build_prober_follows_config() {
        let config = PingConfig::default().with_method(ProbeMethod::Icmp);
        assert_eq!(build_prober(&config).name(), "icmp");

        let config = PingConfig::default();
        assert_eq!(build_prober(&config).name(), "system");
    }

    #[test]
    fn test_status_serializes_lowercase() {
        let json = serde_json::to_string(&HostStatus::Down).unwrap();
        assert_eq!(json, "\"down\"");
    }
}
