//! Probe through the platform `ping` binary

use std::process::Stdio;

use async_trait::async_trait;
use log::debug;
use tokio::process::Command;

use super::{HostStatus, Prober, ECHO_WAIT};
use crate::error::ProbeError;

/// Runs one `ping` per host and trusts its exit status
#[derive(Debug, Clone)]
pub struct SystemPinger {
    program: String,
}

impl Default for SystemPinger {
    fn default() -> Self {
        Self::new("ping")
    }
}

impl SystemPinger {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }

    /// Arguments for a single echo with the fixed wait
    pub fn echo_args(host: &str) -> Vec<String> {
        let mut args = count_and_wait_args().to_vec();
        args.push(host.to_string());
        args
    }
}

#[cfg(target_os = "windows")]
fn count_and_wait_args() -> [String; 4] {
    [
        "-n".to_string(),
        "1".to_string(),
        "-w".to_string(),
        ECHO_WAIT.as_millis().to_string(),
    ]
}

#[cfg(any(
    target_os = "macos",
    target_os = "ios",
    target_os = "freebsd",
    target_os = "openbsd",
    target_os = "netbsd",
    target_os = "dragonfly"
))]
fn count_and_wait_args() -> [String; 4] {
    [
        "-c".to_string(),
        "1".to_string(),
        "-t".to_string(),
        ECHO_WAIT.as_secs().max(1).to_string(),
    ]
}

// iputils / busybox
#[cfg(not(any(
    target_os = "windows",
    target_os = "macos",
    target_os = "ios",
    target_os = "freebsd",
    target_os = "openbsd",
    target_os = "netbsd",
    target_os = "dragonfly"
)))]
fn count_and_wait_args() -> [String; 4] {
    [
        "-c".to_string(),
        "1".to_string(),
        "-W".to_string(),
        ECHO_WAIT.as_secs().max(1).to_string(),
    ]
}

#[async_trait]
impl Prober for SystemPinger {
    async fn probe(&self, host: &str) -> Result<HostStatus, ProbeError> {
        // A leading dash would be read by ping as an option.
        if host.starts_with('-') {
            debug!("{}: not a valid address, reporting down", host);
            return Ok(HostStatus::Down);
        }

        let status = Command::new(&self.program)
            .args(Self::echo_args(host))
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .status()
            .await
            .map_err(|source| ProbeError::Spawn {
                program: self.program.clone(),
                source,
            })?;

        debug!("{}: {} exited with {}", host, self.program, status);

        if status.success() {
            Ok(HostStatus::Up)
        } else {
            Ok(HostStatus::Down)
        }
    }

    fn name(&self) -> &str {
        "system"
    }
}
