//! Bounded pool of concurrent probes
//!
//! One task is spawned per host, in input order, but never more than
//! `max_concurrency` at a time: the window is filled up front and each
//! completion lets the next pending host in. Every task hands its result
//! back by value through its join handle, so the [`ResultSet`] is only ever
//! touched by the dispatch loop.
//!
//! The first unexpected probe fault aborts the whole run and the results
//! gathered so far are dropped. An operator interrupt does the same without
//! waiting for probes that are still in flight to finish; they are aborted,
//! and `run` only returns once every aborted probe has been dropped.

use std::sync::Arc;
use std::time::Instant;

use log::{debug, error, info};
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;

use super::{ProbeResult, ResultSet};
use crate::config::PingConfig;
use crate::error::{PoolError, ProbeError};
use crate::network::{build_prober, HostStatus, Prober};
use crate::utils::Logger;

pub use crate::config::DEFAULT_MAX_CONCURRENCY;

type ProbeOutcome = (usize, String, Result<HostStatus, ProbeError>);

/// Runs one prober over a whole host list
pub struct ProbePool {
    prober: Arc<dyn Prober>,
    max_concurrency: usize,
    cancel: CancellationToken,
}

impl ProbePool {
    /// Create a pool running at most `max_concurrency` probes at once
    pub fn new(prober: Arc<dyn Prober>, max_concurrency: usize) -> crate::Result<Self> {
        if max_concurrency == 0 {
            return Err(crate::PingError::ConfigError(
                "max_concurrency must be greater than 0".to_string(),
            ));
        }

        Ok(Self {
            prober,
            max_concurrency,
            cancel: CancellationToken::new(),
        })
    }

    /// Create a pool with the prober and concurrency from `config`
    pub fn from_config(config: &PingConfig) -> crate::Result<Self> {
        config.validate()?;
        Self::new(build_prober(config), config.max_concurrency)
    }

    /// Use an externally owned abort signal
    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Token that aborts a running [`ProbePool::run`] when cancelled
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    pub fn max_concurrency(&self) -> usize {
        self.max_concurrency
    }

    pub fn prober_name(&self) -> &str {
        self.prober.name()
    }

    /// Probe every host and return one result per entry of `hosts`.
    ///
    /// Results come back in completion order. Duplicated hosts are probed
    /// and reported once per occurrence.
    pub async fn run(&self, hosts: Vec<String>) -> Result<ResultSet, PoolError> {
        if self.cancel.is_cancelled() {
            return Err(PoolError::Interrupted);
        }

        let start_time = Instant::now();
        let total = hosts.len();
        Logger::log_run_start(total, self.max_concurrency, self.prober.name());

        let mut results = ResultSet::with_capacity(total);
        let mut pending = hosts.into_iter().enumerate();
        let mut tasks: JoinSet<ProbeOutcome> = JoinSet::new();

        loop {
            while tasks.len() < self.max_concurrency {
                match pending.next() {
                    Some((index, host)) => self.dispatch(&mut tasks, index, host),
                    None => break,
                }
            }

            if tasks.is_empty() {
                break;
            }

            let joined = tokio::select! {
                biased;
                _ = self.cancel.cancelled() => {
                    info!("Interrupted with {} probes in flight", tasks.len());
                    shutdown(&mut tasks).await;
                    return Err(PoolError::Interrupted);
                }
                joined = tasks.join_next() => joined,
            };

            match joined {
                Some(Ok((index, host, Ok(status)))) => {
                    debug!("{} is {}", host, status);
                    results.push(ProbeResult::new(index, host, status));
                }
                Some(Ok((_, host, Err(source)))) => {
                    error!("Probe of {} failed, aborting run: {}", host, source);
                    shutdown(&mut tasks).await;
                    return Err(PoolError::WorkerFault { host, source });
                }
                Some(Err(join_error)) => {
                    error!("Probe task died, aborting run: {}", join_error);
                    shutdown(&mut tasks).await;
                    return Err(PoolError::WorkerPanicked(join_error.to_string()));
                }
                None => break,
            }
        }

        results.set_duration(start_time.elapsed());
        Logger::log_run_complete(results.duration(), results.up_count(), results.len());
        Ok(results)
    }

    fn dispatch(&self, tasks: &mut JoinSet<ProbeOutcome>, index: usize, host: String) {
        let prober = Arc::clone(&self.prober);
        tasks.spawn(async move {
            let outcome = prober.probe(&host).await;
            (index, host, outcome)
        });
    }
}

/// Abort every probe still in flight and wait until each one is dropped.
///
/// Dropping a probe future releases what it holds (a `ping` child is killed),
/// so nothing outlives the run even if the caller exits right away.
async fn shutdown(tasks: &mut JoinSet<ProbeOutcome>) {
    tasks.abort_all();
    while tasks.join_next().await.is_some() {}
}

impl std::fmt::Debug for ProbePool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProbePool")
            .field("prober", &self.prober.name())
            .field("max_concurrency", &self.max_concurrency)
            .field("cancelled", &self.cancel.is_cancelled())
            .finish()
    }
}
