//! Scanner module: the probe pool and the results it produces

pub mod pool;

use crate::network::HostStatus;
use serde::Serialize;
use std::time::Duration;

pub use pool::ProbePool;

/// Outcome of probing one host
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProbeResult {
    #[serde(skip)]
    index: usize,
    host: String,
    status: HostStatus,
}

impl ProbeResult {
    pub(crate) fn new(index: usize, host: String, status: HostStatus) -> Self {
        Self { index, host, status }
    }

    /// Position of the host in the input list
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn status(&self) -> HostStatus {
        self.status
    }
}

/// Every host of one pool run paired with its status.
///
/// Results are kept in completion order until [`ResultSet::sort_by_input_order`]
/// is called. Only the pool adds entries, so a set handed out by
/// [`ProbePool::run`] is complete and no longer changes.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ResultSet {
    results: Vec<ProbeResult>,

    #[serde(skip)]
    duration: Duration,
}

impl ResultSet {
    pub(crate) fn with_capacity(capacity: usize) -> Self {
        Self {
            results: Vec::with_capacity(capacity),
            duration: Duration::from_secs(0),
        }
    }

    pub(crate) fn push(&mut self, result: ProbeResult) {
        self.results.push(result);
    }

    pub(crate) fn set_duration(&mut self, duration: Duration) {
        self.duration = duration;
    }

    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ProbeResult> {
        self.results.iter()
    }

    pub fn up_count(&self) -> usize {
        self.results.iter().filter(|r| r.status.is_up()).count()
    }

    pub fn down_count(&self) -> usize {
        self.len() - self.up_count()
    }

    /// Status of the first result for `host`
    pub fn status_of(&self, host: &str) -> Option<HostStatus> {
        self.results
            .iter()
            .find(|r| r.host == host)
            .map(|r| r.status)
    }

    /// Wall-clock time of the run that produced this set
    pub fn duration(&self) -> Duration {
        self.duration
    }

    /// Restore the order of the input list
    pub fn sort_by_input_order(&mut self) {
        self.results.sort_by_key(|r| r.index);
    }

    /// Take the results out, in their current order
    pub fn into_results(self) -> Vec<ProbeResult> {
        self.results
    }
}

impl<'a> IntoIterator for &'a ResultSet {
    type Item = &'a ProbeResult;
    type IntoIter = std::slice::Iter<'a, ProbeResult>;

    fn into_iter(self) -> Self::IntoIter {
        self.results.iter()
    }
}
