use std::fmt;
use std::time::Duration;

/// Remote mutation that failed for one index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Rollover,
    Delete,
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Step::Rollover => f.write_str("rollover"),
            Step::Delete => f.write_str("delete"),
        }
    }
}

/// An index whose rollover or delete still failed after retrying.
#[derive(Debug)]
pub struct IndexFailure {
    pub index: String,
    pub step: Step,
    pub error: anyhow::Error,
}

impl fmt::Display for IndexFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} of {}: {:#}", self.step, self.index, self.error)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum CleanupError {
    #[error("while getting indices: {0:#}")]
    Inventory(anyhow::Error),
    #[error("while attempting rerouting of unassigned shards: {0:#}")]
    Reroute(anyhow::Error),
    #[error("{} index operation(s) failed: {}", .0.len(), join(.0))]
    IndexFailures(Vec<IndexFailure>),
    #[error("maintenance pass did not finish within {0:?}")]
    Timeout(Duration),
}

fn join(failures: &[IndexFailure]) -> String {
    failures
        .iter()
        .map(|f| f.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}
