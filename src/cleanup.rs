use crate::{
    config::MaintenanceConfig,
    error::{CleanupError, IndexFailure, Step},
    es::{self, ClusterClient},
    name,
    retry::{retry, RetryPolicy},
};
use std::time::Duration;

/// What a maintenance pass did.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct PassOutcome {
    /// indices rolled over to a new backing index
    pub rolled_over: usize,
    /// oversized indices left alone because they are not backing indices
    pub skipped: Vec<String>,
    pub rerouted: bool,
}

/// True if an index stores strictly more than `max_size_bytes`.
pub fn is_oversized(size_in_bytes: i64, max_size_bytes: usize) -> bool {
    i128::from(size_in_bytes) > max_size_bytes as i128
}

/// One rollover pass over all the indices of a cluster.
pub struct Cleanup<'a, C: ?Sized> {
    client: &'a C,
    max_size_bytes: usize,
    retry: RetryPolicy,
}

impl<'a, C: ClusterClient + ?Sized> Cleanup<'a, C> {
    pub fn new(client: &'a C, max_size_bytes: usize) -> Self {
        Cleanup {
            client,
            max_size_bytes,
            retry: RetryPolicy::default(),
        }
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Roll over every oversized backing index, delete the old backing index
    /// once its data stream has moved on, and reroute shards if anything
    /// changed.
    ///
    /// A failing index does not stop the pass, its failure is reported once
    /// all indices have been processed.
    pub async fn run(&self) -> Result<PassOutcome, CleanupError> {
        let mut indices =
            self.client.index_stats().await.map_err(CleanupError::Inventory)?;
        indices.sort_by(|a, b| a.index.cmp(&b.index));

        let mut outcome = PassOutcome::default();
        let mut failures = Vec::new();
        for stats in indices {
            if !is_oversized(stats.size_in_bytes, self.max_size_bytes) {
                log::debug!(
                    "index {} ({} bytes) is within {} bytes",
                    stats.index,
                    stats.size_in_bytes,
                    self.max_size_bytes
                );
                continue;
            }
            let backing = match name::parse(&stats.index) {
                Some(m) => m,
                None => {
                    log::info!(
                        "Index {} does not match pattern, skipping",
                        stats.index
                    );
                    outcome.skipped.push(stats.index);
                    continue;
                }
            };
            match backing.date() {
                Some(date) => log::info!(
                    "About to rollover Index: {}, Size: {}, created: {}",
                    stats.index,
                    stats.size_in_bytes,
                    date
                ),
                None => log::info!(
                    "About to rollover Index: {}, Size: {}",
                    stats.index,
                    stats.size_in_bytes
                ),
            }

            let rolled = retry(
                &self.retry,
                &format!("rollover of {}", backing.base),
                || self.client.rollover(&backing.base),
            )
            .await;
            if let Err(error) = rolled {
                log::warn!("leaving {} in place, rollover failed", stats.index);
                failures.push(IndexFailure {
                    index: stats.index,
                    step: Step::Rollover,
                    error,
                });
                continue;
            }
            outcome.rolled_over += 1;

            let deleted = retry(
                &self.retry,
                &format!("delete of {}", stats.index),
                || self.client.delete_index(&stats.index),
            )
            .await;
            if let Err(error) = deleted {
                failures.push(IndexFailure {
                    index: stats.index,
                    step: Step::Delete,
                    error,
                });
            }
        }

        if outcome.rolled_over == 0 {
            log::info!("No indices to rollover");
        } else {
            log::info!(
                "{} indices rolled over, rerouting shards",
                outcome.rolled_over
            );
            if let Err(e) = self.client.reroute().await {
                for failure in &failures {
                    log::error!("{}", failure);
                }
                return Err(CleanupError::Reroute(e));
            }
            outcome.rerouted = true;
        }

        if !failures.is_empty() {
            return Err(CleanupError::IndexFailures(failures));
        }
        Ok(outcome)
    }
}

/// Run a pass that is abandoned once `deadline` has elapsed.
pub async fn run_with_deadline<C: ClusterClient + ?Sized>(
    client: &C, max_size_bytes: usize, retry: RetryPolicy, deadline: Duration,
) -> Result<PassOutcome, CleanupError> {
    let cleanup = Cleanup::new(client, max_size_bytes).with_retry(retry);
    match tokio::time::timeout(deadline, cleanup.run()).await {
        Ok(result) => result,
        Err(_) => Err(CleanupError::Timeout(deadline)),
    }
}

/// Connect to the cluster described by `config` and run a single pass.
pub async fn run(config: &MaintenanceConfig) -> anyhow::Result<PassOutcome> {
    let client = es::create_client(config)?;
    let outcome = run_with_deadline(
        &client,
        config.max_size_bytes,
        RetryPolicy::default(),
        config.timeout,
    )
    .await?;
    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use super::*;

    const ONE_GB: usize = 1_073_741_824;

    #[test]
    fn oversized_is_strictly_greater() {
        assert!(!is_oversized(1_073_741_824, ONE_GB));
        assert!(is_oversized(1_073_741_825, ONE_GB));
        assert!(!is_oversized(0, ONE_GB));
        assert!(!is_oversized(-1, 0));
        assert!(is_oversized(1, 0));
    }

    #[test]
    fn threshold_wider_than_i64_is_never_exceeded() {
        assert!(!is_oversized(i64::MAX, usize::MAX));
    }
}
