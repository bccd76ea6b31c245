//! Per-branch fan-out with best-effort merging.
//!
//! Every branch gets its own task in a [`JoinSet`]. Tasks report through an
//! unbounded mpsc channel and the coordinator joins all of them before it
//! reads the results, so no task outlives [`fan_out`]. A failing branch never
//! hides records produced by a healthy one.

use crate::artifact::ArtifactRecord;
use crate::error::{Result, TagWatchError};
use std::future::Future;
use tokio::sync::mpsc;
use tokio::task::JoinSet;
use tracing::warn;


/// Outcome reported by one branch task.
#[derive(Debug)]
struct BranchOutcome {
    branch: String,
    result: Result<Vec<ArtifactRecord>>,
}

/// Runs `fetch_branch` once per branch, concurrently, and merges the results.
///
/// Records are concatenated in completion order. Only the most recently
/// observed failure is kept, and it is returned only when no branch produced
/// any record.
pub async fn fan_out<I, S, F, Fut>(branches: I, fetch_branch: F) -> Result<Vec<ArtifactRecord>>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
    F: Fn(String) -> Fut,
    Fut: Future<Output = Result<Vec<ArtifactRecord>>> + Send + 'static,
{
    let (tx, mut rx) = mpsc::unbounded_channel::<BranchOutcome>();
    let mut tasks = JoinSet::new();

    for branch in branches {
        let branch: String = branch.into();
        let fetch = fetch_branch(branch.clone());
        let tx = tx.clone();
        tasks.spawn(async move {
            let result = fetch.await;
            // The receiver lives until every task has been joined
            let _ = tx.send(BranchOutcome { branch, result });
        });
    }
    drop(tx);

    let mut last_error = None;
    while let Some(joined) = tasks.join_next().await {
        if let Err(e) = joined {
            warn!(error = %e, "branch task did not complete");
            last_error = Some(TagWatchError::transport(
                format!("Branch task did not complete: {}", e),
                None,
            ));
        }
    }

    let mut records = Vec::new();
    while let Some(outcome) = rx.recv().await {
        match outcome.result {
            Ok(branch_records) => records.extend(branch_records),
            Err(e) => {
                warn!(branch = %outcome.branch, error = %e, "branch fetch failed");
                last_error = Some(e);
            }
        }
    }

    match last_error {
        Some(e) if records.is_empty() => Err(e),
        _ => Ok(records),
    }
}
