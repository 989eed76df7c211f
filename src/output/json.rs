use serde::Serialize;

use crate::types::{MutationOp, MutationResult, Snapshot};

#[derive(Serialize)]
struct MutationReport<'a> {
    op: MutationOp,
    repo: &'a str,
    #[serde(flatten)]
    result: &'a MutationResult,
}

/// # Errors
/// Returns an error if serialization fails.
pub fn snapshot_to_json(snapshot: &Snapshot) -> serde_json::Result<String> {
    serde_json::to_string_pretty(snapshot)
}

/// The result object with the operation and repository name alongside the
/// `outcome` tag.
///
/// # Errors
/// Returns an error if serialization fails.
pub fn mutation_to_json(op: MutationOp, repo: &str, result: &MutationResult) -> serde_json::Result<String> {
    serde_json::to_string_pretty(&MutationReport { op, repo, result })
}
