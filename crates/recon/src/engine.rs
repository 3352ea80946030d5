use crate::error::ReconError;
use crate::keys::{select_keys, KeyPair, ReconMode};
use crate::matcher::{match_tables, MatchResult};
use crate::model::{Side, Table};
use crate::normalize::normalize;
use crate::summary::Summary;

/// Outcome of the table-level stages of one run.
#[derive(Debug, Clone)]
pub struct Reconciliation {
    pub mode: ReconMode,
    pub keys: KeyPair,
    pub result: MatchResult,
    pub summary: Summary,
}

/// Normalize both tables, pick the key pair for `mode`, partition, count.
pub fn reconcile(left: Table, right: Table, mode: &ReconMode) -> Result<Reconciliation, ReconError> {
    let left = normalize(left, Side::Left)?;
    let right = normalize(right, Side::Right)?;
    let keys = select_keys(mode);

    let result = match_tables(&left, &right, &keys)?;
    let summary = Summary::from_tables(&left, &right, &result);

    log::info!(
        "{mode} reconciliation: {} left, {} right, {} matched, {} + {} unmatched",
        summary.total_left,
        summary.total_right,
        summary.matched,
        summary.unmatched_left,
        summary.unmatched_right
    );

    Ok(Reconciliation {
        mode: mode.clone(),
        keys,
        result,
        summary,
    })
}
