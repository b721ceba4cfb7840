//! Comparison driver: pairs same-named symbols across the two snapshots.
//!
//! Iteration covers the `from` side only: symbols that exist solely in `to`
//! are new API and cannot be broken. Each pair is delegated to the classifier;
//! a fatal error aborts the run with no partial result.

use serde::Serialize;
use tracing::debug;

use crate::differ::changes::{ActionsToTake, BreakingChanges, ComparisonSummary};
use crate::differ::comparator::Comparator;
use crate::error::CompareError;
use crate::snapshot::SnapshotPair;

/// The immutable outcome of one comparison run.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Comparison {
    pub breaking_changes: BreakingChanges,
    pub actions_to_take: ActionsToTake,
    pub summary: ComparisonSummary,
}

/// Run the full comparison over a snapshot pair.
pub fn compare_snapshots(pair: &SnapshotPair) -> Result<Comparison, CompareError> {
    let from = pair.from_version();
    let to = pair.to_version();
    debug!(
        functions = from.functions.len(),
        classes = from.classes.len(),
        interfaces = from.interfaces.len(),
        "comparing snapshots"
    );

    let mut comparator = Comparator::new();
    for (name, func) in &from.functions {
        comparator.compare_function(name, func, to.functions.get(name))?;
    }
    for (name, class) in &from.classes {
        comparator.compare_class(name, class, to.classes.get(name))?;
    }
    for (name, iface) in &from.interfaces {
        comparator.compare_class(name, iface, to.interfaces.get(name))?;
    }

    let (breaking_changes, actions_to_take) = comparator.into_stores();
    let summary = ComparisonSummary::from_stores(&breaking_changes, &actions_to_take);
    debug!(summary = %summary.text(), "comparison finished");
    Ok(Comparison {
        breaking_changes,
        actions_to_take,
        summary,
    })
}
