//! Breaking-change comparison engine.
//!
//! Compares two snapshots of a multi-package codebase and accumulates a
//! catalogue of API-breaking changes plus the maintenance actions they imply
//! (deprecate before removing, delete long-deprecated API, repair malformed
//! deprecation annotations).
//!
//! The engine is a pure in-memory traversal: single-threaded, no I/O, no
//! suspension points. One [`Comparator`] instance per run; the resulting
//! [`Comparison`] is read-only output for downstream renderers.

pub mod changes;
pub mod comparator;
pub mod driver;
pub mod relations;

pub use changes::{
    ActionEntry, ActionKind, ActionsToTake, BreakingChanges, ChangeDetail, ChangeEntry,
    ChangeKind, ComparisonSummary, EntryContext,
};
pub use comparator::Comparator;
pub use driver::{compare_snapshots, Comparison};
