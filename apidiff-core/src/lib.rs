//! apidiff core - breaking-change comparison engine.
//!
//! This crate compares two versions of a multi-package PHP codebase (a
//! "recipe" of composer modules, already parsed into symbol tables by an
//! upstream stage) and produces a structured catalogue of API-breaking
//! changes plus the maintenance actions developers must take.
//!
//! # Pipeline
//!
//! - **Symbol model** ([`types`]): classes, interfaces, traits, functions,
//!   members, parameters, and declarative relational metadata.
//! - **Snapshots** ([`snapshot`]): the `from` and `to` symbol tables, both
//!   addressable at once.
//! - **Comparison** ([`differ`]): the classifier walks same-named pairs and
//!   accumulates changes keyed module -> kind -> symbol kind -> identifier.
//! - **Export** ([`exporter`]): the catalogue serialized for downstream
//!   renderers.
//!
//! Parsing source code, cloning repositories and rendering human changelogs
//! all live outside this crate.

pub mod differ;
pub mod error;
pub mod exporter;
pub mod modules;
pub mod snapshot;
pub mod types;

pub use differ::{compare_snapshots, Comparison};
pub use error::CompareError;
pub use snapshot::{Snapshot, SnapshotPair, VersionTag};
