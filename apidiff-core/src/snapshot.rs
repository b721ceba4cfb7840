//! Snapshot pairing: two simultaneously-valid views of the same codebase.
//!
//! The comparison always runs against one `from` snapshot and one `to`
//! snapshot. Both are held live for the whole traversal; there is no mutable
//! "current version" cursor to switch and forget to switch back.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::types::{ClassDef, FunctionDef};

/// Which codebase snapshot a query applies to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VersionTag {
    From,
    To,
}

impl VersionTag {
    pub fn as_str(&self) -> &'static str {
        match self {
            VersionTag::From => "from",
            VersionTag::To => "to",
        }
    }
}

/// One version's symbol table, keyed by fully-qualified name.
///
/// Traits ride in `classes` with `category: "trait"`; the category tag keeps
/// them apart during classification. Name collisions are not a supported
/// scenario; the map keying makes the last write win.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Snapshot {
    #[serde(default)]
    pub functions: BTreeMap<String, FunctionDef>,
    #[serde(default)]
    pub classes: BTreeMap<String, ClassDef>,
    #[serde(default)]
    pub interfaces: BTreeMap<String, ClassDef>,
}

impl Snapshot {
    pub fn is_empty(&self) -> bool {
        self.functions.is_empty() && self.classes.is_empty() && self.interfaces.is_empty()
    }
}

/// The two snapshots under comparison, addressable independently.
#[derive(Clone, Debug, Default)]
pub struct SnapshotPair {
    from: Snapshot,
    to: Snapshot,
}

impl SnapshotPair {
    pub fn new(from: Snapshot, to: Snapshot) -> Self {
        Self { from, to }
    }

    pub fn get(&self, tag: VersionTag) -> &Snapshot {
        match tag {
            VersionTag::From => &self.from,
            VersionTag::To => &self.to,
        }
    }

    pub fn from_version(&self) -> &Snapshot {
        &self.from
    }

    pub fn to_version(&self) -> &Snapshot {
        &self.to
    }
}
