//! Change and action catalogues for the breaking-change comparison.
//!
//! Every detected difference is one [`ChangeEntry`] whose payload is a closed
//! [`ChangeDetail`] variant: one variant per change kind, so each kind's
//! record shape is checked at compile time instead of being free-form map
//! mutation. The accumulators nest module -> kind -> symbol kind -> symbol
//! identifier, which is exactly the shape the downstream renderer consumes.

use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

use crate::types::{ApiKind, Visibility};

/// The kind of breaking change detected.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum ChangeKind {
    #[serde(rename = "removed")]
    Removed,
    #[serde(rename = "internal")]
    Internal,
    #[serde(rename = "visibility")]
    Visibility,
    #[serde(rename = "returnType")]
    ReturnType,
    #[serde(rename = "type")]
    Type,
    #[serde(rename = "renamed")]
    Renamed,
    #[serde(rename = "new")]
    New,
    #[serde(rename = "abstract")]
    Abstract,
    #[serde(rename = "final")]
    Final,
    #[serde(rename = "returnByRef")]
    ReturnByRef,
    #[serde(rename = "passByRef")]
    PassByRef,
    #[serde(rename = "readonly")]
    Readonly,
    #[serde(rename = "variadic")]
    Variadic,
    #[serde(rename = "default")]
    Default,
    #[serde(rename = "static")]
    Static,
    #[serde(rename = "multirelational")]
    Multirelational,
    #[serde(rename = "through")]
    Through,
    #[serde(rename = "through-data")]
    ThroughData,
}

impl ChangeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChangeKind::Removed => "removed",
            ChangeKind::Internal => "internal",
            ChangeKind::Visibility => "visibility",
            ChangeKind::ReturnType => "returnType",
            ChangeKind::Type => "type",
            ChangeKind::Renamed => "renamed",
            ChangeKind::New => "new",
            ChangeKind::Abstract => "abstract",
            ChangeKind::Final => "final",
            ChangeKind::ReturnByRef => "returnByRef",
            ChangeKind::PassByRef => "passByRef",
            ChangeKind::Readonly => "readonly",
            ChangeKind::Variadic => "variadic",
            ChangeKind::Default => "default",
            ChangeKind::Static => "static",
            ChangeKind::Multirelational => "multirelational",
            ChangeKind::Through => "through",
            ChangeKind::ThroughData => "through-data",
        }
    }
}

/// Per-kind payload of a breaking change. One variant per [`ChangeKind`].
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ChangeDetail {
    /// API gone from the public surface entirely. `message` carries the
    /// parsed deprecation message, empty when none was usable.
    Removed { message: String },
    /// API still present but now marked internal.
    Internal { message: String },
    Visibility {
        from: Visibility,
        to: Visibility,
    },
    /// Return type changed; canonical forms plus the source spelling, since
    /// FQN resolution of intersection types is best-effort.
    ReturnType {
        from: String,
        to: String,
        #[serde(rename = "fromOrig")]
        from_orig: String,
        #[serde(rename = "toOrig")]
        to_orig: String,
    },
    /// Declared type changed: property/const/param hints, class category
    /// flips, or field/relation type specs.
    Type {
        from: String,
        to: String,
        #[serde(rename = "fromOrig", skip_serializing_if = "Option::is_none")]
        from_orig: Option<String>,
        #[serde(rename = "toOrig", skip_serializing_if = "Option::is_none")]
        to_orig: Option<String>,
    },
    /// Parameter renamed in place (matched by position).
    Renamed { from: String, to: String },
    /// Parameter newly added on the `to` side.
    New {
        #[serde(skip_serializing_if = "Option::is_none")]
        hint: Option<String>,
    },
    /// Became abstract. Never recorded in the other direction.
    Abstract {},
    /// Became final. Never recorded in the other direction.
    Final {},
    ReturnByRef {
        #[serde(rename = "isNow")]
        is_now: bool,
    },
    PassByRef {
        #[serde(rename = "isNow")]
        is_now: bool,
    },
    Readonly {
        #[serde(rename = "isNow")]
        is_now: bool,
    },
    Variadic {
        #[serde(rename = "isNow")]
        is_now: bool,
    },
    /// Default value changed, quote-style churn excluded.
    Default {
        #[serde(skip_serializing_if = "Option::is_none")]
        from: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        to: Option<String>,
    },
    Static {
        #[serde(rename = "isNow")]
        is_now: bool,
    },
    /// Has-one relation became (or stopped being) polymorphic.
    Multirelational {
        #[serde(rename = "isNow")]
        is_now: bool,
    },
    /// Many-many relation gained or lost an explicit join-record model.
    Through {
        #[serde(rename = "isNow")]
        is_now: bool,
    },
    /// The join-record descriptor itself changed.
    ThroughData { from: String, to: String },
}

impl ChangeDetail {
    pub fn kind(&self) -> ChangeKind {
        match self {
            ChangeDetail::Removed { .. } => ChangeKind::Removed,
            ChangeDetail::Internal { .. } => ChangeKind::Internal,
            ChangeDetail::Visibility { .. } => ChangeKind::Visibility,
            ChangeDetail::ReturnType { .. } => ChangeKind::ReturnType,
            ChangeDetail::Type { .. } => ChangeKind::Type,
            ChangeDetail::Renamed { .. } => ChangeKind::Renamed,
            ChangeDetail::New { .. } => ChangeKind::New,
            ChangeDetail::Abstract {} => ChangeKind::Abstract,
            ChangeDetail::Final {} => ChangeKind::Final,
            ChangeDetail::ReturnByRef { .. } => ChangeKind::ReturnByRef,
            ChangeDetail::PassByRef { .. } => ChangeKind::PassByRef,
            ChangeDetail::Readonly { .. } => ChangeKind::Readonly,
            ChangeDetail::Variadic { .. } => ChangeKind::Variadic,
            ChangeDetail::Default { .. } => ChangeKind::Default,
            ChangeDetail::Static { .. } => ChangeKind::Static,
            ChangeDetail::Multirelational { .. } => ChangeKind::Multirelational,
            ChangeDetail::Through { .. } => ChangeKind::Through,
            ChangeDetail::ThroughData { .. } => ChangeKind::ThroughData,
        }
    }
}

/// Source location and owning class attached to every recorded entry.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct EntryContext {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
    pub line: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub class: Option<String>,
}

impl EntryContext {
    pub fn new(file: Option<String>, line: u32) -> Self {
        Self {
            file,
            line,
            class: None,
        }
    }

    pub fn in_class(file: Option<String>, line: u32, class: impl Into<String>) -> Self {
        Self {
            file,
            line,
            class: Some(class.into()),
        }
    }
}

/// One recorded breaking change: context plus the kind-specific payload,
/// serialized as a single flat record.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ChangeEntry {
    #[serde(flatten)]
    pub context: EntryContext,
    #[serde(flatten)]
    pub detail: ChangeDetail,
}

impl ChangeEntry {
    pub fn new(context: EntryContext, detail: ChangeDetail) -> Self {
        Self { context, detail }
    }

    pub fn kind(&self) -> ChangeKind {
        self.detail.kind()
    }
}

/// Breaking changes accumulated over one comparison run, nested
/// module -> change kind -> symbol kind -> symbol identifier.
#[derive(Clone, Debug, Default, Serialize)]
#[serde(transparent)]
pub struct BreakingChanges {
    entries: BTreeMap<String, BTreeMap<ChangeKind, BTreeMap<ApiKind, BTreeMap<String, ChangeEntry>>>>,
}

impl BreakingChanges {
    /// Append one entry; the change kind comes from the entry's payload, so
    /// an entry can never land under the wrong kind bucket.
    pub fn record(&mut self, module: &str, api: ApiKind, id: impl Into<String>, entry: ChangeEntry) {
        self.entries
            .entry(module.to_string())
            .or_default()
            .entry(entry.kind())
            .or_default()
            .entry(api)
            .or_default()
            .insert(id.into(), entry);
    }

    pub fn get(
        &self,
        module: &str,
        kind: ChangeKind,
        api: ApiKind,
        id: &str,
    ) -> Option<&ChangeEntry> {
        self.entries.get(module)?.get(&kind)?.get(&api)?.get(id)
    }

    pub fn modules(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Flat walk over every recorded entry, in key order.
    pub fn iter(
        &self,
    ) -> impl Iterator<Item = (&str, ChangeKind, ApiKind, &str, &ChangeEntry)> {
        self.entries.iter().flat_map(|(module, kinds)| {
            kinds.iter().flat_map(move |(kind, apis)| {
                apis.iter().flat_map(move |(api, ids)| {
                    ids.iter()
                        .map(move |(id, entry)| (module.as_str(), *kind, *api, id.as_str(), entry))
                })
            })
        })
    }

    pub fn len(&self) -> usize {
        self.iter().count()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Maintenance action a developer must take.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum ActionKind {
    /// API removed or internalized without ever carrying a deprecation
    /// notice.
    #[serde(rename = "deprecate")]
    Deprecate,
    /// API deprecated in both versions: safe to delete now.
    #[serde(rename = "remove")]
    Remove,
    /// Deprecation annotation malformed; fix the source docblock.
    #[serde(rename = "fix-deprecation")]
    FixDeprecation,
}

impl ActionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActionKind::Deprecate => "deprecate",
            ActionKind::Remove => "remove",
            ActionKind::FixDeprecation => "fix-deprecation",
        }
    }
}

/// One recorded action: location context plus an optional explanation
/// (the deprecation message for `remove`, the defect for `fix-deprecation`).
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct ActionEntry {
    #[serde(flatten)]
    pub context: EntryContext,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl ActionEntry {
    pub fn new(context: EntryContext) -> Self {
        Self {
            context,
            message: None,
        }
    }

    pub fn with_message(context: EntryContext, message: impl Into<String>) -> Self {
        Self {
            context,
            message: Some(message.into()),
        }
    }
}

/// Actions accumulated over one comparison run, nested
/// module -> action kind -> symbol kind -> symbol identifier.
#[derive(Clone, Debug, Default, Serialize)]
#[serde(transparent)]
pub struct ActionsToTake {
    entries: BTreeMap<String, BTreeMap<ActionKind, BTreeMap<ApiKind, BTreeMap<String, ActionEntry>>>>,
}

impl ActionsToTake {
    pub fn record(
        &mut self,
        module: &str,
        action: ActionKind,
        api: ApiKind,
        id: impl Into<String>,
        entry: ActionEntry,
    ) {
        self.entries
            .entry(module.to_string())
            .or_default()
            .entry(action)
            .or_default()
            .entry(api)
            .or_default()
            .insert(id.into(), entry);
    }

    pub fn get(
        &self,
        module: &str,
        action: ActionKind,
        api: ApiKind,
        id: &str,
    ) -> Option<&ActionEntry> {
        self.entries.get(module)?.get(&action)?.get(&api)?.get(id)
    }

    pub fn iter(
        &self,
    ) -> impl Iterator<Item = (&str, ActionKind, ApiKind, &str, &ActionEntry)> {
        self.entries.iter().flat_map(|(module, actions)| {
            actions.iter().flat_map(move |(action, apis)| {
                apis.iter().flat_map(move |(api, ids)| {
                    ids.iter()
                        .map(move |(id, entry)| (module.as_str(), *action, *api, id.as_str(), entry))
                })
            })
        })
    }

    pub fn len(&self) -> usize {
        self.iter().count()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Derived statistics over one comparison run.
#[derive(Clone, Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ComparisonSummary {
    pub changes: BTreeMap<ChangeKind, u32>,
    pub actions: BTreeMap<ActionKind, u32>,
    pub modules: BTreeSet<String>,
    pub total_changes: u32,
    pub total_actions: u32,
}

impl ComparisonSummary {
    pub fn from_stores(changes: &BreakingChanges, actions: &ActionsToTake) -> Self {
        let mut summary = Self::default();
        for (module, kind, _, _, _) in changes.iter() {
            *summary.changes.entry(kind).or_default() += 1;
            summary.modules.insert(module.to_string());
            summary.total_changes += 1;
        }
        for (module, action, _, _, _) in actions.iter() {
            *summary.actions.entry(action).or_default() += 1;
            summary.modules.insert(module.to_string());
            summary.total_actions += 1;
        }
        summary
    }

    /// Human-readable one-liner.
    pub fn text(&self) -> String {
        if self.total_changes == 0 && self.total_actions == 0 {
            return "No breaking changes".to_string();
        }

        let mut parts = Vec::new();
        if self.total_changes > 0 {
            let kinds: Vec<String> = self
                .changes
                .iter()
                .map(|(kind, count)| format!("{} {}", count, kind.as_str()))
                .collect();
            parts.push(format!(
                "{} breaking ({})",
                self.total_changes,
                kinds.join(", ")
            ));
        }
        if self.total_actions > 0 {
            let kinds: Vec<String> = self
                .actions
                .iter()
                .map(|(action, count)| format!("{} {}", count, action.as_str()))
                .collect();
            parts.push(format!(
                "{} actions ({})",
                self.total_actions,
                kinds.join(", ")
            ));
        }
        parts.push(format!(
            "{} module{}",
            self.modules.len(),
            if self.modules.len() == 1 { "" } else { "s" }
        ));
        parts.join("; ")
    }
}
