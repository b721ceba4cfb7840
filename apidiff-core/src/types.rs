//! Data models for codebase symbol tables.
//!
//! These types represent one parsed snapshot of a multi-package PHP codebase,
//! providing a reflection-free view of classes, interfaces, traits, global
//! functions and their members. An upstream stage produces them; nothing in
//! this crate parses source code.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// The symbol kind tag used to bucket catalogue entries.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApiKind {
    Class,
    Interface,
    Trait,
    Function,
    Method,
    Property,
    /// A private static property: read by the framework's configuration
    /// subsystem rather than accessed as a normal object property.
    Config,
    Const,
    Param,
}

impl ApiKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ApiKind::Class => "class",
            ApiKind::Interface => "interface",
            ApiKind::Trait => "trait",
            ApiKind::Function => "function",
            ApiKind::Method => "method",
            ApiKind::Property => "property",
            ApiKind::Config => "config",
            ApiKind::Const => "const",
            ApiKind::Param => "param",
        }
    }
}

/// Whether a class-like symbol is a class, interface or trait.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClassCategory {
    #[default]
    Class,
    Interface,
    Trait,
}

impl ClassCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            ClassCategory::Class => "class",
            ClassCategory::Interface => "interface",
            ClassCategory::Trait => "trait",
        }
    }

    pub fn api_kind(&self) -> ApiKind {
        match self {
            ClassCategory::Class => ApiKind::Class,
            ClassCategory::Interface => ApiKind::Interface,
            ClassCategory::Trait => ApiKind::Trait,
        }
    }
}

/// Declared visibility of a member. `None` covers symbols without an
/// explicit visibility (e.g. classes, or pre-modifier legacy declarations).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    Public,
    Protected,
    Private,
    #[default]
    None,
}

impl Visibility {
    pub fn as_str(&self) -> &'static str {
        match self {
            Visibility::Public => "public",
            Visibility::Protected => "protected",
            Visibility::Private => "private",
            Visibility::None => "none",
        }
    }
}

/// One alternative of a union type (or one operand of an intersection type).
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct TypePart {
    /// The type name as originally written, e.g. `string` or `SiteTree`.
    pub name: String,
    /// Fully-qualified name when the part references a class, resolved by the
    /// upstream reflection stage. Builtins leave this unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resolved: Option<String>,
}

impl TypePart {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            resolved: None,
        }
    }

    pub fn resolved(name: impl Into<String>, fqn: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            resolved: Some(fqn.into()),
        }
    }
}

/// A declared type: an ordered list of parts joined as a union or an
/// intersection.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct TypeHint {
    pub parts: Vec<TypePart>,
    #[serde(default)]
    pub is_intersection: bool,
}

impl TypeHint {
    pub fn single(name: impl Into<String>) -> Self {
        Self {
            parts: vec![TypePart::new(name)],
            is_intersection: false,
        }
    }

    fn separator(&self) -> &'static str {
        if self.is_intersection {
            "&"
        } else {
            "|"
        }
    }

    /// Canonical string form: class parts replaced by their fully-qualified
    /// names. This is the comparison key for type changes.
    pub fn canonical(&self) -> String {
        self.parts
            .iter()
            .map(|p| p.resolved.as_deref().unwrap_or(&p.name))
            .collect::<Vec<_>>()
            .join(self.separator())
    }

    /// The type exactly as written in source. Kept alongside the canonical
    /// form because FQN resolution of intersection types is best-effort.
    pub fn as_written(&self) -> String {
        self.parts
            .iter()
            .map(|p| p.name.as_str())
            .collect::<Vec<_>>()
            .join(self.separator())
    }
}

/// Canonical form of an optional hint; absent hints canonicalize to "".
pub fn hint_canonical(hint: Option<&TypeHint>) -> String {
    hint.map(TypeHint::canonical).unwrap_or_default()
}

/// Written form of an optional hint; absent hints render as "".
pub fn hint_as_written(hint: Option<&TypeHint>) -> String {
    hint.map(TypeHint::as_written).unwrap_or_default()
}

/// A single `@deprecated` annotation, pre-split into whitespace-separated
/// parts by the upstream stage. Part 0 conventionally carries the version the
/// deprecation landed in.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct DeprecationNotice {
    pub parts: Vec<String>,
}

impl DeprecationNotice {
    pub fn new(parts: Vec<String>) -> Self {
        Self { parts }
    }
}

/// Why a deprecation annotation needs fixing.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DeprecationProblem {
    /// Part 0 of the notice is not a version number.
    MissingVersion,
    /// More than one `@deprecated` notice on the same symbol.
    MultipleNotices,
}

impl DeprecationProblem {
    pub fn describe(&self) -> &'static str {
        match self {
            DeprecationProblem::MissingVersion => "deprecation notice has no version number",
            DeprecationProblem::MultipleNotices => "symbol carries multiple deprecation notices",
        }
    }
}

/// Result of parsing a symbol's deprecation notices.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ParsedDeprecation {
    /// Human message with the version stripped; empty when the symbol is not
    /// deprecated or the annotation is malformed.
    pub message: String,
    pub problem: Option<DeprecationProblem>,
}

static VERSION_NUMBER: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[0-9]+(\.[0-9]+)*$").unwrap());

/// Parse a symbol's deprecation notices into a message plus any data-quality
/// problem. Never fails: malformed annotations are reported, not thrown.
pub fn parse_deprecations(notices: &[DeprecationNotice]) -> ParsedDeprecation {
    match notices {
        [] => ParsedDeprecation::default(),
        [notice] => match notice.parts.split_first() {
            Some((version, rest)) if VERSION_NUMBER.is_match(version) => ParsedDeprecation {
                message: rest.join(" "),
                problem: None,
            },
            _ => ParsedDeprecation {
                message: String::new(),
                problem: Some(DeprecationProblem::MissingVersion),
            },
        },
        _ => ParsedDeprecation {
            message: String::new(),
            problem: Some(DeprecationProblem::MultipleNotices),
        },
    }
}

/// A function or method parameter.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ParamDef {
    /// Name without the leading `$`.
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hint: Option<TypeHint>,
    /// Default value exactly as written in source, quote style included.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<String>,
    #[serde(default)]
    pub variadic: bool,
    #[serde(default)]
    pub by_ref: bool,
}

impl ParamDef {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }
}

/// A global function.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct FunctionDef {
    pub name: String,
    /// `None` means the function does not exist in this snapshot.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
    #[serde(default)]
    pub line: u32,
    #[serde(default)]
    pub is_internal: bool,
    #[serde(default)]
    pub deprecations: Vec<DeprecationNotice>,
    /// Return-by-reference (`function &foo()`).
    #[serde(default)]
    pub by_ref: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub return_hint: Option<TypeHint>,
    #[serde(default)]
    pub params: Vec<ParamDef>,
}

/// A class method.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct MethodDef {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
    #[serde(default)]
    pub line: u32,
    #[serde(default)]
    pub is_internal: bool,
    #[serde(default)]
    pub deprecations: Vec<DeprecationNotice>,
    #[serde(default)]
    pub visibility: Visibility,
    #[serde(default)]
    pub is_static: bool,
    #[serde(default)]
    pub is_abstract: bool,
    #[serde(default)]
    pub is_final: bool,
    #[serde(default)]
    pub by_ref: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub return_hint: Option<TypeHint>,
    #[serde(default)]
    pub params: Vec<ParamDef>,
}

/// A class property.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct PropertyDef {
    /// Name without the leading `$`.
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
    #[serde(default)]
    pub line: u32,
    #[serde(default)]
    pub is_internal: bool,
    #[serde(default)]
    pub deprecations: Vec<DeprecationNotice>,
    #[serde(default)]
    pub visibility: Visibility,
    #[serde(default)]
    pub is_static: bool,
    #[serde(default)]
    pub is_readonly: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hint: Option<TypeHint>,
}

impl PropertyDef {
    /// A private static property is a configuration slot, not a property.
    /// Derived, never stored.
    pub fn is_config(&self) -> bool {
        self.is_static && self.visibility == Visibility::Private
    }

    pub fn api_kind(&self) -> ApiKind {
        if self.is_config() {
            ApiKind::Config
        } else {
            ApiKind::Property
        }
    }
}

/// A class constant.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct ConstDef {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
    #[serde(default)]
    pub line: u32,
    #[serde(default)]
    pub is_internal: bool,
    #[serde(default)]
    pub deprecations: Vec<DeprecationNotice>,
    #[serde(default)]
    pub visibility: Visibility,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hint: Option<TypeHint>,
}

/// Target of a has-one relation.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct HasOneSpec {
    pub class: String,
    /// Polymorphic has-one: may point at more than one concrete class.
    #[serde(default)]
    pub multirelational: bool,
}

impl HasOneSpec {
    pub fn to_class(class: impl Into<String>) -> Self {
        Self {
            class: class.into(),
            multirelational: false,
        }
    }
}

/// Descriptor of an explicit many-many join record.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ThroughSpec {
    /// The join-record class mediating the relation.
    pub through: String,
    /// Field on the join record pointing back at the owner.
    pub from: String,
    /// Field on the join record pointing at the related class.
    pub to: String,
}

/// A many-many relation: either an implicit join table against a target
/// class, or an explicit through model.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ManyManySpec {
    Through(ThroughSpec),
    Direct { class: String },
}

impl ManyManySpec {
    pub fn direct(class: impl Into<String>) -> Self {
        ManyManySpec::Direct {
            class: class.into(),
        }
    }
}

/// Declarative relational metadata attached to model classes.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct RelationSet {
    /// Field name -> type spec string, e.g. `"Title" => "Varchar(255)"`.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub db: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub fixed_fields: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub has_one: BTreeMap<String, HasOneSpec>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub has_many: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub belongs_to: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub many_many: BTreeMap<String, ManyManySpec>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub belongs_many_many: BTreeMap<String, String>,
}

impl RelationSet {
    pub fn is_empty(&self) -> bool {
        self.db.is_empty()
            && self.fixed_fields.is_empty()
            && self.has_one.is_empty()
            && self.has_many.is_empty()
            && self.belongs_to.is_empty()
            && self.many_many.is_empty()
            && self.belongs_many_many.is_empty()
    }
}

/// A class, interface or trait, with its declared members.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct ClassDef {
    /// Fully-qualified name.
    pub name: String,
    /// `None` means the symbol does not exist in this snapshot.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
    #[serde(default)]
    pub line: u32,
    #[serde(default)]
    pub category: ClassCategory,
    #[serde(default)]
    pub is_internal: bool,
    #[serde(default)]
    pub deprecations: Vec<DeprecationNotice>,
    #[serde(default)]
    pub is_abstract: bool,
    #[serde(default)]
    pub is_final: bool,
    #[serde(default)]
    pub consts: Vec<ConstDef>,
    #[serde(default)]
    pub properties: Vec<PropertyDef>,
    #[serde(default)]
    pub methods: Vec<MethodDef>,
    #[serde(default, skip_serializing_if = "RelationSet::is_empty")]
    pub relations: RelationSet,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn notice(parts: &[&str]) -> DeprecationNotice {
        DeprecationNotice::new(parts.iter().map(|s| s.to_string()).collect())
    }

    #[test]
    fn test_canonical_prefers_resolved_names() {
        let hint = TypeHint {
            parts: vec![
                TypePart::resolved("SiteTree", "Cms\\Model\\SiteTree"),
                TypePart::new("null"),
            ],
            is_intersection: false,
        };
        assert_eq!(hint.canonical(), "Cms\\Model\\SiteTree|null");
        assert_eq!(hint.as_written(), "SiteTree|null");
    }

    #[test]
    fn test_intersection_separator() {
        let hint = TypeHint {
            parts: vec![TypePart::new("Countable"), TypePart::new("Traversable")],
            is_intersection: true,
        };
        assert_eq!(hint.canonical(), "Countable&Traversable");
    }

    #[test]
    fn test_parse_deprecations_well_formed() {
        let parsed = parse_deprecations(&[notice(&["1.2.0", "Do", "not", "use", "this."])]);
        assert_eq!(parsed.message, "Do not use this.");
        assert_eq!(parsed.problem, None);
    }

    #[test]
    fn test_parse_deprecations_missing_version() {
        let parsed = parse_deprecations(&[notice(&["Will", "be", "removed"])]);
        assert_eq!(parsed.message, "");
        assert_eq!(parsed.problem, Some(DeprecationProblem::MissingVersion));
    }

    #[test]
    fn test_parse_deprecations_multiple_notices() {
        let parsed = parse_deprecations(&[notice(&["1.0.0", "first"]), notice(&["1.1.0", "again"])]);
        assert_eq!(parsed.message, "");
        assert_eq!(parsed.problem, Some(DeprecationProblem::MultipleNotices));
    }

    #[test]
    fn test_parse_deprecations_not_deprecated() {
        let parsed = parse_deprecations(&[]);
        assert_eq!(parsed.message, "");
        assert_eq!(parsed.problem, None);
    }

    #[test]
    fn test_config_classification() {
        let mut prop = PropertyDef {
            name: "allowed_children".into(),
            visibility: Visibility::Private,
            is_static: true,
            ..PropertyDef::default()
        };
        assert_eq!(prop.api_kind(), ApiKind::Config);

        prop.visibility = Visibility::Protected;
        assert_eq!(prop.api_kind(), ApiKind::Property);

        prop.visibility = Visibility::Private;
        prop.is_static = false;
        assert_eq!(prop.api_kind(), ApiKind::Property);
    }

    #[test]
    fn test_many_many_spec_deserializes_both_shapes() {
        let direct: ManyManySpec = serde_json::from_str(r#"{"class": "Tag"}"#).unwrap();
        assert_eq!(direct, ManyManySpec::direct("Tag"));

        let through: ManyManySpec =
            serde_json::from_str(r#"{"through": "Membership", "from": "team", "to": "player"}"#)
                .unwrap();
        assert_eq!(
            through,
            ManyManySpec::Through(ThroughSpec {
                through: "Membership".into(),
                from: "team".into(),
                to: "player".into(),
            })
        );
    }
}
