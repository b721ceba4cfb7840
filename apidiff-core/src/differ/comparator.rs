//! Change classifier: pairwise comparison algorithms, one per symbol kind.
//!
//! Every comparison follows the same shape: a Missing-API check that
//! short-circuits when the symbol is gone (or as good as gone) from the `to`
//! snapshot, then signature checks, then kind-specific extras. Findings land
//! in the [`BreakingChanges`] and [`ActionsToTake`] accumulators; one
//! [`Comparator`] instance covers exactly one comparison run.

use tracing::warn;

use crate::differ::changes::{
    ActionEntry, ActionKind, ActionsToTake, BreakingChanges, ChangeDetail, ChangeEntry,
    EntryContext,
};
use crate::differ::relations;
use crate::error::CompareError;
use crate::modules::module_for_path;
use crate::types::{
    hint_as_written, hint_canonical, parse_deprecations, ApiKind, ClassDef, ConstDef,
    DeprecationNotice, FunctionDef, MethodDef, ParamDef, ParsedDeprecation, PropertyDef, TypeHint,
    Visibility,
};

/// The slice of a symbol the Missing-API check needs.
struct ApiFacts<'a> {
    file: Option<&'a str>,
    internal: bool,
    deprecations: &'a [DeprecationNotice],
}

impl<'a> ApiFacts<'a> {
    fn new(file: Option<&'a str>, internal: bool, deprecations: &'a [DeprecationNotice]) -> Self {
        Self {
            file,
            internal,
            deprecations,
        }
    }
}

/// The slice of a symbol the signature checks compare.
struct SignatureFacts<'a> {
    /// Return type for functions/methods, declared type otherwise.
    hint: Option<&'a TypeHint>,
    visibility: Visibility,
    /// `None` for kinds without static-ness (classes, functions).
    is_static: Option<bool>,
    is_abstract: bool,
    is_final: bool,
}

/// Accumulating pairwise classifier. Not idempotent: comparing twice into the
/// same instance doubles the catalogue, so use a fresh instance per run.
#[derive(Default)]
pub struct Comparator {
    pub(crate) changes: BreakingChanges,
    pub(crate) actions: ActionsToTake,
}

impl Comparator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn breaking_changes(&self) -> &BreakingChanges {
        &self.changes
    }

    pub fn actions_to_take(&self) -> &ActionsToTake {
        &self.actions
    }

    pub fn into_stores(self) -> (BreakingChanges, ActionsToTake) {
        (self.changes, self.actions)
    }

    /// Compare a global function pair.
    pub fn compare_function(
        &mut self,
        name: &str,
        from: &FunctionDef,
        to: Option<&FunctionDef>,
    ) -> Result<(), CompareError> {
        let module = resolve_module(
            from.file.as_deref(),
            to.and_then(|t| t.file.as_deref()),
            name,
        )?;
        let id = format!("{name}()");
        let ctx = EntryContext::new(from.file.clone(), from.line);

        let from_facts = ApiFacts::new(from.file.as_deref(), from.is_internal, &from.deprecations);
        let to_facts =
            to.map(|t| ApiFacts::new(t.file.as_deref(), t.is_internal, &t.deprecations));
        if self.check_missing_api(&module, ApiKind::Function, &id, &ctx, &from_facts, to_facts.as_ref())
        {
            return Ok(());
        }
        let to = to.expect("present when not missing");

        self.check_signature(
            &module,
            ApiKind::Function,
            &id,
            &ctx,
            &SignatureFacts {
                hint: from.return_hint.as_ref(),
                visibility: Visibility::None,
                is_static: None,
                is_abstract: false,
                is_final: false,
            },
            &SignatureFacts {
                hint: to.return_hint.as_ref(),
                visibility: Visibility::None,
                is_static: None,
                is_abstract: false,
                is_final: false,
            },
        );
        if from.by_ref != to.by_ref {
            self.changes.record(
                &module,
                ApiKind::Function,
                &id,
                ChangeEntry::new(ctx.clone(), ChangeDetail::ReturnByRef { is_now: to.by_ref }),
            );
        }
        self.compare_parameters(&module, name, &ctx, &from.params, &to.params);
        Ok(())
    }

    /// Compare a class/interface/trait pair, recursing into members and
    /// relational metadata.
    pub fn compare_class(
        &mut self,
        name: &str,
        from: &ClassDef,
        to: Option<&ClassDef>,
    ) -> Result<(), CompareError> {
        let module = resolve_module(
            from.file.as_deref(),
            to.and_then(|t| t.file.as_deref()),
            name,
        )?;
        let api = from.category.api_kind();
        let ctx = EntryContext::new(from.file.clone(), from.line);

        let from_facts = ApiFacts::new(from.file.as_deref(), from.is_internal, &from.deprecations);
        let to_facts =
            to.map(|t| ApiFacts::new(t.file.as_deref(), t.is_internal, &t.deprecations));
        if self.check_missing_api(&module, api, name, &ctx, &from_facts, to_facts.as_ref()) {
            return Ok(());
        }
        let to = to.expect("present when not missing");

        self.check_signature(
            &module,
            api,
            name,
            &ctx,
            &SignatureFacts {
                hint: None,
                visibility: Visibility::None,
                is_static: None,
                is_abstract: from.is_abstract,
                is_final: from.is_final,
            },
            &SignatureFacts {
                hint: None,
                visibility: Visibility::None,
                is_static: None,
                is_abstract: to.is_abstract,
                is_final: to.is_final,
            },
        );
        if from.category != to.category {
            self.changes.record(
                &module,
                api,
                name,
                ChangeEntry::new(
                    ctx.clone(),
                    ChangeDetail::Type {
                        from: from.category.as_str().to_string(),
                        to: to.category.as_str().to_string(),
                        from_orig: None,
                        to_orig: None,
                    },
                ),
            );
        }

        // Members are paired by name; members present only in `to` are new
        // API and cannot break existing consumers, so they go unflagged.
        for c in &from.consts {
            let counterpart = to.consts.iter().find(|t| t.name == c.name);
            self.compare_const(&module, name, c, counterpart)?;
        }
        for p in &from.properties {
            let counterpart = to.properties.iter().find(|t| t.name == p.name);
            self.compare_property(&module, name, p, counterpart)?;
        }
        for m in &from.methods {
            let counterpart = to.methods.iter().find(|t| t.name == m.name);
            self.compare_method(&module, name, m, counterpart)?;
        }

        relations::compare_relations(self, &module, name, &ctx, &from.relations, &to.relations);
        Ok(())
    }

    fn compare_const(
        &mut self,
        class_module: &str,
        class: &str,
        from: &ConstDef,
        to: Option<&ConstDef>,
    ) -> Result<(), CompareError> {
        let module = member_module(
            class_module,
            from.file.as_deref(),
            to.and_then(|t| t.file.as_deref()),
        )?;
        let id = format!("{class}::{}", from.name);
        let ctx = EntryContext::in_class(from.file.clone(), from.line, class);

        let from_facts = ApiFacts::new(from.file.as_deref(), from.is_internal, &from.deprecations);
        let to_facts =
            to.map(|t| ApiFacts::new(t.file.as_deref(), t.is_internal, &t.deprecations));
        if self.check_missing_api(&module, ApiKind::Const, &id, &ctx, &from_facts, to_facts.as_ref())
        {
            return Ok(());
        }
        let to = to.expect("present when not missing");

        self.check_signature(
            &module,
            ApiKind::Const,
            &id,
            &ctx,
            &SignatureFacts {
                hint: from.hint.as_ref(),
                visibility: from.visibility,
                is_static: None,
                is_abstract: false,
                is_final: false,
            },
            &SignatureFacts {
                hint: to.hint.as_ref(),
                visibility: to.visibility,
                is_static: None,
                is_abstract: false,
                is_final: false,
            },
        );
        Ok(())
    }

    fn compare_property(
        &mut self,
        class_module: &str,
        class: &str,
        from: &PropertyDef,
        to: Option<&PropertyDef>,
    ) -> Result<(), CompareError> {
        let module = member_module(
            class_module,
            from.file.as_deref(),
            to.and_then(|t| t.file.as_deref()),
        )?;
        // Classified by what existing consumers knew it as: the `from` side.
        let api = from.api_kind();
        let id = format!("{class}->{}", from.name);
        let ctx = EntryContext::in_class(from.file.clone(), from.line, class);

        let from_facts = ApiFacts::new(from.file.as_deref(), from.is_internal, &from.deprecations);
        let to_facts =
            to.map(|t| ApiFacts::new(t.file.as_deref(), t.is_internal, &t.deprecations));
        if self.check_missing_api(&module, api, &id, &ctx, &from_facts, to_facts.as_ref()) {
            return Ok(());
        }
        let to = to.expect("present when not missing");

        self.check_signature(
            &module,
            api,
            &id,
            &ctx,
            &SignatureFacts {
                hint: from.hint.as_ref(),
                visibility: from.visibility,
                is_static: Some(from.is_static),
                is_abstract: false,
                is_final: false,
            },
            &SignatureFacts {
                hint: to.hint.as_ref(),
                visibility: to.visibility,
                is_static: Some(to.is_static),
                is_abstract: false,
                is_final: false,
            },
        );
        if from.is_readonly != to.is_readonly {
            self.changes.record(
                &module,
                api,
                &id,
                ChangeEntry::new(
                    ctx.clone(),
                    ChangeDetail::Readonly {
                        is_now: to.is_readonly,
                    },
                ),
            );
        }
        Ok(())
    }

    fn compare_method(
        &mut self,
        class_module: &str,
        class: &str,
        from: &MethodDef,
        to: Option<&MethodDef>,
    ) -> Result<(), CompareError> {
        let module = member_module(
            class_module,
            from.file.as_deref(),
            to.and_then(|t| t.file.as_deref()),
        )?;
        let id = format!("{class}::{}()", from.name);
        let ctx = EntryContext::in_class(from.file.clone(), from.line, class);

        let from_facts = ApiFacts::new(from.file.as_deref(), from.is_internal, &from.deprecations);
        let to_facts =
            to.map(|t| ApiFacts::new(t.file.as_deref(), t.is_internal, &t.deprecations));
        if self.check_missing_api(&module, ApiKind::Method, &id, &ctx, &from_facts, to_facts.as_ref())
        {
            return Ok(());
        }
        let to = to.expect("present when not missing");

        self.check_signature(
            &module,
            ApiKind::Method,
            &id,
            &ctx,
            &SignatureFacts {
                hint: from.return_hint.as_ref(),
                visibility: from.visibility,
                is_static: Some(from.is_static),
                is_abstract: from.is_abstract,
                is_final: from.is_final,
            },
            &SignatureFacts {
                hint: to.return_hint.as_ref(),
                visibility: to.visibility,
                is_static: Some(to.is_static),
                is_abstract: to.is_abstract,
                is_final: to.is_final,
            },
        );
        if from.by_ref != to.by_ref {
            self.changes.record(
                &module,
                ApiKind::Method,
                &id,
                ChangeEntry::new(ctx.clone(), ChangeDetail::ReturnByRef { is_now: to.by_ref }),
            );
        }
        let owner = format!("{class}::{}", from.name);
        self.compare_parameters(&module, &owner, &ctx, &from.params, &to.params);
        Ok(())
    }

    /// Pair parameters by name, falling back to ordinal position for renames,
    /// then flag whatever is left on the `to` side as new.
    fn compare_parameters(
        &mut self,
        module: &str,
        owner: &str,
        ctx: &EntryContext,
        from_params: &[ParamDef],
        to_params: &[ParamDef],
    ) {
        let mut taken = vec![false; to_params.len()];
        let mut matched: Vec<Option<usize>> = vec![None; from_params.len()];

        // Pass 1: exact name matches.
        for (i, fp) in from_params.iter().enumerate() {
            if let Some(j) = to_params
                .iter()
                .position(|tp| tp.name == fp.name)
            {
                if !taken[j] {
                    matched[i] = Some(j);
                    taken[j] = true;
                }
            }
        }
        // Pass 2: the parameter at the same ordinal position is treated as
        // the renamed counterpart.
        for i in 0..from_params.len() {
            if matched[i].is_none() && i < to_params.len() && !taken[i] {
                matched[i] = Some(i);
                taken[i] = true;
            }
        }

        for (i, fp) in from_params.iter().enumerate() {
            let id = format!("{owner}(${})", fp.name);
            let Some(j) = matched[i] else {
                self.changes.record(
                    module,
                    ApiKind::Param,
                    &id,
                    ChangeEntry::new(
                        ctx.clone(),
                        ChangeDetail::Removed {
                            message: String::new(),
                        },
                    ),
                );
                continue;
            };
            let tp = &to_params[j];

            let from_canonical = hint_canonical(fp.hint.as_ref());
            let to_canonical = hint_canonical(tp.hint.as_ref());
            if from_canonical != to_canonical {
                self.changes.record(
                    module,
                    ApiKind::Param,
                    &id,
                    ChangeEntry::new(
                        ctx.clone(),
                        ChangeDetail::Type {
                            from: from_canonical,
                            to: to_canonical,
                            from_orig: Some(hint_as_written(fp.hint.as_ref())),
                            to_orig: Some(hint_as_written(tp.hint.as_ref())),
                        },
                    ),
                );
            }
            if fp.variadic != tp.variadic {
                self.changes.record(
                    module,
                    ApiKind::Param,
                    &id,
                    ChangeEntry::new(ctx.clone(), ChangeDetail::Variadic { is_now: tp.variadic }),
                );
            }
            if fp.by_ref != tp.by_ref {
                self.changes.record(
                    module,
                    ApiKind::Param,
                    &id,
                    ChangeEntry::new(ctx.clone(), ChangeDetail::PassByRef { is_now: tp.by_ref }),
                );
            }
            if !defaults_equal(fp.default.as_deref(), tp.default.as_deref()) {
                self.changes.record(
                    module,
                    ApiKind::Param,
                    &id,
                    ChangeEntry::new(
                        ctx.clone(),
                        ChangeDetail::Default {
                            from: fp.default.clone(),
                            to: tp.default.clone(),
                        },
                    ),
                );
            }
            if tp.name != fp.name {
                self.changes.record(
                    module,
                    ApiKind::Param,
                    &id,
                    ChangeEntry::new(
                        ctx.clone(),
                        ChangeDetail::Renamed {
                            from: format!("${}", fp.name),
                            to: format!("${}", tp.name),
                        },
                    ),
                );
            }
        }

        for (j, tp) in to_params.iter().enumerate() {
            if taken[j] {
                continue;
            }
            let id = format!("{owner}(${})", tp.name);
            self.changes.record(
                module,
                ApiKind::Param,
                &id,
                ChangeEntry::new(
                    ctx.clone(),
                    ChangeDetail::New {
                        hint: tp.hint.as_ref().map(TypeHint::canonical),
                    },
                ),
            );
        }
    }

    /// The Missing-API check. Returns true when the symbol is gone from the
    /// public surface and all further checks must be skipped.
    fn check_missing_api(
        &mut self,
        module: &str,
        api: ApiKind,
        id: &str,
        ctx: &EntryContext,
        from: &ApiFacts,
        to: Option<&ApiFacts>,
    ) -> bool {
        let vanished = match to {
            None => true,
            Some(t) => t.file.is_none(),
        };
        if vanished {
            // Internal API disappearing was never a public break.
            if from.internal {
                return true;
            }
            let parsed = self.parse_and_flag(module, api, id, ctx, from.deprecations);
            if from.deprecations.is_empty() {
                self.actions.record(
                    module,
                    ActionKind::Deprecate,
                    api,
                    id,
                    ActionEntry::new(ctx.clone()),
                );
            }
            self.changes.record(
                module,
                api,
                id,
                ChangeEntry::new(
                    ctx.clone(),
                    ChangeDetail::Removed {
                        message: parsed.message,
                    },
                ),
            );
            return true;
        }

        let to = to.expect("vanished is false");
        if !from.internal && to.internal {
            // Effectively removed from the public surface. Internal config is
            // invisible to the config system, which is the same as deletion.
            let parsed = self.parse_and_flag(module, api, id, ctx, from.deprecations);
            if from.deprecations.is_empty() {
                self.actions.record(
                    module,
                    ActionKind::Deprecate,
                    api,
                    id,
                    ActionEntry::new(ctx.clone()),
                );
            }
            let detail = if api == ApiKind::Config {
                ChangeDetail::Removed {
                    message: parsed.message,
                }
            } else {
                ChangeDetail::Internal {
                    message: parsed.message,
                }
            };
            self.changes
                .record(module, api, id, ChangeEntry::new(ctx.clone(), detail));
            return true;
        }

        if !from.deprecations.is_empty() && !to.deprecations.is_empty() {
            // Correctly deprecated across both versions: safe to delete now.
            // Deprecations that were lifted, or that only appeared in `to`,
            // are deliberately ignored.
            let parsed = self.parse_and_flag(module, api, id, ctx, to.deprecations);
            let entry = if parsed.message.is_empty() {
                ActionEntry::new(ctx.clone())
            } else {
                ActionEntry::with_message(ctx.clone(), parsed.message)
            };
            self.actions
                .record(module, ActionKind::Remove, api, id, entry);
            return true;
        }

        false
    }

    /// Checks shared by every still-present symbol: declared type,
    /// visibility, and the one-directional modifier escalations.
    fn check_signature(
        &mut self,
        module: &str,
        api: ApiKind,
        id: &str,
        ctx: &EntryContext,
        from: &SignatureFacts,
        to: &SignatureFacts,
    ) {
        let from_canonical = hint_canonical(from.hint);
        let to_canonical = hint_canonical(to.hint);
        if from_canonical != to_canonical {
            let detail = match api {
                ApiKind::Function | ApiKind::Method => ChangeDetail::ReturnType {
                    from: from_canonical,
                    to: to_canonical,
                    from_orig: hint_as_written(from.hint),
                    to_orig: hint_as_written(to.hint),
                },
                _ => ChangeDetail::Type {
                    from: from_canonical,
                    to: to_canonical,
                    from_orig: Some(hint_as_written(from.hint)),
                    to_orig: Some(hint_as_written(to.hint)),
                },
            };
            self.changes
                .record(module, api, id, ChangeEntry::new(ctx.clone(), detail));
        }
        if from.visibility != to.visibility {
            self.changes.record(
                module,
                api,
                id,
                ChangeEntry::new(
                    ctx.clone(),
                    ChangeDetail::Visibility {
                        from: from.visibility,
                        to: to.visibility,
                    },
                ),
            );
        }
        if !from.is_final && to.is_final {
            self.changes.record(
                module,
                api,
                id,
                ChangeEntry::new(ctx.clone(), ChangeDetail::Final {}),
            );
        }
        if !from.is_abstract && to.is_abstract {
            self.changes.record(
                module,
                api,
                id,
                ChangeEntry::new(ctx.clone(), ChangeDetail::Abstract {}),
            );
        }
        if let (Some(was), Some(now)) = (from.is_static, to.is_static) {
            if was != now {
                self.changes.record(
                    module,
                    api,
                    id,
                    ChangeEntry::new(ctx.clone(), ChangeDetail::Static { is_now: now }),
                );
            }
        }
    }

    /// Parse deprecation notices, recording a fix-deprecation action for any
    /// data-quality problem. Never fatal.
    fn parse_and_flag(
        &mut self,
        module: &str,
        api: ApiKind,
        id: &str,
        ctx: &EntryContext,
        notices: &[DeprecationNotice],
    ) -> ParsedDeprecation {
        let parsed = parse_deprecations(notices);
        if let Some(problem) = parsed.problem {
            warn!(symbol = id, "{}", problem.describe());
            self.actions.record(
                module,
                ActionKind::FixDeprecation,
                api,
                id,
                ActionEntry::with_message(ctx.clone(), problem.describe()),
            );
        }
        parsed
    }
}

/// Verbatim comparison first; quote-style churn on string literals does not
/// count as a change.
fn defaults_equal(from: Option<&str>, to: Option<&str>) -> bool {
    match (from, to) {
        (None, None) => true,
        (Some(a), Some(b)) => a == b || a.replace('"', "'") == b.replace('"', "'"),
        _ => false,
    }
}

/// Module of a top-level symbol: the `from` side's file, falling back to the
/// `to` side for symbols that only exist there.
fn resolve_module(
    from_file: Option<&str>,
    to_file: Option<&str>,
    symbol: &str,
) -> Result<String, CompareError> {
    match from_file.or(to_file) {
        Some(path) => module_for_path(path),
        None => Err(CompareError::ModuleResolution(format!(
            "{symbol} (no file recorded)"
        ))),
    }
}

/// Module of a member symbol. Members usually share their class's file but
/// may not (inherited members), so their own file wins when present.
fn member_module(
    class_module: &str,
    from_file: Option<&str>,
    to_file: Option<&str>,
) -> Result<String, CompareError> {
    match from_file.or(to_file) {
        Some(path) => module_for_path(path),
        None => Ok(class_module.to_string()),
    }
}
