//! Comparison of declarative relational metadata on model classes.
//!
//! The relation maps (`db`, `has_one`, `many_many`, ...) are configuration
//! slots in the source framework, so their entries are catalogued under the
//! `config` symbol kind with `Class->map.Name` identifiers. Entries present
//! only in `to` are new schema and go unflagged, same as new class members.

use std::collections::BTreeMap;

use crate::differ::changes::{ChangeDetail, ChangeEntry, EntryContext};
use crate::differ::comparator::Comparator;
use crate::types::{ApiKind, HasOneSpec, ManyManySpec, RelationSet, ThroughSpec};

pub(crate) fn compare_relations(
    cmp: &mut Comparator,
    module: &str,
    class: &str,
    class_ctx: &EntryContext,
    from: &RelationSet,
    to: &RelationSet,
) {
    if from.is_empty() && to.is_empty() {
        return;
    }
    let ctx = EntryContext::in_class(class_ctx.file.clone(), class_ctx.line, class);

    diff_value_map(cmp, module, class, &ctx, "db", &from.db, &to.db);
    diff_value_map(
        cmp,
        module,
        class,
        &ctx,
        "fixed_fields",
        &from.fixed_fields,
        &to.fixed_fields,
    );
    diff_value_map(
        cmp,
        module,
        class,
        &ctx,
        "has_many",
        &from.has_many,
        &to.has_many,
    );
    diff_value_map(
        cmp,
        module,
        class,
        &ctx,
        "belongs_to",
        &from.belongs_to,
        &to.belongs_to,
    );
    diff_value_map(
        cmp,
        module,
        class,
        &ctx,
        "belongs_many_many",
        &from.belongs_many_many,
        &to.belongs_many_many,
    );

    for (name, f) in &from.has_one {
        let id = format!("{class}->has_one.{name}");
        match to.has_one.get(name) {
            None => record_removed(cmp, module, &ctx, &id),
            Some(t) => diff_has_one(cmp, module, &ctx, &id, f, t),
        }
    }

    for (name, f) in &from.many_many {
        let id = format!("{class}->many_many.{name}");
        match to.many_many.get(name) {
            None => record_removed(cmp, module, &ctx, &id),
            Some(t) => diff_many_many(cmp, module, &ctx, &id, f, t),
        }
    }
}

/// Field-name -> spec-string maps: removal and spec changes only.
fn diff_value_map(
    cmp: &mut Comparator,
    module: &str,
    class: &str,
    ctx: &EntryContext,
    map_name: &str,
    from: &BTreeMap<String, String>,
    to: &BTreeMap<String, String>,
) {
    for (name, from_spec) in from {
        let id = format!("{class}->{map_name}.{name}");
        match to.get(name) {
            None => record_removed(cmp, module, ctx, &id),
            Some(to_spec) if to_spec != from_spec => {
                cmp.changes.record(
                    module,
                    ApiKind::Config,
                    &id,
                    ChangeEntry::new(
                        ctx.clone(),
                        ChangeDetail::Type {
                            from: from_spec.clone(),
                            to: to_spec.clone(),
                            from_orig: None,
                            to_orig: None,
                        },
                    ),
                );
            }
            Some(_) => {}
        }
    }
}

fn diff_has_one(
    cmp: &mut Comparator,
    module: &str,
    ctx: &EntryContext,
    id: &str,
    from: &HasOneSpec,
    to: &HasOneSpec,
) {
    if from.class != to.class {
        cmp.changes.record(
            module,
            ApiKind::Config,
            id,
            ChangeEntry::new(
                ctx.clone(),
                ChangeDetail::Type {
                    from: from.class.clone(),
                    to: to.class.clone(),
                    from_orig: None,
                    to_orig: None,
                },
            ),
        );
    }
    if from.multirelational != to.multirelational {
        cmp.changes.record(
            module,
            ApiKind::Config,
            id,
            ChangeEntry::new(
                ctx.clone(),
                ChangeDetail::Multirelational {
                    is_now: to.multirelational,
                },
            ),
        );
    }
}

fn diff_many_many(
    cmp: &mut Comparator,
    module: &str,
    ctx: &EntryContext,
    id: &str,
    from: &ManyManySpec,
    to: &ManyManySpec,
) {
    match (from, to) {
        (ManyManySpec::Direct { class: a }, ManyManySpec::Direct { class: b }) => {
            if a != b {
                cmp.changes.record(
                    module,
                    ApiKind::Config,
                    id,
                    ChangeEntry::new(
                        ctx.clone(),
                        ChangeDetail::Type {
                            from: a.clone(),
                            to: b.clone(),
                            from_orig: None,
                            to_orig: None,
                        },
                    ),
                );
            }
        }
        (ManyManySpec::Direct { .. }, ManyManySpec::Through(_)) => {
            cmp.changes.record(
                module,
                ApiKind::Config,
                id,
                ChangeEntry::new(ctx.clone(), ChangeDetail::Through { is_now: true }),
            );
        }
        (ManyManySpec::Through(_), ManyManySpec::Direct { .. }) => {
            cmp.changes.record(
                module,
                ApiKind::Config,
                id,
                ChangeEntry::new(ctx.clone(), ChangeDetail::Through { is_now: false }),
            );
        }
        (ManyManySpec::Through(a), ManyManySpec::Through(b)) => {
            if a != b {
                cmp.changes.record(
                    module,
                    ApiKind::Config,
                    id,
                    ChangeEntry::new(
                        ctx.clone(),
                        ChangeDetail::ThroughData {
                            from: describe_through(a),
                            to: describe_through(b),
                        },
                    ),
                );
            }
        }
    }
}

fn record_removed(cmp: &mut Comparator, module: &str, ctx: &EntryContext, id: &str) {
    cmp.changes.record(
        module,
        ApiKind::Config,
        id,
        ChangeEntry::new(
            ctx.clone(),
            ChangeDetail::Removed {
                message: String::new(),
            },
        ),
    );
}

fn describe_through(spec: &ThroughSpec) -> String {
    format!("{} (from={}, to={})", spec.through, spec.from, spec.to)
}
