//! Compare command - run the breaking-change comparison over two snapshots.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use colored::Colorize;
use tracing::debug;

use apidiff_core::differ::{ActionKind, ChangeDetail, ChangeKind};
use apidiff_core::exporter::json;
use apidiff_core::{compare_snapshots, Comparison, Snapshot, SnapshotPair};

use crate::output::OutputFormat;

pub struct CompareArgs {
    pub from: PathBuf,
    pub to: PathBuf,
    pub format: OutputFormat,
    pub output: Option<PathBuf>,
    pub fail_on_breaking: bool,
}

pub fn run(args: CompareArgs) -> Result<i32> {
    let pair = SnapshotPair::new(load_snapshot(&args.from)?, load_snapshot(&args.to)?);
    let comparison = compare_snapshots(&pair).context("comparison failed")?;
    debug!(summary = %comparison.summary.text(), "comparison finished");

    let rendered = match args.format {
        OutputFormat::Json => json::export(&comparison, true)?,
        OutputFormat::Report => report(&comparison),
    };
    match &args.output {
        Some(path) => fs::write(path, rendered + "\n")
            .with_context(|| format!("failed to write {}", path.display()))?,
        None => println!("{rendered}"),
    }

    if args.fail_on_breaking && !comparison.breaking_changes.is_empty() {
        return Ok(2);
    }
    Ok(0)
}

fn load_snapshot(path: &Path) -> Result<Snapshot> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read snapshot {}", path.display()))?;
    serde_json::from_str(&raw)
        .with_context(|| format!("failed to parse snapshot {}", path.display()))
}

/// Human-readable report: breaking changes first, then actions, grouped by
/// module in key order.
fn report(comparison: &Comparison) -> String {
    let mut out = String::new();

    out.push_str(&format!(
        "{} {}\n",
        "COMPARE:".cyan().bold(),
        comparison.summary.text()
    ));

    if !comparison.breaking_changes.is_empty() {
        out.push('\n');
        out.push_str(&format!("{}\n", "BREAKING CHANGES:".red().bold()));
        out.push_str(&format!("{}\n", "-".repeat(60)));

        let mut current_module = "";
        for (module, kind, api, id, entry) in comparison.breaking_changes.iter() {
            if module != current_module {
                out.push_str(&format!("{}\n", module.cyan()));
                current_module = module;
            }
            let name = if kind == ChangeKind::Removed {
                id.red().bold()
            } else {
                id.yellow()
            };
            out.push_str(&format!(
                "  [{}] {} {}",
                kind.as_str().dimmed(),
                api.as_str(),
                name
            ));
            let detail = describe_change(&entry.detail);
            if !detail.is_empty() {
                out.push_str(&format!("  {detail}"));
            }
            out.push('\n');
            if let Some(ref file) = entry.context.file {
                out.push_str(&format!(
                    "      {}\n",
                    format!("{}:{}", file, entry.context.line).dimmed()
                ));
            }
        }
    }

    if !comparison.actions_to_take.is_empty() {
        out.push('\n');
        out.push_str(&format!("{}\n", "ACTIONS TO TAKE:".yellow().bold()));
        out.push_str(&format!("{}\n", "-".repeat(60)));

        let mut current_module = "";
        for (module, action, api, id, entry) in comparison.actions_to_take.iter() {
            if module != current_module {
                out.push_str(&format!("{}\n", module.cyan()));
                current_module = module;
            }
            out.push_str(&format!(
                "  [{}] {} {}",
                action.as_str().dimmed(),
                api.as_str(),
                id.yellow()
            ));
            if action == ActionKind::FixDeprecation {
                if let Some(ref message) = entry.message {
                    out.push_str(&format!("  {message}"));
                }
            }
            out.push('\n');
        }
    }

    if comparison.breaking_changes.is_empty() && comparison.actions_to_take.is_empty() {
        out.push_str(&format!(
            "\n{}\n",
            "No API surface differences detected.".dimmed()
        ));
    }

    out
}

/// One-line rendering of a change payload.
fn describe_change(detail: &ChangeDetail) -> String {
    match detail {
        ChangeDetail::Removed { message } | ChangeDetail::Internal { message } => {
            if message.is_empty() {
                String::new()
            } else {
                format!("deprecated: {message}")
            }
        }
        ChangeDetail::Visibility { from, to } => format!("{} -> {}", from.as_str(), to.as_str()),
        ChangeDetail::ReturnType { from, to, .. } => format!("{from} -> {to}"),
        ChangeDetail::Type { from, to, .. } => format!("{from} -> {to}"),
        ChangeDetail::Renamed { from, to } => format!("{from} -> {to}"),
        ChangeDetail::New { hint } => match hint {
            Some(hint) => format!("new parameter: {hint}"),
            None => "new parameter".to_string(),
        },
        ChangeDetail::Abstract {} => "now abstract".to_string(),
        ChangeDetail::Final {} => "now final".to_string(),
        ChangeDetail::ReturnByRef { is_now } => flag_text("returns by reference", *is_now),
        ChangeDetail::PassByRef { is_now } => flag_text("passed by reference", *is_now),
        ChangeDetail::Readonly { is_now } => flag_text("readonly", *is_now),
        ChangeDetail::Variadic { is_now } => flag_text("variadic", *is_now),
        ChangeDetail::Default { from, to } => format!(
            "default {} -> {}",
            from.as_deref().unwrap_or("none"),
            to.as_deref().unwrap_or("none")
        ),
        ChangeDetail::Static { is_now } => flag_text("static", *is_now),
        ChangeDetail::Multirelational { is_now } => flag_text("multirelational", *is_now),
        ChangeDetail::Through { is_now } => flag_text("uses a through model", *is_now),
        ChangeDetail::ThroughData { from, to } => format!("{from} -> {to}"),
    }
}

fn flag_text(what: &str, is_now: bool) -> String {
    if is_now {
        format!("now {what}")
    } else {
        format!("no longer {what}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use apidiff_core::types::Visibility;

    const FROM_FILE: &str = "/work/cloned/from/vendor/acme/widgets/src/Foo.php";

    fn from_snapshot_json() -> String {
        serde_json::json!({
            "classes": {
                "Foo": { "name": "Foo", "file": FROM_FILE, "line": 3 }
            }
        })
        .to_string()
    }

    #[test]
    fn test_describe_change_texts() {
        assert_eq!(
            describe_change(&ChangeDetail::Visibility {
                from: Visibility::Protected,
                to: Visibility::Public
            }),
            "protected -> public"
        );
        assert_eq!(
            describe_change(&ChangeDetail::Removed {
                message: "Use Bar instead.".into()
            }),
            "deprecated: Use Bar instead."
        );
        assert_eq!(
            describe_change(&ChangeDetail::Removed {
                message: String::new()
            }),
            ""
        );
        assert_eq!(
            describe_change(&ChangeDetail::Variadic { is_now: false }),
            "no longer variadic"
        );
    }

    #[test]
    fn test_report_lists_modules_and_entries() {
        colored::control::set_override(false);

        let dir = tempfile::tempdir().unwrap();
        let from_path = dir.path().join("from.json");
        let to_path = dir.path().join("to.json");
        fs::write(&from_path, from_snapshot_json()).unwrap();
        fs::write(&to_path, "{}").unwrap();

        let pair = SnapshotPair::new(
            load_snapshot(&from_path).unwrap(),
            load_snapshot(&to_path).unwrap(),
        );
        let comparison = compare_snapshots(&pair).unwrap();
        let text = report(&comparison);

        assert!(text.contains("BREAKING CHANGES:"));
        assert!(text.contains("acme/widgets"));
        assert!(text.contains("[removed] class Foo"));
        assert!(text.contains("[deprecate] class Foo"));
        assert!(text.contains(&format!("{FROM_FILE}:3")));
    }

    #[test]
    fn test_run_writes_json_catalogue() {
        let dir = tempfile::tempdir().unwrap();
        let from_path = dir.path().join("from.json");
        let to_path = dir.path().join("to.json");
        let out_path = dir.path().join("catalogue.json");
        fs::write(&from_path, from_snapshot_json()).unwrap();
        fs::write(&to_path, "{}").unwrap();

        let code = run(CompareArgs {
            from: from_path,
            to: to_path,
            format: OutputFormat::Json,
            output: Some(out_path.clone()),
            fail_on_breaking: false,
        })
        .unwrap();
        assert_eq!(code, 0);

        let value: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&out_path).unwrap()).unwrap();
        assert!(value["breakingChanges"]["acme/widgets"]["removed"]["class"]
            .get("Foo")
            .is_some());
    }

    #[test]
    fn test_fail_on_breaking_exit_code() {
        let dir = tempfile::tempdir().unwrap();
        let from_path = dir.path().join("from.json");
        let to_path = dir.path().join("to.json");
        fs::write(&from_path, from_snapshot_json()).unwrap();
        fs::write(&to_path, "{}").unwrap();

        let code = run(CompareArgs {
            from: from_path.clone(),
            to: to_path.clone(),
            format: OutputFormat::Json,
            output: Some(dir.path().join("out.json")),
            fail_on_breaking: true,
        })
        .unwrap();
        assert_eq!(code, 2);

        // Identical snapshots: a clean run even with the gate on.
        let code = run(CompareArgs {
            from: from_path.clone(),
            to: from_path,
            format: OutputFormat::Json,
            output: Some(dir.path().join("out2.json")),
            fail_on_breaking: true,
        })
        .unwrap();
        assert_eq!(code, 0);
    }

    #[test]
    fn test_unreadable_snapshot_is_a_cli_error() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.json");
        let err = load_snapshot(&missing).unwrap_err();
        assert!(err.to_string().contains("failed to read snapshot"));
    }
}
