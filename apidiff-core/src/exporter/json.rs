//! JSON export of the comparison catalogue.

use crate::differ::Comparison;

/// Serialize a comparison to the nested-map contract consumed by renderers:
/// module -> change kind -> symbol kind -> symbol identifier -> record.
pub fn export(comparison: &Comparison, pretty: bool) -> Result<String, serde_json::Error> {
    if pretty {
        serde_json::to_string_pretty(comparison)
    } else {
        serde_json::to_string(comparison)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::differ::compare_snapshots;
    use crate::snapshot::{Snapshot, SnapshotPair};
    use crate::types::ClassDef;

    fn removed_class_comparison() -> Comparison {
        let mut from = Snapshot::default();
        from.classes.insert(
            "Foo".into(),
            ClassDef {
                name: "Foo".into(),
                file: Some("/work/cloned/from/vendor/acme/widgets/src/Foo.php".into()),
                line: 3,
                ..ClassDef::default()
            },
        );
        let pair = SnapshotPair::new(from, Snapshot::default());
        compare_snapshots(&pair).unwrap()
    }

    #[test]
    fn test_export_nests_by_module_kind_api_and_id() {
        let output = export(&removed_class_comparison(), false).unwrap();
        let value: serde_json::Value = serde_json::from_str(&output).unwrap();

        let record = &value["breakingChanges"]["acme/widgets"]["removed"]["class"]["Foo"];
        assert_eq!(record["message"], "");
        assert!(value["actionsToTake"]["acme/widgets"]["deprecate"]["class"]
            .get("Foo")
            .is_some());
        assert_eq!(value["summary"]["totalChanges"], 1);
    }

    #[test]
    fn test_export_pretty() {
        let output = export(&removed_class_comparison(), true).unwrap();
        assert!(output.contains('\n'));
    }
}
