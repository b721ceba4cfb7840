//! Module attribution: mapping a symbol's file path to its owning package.
//!
//! Cloned sources follow a fixed layout, `<root>/cloned/<from|to>/vendor/
//! <vendor>/<package>/...`; the captured `<vendor>/<package>` segment is the
//! module identity. A path outside that layout violates a structural
//! assumption and aborts the comparison.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::CompareError;

static MODULE_PATH: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"[/\\]cloned[/\\](?:from|to)[/\\]vendor[/\\]([^/\\]+)[/\\]([^/\\]+)[/\\]").unwrap()
});

/// Resolve the owning `vendor/package` module for a file path.
pub fn module_for_path(path: &str) -> Result<String, CompareError> {
    let caps = MODULE_PATH
        .captures(path)
        .ok_or_else(|| CompareError::ModuleResolution(path.to_string()))?;
    Ok(format!("{}/{}", &caps[1], &caps[2]))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolves_vendor_and_package() {
        let module =
            module_for_path("/work/cloned/from/vendor/acme/widgets/src/Foo.php").unwrap();
        assert_eq!(module, "acme/widgets");
    }

    #[test]
    fn test_resolves_to_side_paths_too() {
        let module =
            module_for_path("/work/cloned/to/vendor/acme/widgets/code/Bar.php").unwrap();
        assert_eq!(module, "acme/widgets");
    }

    #[test]
    fn test_file_directly_under_package_root() {
        let module = module_for_path("/work/cloned/from/vendor/acme/widgets/Foo.php").unwrap();
        assert_eq!(module, "acme/widgets");
    }

    #[test]
    fn test_missing_vendor_segment_is_fatal() {
        let err = module_for_path("/work/cloned/from/src/Foo.php").unwrap_err();
        assert!(matches!(err, CompareError::ModuleResolution(_)));
    }

    #[test]
    fn test_windows_separators() {
        let module =
            module_for_path(r"C:\work\cloned\from\vendor\acme\widgets\src\Foo.php").unwrap();
        assert_eq!(module, "acme/widgets");
    }
}
