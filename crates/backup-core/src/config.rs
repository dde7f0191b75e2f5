//! Backup configuration document.
//!
//! The config is a JSON document of shape
//! `{ "items": [ {"name", "sourceDir", "destDir"}, ... ] }`. Item order is
//! significant: items are processed in configuration order. Validation
//! happens at load time so artifact-path collisions are impossible later.

use std::collections::HashSet;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// One configured source/destination directory pair.
///
/// Immutable once loaded; the orchestrator only reads it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BackupItem {
    /// Unique name within the run, used for artifact file naming
    pub name: String,
    /// Directory (or rclone remote path) to back up
    pub source_dir: String,
    /// Directory (or rclone remote path) to back up into
    pub dest_dir: String,
}

/// The ordered set of backup items for a run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackupConfig {
    /// Backup items, processed in this order
    pub items: Vec<BackupItem>,
}

impl BackupConfig {
    /// Load and validate a backup config from a JSON file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|source| Error::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;

        let config: Self =
            serde_json::from_str(&content).map_err(|e| Error::ConfigParse {
                path: path.to_path_buf(),
                message: e.to_string(),
            })?;

        config.validate()?;
        Ok(config)
    }

    /// Validate the loaded document.
    ///
    /// Every item needs all three fields non-empty, a name that is safe as
    /// a file-name component, and a name no other item uses.
    fn validate(&self) -> Result<()> {
        let mut seen = HashSet::new();

        for (index, item) in self.items.iter().enumerate() {
            if item.name.is_empty() {
                return Err(invalid(format!("item {}: name must not be empty", index)));
            }
            if item.name.contains(['/', '\\']) || item.name.contains("..") {
                return Err(invalid(format!(
                    "item '{}': name must not contain path separators or '..'",
                    item.name
                )));
            }
            if item.source_dir.is_empty() {
                return Err(invalid(format!(
                    "item '{}': sourceDir must not be empty",
                    item.name
                )));
            }
            if item.dest_dir.is_empty() {
                return Err(invalid(format!(
                    "item '{}': destDir must not be empty",
                    item.name
                )));
            }
            if !seen.insert(item.name.as_str()) {
                return Err(invalid(format!("duplicate item name '{}'", item.name)));
            }
        }

        Ok(())
    }
}

fn invalid(message: String) -> Error {
    Error::ConfigInvalid { message }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;
    use tempfile::TempDir;

    fn load_str(content: &str) -> Result<BackupConfig> {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.json");
        fs::write(&path, content).unwrap();
        BackupConfig::load(&path)
    }

    #[test]
    fn test_load_valid_config() {
        let config = load_str(
            r#"{"items": [
                {"name": "docs", "sourceDir": "/home/docs", "destDir": "remote:docs"},
                {"name": "photos", "sourceDir": "/home/photos", "destDir": "remote:photos"}
            ]}"#,
        )
        .unwrap();

        assert_eq!(config.items.len(), 2);
        assert_eq!(config.items[0].name, "docs");
        assert_eq!(config.items[0].source_dir, "/home/docs");
        assert_eq!(config.items[1].dest_dir, "remote:photos");
    }

    #[test]
    fn test_load_preserves_item_order() {
        let config = load_str(
            r#"{"items": [
                {"name": "b", "sourceDir": "/b", "destDir": "/db"},
                {"name": "a", "sourceDir": "/a", "destDir": "/da"}
            ]}"#,
        )
        .unwrap();

        let names: Vec<_> = config.items.iter().map(|i| i.name.as_str()).collect();
        assert_eq!(names, vec!["b", "a"]);
    }

    #[test]
    fn test_empty_items_is_valid() {
        let config = load_str(r#"{"items": []}"#).unwrap();
        assert!(config.items.is_empty());
    }

    #[test]
    fn test_missing_items_key_is_parse_error() {
        let result = load_str(r#"{}"#);
        assert!(matches!(result, Err(Error::ConfigParse { .. })));
    }

    #[test]
    fn test_malformed_json_is_parse_error() {
        let result = load_str("{not json");
        assert!(matches!(result, Err(Error::ConfigParse { .. })));
    }

    #[test]
    fn test_missing_file_is_read_error() {
        let temp = TempDir::new().unwrap();
        let result = BackupConfig::load(&temp.path().join("absent.json"));
        assert!(matches!(result, Err(Error::ConfigRead { .. })));
    }

    #[rstest]
    #[case(r#"{"items": [{"name": "", "sourceDir": "/s", "destDir": "/d"}]}"#)]
    #[case(r#"{"items": [{"name": "docs", "sourceDir": "", "destDir": "/d"}]}"#)]
    #[case(r#"{"items": [{"name": "docs", "sourceDir": "/s", "destDir": ""}]}"#)]
    fn test_empty_fields_are_rejected(#[case] content: &str) {
        let result = load_str(content);
        assert!(matches!(result, Err(Error::ConfigInvalid { .. })));
    }

    #[test]
    fn test_duplicate_names_are_rejected() {
        let result = load_str(
            r#"{"items": [
                {"name": "docs", "sourceDir": "/a", "destDir": "/b"},
                {"name": "docs", "sourceDir": "/c", "destDir": "/d"}
            ]}"#,
        );

        let err = result.unwrap_err();
        assert!(err.to_string().contains("duplicate item name 'docs'"));
    }

    #[rstest]
    #[case("a/b")]
    #[case("a\\b")]
    #[case("..")]
    fn test_unsafe_names_are_rejected(#[case] name: &str) {
        let content = format!(
            r#"{{"items": [{{"name": "{}", "sourceDir": "/s", "destDir": "/d"}}]}}"#,
            name.replace('\\', "\\\\")
        );
        let result = load_str(&content);
        assert!(matches!(result, Err(Error::ConfigInvalid { .. })));
    }
}
