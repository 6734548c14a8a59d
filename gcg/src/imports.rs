//! Import declarations and their deduplicated merge.

use serde::{Deserialize, Serialize};

/// One import of a Go file. The path is the identity; the alias is carried
/// along but never compared.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportDeclaration {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alias: Option<String>,
    pub path: String,
}

impl ImportDeclaration {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            alias: None,
            path: path.into(),
        }
    }

    pub fn aliased(alias: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            alias: Some(alias.into()),
            path: path.into(),
        }
    }
}

/// Union of the three import sources of one generated file.
///
/// Sources are visited in priority order (template defaults, imports carried
/// over from the model's source file, imports of the previous artifact). The
/// first declaration seen for a path wins, including its alias. The result
/// keeps first-occurrence order.
pub fn merge_imports(
    defaults: &[ImportDeclaration],
    filtered: &[ImportDeclaration],
    legacy: &[ImportDeclaration],
) -> Vec<ImportDeclaration> {
    let mut merged: Vec<ImportDeclaration> = Vec::with_capacity(defaults.len() + filtered.len() + legacy.len());
    for import in defaults.iter().chain(filtered).chain(legacy) {
        if !merged.iter().any(|existing| existing.path == import.path) {
            merged.push(import.clone());
        }
    }
    merged
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_merge_keeps_priority_order() {
        let defaults = vec![ImportDeclaration::new("gorm.io/gorm")];
        let filtered = vec![ImportDeclaration::aliased("gus", "gopay/util/seaenum")];
        let legacy = vec![ImportDeclaration::new("time")];

        let merged = merge_imports(&defaults, &filtered, &legacy);
        let paths: Vec<_> = merged.iter().map(|i| i.path.as_str()).collect();
        assert_eq!(paths, vec!["gorm.io/gorm", "gopay/util/seaenum", "time"]);
    }

    #[test]
    fn test_first_alias_wins_on_collision() {
        let defaults = vec![ImportDeclaration::new("gorm.io/gorm")];
        let filtered = vec![ImportDeclaration::aliased("g", "gorm.io/gorm")];
        let legacy = vec![
            ImportDeclaration::aliased("enum", "gopay/util/seaenum"),
            ImportDeclaration::aliased("gus", "gopay/util/seaenum"),
        ];

        let merged = merge_imports(&defaults, &filtered, &legacy);
        assert_eq!(
            merged,
            vec![
                ImportDeclaration::new("gorm.io/gorm"),
                ImportDeclaration::aliased("enum", "gopay/util/seaenum"),
            ]
        );
    }

    #[test]
    fn test_merged_size_equals_unique_paths() {
        let sets = [
            vec![
                ImportDeclaration::new("a"),
                ImportDeclaration::new("b"),
                ImportDeclaration::new("a"),
            ],
            vec![ImportDeclaration::new("b"), ImportDeclaration::aliased("x", "c")],
            vec![
                ImportDeclaration::new("c"),
                ImportDeclaration::new("d"),
                ImportDeclaration::new("a"),
            ],
        ];

        let merged = merge_imports(&sets[0], &sets[1], &sets[2]);
        let unique: HashSet<_> = sets.iter().flatten().map(|i| i.path.as_str()).collect();
        assert_eq!(merged.len(), unique.len());

        let merged_paths: HashSet<_> = merged.iter().map(|i| i.path.as_str()).collect();
        assert_eq!(merged_paths.len(), merged.len());
    }

    #[test]
    fn test_merge_of_empty_sources() {
        assert!(merge_imports(&[], &[], &[]).is_empty());
    }
}
