//! Detection of hand-written overrides in a previously generated file.
//!
//! A developer may replace the generated `Where`, `Preload` or the
//! `<Model>WhereOption` type inside a `gen_*.go` file. Their exact source text
//! is captured here and replayed by the template on the next run.

use log::{debug, warn};
use std::io::ErrorKind;
use std::path::Path;

use crate::imports::ImportDeclaration;
use crate::scanner::{ParseError, SourceFile, parse_file};

/// Suffix of the option type generated for each model.
pub const OPTION_TYPE_SUFFIX: &str = "WhereOption";

const WHERE_METHOD: &str = "Where";
const PRELOAD_METHOD: &str = "Preload";

/// Overrides and imports found in a prior artifact.
///
/// `None` means the element was not present and the template default is
/// used.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PreservedOverrides {
    pub where_func: Option<String>,
    pub preload_func: Option<String>,
    pub option_type: Option<String>,
    /// All imports of the prior artifact, unfiltered.
    pub imports: Vec<ImportDeclaration>,
}

impl PreservedOverrides {
    /// Labels of the overrides present, for reporting.
    pub fn labels(&self) -> Vec<&'static str> {
        let mut labels = Vec::new();
        if self.option_type.is_some() {
            labels.push("option type");
        }
        if self.where_func.is_some() {
            labels.push("Where");
        }
        if self.preload_func.is_some() {
            labels.push("Preload");
        }
        labels
    }
}

/// Inspect the artifact at `path` for overrides of `type_name`.
///
/// A missing or unparsable file yields empty overrides; first-time
/// generation is the common case.
pub fn analyze(path: &Path, type_name: &str) -> PreservedOverrides {
    let content = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            debug!("{}: no previous artifact", path.display());
            return PreservedOverrides::default();
        }
        Err(e) => {
            warn!("{}: cannot read previous artifact, regenerating from scratch: {e}", path.display());
            return PreservedOverrides::default();
        }
    };

    match analyze_source(&content, type_name) {
        Ok(preserved) => preserved,
        Err(e) => {
            warn!(
                "{}: previous artifact does not parse ({e}), regenerating from scratch",
                path.display()
            );
            PreservedOverrides::default()
        }
    }
}

/// Inspect artifact source text for overrides of `type_name`.
pub fn analyze_source(src: &str, type_name: &str) -> Result<PreservedOverrides, ParseError> {
    let file = parse_file(src)?;
    Ok(collect(src, &file, &format!("{type_name}{OPTION_TYPE_SUFFIX}")))
}

fn collect(src: &str, file: &SourceFile, option_type: &str) -> PreservedOverrides {
    let mut preserved = PreservedOverrides {
        imports: file
            .imports
            .iter()
            .map(|spec| ImportDeclaration {
                alias: spec.alias.clone(),
                path: spec.path.clone(),
            })
            .collect(),
        ..Default::default()
    };

    for func in file.func_decls() {
        let Some(receiver) = &func.receiver else {
            continue;
        };
        if receiver.type_name != option_type {
            continue;
        }
        let text = func.span.slice(src).to_string();
        match func.name.name.as_str() {
            WHERE_METHOD => preserved.where_func = Some(text),
            PRELOAD_METHOD => preserved.preload_func = Some(text),
            _ => {}
        }
    }

    for decl in file.type_decls() {
        for spec in &decl.specs {
            if spec.name.name != option_type {
                continue;
            }
            let text = if decl.grouped {
                format!("type {}", spec.span.slice(src))
            } else {
                decl.span.slice(src).to_string()
            };
            preserved.option_type = Some(text);
        }
    }

    preserved
}

#[cfg(test)]
mod tests {
    use super::*;

    const ARTIFACT: &str = r#"package dao

import (
	"gorm.io/gorm"

	gus "gopay/util/seaenum"
)

type SMSWhereOption struct {
	ID       *uint64
	Currency *gus.Currency
}

// Where is hand-tuned.
func (o *SMSWhereOption) Where(db *gorm.DB) *gorm.DB {
	if o.ID != nil {
		db = db.Where("id = ?", *o.ID) // custom
	}
	return db
}

func (o *SMSWhereOption) Preload(db *gorm.DB) *gorm.DB {
	return db.Preload("Currency")
}

func (o *OtherWhereOption) Where(db *gorm.DB) *gorm.DB {
	return db
}
"#;

    #[test]
    fn test_captures_exact_override_spans() {
        let preserved = analyze_source(ARTIFACT, "SMS").unwrap();
        assert_eq!(
            preserved.where_func.as_deref(),
            Some(
                "func (o *SMSWhereOption) Where(db *gorm.DB) *gorm.DB {\n\tif o.ID != nil {\n\t\tdb = db.Where(\"id = ?\", *o.ID) // custom\n\t}\n\treturn db\n}"
            )
        );
        assert_eq!(
            preserved.preload_func.as_deref(),
            Some("func (o *SMSWhereOption) Preload(db *gorm.DB) *gorm.DB {\n\treturn db.Preload(\"Currency\")\n}")
        );
        assert_eq!(
            preserved.option_type.as_deref(),
            Some("type SMSWhereOption struct {\n\tID       *uint64\n\tCurrency *gus.Currency\n}")
        );
        assert_eq!(preserved.labels(), vec!["option type", "Where", "Preload"]);
    }

    #[test]
    fn test_collects_all_imports_unfiltered() {
        let preserved = analyze_source(ARTIFACT, "SMS").unwrap();
        assert_eq!(
            preserved.imports,
            vec![
                ImportDeclaration::new("gorm.io/gorm"),
                ImportDeclaration::aliased("gus", "gopay/util/seaenum"),
            ]
        );
    }

    #[test]
    fn test_other_receivers_do_not_match() {
        let preserved = analyze_source(ARTIFACT, "Other").unwrap();
        assert!(preserved.where_func.as_deref().unwrap().contains("OtherWhereOption"));
        assert_eq!(preserved.preload_func, None);
        assert_eq!(preserved.option_type, None);

        let none = analyze_source(ARTIFACT, "Missing").unwrap();
        assert!(none.labels().is_empty());
    }

    #[test]
    fn test_value_receiver_matches() {
        let src = "package dao\n\nfunc (o SMSWhereOption) Where(db *gorm.DB) *gorm.DB { return db }\n";
        let preserved = analyze_source(src, "SMS").unwrap();
        assert_eq!(
            preserved.where_func.as_deref(),
            Some("func (o SMSWhereOption) Where(db *gorm.DB) *gorm.DB { return db }")
        );
    }

    #[test]
    fn test_grouped_option_type_gets_type_keyword() {
        let src = "package dao\n\ntype (\n\tSMSWhereOption struct {\n\t\tID *uint64\n\t}\n)\n";
        let preserved = analyze_source(src, "SMS").unwrap();
        assert_eq!(
            preserved.option_type.as_deref(),
            Some("type SMSWhereOption struct {\n\t\tID *uint64\n\t}")
        );
    }

    #[test]
    fn test_missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let preserved = analyze(&dir.path().join("gen_sms.go"), "SMS");
        assert_eq!(preserved, PreservedOverrides::default());
    }

    #[test]
    fn test_unparsable_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("gen_sms.go");
        std::fs::write(&path, "package dao\n\nfunc (o *SMSWhereOption) Where( {\n").unwrap();
        assert_eq!(analyze(&path, "SMS"), PreservedOverrides::default());
    }
}
