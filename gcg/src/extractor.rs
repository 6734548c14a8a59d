//! Extraction of model structs and carried-over imports from a Go file.

use log::debug;
use serde::Serialize;
use std::path::{Path, PathBuf};

use crate::config::GenConfig;
use crate::errors::GenError;
use crate::imports::ImportDeclaration;
use crate::naming::NameTransformer;
use crate::scanner::{FieldDecl, ParseError, SourceFile, StructTag, TypeKind, parse_file};

/// A source file together with its parsed declarations.
#[derive(Debug, Clone)]
pub struct SourceUnit {
    pub path: PathBuf,
    pub content: String,
    pub file: SourceFile,
}

impl SourceUnit {
    /// Read and parse a file. Both failures are fatal for a generation run.
    pub fn read(path: &Path) -> Result<Self, GenError> {
        let content = std::fs::read_to_string(path).map_err(|source| GenError::SourceRead {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(path, content).map_err(|source| GenError::Extraction {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn parse(path: impl Into<PathBuf>, content: String) -> Result<Self, ParseError> {
        let file = parse_file(&content)?;
        Ok(Self {
            path: path.into(),
            content,
            file,
        })
    }

    /// File name without directories, e.g. `sms_domain.go`.
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }
}

/// One retained struct field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldDefinition {
    pub name: String,
    /// Declared type exactly as written in the source.
    #[serde(rename = "type")]
    pub type_text: String,
    pub name_snake: String,
    /// Trailing line comment without its marker, empty when absent.
    pub comment: String,
}

/// A struct eligible for generation, fields in declaration order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeDefinition {
    pub name: String,
    pub fields: Vec<FieldDefinition>,
}

/// Everything the generator needs from one model file.
#[derive(Debug, Clone, Default)]
pub struct Extraction {
    pub package: String,
    /// Types in discovery order; names are unique.
    pub types: Vec<TypeDefinition>,
    /// Imports whose path matches the package filter.
    pub imports: Vec<ImportDeclaration>,
}

impl Extraction {
    pub fn type_named(&self, name: &str) -> Option<&TypeDefinition> {
        self.types.iter().find(|t| t.name == name)
    }

    fn insert(&mut self, def: TypeDefinition) {
        match self.types.iter_mut().find(|t| t.name == def.name) {
            Some(existing) => *existing = def,
            None => self.types.push(def),
        }
    }
}

/// Walks a parsed file and collects model structs, honoring opt-out markers.
pub struct TypeExtractor<'a> {
    config: &'a GenConfig,
    package_filter: &'a str,
    names: NameTransformer,
}

impl<'a> TypeExtractor<'a> {
    pub fn new(config: &'a GenConfig, package_filter: &'a str) -> Self {
        Self {
            config,
            package_filter,
            names: NameTransformer::new(config.naming.initialisms.clone()),
        }
    }

    pub fn extract(&self, unit: &SourceUnit) -> Extraction {
        let src = unit.content.as_str();
        let mut extraction = Extraction {
            package: unit.file.package.name.clone(),
            ..Default::default()
        };

        extraction.imports = unit
            .file
            .imports
            .iter()
            .filter(|spec| !self.package_filter.is_empty() && spec.path.contains(self.package_filter))
            .map(|spec| ImportDeclaration {
                alias: spec.alias.clone(),
                path: spec.path.clone(),
            })
            .collect();

        for decl in unit.file.type_decls() {
            for spec in &decl.specs {
                let TypeKind::Struct(fields) = &spec.ty.kind else {
                    continue;
                };
                let disabled = [decl.doc.as_deref(), spec.doc.as_deref()]
                    .into_iter()
                    .flatten()
                    .any(|doc| self.doc_disables(doc));
                if disabled {
                    debug!("{}: skipping {} (disabled by doc comment)", unit.path.display(), spec.name.name);
                    continue;
                }

                let fields = fields
                    .iter()
                    .flat_map(|field| self.field_definitions(src, &spec.name.name, field))
                    .collect();
                extraction.insert(TypeDefinition {
                    name: spec.name.name.clone(),
                    fields,
                });
            }
        }

        extraction
    }

    fn field_definitions(&self, src: &str, type_name: &str, field: &FieldDecl) -> Vec<FieldDefinition> {
        if field.is_embedded() {
            // Promoted fields are not flattened.
            debug!(
                "{type_name}: skipping embedded field {}",
                field.ty.span.slice(src)
            );
            return Vec::new();
        }
        if field.tag.as_ref().is_some_and(|tag| self.tag_disables(tag)) {
            debug!("{type_name}: skipping field {} (disabled by tag)", field.names[0].name);
            return Vec::new();
        }
        if let Some(doc) = &field.doc
            && doc.contains(&self.config.markers.doc_marker)
        {
            debug!(
                "{type_name}: field {} carries a doc comment marker, which only applies to types; use a tag",
                field.names[0].name
            );
        }

        let type_text = field.ty.span.slice(src).to_string();
        let comment = field.comment.as_deref().map(comment_body).unwrap_or_default();
        field
            .names
            .iter()
            .map(|name| FieldDefinition {
                name: name.name.clone(),
                type_text: type_text.clone(),
                name_snake: self.names.to_snake(&name.name),
                comment: comment.clone(),
            })
            .collect()
    }

    fn tag_disables(&self, tag: &StructTag) -> bool {
        let markers = &self.config.markers;
        tag.options(&markers.tag_key)
            .iter()
            .any(|option| markers.is_disable_value(option))
    }

    /// `// gopher:gen_disable` anywhere in the doc, or a tag-style directive
    /// line such as `// gopher:"-"`.
    fn doc_disables(&self, doc: &str) -> bool {
        if doc.contains(&self.config.markers.doc_marker) {
            return true;
        }
        doc.lines()
            .map(comment_body)
            .any(|line| self.tag_disables(&StructTag::new(line)))
    }
}

/// Text of a comment without `//` or `/* */` markers.
fn comment_body(comment: &str) -> String {
    let comment = comment.trim();
    let body = if let Some(line) = comment.strip_prefix("//") {
        line
    } else if let Some(block) = comment.strip_prefix("/*") {
        block.strip_suffix("*/").unwrap_or(block)
    } else {
        comment
    };
    body.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn extract(src: &str) -> Extraction {
        let config = GenConfig::default();
        let unit = SourceUnit::parse("model.go", src.to_string()).unwrap();
        TypeExtractor::new(&config, &config.source.package_filter).extract(&unit)
    }

    fn field_names(def: &TypeDefinition) -> Vec<&str> {
        def.fields.iter().map(|f| f.name.as_str()).collect()
    }

    #[test]
    fn test_extracts_fields_in_order_with_raw_types() {
        let src = r#"package dao

import (
	"time"
)

type AppVersionDomain struct {
	AppID         string    `json:"app_id" db:"app_id"`
	DownloadURL   *string   `json:"download_url" db:"download_url"`
	CreatedAt     time.Time `json:"created_at" db:"created_at" binding:"-"`
}
"#;
        let extraction = extract(src);
        assert_eq!(extraction.package, "dao");
        let def = extraction.type_named("AppVersionDomain").unwrap();
        assert_eq!(field_names(def), vec!["AppID", "DownloadURL", "CreatedAt"]);
        assert_eq!(def.fields[1].type_text, "*string");
        assert_eq!(def.fields[1].name_snake, "download_url");
        assert_eq!(def.fields[2].type_text, "time.Time");
        // `binding:"-"` is not the opt-out key.
        assert_eq!(def.fields.len(), 3);
    }

    #[test]
    fn test_imports_are_filtered_by_substring() {
        let src = r#"package dao

import (
	"time"

	gus "gopay/util/seaenum"
	"github.com/acme/gopay-sdk"
)

type SMS struct {
	ID uint64
}
"#;
        let extraction = extract(src);
        assert_eq!(
            extraction.imports,
            vec![
                ImportDeclaration::aliased("gus", "gopay/util/seaenum"),
                ImportDeclaration::new("github.com/acme/gopay-sdk"),
            ]
        );
    }

    #[test]
    fn test_empty_filter_matches_nothing() {
        let config = GenConfig::default();
        let unit = SourceUnit::parse("m.go", "package p\n\nimport \"gopay/x\"\n".to_string()).unwrap();
        let extraction = TypeExtractor::new(&config, "").extract(&unit);
        assert!(extraction.imports.is_empty());
    }

    #[test]
    fn test_type_level_opt_out_removes_type_entirely() {
        let src = r#"package dao

// Legacy is kept for reads only.
// gopher:gen_disable
type Legacy struct {
	ID   uint64
	Name string `gopher:"-"`
}

// gopher:"-"
type Hidden struct {
	ID uint64
}

type Kept struct {
	ID uint64
}
"#;
        let extraction = extract(src);
        let names: Vec<_> = extraction.types.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["Kept"]);
    }

    #[test]
    fn test_grouped_spec_doc_can_opt_out() {
        let src = r#"package dao

type (
	// gopher:gen_disable
	Skipped struct{ A int }
	Included struct{ B int }
)
"#;
        let extraction = extract(src);
        assert!(extraction.type_named("Skipped").is_none());
        assert!(extraction.type_named("Included").is_some());
    }

    #[test]
    fn test_field_tag_opt_out_keeps_relative_order() {
        let src = r#"package dao

type Order struct {
	OrderID   string
	Secret    string `json:"-" gopher:"-"`
	Amount    int64
	Internal  string `gopher:"gen_disable"`
	CreatedAt int64
}
"#;
        let extraction = extract(src);
        let def = extraction.type_named("Order").unwrap();
        assert_eq!(field_names(def), vec!["OrderID", "Amount", "CreatedAt"]);
        assert_eq!(def.fields[0].name_snake, "order_id");
    }

    #[test]
    fn test_field_doc_marker_is_not_an_opt_out() {
        let src = r#"package dao

type Order struct {
	// gopher:gen_disable
	Note string
}
"#;
        let extraction = extract(src);
        assert_eq!(field_names(extraction.type_named("Order").unwrap()), vec!["Note"]);
    }

    #[test]
    fn test_embedded_fields_skipped_and_multi_name_expanded() {
        let src = r#"package dao

type Base struct {
	ID int
}

type Account struct {
	Base
	*pkg.Audit
	First, Last string // names
}
"#;
        let extraction = extract(src);
        let def = extraction.type_named("Account").unwrap();
        assert_eq!(field_names(def), vec!["First", "Last"]);
        assert_eq!(def.fields[1].type_text, "string");
        assert_eq!(def.fields[1].comment, "names");
    }

    #[test]
    fn test_non_struct_types_are_ignored_and_empty_structs_kept() {
        let src = r#"package dao

type Status int
type Handler func(int) error
type Empty struct{}
type OnlyHidden struct {
	X int `gopher:"-"`
}
"#;
        let extraction = extract(src);
        let names: Vec<_> = extraction.types.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["Empty", "OnlyHidden"]);
        assert!(extraction.types.iter().all(|t| t.fields.is_empty()));
    }

    #[test]
    fn test_read_reports_parse_error_with_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.go");
        std::fs::write(&path, "package dao\n\ntype Broken struct {\n").unwrap();
        match SourceUnit::read(&path) {
            Err(GenError::Extraction { path: p, source }) => {
                assert_eq!(p, path);
                assert!(source.line >= 3);
            }
            other => panic!("expected extraction error, got {other:?}"),
        }
    }

    #[test]
    fn test_comment_body() {
        assert_eq!(comment_body("// 流水號"), "流水號");
        assert_eq!(comment_body("/* block */"), "block");
        assert_eq!(comment_body("//tight"), "tight");
    }
}
