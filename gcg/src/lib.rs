//! Query-option companion files for gorm models.
//!
//! This crate scans a folder of Go model files for struct declarations and
//! renders one `gen_<model>.go` file per struct from a handlebars template.
//! Hand-written `Where`, `Preload` and `<Model>WhereOption` overrides in a
//! previously generated file are carried over verbatim, so regenerating is
//! safe after a model changes.
//!
//! # Example
//!
//! ```no_run
//! let report = gcg::generate("internal/dao", "templates/pkg.model.option.hbs")
//!     .package_filter("gopay")
//!     .run()
//!     .expect("generation failed");
//!
//! for artifact in &report.generated {
//!     println!("{}", artifact.output.display());
//! }
//! ```
//!
//! Opting out is done with a doc comment on the type:
//!
//! ```go
//! // gopher:gen_disable
//! type Audit struct { ... }
//! ```
//!
//! or with a `gopher:"-"` tag on a field.

pub mod config;
pub mod errors;
pub mod extractor;
pub mod formatter;
pub mod generator;
pub mod imports;
pub mod naming;
pub mod preserve;
pub mod render;
pub mod scanner;

use std::path::PathBuf;

pub use config::GenConfig;
pub use errors::GenError;
pub use formatter::{CommandFormatter, Formatter};
pub use generator::{GenerationReport, Generator};
pub use imports::{ImportDeclaration, merge_imports};
pub use naming::NameTransformer;

/// Create a generator for `folder` with default settings.
pub fn generate(folder: impl Into<PathBuf>, template: impl Into<PathBuf>) -> Generator {
    Generator::new(folder, template)
}
