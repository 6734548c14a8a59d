use std::path::PathBuf;

use thiserror::Error;

use crate::scanner::ParseError;

/// Errors raised while generating option files.
///
/// Only [`GenError::TemplateLoad`], [`GenError::Render`] and
/// [`GenError::Write`] are scoped to a single model; the generator records
/// them and moves on. Everything else aborts the run.
#[derive(Debug, Error)]
pub enum GenError {
    /// A required option is missing or a config file is unusable.
    #[error("configuration error: {message}")]
    Configuration { message: String },

    /// The source folder or one of its files could not be read.
    #[error("failed to read {}: {source}", path.display())]
    SourceRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A model file is not valid Go.
    #[error("failed to parse {}: {source}", path.display())]
    Extraction {
        path: PathBuf,
        #[source]
        source: ParseError,
    },

    /// The template file is missing or malformed.
    #[error("failed to load template {}: {source}", path.display())]
    TemplateLoad {
        path: PathBuf,
        #[source]
        source: Box<handlebars::TemplateError>,
    },

    /// The template failed against a model's context.
    #[error("failed to render {type_name}: {source}")]
    Render {
        type_name: String,
        #[source]
        source: Box<handlebars::RenderError>,
    },

    /// A rendered artifact could not be written.
    #[error("failed to write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The external formatter failed on a generated file.
    #[error("formatter failed on {}: {message}", path.display())]
    PostProcess { path: PathBuf, message: String },
}

impl GenError {
    /// Whether the generator may skip the affected model and continue.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            GenError::TemplateLoad { .. } | GenError::Render { .. } | GenError::Write { .. }
        )
    }
}
