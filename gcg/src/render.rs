//! Template binding for generated option files.

use handlebars::Handlebars;
use serde::Serialize;
use std::path::{Path, PathBuf};

use crate::errors::GenError;
use crate::extractor::FieldDefinition;
use crate::imports::ImportDeclaration;
use crate::preserve::PreservedOverrides;

/// Context handed to the template for one model.
///
/// Field names are a stable contract: every template binds against them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GenerationModel {
    pub model_name: String,
    /// Source file the model was read from.
    pub file_name: String,
    pub package_name: String,
    pub template: String,
    pub struct_fields: Vec<FieldDefinition>,
    pub skip_where: bool,
    pub where_func: String,
    pub skip_preload: bool,
    pub preload_func: String,
    pub skip_where_option: bool,
    pub where_option_struct: String,
    pub imports: Vec<ImportContext>,
}

/// Import as seen by templates; `alias` is empty when there is none.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImportContext {
    pub alias: String,
    pub path: String,
}

impl From<&ImportDeclaration> for ImportContext {
    fn from(import: &ImportDeclaration) -> Self {
        Self {
            alias: import.alias.clone().unwrap_or_default(),
            path: import.path.clone(),
        }
    }
}

impl GenerationModel {
    pub fn new(
        model_name: impl Into<String>,
        file_name: impl Into<String>,
        package_name: impl Into<String>,
        template: impl Into<String>,
        struct_fields: Vec<FieldDefinition>,
        preserved: &PreservedOverrides,
        imports: &[ImportDeclaration],
    ) -> Self {
        Self {
            model_name: model_name.into(),
            file_name: file_name.into(),
            package_name: package_name.into(),
            template: template.into(),
            struct_fields,
            skip_where: preserved.where_func.is_some(),
            where_func: preserved.where_func.clone().unwrap_or_default(),
            skip_preload: preserved.preload_func.is_some(),
            preload_func: preserved.preload_func.clone().unwrap_or_default(),
            skip_where_option: preserved.option_type.is_some(),
            where_option_struct: preserved.option_type.clone().unwrap_or_default(),
            imports: imports.iter().map(ImportContext::from).collect(),
        }
    }
}

/// Identifier of a template file: its name without the last extension.
///
/// `templates/pkg.model.option.hbs` -> `pkg.model.option`
pub fn template_id(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// A loaded template, ready to render models.
pub struct TemplateRenderer {
    handlebars: Handlebars<'static>,
    id: String,
    path: PathBuf,
}

impl TemplateRenderer {
    /// Load and compile the template at `path`.
    pub fn load(path: &Path) -> Result<Self, GenError> {
        let id = template_id(path);
        let mut handlebars = Self::registry();
        handlebars
            .register_template_file(&id, path)
            .map_err(|source| GenError::TemplateLoad {
                path: path.to_path_buf(),
                source: Box::new(source),
            })?;
        Ok(Self {
            handlebars,
            id,
            path: path.to_path_buf(),
        })
    }

    /// Compile a template from memory under the given identifier.
    pub fn from_source(id: &str, source: &str) -> Result<Self, GenError> {
        let mut handlebars = Self::registry();
        handlebars
            .register_template_string(id, source)
            .map_err(|source| GenError::TemplateLoad {
                path: PathBuf::from(id),
                source: Box::new(source),
            })?;
        Ok(Self {
            handlebars,
            id: id.to_string(),
            path: PathBuf::from(id),
        })
    }

    fn registry() -> Handlebars<'static> {
        let mut handlebars = Handlebars::new();
        // A context field missing from the model is an error, not a blank.
        handlebars.set_strict_mode(true);
        handlebars.register_escape_fn(handlebars::no_escape);

        handlebars.register_helper("pointer", Box::new(pointer_helper));
        handlebars.register_helper("lower", Box::new(lower_helper));
        handlebars.register_helper("upper", Box::new(upper_helper));
        handlebars
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn render(&self, model: &GenerationModel) -> Result<String, GenError> {
        self.handlebars
            .render(&self.id, model)
            .map_err(|source| GenError::Render {
                type_name: model.model_name.clone(),
                source: Box::new(source),
            })
    }

    /// Render into memory, then replace the file at `output`.
    pub fn render_to_file(&self, model: &GenerationModel, output: &Path) -> Result<(), GenError> {
        let content = self.render(model)?;
        std::fs::write(output, content).map_err(|source| GenError::Write {
            path: output.to_path_buf(),
            source,
        })
    }
}

// Handlebars helpers

/// `{{pointer type}}`: make a field type nilable for use in an option struct.
fn pointer_helper(
    h: &handlebars::Helper,
    _: &Handlebars,
    _: &handlebars::Context,
    _: &mut handlebars::RenderContext,
    out: &mut dyn handlebars::Output,
) -> handlebars::HelperResult {
    let param = h.param(0).and_then(|v| v.value().as_str()).unwrap_or("");
    out.write(&pointer_type(param))?;
    Ok(())
}

fn lower_helper(
    h: &handlebars::Helper,
    _: &Handlebars,
    _: &handlebars::Context,
    _: &mut handlebars::RenderContext,
    out: &mut dyn handlebars::Output,
) -> handlebars::HelperResult {
    let param = h.param(0).and_then(|v| v.value().as_str()).unwrap_or("");
    out.write(&param.to_lowercase())?;
    Ok(())
}

fn upper_helper(
    h: &handlebars::Helper,
    _: &Handlebars,
    _: &handlebars::Context,
    _: &mut handlebars::RenderContext,
    out: &mut dyn handlebars::Output,
) -> handlebars::HelperResult {
    let param = h.param(0).and_then(|v| v.value().as_str()).unwrap_or("");
    out.write(&param.to_uppercase())?;
    Ok(())
}

fn pointer_type(ty: &str) -> String {
    if ty.starts_with('*') || ty.starts_with("[]") || ty.starts_with("map[") {
        ty.to_string()
    } else {
        format!("*{ty}")
    }
}
