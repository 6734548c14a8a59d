//! Batch generation over a folder of model files.

use log::{debug, info, warn};
use serde::Serialize;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::config::GenConfig;
use crate::errors::GenError;
use crate::extractor::{SourceUnit, TypeExtractor};
use crate::formatter::Formatter;
use crate::imports::merge_imports;
use crate::naming::NameTransformer;
use crate::preserve;
use crate::render::{GenerationModel, TemplateRenderer};

/// Builder for configuring and running a generation batch.
pub struct Generator {
    folder: PathBuf,
    template: PathBuf,
    package_filter: Option<String>,
    config: Option<GenConfig>,
    formatter: Option<Box<dyn Formatter>>,
    dry_run: bool,
}

impl Generator {
    /// Generate for the model files directly inside `folder` using the
    /// template file at `template`.
    pub fn new(folder: impl Into<PathBuf>, template: impl Into<PathBuf>) -> Self {
        Self {
            folder: folder.into(),
            template: template.into(),
            package_filter: None,
            config: None,
            formatter: None,
            dry_run: false,
        }
    }

    /// Substring an import path must contain to be carried over from the
    /// model file.
    ///
    /// Default: the configured `source.package_filter` (`gopay`)
    pub fn package_filter(mut self, filter: impl Into<String>) -> Self {
        self.package_filter = Some(filter.into());
        self
    }

    /// Use this configuration instead of discovering `gcg.toml` in the folder.
    pub fn config(mut self, config: GenConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Run `formatter` over every written file once the batch is done.
    pub fn formatter(mut self, formatter: Box<dyn Formatter>) -> Self {
        self.formatter = Some(formatter);
        self
    }

    /// Render everything but write nothing.
    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Run the batch.
    ///
    /// Read and parse failures abort the run, as does a formatter failure.
    /// Template and write failures only skip the affected model and are
    /// listed in the report.
    pub fn run(self) -> Result<GenerationReport, GenError> {
        if self.folder.as_os_str().is_empty() {
            return Err(GenError::Configuration {
                message: "folder is required".to_string(),
            });
        }
        if self.template.as_os_str().is_empty() {
            return Err(GenError::Configuration {
                message: "template is required".to_string(),
            });
        }

        let config = match self.config {
            Some(config) => config,
            None => GenConfig::discover(&self.folder)?,
        };
        let package_filter = self
            .package_filter
            .unwrap_or_else(|| config.source.package_filter.clone());
        let extractor = TypeExtractor::new(&config, &package_filter);
        let names = NameTransformer::new(config.naming.initialisms.clone());

        let mut report = GenerationReport::default();
        for path in candidate_files(&self.folder, &config)? {
            let unit = SourceUnit::read(&path)?;
            let extraction = extractor.extract(&unit);
            if extraction.types.is_empty() {
                debug!("{}: no model structs", path.display());
                continue;
            }

            let renderer = match TemplateRenderer::load(&self.template) {
                Ok(renderer) => renderer,
                Err(e) => {
                    warn!("{e}");
                    for def in &extraction.types {
                        report.fail(&def.name, &path, &e);
                    }
                    continue;
                }
            };

            for def in &extraction.types {
                if def.fields.is_empty() {
                    debug!("{}: skipping {} (no eligible fields)", path.display(), def.name);
                    report.skipped.push(SkippedType {
                        type_name: def.name.clone(),
                        source: path.clone(),
                        reason: "no eligible fields".to_string(),
                    });
                    continue;
                }

                let output = self.folder.join(format!(
                    "{}{}.{}",
                    config.source.file_prefix,
                    names.to_snake(&def.name),
                    config.source.extension
                ));
                let preserved = preserve::analyze(&output, &def.name);
                let imports = merge_imports(
                    config.default_imports(renderer.id()),
                    &extraction.imports,
                    &preserved.imports,
                );
                let model = GenerationModel::new(
                    &def.name,
                    unit.file_name(),
                    &extraction.package,
                    renderer.id(),
                    def.fields.clone(),
                    &preserved,
                    &imports,
                );

                let result = if self.dry_run {
                    renderer.render(&model).map(|_| ())
                } else {
                    renderer.render_to_file(&model, &output)
                };
                match result {
                    Ok(()) => {
                        if self.dry_run {
                            info!("{}: would generate {}", def.name, output.display());
                        } else {
                            info!("{}: generated {}", def.name, output.display());
                        }
                        report.generated.push(GeneratedArtifact {
                            type_name: def.name.clone(),
                            source: path.clone(),
                            output,
                            fields: def.fields.len(),
                            preserved: preserved.labels().into_iter().map(String::from).collect(),
                        });
                    }
                    Err(e) if e.is_recoverable() => {
                        warn!("{e}");
                        report.fail(&def.name, &path, &e);
                    }
                    Err(e) => return Err(e),
                }
            }
        }

        if !self.dry_run
            && let Some(formatter) = &self.formatter
        {
            for artifact in &report.generated {
                formatter.format(&artifact.output)?;
            }
        }

        Ok(report)
    }
}

/// Model files directly inside `folder`, sorted by name. Generated files and
/// test files are left out.
fn candidate_files(folder: &Path, config: &GenConfig) -> Result<Vec<PathBuf>, GenError> {
    let extension = config.source.extension.as_str();
    let test_suffix = format!("_test.{extension}");
    let mut files = Vec::new();

    for entry in WalkDir::new(folder)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
    {
        let entry = entry.map_err(|e| {
            let path = e.path().unwrap_or(folder).to_path_buf();
            let source = e
                .into_io_error()
                .unwrap_or_else(|| std::io::Error::other("directory walk failed"));
            GenError::SourceRead { path, source }
        })?;
        if !entry.file_type().is_file() {
            continue;
        }

        let path = entry.path();
        let file_name = entry.file_name().to_string_lossy();
        if path.extension().and_then(|e| e.to_str()) != Some(extension) {
            continue;
        }
        if file_name.starts_with(&config.source.file_prefix) || file_name.ends_with(&test_suffix) {
            debug!("{}: excluded", path.display());
            continue;
        }
        files.push(path.to_path_buf());
    }

    Ok(files)
}

/// Outcome of one batch.
#[derive(Debug, Clone, Default, Serialize)]
pub struct GenerationReport {
    pub generated: Vec<GeneratedArtifact>,
    pub skipped: Vec<SkippedType>,
    pub failures: Vec<GenerationFailure>,
}

impl GenerationReport {
    fn fail(&mut self, type_name: &str, source: &Path, error: &GenError) {
        self.failures.push(GenerationFailure {
            type_name: type_name.to_string(),
            source: source.to_path_buf(),
            error: error.to_string(),
        });
    }

    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct GeneratedArtifact {
    pub type_name: String,
    pub source: PathBuf,
    pub output: PathBuf,
    pub fields: usize,
    /// Overrides replayed from the previous artifact.
    pub preserved: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SkippedType {
    pub type_name: String,
    pub source: PathBuf,
    pub reason: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct GenerationFailure {
    pub type_name: String,
    pub source: PathBuf,
    pub error: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn touch(dir: &Path, name: &str) {
        std::fs::write(dir.join(name), "package dao\n").unwrap();
    }

    #[test]
    fn test_candidate_files_are_filtered_and_sorted() {
        let dir = tempfile::tempdir().unwrap();
        for name in [
            "user.go",
            "gen_user.go",
            "account.go",
            "account_test.go",
            "notes.txt",
            "regenerate.go",
        ] {
            touch(dir.path(), name);
        }
        std::fs::create_dir(dir.path().join("nested")).unwrap();
        touch(&dir.path().join("nested"), "deep.go");

        let files = candidate_files(dir.path(), &GenConfig::default()).unwrap();
        let names: Vec<_> = files
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["account.go", "regenerate.go", "user.go"]);
    }

    #[test]
    fn test_unreadable_folder_is_source_read_error() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing");
        let err = candidate_files(&missing, &GenConfig::default()).unwrap_err();
        assert!(matches!(err, GenError::SourceRead { .. }));
    }

    #[test]
    fn test_empty_folder_option_is_configuration_error() {
        let err = Generator::new("", "pkg.model.option.hbs").run().unwrap_err();
        assert!(matches!(err, GenError::Configuration { .. }));

        let err = Generator::new("models", "").run().unwrap_err();
        assert!(matches!(err, GenError::Configuration { .. }));
    }
}
