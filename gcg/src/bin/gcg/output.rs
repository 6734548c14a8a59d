use anyhow::Result;
use clap::ValueEnum;
use colored::{Color, Colorize};
use comfy_table::{Attribute, Cell, Color as TableColor, Table};
use serde::Serialize;

use gcg::GenerationReport;

/// Message kinds printed around the summary.
#[derive(Clone, Copy, Debug, PartialEq)]
enum Tone {
    Success,
    Error,
    Warning,
    Info,
    Detail,
}

impl Tone {
    fn icon(self) -> &'static str {
        match self {
            Tone::Success => "✓",
            Tone::Error => "✗",
            Tone::Warning => "⚠",
            Tone::Info => "ℹ",
            Tone::Detail => "→",
        }
    }

    fn color(self) -> Color {
        match self {
            Tone::Success => Color::Green,
            Tone::Error => Color::Red,
            Tone::Warning => Color::Yellow,
            Tone::Info => Color::Blue,
            Tone::Detail => Color::BrightBlack,
        }
    }
}

/// Output format options for the generation summary
#[derive(Clone, Debug, ValueEnum, Default, PartialEq)]
pub enum OutputFormat {
    /// Formatted table output (default)
    #[default]
    Table,
    /// JSON output for scripting
    Json,
    /// Compact single-line output
    Compact,
}

/// Global CLI options that affect output
#[derive(Clone, Debug, Default)]
pub struct GlobalOptions {
    pub output_format: OutputFormat,
    pub quiet: bool,
    pub verbose: bool,
    pub no_color: bool,
}

/// Data that can be displayed as a table
pub trait TableDisplay {
    fn to_table(&self, options: &GlobalOptions) -> Table;
    fn to_compact(&self) -> String;
}

/// Output manager handles formatting and display
pub struct OutputManager {
    pub options: GlobalOptions,
}

impl OutputManager {
    pub fn new(options: GlobalOptions) -> Self {
        Self { options }
    }

    /// Display data according to the configured output format
    pub fn display<T>(&self, data: &T) -> Result<()>
    where
        T: Serialize + TableDisplay,
    {
        if self.options.quiet {
            return Ok(());
        }

        match self.options.output_format {
            OutputFormat::Json => {
                let json = serde_json::to_string_pretty(data)?;
                println!("{json}");
            }
            OutputFormat::Table => {
                let table = data.to_table(&self.options);
                println!("{table}");
            }
            OutputFormat::Compact => {
                println!("{}", data.to_compact());
            }
        }
        Ok(())
    }

    /// Whether human-oriented messages should be printed around the summary
    fn chatty(&self) -> bool {
        !self.options.quiet && self.options.output_format != OutputFormat::Json
    }

    fn line(&self, tone: Tone, message: &str) -> String {
        if self.options.no_color {
            format!("{} {message}", tone.icon())
        } else {
            format!("{} {}", tone.icon().color(tone.color()), message.color(tone.color()))
        }
    }

    pub fn success(&self, message: &str) {
        if self.chatty() {
            println!("{}", self.line(Tone::Success, message));
        }
    }

    /// Errors are printed even in quiet mode
    pub fn error(&self, message: &str) {
        eprintln!("{}", self.line(Tone::Error, message));
    }

    pub fn warning(&self, message: &str) {
        if !self.options.quiet {
            eprintln!("{}", self.line(Tone::Warning, message));
        }
    }

    pub fn info(&self, message: &str) {
        if self.chatty() {
            println!("{}", self.line(Tone::Info, message));
        }
    }

    /// Only shown with --verbose
    pub fn verbose(&self, message: &str) {
        if self.options.verbose && self.chatty() {
            eprintln!("{}", self.line(Tone::Detail, message));
        }
    }
}

fn themed_table(options: &GlobalOptions, headers: &[&str]) -> Table {
    let mut table = Table::new();
    if options.no_color {
        table.load_preset(comfy_table::presets::ASCII_FULL);
    } else {
        table.load_preset(comfy_table::presets::UTF8_FULL_CONDENSED);
    }

    let header_cells: Vec<Cell> = headers
        .iter()
        .map(|h| {
            let cell = Cell::new(h).add_attribute(Attribute::Bold);
            if options.no_color { cell } else { cell.fg(TableColor::Cyan) }
        })
        .collect();
    table.set_header(header_cells);
    table
}

fn file_name(path: &std::path::Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

impl TableDisplay for GenerationReport {
    fn to_table(&self, options: &GlobalOptions) -> Table {
        let mut table = themed_table(options, &["Model", "Source", "Status", "Detail"]);

        if self.generated.is_empty() && self.skipped.is_empty() && self.failures.is_empty() {
            table.add_row(vec![Cell::new("No models found")]);
            return table;
        }

        for artifact in &self.generated {
            let preserved = if artifact.preserved.is_empty() {
                String::new()
            } else {
                format!(", kept {}", artifact.preserved.join(", "))
            };
            table.add_row(vec![
                Cell::new(&artifact.type_name),
                Cell::new(file_name(&artifact.source)),
                status_cell(options, "📄", "generated", TableColor::Green),
                Cell::new(format!(
                    "{} ({} fields{preserved})",
                    file_name(&artifact.output),
                    artifact.fields
                )),
            ]);
        }
        for skipped in &self.skipped {
            table.add_row(vec![
                Cell::new(&skipped.type_name),
                Cell::new(file_name(&skipped.source)),
                status_cell(options, "-", "skipped", TableColor::DarkGrey),
                Cell::new(&skipped.reason),
            ]);
        }
        for failure in &self.failures {
            table.add_row(vec![
                Cell::new(&failure.type_name),
                Cell::new(file_name(&failure.source)),
                status_cell(options, Tone::Error.icon(), "failed", TableColor::Red),
                Cell::new(&failure.error),
            ]);
        }

        table
    }

    fn to_compact(&self) -> String {
        format!(
            "generated={} skipped={} failed={}",
            self.generated.len(),
            self.skipped.len(),
            self.failures.len()
        )
    }
}

fn status_cell(options: &GlobalOptions, icon: &str, label: &str, color: TableColor) -> Cell {
    let cell = Cell::new(format!("{icon} {label}"));
    if options.no_color { cell } else { cell.fg(color) }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gcg::generator::{GeneratedArtifact, GenerationFailure, SkippedType};
    use std::path::PathBuf;

    fn report() -> GenerationReport {
        GenerationReport {
            generated: vec![GeneratedArtifact {
                type_name: "SMS".to_string(),
                source: PathBuf::from("dao/sms_domain.go"),
                output: PathBuf::from("dao/gen_sms.go"),
                fields: 5,
                preserved: vec!["Where".to_string()],
            }],
            skipped: vec![SkippedType {
                type_name: "Empty".to_string(),
                source: PathBuf::from("dao/empty.go"),
                reason: "no eligible fields".to_string(),
            }],
            failures: vec![GenerationFailure {
                type_name: "Broken".to_string(),
                source: PathBuf::from("dao/broken.go"),
                error: "failed to render Broken".to_string(),
            }],
        }
    }

    #[test]
    fn test_compact_summary() {
        assert_eq!(report().to_compact(), "generated=1 skipped=1 failed=1");
    }

    #[test]
    fn test_table_lists_every_model() {
        let options = GlobalOptions {
            no_color: true,
            ..Default::default()
        };
        let rendered = report().to_table(&options).to_string();
        assert!(rendered.contains("gen_sms.go (5 fields, kept Where)"));
        assert!(rendered.contains("no eligible fields"));
        assert!(rendered.contains("failed to render Broken"));
    }

    #[test]
    fn test_empty_report_table() {
        let rendered = GenerationReport::default()
            .to_table(&GlobalOptions::default())
            .to_string();
        assert!(rendered.contains("No models found"));
    }

    #[test]
    fn test_output_manager_json() {
        let manager = OutputManager::new(GlobalOptions {
            output_format: OutputFormat::Json,
            ..Default::default()
        });
        assert!(manager.display(&report()).is_ok());
    }

    #[test]
    fn test_plain_message_lines() {
        let manager = OutputManager::new(GlobalOptions {
            no_color: true,
            ..Default::default()
        });
        assert_eq!(manager.line(Tone::Success, "Generated 2 file(s)"), "✓ Generated 2 file(s)");
        assert_eq!(manager.line(Tone::Warning, "SMS: bad"), "⚠ SMS: bad");
    }

    #[test]
    fn test_output_manager_quiet() {
        let manager = OutputManager::new(GlobalOptions {
            quiet: true,
            ..Default::default()
        });
        assert!(manager.display(&report()).is_ok());
    }
}
