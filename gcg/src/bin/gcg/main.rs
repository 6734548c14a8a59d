mod output;

use anyhow::{Context, Result};
use clap::Parser;
use clap::builder::Styles;
use clap::builder::styling::AnsiColor;
use std::path::PathBuf;

use gcg::{CommandFormatter, GenConfig, GenError, Generator};
use output::{GlobalOptions, OutputFormat, OutputManager};

const STYLES: Styles = Styles::styled()
    .usage(AnsiColor::BrightBlue.on_default().bold())
    .header(AnsiColor::Cyan.on_default().bold())
    .literal(AnsiColor::Magenta.on_default())
    .placeholder(AnsiColor::BrightBlack.on_default())
    .error(AnsiColor::Red.on_default().bold());

const AFTER_HELP: &str = "\
Examples:
  gcg -f ./internal/dao
  gcg -f ./internal/dao -t ./templates/pkg.model.option.hbs -p gopay
  gcg -f ./internal/dao --format \"goimports -w\"
  gcg -f ./internal/dao --dry-run --output json

Environment Variables:
  GCG_FOLDER  Default for --folder
  RUST_LOG    Log filter, e.g. gcg=debug
";

#[derive(Parser)]
#[command(name = "gcg")]
#[command(version, styles = STYLES, after_long_help = AFTER_HELP)]
#[command(
    about = "Generate query-option companion files for gorm models",
    long_about = r#"Generate query-option companion files for gorm models.

Every struct in the *.go files of --folder gets a gen_<model>.go file rendered
from --tmpl. Hand-written Where, Preload and <Model>WhereOption declarations in
an existing gen_<model>.go are kept as they are.

Opt out a model with a `// gopher:gen_disable` doc comment and a field with a
`gopher:"-"` tag.
"#
)]
struct Cli {
    /// Folder containing the model files
    #[arg(short = 'f', long, env = "GCG_FOLDER")]
    folder: Option<PathBuf>,

    /// Template file
    #[arg(short = 't', long = "tmpl", default_value = "./templates/pkg.model.option.hbs")]
    tmpl: PathBuf,

    /// Only imports whose path contains this string are carried over from the model file [default: gopay]
    #[arg(short = 'p', long = "additionalImportPkg")]
    additional_import_pkg: Option<String>,

    /// Config file (defaults to gcg.toml in the folder when present)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Formatter command run on every generated file, e.g. "goimports -w"
    #[arg(long)]
    format: Option<String>,

    /// Render without writing any file
    #[arg(long)]
    dry_run: bool,

    /// Output format
    #[arg(long, value_enum, default_value = "table")]
    output: OutputFormat,

    /// Suppress output (only errors will be shown)
    #[arg(short = 'q', long)]
    quiet: bool,

    /// Enable verbose output
    #[arg(short = 'v', long)]
    verbose: bool,

    /// Disable colored output
    #[arg(long)]
    no_color: bool,
}

fn init_logging(verbose: bool) {
    let default_filter = if verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .format_timestamp(None)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if cli.no_color {
        colored::control::set_override(false);
    }

    let output = OutputManager::new(GlobalOptions {
        output_format: cli.output.clone(),
        quiet: cli.quiet,
        verbose: cli.verbose,
        no_color: cli.no_color,
    });

    if let Err(err) = execute(cli, &output) {
        output.error(&format!("Error: {err:#}"));
        std::process::exit(1);
    }
}

fn execute(cli: Cli, output: &OutputManager) -> Result<()> {
    let folder = cli.folder.ok_or_else(|| GenError::Configuration {
        message: "--folder is required".to_string(),
    })?;

    let config = match &cli.config {
        Some(path) => GenConfig::load(path)?,
        None => GenConfig::discover(&folder)?,
    };

    let mut generator = Generator::new(&folder, &cli.tmpl)
        .config(config)
        .dry_run(cli.dry_run);
    if let Some(filter) = cli.additional_import_pkg {
        generator = generator.package_filter(filter);
    }
    if let Some(command) = cli.format.as_deref() {
        generator = generator.formatter(Box::new(CommandFormatter::from_command_line(command)?));
    }

    output.verbose(&format!("scanning {} with {}", folder.display(), cli.tmpl.display()));
    let report = generator
        .run()
        .with_context(|| format!("generation in {} failed", folder.display()))?;

    output.display(&report)?;
    for failure in &report.failures {
        output.warning(&format!("{}: {}", failure.type_name, failure.error));
    }

    if cli.dry_run {
        output.info(&format!("{} file(s) would be generated", report.generated.len()));
    } else if report.generated.is_empty() {
        output.info("Nothing to generate");
    } else {
        output.success(&format!("Generated {} file(s)", report.generated.len()));
    }

    Ok(())
}
