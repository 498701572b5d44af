use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use tracing::error;

use cabinet_json::{logging, output, BuildError, Config, Pipeline, SourceFormat};

#[derive(Parser)]
#[command(name = "cabinet-json")]
#[command(about = "Build data/ministers.json from the government spreadsheet export")]
#[command(version)]
struct Cli {
    /// Directory of exported CSV tables, or a JSON workbook
    source: PathBuf,

    /// Output file (overrides the config)
    #[arg(long)]
    output: Option<PathBuf>,

    /// Also write one file per minister and an index.json into this directory
    #[arg(long)]
    split: Option<PathBuf>,

    /// Force the source format instead of detecting it
    #[arg(long, value_enum)]
    format: Option<FormatArg>,

    /// Configuration file (defaults to ./cabinet.toml when present)
    #[arg(long)]
    config: Option<PathBuf>,
}

#[derive(Clone, Copy, ValueEnum)]
enum FormatArg {
    Csv,
    Workbook,
}

impl From<FormatArg> for SourceFormat {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::Csv => SourceFormat::CsvDirectory,
            FormatArg::Workbook => SourceFormat::Workbook,
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    if !cli.source.exists() {
        eprintln!("❌ Source not found: {}", cli.source.display());
        return ExitCode::FAILURE;
    }

    let mut config = match Config::load(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ {e}");
            return ExitCode::FAILURE;
        }
    };
    if let Some(path) = cli.output.clone() {
        config.output.path = path;
    }
    if let Some(dir) = cli.split.clone() {
        config.output.split_dir = Some(dir);
    }

    let _guard = logging::init_logging(config.log_dir.as_deref());

    match run(&cli, config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            if let Some(BuildError::Validation(report)) = e.downcast_ref::<BuildError>() {
                println!("Validation errors:");
                for message in report.error_messages() {
                    println!("  - {message}");
                }
            }
            error!("{:#}", e);
            eprintln!("❌ {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli, config: Config) -> Result<()> {
    println!("📖 Loading tables from {}...", cli.source.display());
    let pipeline = Pipeline::new(config);
    let result = pipeline
        .run_from_source(&cli.source, cli.format.map(SourceFormat::from))
        .with_context(|| format!("Failed to build ministers from {}", cli.source.display()))?;

    let output = &pipeline.config().output;
    output::write_document(&result.ministers, &output.path)
        .with_context(|| format!("Failed to write {}", output.path.display()))?;
    if let Some(dir) = &output.split_dir {
        output::write_split(&result.ministers, dir)
            .with_context(|| format!("Failed to write split files into {}", dir.display()))?;
    }

    if !result.report.warnings.is_empty() {
        println!("⚠️  {} warning(s), see log", result.report.warnings.len());
    }
    println!(
        "✅ Conversion complete: {} ministers → {}",
        result.ministers.len(),
        output.path.display()
    );
    Ok(())
}
