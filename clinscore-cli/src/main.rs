//! clinscore CLI - clinical risk scores from vitals and lab values

#![deny(warnings)]

// Global invariants enforced:
// - Reports go to stdout; logs, progress and notices go to stderr
// - Batch output keeps input order
// - Identical input yields byte-for-byte identical output

use anyhow::Context;
use clap::{Parser, Subcommand};
use clinscore_core::config::{self, ResolvedConfig};
use clinscore_core::input;
use clinscore_core::report::{render_json_batch, render_jsonl};
use clinscore_core::units::{BilirubinUnit, ProteinUnit, UnitOverrides, UreaSource, UreaUnit};
use clinscore_core::{render_json, render_text, score_batch_with_progress, score_patient, ScoreKind};
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser)]
#[command(name = "clinscore")]
#[command(about = "Clinical risk scores (NEWS2, CURB-65, PNI, SII, ALBI, eGFR, ...) from vitals and labs")]
#[command(version = env!("CLINSCORE_VERSION"))]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Score a single patient record (JSON)
    Score {
        /// Path to the patient record
        file: PathBuf,

        /// Output format
        #[arg(long, default_value = "text")]
        format: OutputFormat,

        #[command(flatten)]
        common: CommonArgs,
    },
    /// Score a JSON Lines file of patient records
    Batch {
        /// Path to the JSON Lines file
        file: PathBuf,

        /// Output format
        #[arg(long, default_value = "json")]
        format: BatchFormat,

        /// Hide the progress bar
        #[arg(long)]
        quiet: bool,

        #[command(flatten)]
        common: CommonArgs,
    },
    /// Print band tables (all scores, or one score by id)
    Tables {
        /// Score id, e.g. news2 or alt_platelet_ratio
        score: Option<String>,
    },
    /// Validate or show configuration
    #[command(name = "config")]
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(clap::Args)]
struct CommonArgs {
    /// Path to config file (default: auto-discover from current directory)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Unit for albumin, total protein and globulin
    #[arg(long)]
    protein_unit: Option<ProteinUnitArg>,

    /// Unit for bilirubin
    #[arg(long)]
    bilirubin_unit: Option<BilirubinUnitArg>,

    /// Whether the nitrogen value is urea or BUN
    #[arg(long)]
    urea_source: Option<UreaSourceArg>,

    /// Unit for urea/BUN
    #[arg(long)]
    urea_unit: Option<UreaUnitArg>,
}

impl CommonArgs {
    fn unit_overrides(&self) -> UnitOverrides {
        UnitOverrides {
            protein: self.protein_unit.map(Into::into),
            bilirubin: self.bilirubin_unit.map(Into::into),
            urea_source: self.urea_source.map(Into::into),
            urea_unit: self.urea_unit.map(Into::into),
        }
    }
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Validate a config file without scoring anything
    Validate {
        /// Path to config file (default: auto-discover from current directory)
        #[arg(long)]
        path: Option<PathBuf>,
    },
    /// Show the resolved configuration (merged defaults + config file)
    Show {
        /// Path to config file (default: auto-discover from current directory)
        #[arg(long)]
        path: Option<PathBuf>,
    },
}

#[derive(Clone, Copy, clap::ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

#[derive(Clone, Copy, clap::ValueEnum)]
enum BatchFormat {
    Json,
    Jsonl,
}

#[derive(Clone, Copy, clap::ValueEnum)]
enum ProteinUnitArg {
    #[value(name = "g/dL", alias = "g-dl")]
    GramsPerDeciliter,
    #[value(name = "g/L", alias = "g-l")]
    GramsPerLiter,
}

impl From<ProteinUnitArg> for ProteinUnit {
    fn from(arg: ProteinUnitArg) -> Self {
        match arg {
            ProteinUnitArg::GramsPerDeciliter => ProteinUnit::GramsPerDeciliter,
            ProteinUnitArg::GramsPerLiter => ProteinUnit::GramsPerLiter,
        }
    }
}

#[derive(Clone, Copy, clap::ValueEnum)]
enum BilirubinUnitArg {
    #[value(name = "mg/dL", alias = "mg-dl")]
    MilligramsPerDeciliter,
    #[value(name = "umol/L", alias = "umol-l")]
    MicromolesPerLiter,
}

impl From<BilirubinUnitArg> for BilirubinUnit {
    fn from(arg: BilirubinUnitArg) -> Self {
        match arg {
            BilirubinUnitArg::MilligramsPerDeciliter => BilirubinUnit::MilligramsPerDeciliter,
            BilirubinUnitArg::MicromolesPerLiter => BilirubinUnit::MicromolesPerLiter,
        }
    }
}

#[derive(Clone, Copy, clap::ValueEnum)]
enum UreaSourceArg {
    Urea,
    Bun,
}

impl From<UreaSourceArg> for UreaSource {
    fn from(arg: UreaSourceArg) -> Self {
        match arg {
            UreaSourceArg::Urea => UreaSource::Urea,
            UreaSourceArg::Bun => UreaSource::Bun,
        }
    }
}

#[derive(Clone, Copy, clap::ValueEnum)]
enum UreaUnitArg {
    #[value(name = "mg/dL", alias = "mg-dl")]
    MilligramsPerDeciliter,
    #[value(name = "mmol/L", alias = "mmol-l")]
    MillimolesPerLiter,
}

impl From<UreaUnitArg> for UreaUnit {
    fn from(arg: UreaUnitArg) -> Self {
        match arg {
            UreaUnitArg::MilligramsPerDeciliter => UreaUnit::MilligramsPerDeciliter,
            UreaUnitArg::MillimolesPerLiter => UreaUnit::MillimolesPerLiter,
        }
    }
}

/// Install the stderr log subscriber
///
/// Reads `RUST_LOG`, then `CLINSCORE_LOG`; defaults to `warn`.
fn init_tracing() {
    let filter = EnvFilter::try_from_env("RUST_LOG")
        .or_else(|_| EnvFilter::try_from_env("CLINSCORE_LOG"))
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> anyhow::Result<()> {
    init_tracing();
    let cli = Cli::parse();

    match cli.command {
        Commands::Score {
            file,
            format,
            common,
        } => {
            ensure_exists(&file)?;
            let resolved = load_config(&common)?;

            let record = input::load_record(&file)?;
            let report = score_patient(record, &resolved);

            match format {
                OutputFormat::Text => print!("{}", render_text(&report)),
                OutputFormat::Json => println!("{}", render_json(&report)),
            }
        }
        Commands::Batch {
            file,
            format,
            quiet,
            common,
        } => {
            ensure_exists(&file)?;
            let resolved = load_config(&common)?;

            let records = input::load_records_jsonl(&file)?;
            info!(records = records.len(), "scoring batch");

            let bar = progress_bar(records.len() as u64, quiet);
            let reports = score_batch_with_progress(records, &resolved, || bar.inc(1));
            bar.finish_and_clear();

            match format {
                BatchFormat::Json => println!("{}", render_json_batch(&reports)),
                BatchFormat::Jsonl => print!("{}", render_jsonl(&reports)),
            }
        }
        Commands::Tables { score } => {
            let kinds = match score {
                Some(id) => vec![id.parse::<ScoreKind>()?],
                None => ScoreKind::ALL.to_vec(),
            };
            print!("{}", render_tables(&kinds));
        }
        Commands::Config { action } => match action {
            ConfigAction::Validate { path } => {
                let project_root = std::env::current_dir()?;
                let resolved = config::load_and_resolve(&project_root, path.as_deref());

                match resolved {
                    Ok(config) => {
                        if let Some(ref p) = config.config_path {
                            println!("Config valid: {}", p.display());
                        } else {
                            println!("No config file found. Using defaults.");
                        }
                    }
                    Err(e) => {
                        eprintln!("Config validation failed: {:#}", e);
                        std::process::exit(1);
                    }
                }
            }
            ConfigAction::Show { path } => {
                let project_root = std::env::current_dir()?;
                let resolved = config::load_and_resolve(&project_root, path.as_deref())
                    .context("failed to load configuration")?;
                print!("{}", render_config(&resolved));
            }
        },
    }

    Ok(())
}

fn ensure_exists(path: &Path) -> anyhow::Result<()> {
    if !path.exists() {
        anyhow::bail!("Path does not exist: {}", path.display());
    }
    Ok(())
}

/// Load config from the working directory and layer CLI unit flags on top
fn load_config(common: &CommonArgs) -> anyhow::Result<ResolvedConfig> {
    let project_root = std::env::current_dir()?;
    let mut resolved = config::load_and_resolve(&project_root, common.config.as_deref())
        .context("failed to load configuration")?;

    if let Some(config_path) = &resolved.config_path {
        eprintln!("Using config: {}", config_path.display());
    }

    let overrides = common.unit_overrides();
    if !overrides.is_empty() {
        info!(?overrides, "unit flags override record and config units");
    }
    resolved.unit_overrides = overrides;
    Ok(resolved)
}

fn progress_bar(len: u64, quiet: bool) -> ProgressBar {
    if quiet {
        return ProgressBar::hidden();
    }
    let bar = ProgressBar::with_draw_target(Some(len), ProgressDrawTarget::stderr());
    bar.set_style(
        ProgressStyle::default_bar()
            .template("{msg} [{bar:40}] {pos}/{len}")
            .unwrap_or_else(|_| ProgressStyle::default_bar()),
    );
    bar.set_message("scoring");
    bar
}

fn render_tables(kinds: &[ScoreKind]) -> String {
    let mut output = String::new();
    for kind in kinds {
        let table = kind.table();
        output.push_str(&format!(
            "{} ({}, {})\n",
            kind.name(),
            kind.id(),
            table.direction.as_str()
        ));
        for (index, band) in table.bands.iter().enumerate() {
            output.push_str(&format!(
                "  {:<16} {:<30} {}\n",
                table.range_label(index),
                band.label,
                band.severity.as_str()
            ));
        }
        if *kind == ScoreKind::News2 {
            output.push_str("  any parameter scoring 3 with total < 5 -> Low-medium\n");
        }
        output.push('\n');
    }
    output
}

fn render_config(resolved: &ResolvedConfig) -> String {
    let mut output = String::from("Configuration:\n");
    match resolved.config_path {
        Some(ref p) => output.push_str(&format!("  Source: {}\n", p.display())),
        None => output.push_str("  Source: defaults (no config file found)\n"),
    }
    output.push('\n');
    output.push_str("Units:\n");
    output.push_str(&format!("  protein: {}\n", resolved.units.protein.as_str()));
    output.push_str(&format!("  bilirubin: {}\n", resolved.units.bilirubin.as_str()));
    output.push_str(&format!(
        "  urea_source: {}\n",
        resolved.units.urea_source.as_str()
    ));
    output.push_str(&format!("  urea_unit: {}\n", resolved.units.urea_unit.as_str()));
    output.push('\n');
    output.push_str("Scores:\n");
    let ids: Vec<&str> = resolved.scores.iter().map(|k| k.id()).collect();
    output.push_str(&format!("  enabled: {}\n", ids.join(", ")));
    output.push('\n');
    output.push_str("Options:\n");
    output.push_str(&format!(
        "  ast_upper_limit: {}\n",
        resolved.options.ast_upper_limit
    ));
    output
}
