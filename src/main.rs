//! cpq-package CLI
//!
//! Entry point for the `cpq-package` command-line tool.

use std::fs;
use std::path::{Path, PathBuf};
use std::process;

use clap::{Args, Parser, Subcommand};
use cpq_package::config::DEFAULT_FILE_NAME;
use cpq_package::{
    build_from_path, submit, BuildOutput, DirectoryTransport, EffectiveSettings, Mode,
    PipelineError,
};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "cpq-package")]
#[command(about = "Build CPQ migration package documents from spreadsheet rows", version)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the document and print it (or write it with --output)
    Build {
        #[command(flatten)]
        input: InputArgs,

        /// Write the document to this file instead of stdout
        #[arg(long, short = 'o')]
        output: Option<PathBuf>,
    },

    /// Validate the input and print a JSON report without the document
    Check {
        #[command(flatten)]
        input: InputArgs,
    },

    /// Build the document and submit it to a directory sink
    Submit {
        #[command(flatten)]
        input: InputArgs,

        /// Directory receiving the package JSON
        #[arg(long)]
        out_dir: PathBuf,

        /// Existing package to update
        #[arg(long)]
        path_id: Option<String>,
    },
}

#[derive(Args)]
struct InputArgs {
    /// Input sheet (.csv, or .json row file)
    input: PathBuf,

    /// Row layout of the input
    #[arg(long, value_enum)]
    mode: Option<Mode>,

    /// Package name for the document
    #[arg(long)]
    name: Option<String>,

    /// Settings file (default: ./cpq-package.toml when present)
    #[arg(long, short = 'c')]
    config: Option<PathBuf>,

    /// Minimum number of segments in a configuration path
    #[arg(long)]
    min_depth: Option<usize>,

    /// Maximum number of segments in a configuration path
    #[arg(long)]
    max_depth: Option<usize>,

    /// Emit compact JSON
    #[arg(long)]
    compact: bool,
}

impl InputArgs {
    fn overrides(&self) -> toml::Table {
        let mut table = toml::Table::new();
        if let Some(mode) = self.mode {
            table.insert("mode".to_string(), toml::Value::String(mode.as_str().to_string()));
        }
        if let Some(name) = &self.name {
            table.insert("package_name".to_string(), toml::Value::String(name.clone()));
        }
        if let Some(depth) = self.min_depth {
            let depth = i64::try_from(depth).unwrap_or(i64::MAX);
            table.insert("min_path_depth".to_string(), toml::Value::Integer(depth));
        }
        if let Some(depth) = self.max_depth {
            let depth = i64::try_from(depth).unwrap_or(i64::MAX);
            table.insert("max_path_depth".to_string(), toml::Value::Integer(depth));
        }
        if self.compact {
            table.insert("pretty".to_string(), toml::Value::Boolean(false));
        }
        table
    }

    fn settings(&self) -> Result<EffectiveSettings, PipelineError> {
        let default_file = Path::new(DEFAULT_FILE_NAME);
        let file = match &self.config {
            Some(path) => Some(path.as_path()),
            None if default_file.exists() => Some(default_file),
            None => None,
        };
        Ok(EffectiveSettings::build(file, Some(self.overrides()))?)
    }
}

fn init_logging(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        Commands::Build { input, output } => run_build(&input, output.as_deref()),
        Commands::Check { input } => run_check(&input),
        Commands::Submit {
            input,
            out_dir,
            path_id,
        } => run_submit(&input, out_dir, path_id.as_deref()),
    };

    if let Err(e) = result {
        eprintln!("Error [{}]: {}", e.as_code(), e);
        process::exit(1);
    }
}

fn build(input: &InputArgs) -> Result<(BuildOutput, bool), PipelineError> {
    let effective = input.settings()?;
    if let Some(path) = effective.file_path() {
        tracing::info!(settings = path, "settings file loaded");
    }
    let output = build_from_path(&input.input, &effective.settings)?;
    Ok((output, effective.settings.pretty))
}

fn to_json<T: serde::Serialize>(value: &T, pretty: bool) -> Result<String, PipelineError> {
    let text = if pretty {
        serde_json::to_string_pretty(value)
    } else {
        serde_json::to_string(value)
    };
    text.map_err(PipelineError::from)
}

fn run_build(input: &InputArgs, output_path: Option<&Path>) -> Result<(), PipelineError> {
    let (output, pretty) = build(input)?;
    let json = to_json(&output.document, pretty)?;
    match output_path {
        Some(path) => {
            fs::write(path, json)?;
            eprintln!(
                "Wrote {} ({} item(s), digest {})",
                path.display(),
                output.report.items,
                output.report.digest
            );
        }
        None => println!("{}", json),
    }
    Ok(())
}

/// Pretty-printing for reports, honoured even when the build itself fails.
/// Falls back to the `--compact` flag if the settings cannot be loaded.
fn report_pretty(input: &InputArgs) -> bool {
    input
        .settings()
        .map(|effective| effective.settings.pretty)
        .unwrap_or(!input.compact)
}

fn run_check(input: &InputArgs) -> Result<(), PipelineError> {
    let pretty = report_pretty(input);
    match build(input) {
        Ok((output, _)) => {
            let report = serde_json::json!({
                "ok": true,
                "report": output.report,
            });
            println!("{}", to_json(&report, pretty)?);
            Ok(())
        }
        Err(e) => {
            let report = serde_json::json!({
                "ok": false,
                "error": {
                    "code": e.as_code(),
                    "message": e.to_string(),
                },
            });
            println!("{}", to_json(&report, pretty)?);
            process::exit(1);
        }
    }
}

fn run_submit(input: &InputArgs, out_dir: PathBuf, path_id: Option<&str>) -> Result<(), PipelineError> {
    let (output, pretty) = build(input)?;
    let transport = DirectoryTransport::new(out_dir).with_pretty(pretty);
    let submission = submit(&output, &transport, path_id)?;

    println!("Status Code: {}", submission.status);
    println!("Response Body:");
    println!("{}", submission.body);
    if submission.is_success() {
        println!("\nMigration Package Created");
        Ok(())
    } else {
        println!("\nMigration Package creation failed.");
        process::exit(1);
    }
}
