//! xcob converts the coverage data inside an Xcode result bundle into a
//! Cobertura XML report for CI dashboards.
//!
//! The heavy lifting lives in the library crates; this binary parses
//! arguments, resolves configuration, wires up the platform adapters, and
//! writes the document to stdout or a file.

use std::fs;
use std::path::{Path, PathBuf};

use clap::Parser;
use thiserror::Error;

use xcob_adapters_xcrun::{PlistContainerReader, XcrunDataSource};
use xcob_app::{export_from_container, ExportError};
use xcob_config::{discover_config, load_config, resolve_options, CliOverrides, Config, ConfigError};
use xcob_ports::SystemClock;

/// Convert an Xcode result bundle's coverage data into a Cobertura XML report.
#[derive(Parser)]
#[command(name = "xcob")]
#[command(about = "Convert an Xcode result bundle's coverage data into a Cobertura XML report")]
#[command(version)]
struct Cli {
    /// Path to the result bundle (.xcresult)
    bundle: PathBuf,

    /// Exclude targets whose name contains this substring (repeatable)
    #[arg(long = "exclude-target")]
    exclude_targets: Vec<String>,

    /// Exclude files whose path contains this substring (repeatable)
    #[arg(long = "exclude-package")]
    exclude_packages: Vec<String>,

    /// Output path for the XML report (default: stdout)
    #[arg(long)]
    out: Option<PathBuf>,

    /// Path to config file (default: auto-discover xcob.toml)
    #[arg(long, short = 'c')]
    config: Option<PathBuf>,
}

/// CLI errors
#[derive(Debug, Error)]
enum CliError {
    #[error("failed to load config: {0}")]
    ConfigLoad(#[from] ConfigError),

    #[error("failed to write report '{path}': {source}")]
    FileWrite {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{0}")]
    Export(#[from] ExportError),
}

/// Exit codes:
/// - 0: report generated
/// - 1: any error (unreadable container, toolchain failure, bad config, I/O)
const EXIT_CODE_ERROR: i32 = 1;

fn main() {
    let cli = Cli::parse();
    let exit_code = match run(cli) {
        Ok(()) => 0,
        Err(e) => {
            eprintln!("error: {}", e);
            EXIT_CODE_ERROR
        }
    };
    std::process::exit(exit_code);
}

fn run(cli: Cli) -> Result<(), CliError> {
    let config = load_effective_config(cli.config.as_deref())?;
    let overrides = CliOverrides {
        targets_to_exclude: cli.exclude_targets,
        packages_to_exclude: cli.exclude_packages,
    };
    let options = resolve_options(&config, &overrides);

    let reader = PlistContainerReader::new();
    let source = XcrunDataSource::new();
    let xml = export_from_container(&cli.bundle, &options, &reader, &source, &SystemClock)?;

    match cli.out {
        Some(path) => {
            if let Some(parent) = path.parent() {
                if !parent.as_os_str().is_empty() {
                    fs::create_dir_all(parent).map_err(|source| CliError::FileWrite {
                        path: path.display().to_string(),
                        source,
                    })?;
                }
            }
            fs::write(&path, xml).map_err(|source| CliError::FileWrite {
                path: path.display().to_string(),
                source,
            })?;
        }
        None => print!("{}", xml),
    }

    Ok(())
}

/// Load the config file: an explicit `--config` path must exist, while the
/// auto-discovered `xcob.toml` is optional.
fn load_effective_config(explicit: Option<&Path>) -> Result<Config, CliError> {
    match explicit {
        Some(path) => Ok(load_config(path)?),
        None => match discover_config(Path::new(".")) {
            Some(path) => Ok(load_config(&path)?),
            None => Ok(Config::default()),
        },
    }
}
