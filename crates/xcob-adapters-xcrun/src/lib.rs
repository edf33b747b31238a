//! Platform toolchain adapters for xcob.
//!
//! These adapters implement the ports against the host system: the coverage
//! data source shells out to `xcrun xccov`, and the container reader decodes
//! a result bundle's `Info.plist` by converting it to JSON with `plutil`.
//! Everything upstream of the port traits stays testable without either tool
//! installed.

use std::path::Path;
use std::process::Command;

use serde::Deserialize;

use xcob_ports::{
    ContainerAction, ContainerMetadata, ContainerReader, CoverageDataSource, DataSourceError,
};

// ============================================================================
// Process Launching
// ============================================================================

/// Run a command and return its stdout as UTF-8 text.
///
/// Non-zero exit and empty output are both reported as typed errors naming
/// the full command line.
fn run_command(program: &str, args: &[&str]) -> Result<String, DataSourceError> {
    let command = if args.is_empty() {
        program.to_string()
    } else {
        format!("{program} {}", args.join(" "))
    };

    let output = Command::new(program)
        .args(args)
        .output()
        .map_err(|e| DataSourceError::Launch {
            command: command.clone(),
            message: e.to_string(),
        })?;

    if !output.status.success() {
        return Err(DataSourceError::CommandFailed {
            command,
            status: output.status.code().unwrap_or(-1),
        });
    }

    let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
    if stdout.is_empty() {
        return Err(DataSourceError::EmptyOutput { command });
    }

    Ok(stdout)
}

/// Run `xcrun xccov` with the given arguments.
fn launch_xccov(args: &[&str]) -> Result<String, DataSourceError> {
    let mut full = vec!["xccov"];
    full.extend_from_slice(args);
    run_command("xcrun", &full)
}

// ============================================================================
// Coverage Data Source
// ============================================================================

/// Coverage data source backed by the `xcrun xccov` tool.
#[derive(Debug, Default)]
pub struct XcrunDataSource;

impl XcrunDataSource {
    /// Create a new data source.
    pub fn new() -> Self {
        Self
    }
}

impl CoverageDataSource for XcrunDataSource {
    fn fetch_summary(&self, location: &Path) -> Result<String, DataSourceError> {
        let location = location.to_string_lossy();
        launch_xccov(&["view", &location, "--json"])
    }

    fn list_coverable_files(&self, location: &Path) -> Result<Vec<String>, DataSourceError> {
        let location = location.to_string_lossy();
        let listing = launch_xccov(&["view", "--file-list", &location])?;
        Ok(listing
            .lines()
            .filter(|line| !line.is_empty())
            .map(|line| line.to_string())
            .collect())
    }

    fn fetch_file_coverage_text(
        &self,
        path: &str,
        location: &Path,
    ) -> Result<String, DataSourceError> {
        let location = location.to_string_lossy();
        launch_xccov(&["view", "--file", path, &location])
    }
}

// ============================================================================
// Result Container Reader
// ============================================================================

/// Result-container reader backed by `plutil`.
///
/// Converts the bundle's `Info.plist` to JSON and decodes the typed fields
/// the resolver needs.
#[derive(Debug, Default)]
pub struct PlistContainerReader;

impl PlistContainerReader {
    /// Create a new container reader.
    pub fn new() -> Self {
        Self
    }
}

#[derive(Debug, Deserialize)]
struct RawBundle {
    #[serde(rename = "FormatVersion")]
    format_version: String,
    #[serde(rename = "CreatingWorkspaceFilePath")]
    creating_workspace_file_path: String,
    #[serde(rename = "Actions")]
    actions: Vec<RawAction>,
}

#[derive(Debug, Deserialize)]
struct RawAction {
    #[serde(rename = "SchemeCommand")]
    scheme_command: String,
    #[serde(rename = "ActionResult")]
    action_result: RawActionResult,
}

#[derive(Debug, Deserialize)]
struct RawActionResult {
    #[serde(rename = "CodeCoveragePath")]
    code_coverage_path: String,
    #[serde(rename = "CodeCoverageArchivePath")]
    code_coverage_archive_path: String,
    #[serde(rename = "HasCodeCoverage")]
    has_code_coverage: bool,
}

/// Decode a bundle's plist-as-JSON text into container metadata.
fn decode_bundle_json(json: &str) -> Result<ContainerMetadata, String> {
    let raw: RawBundle =
        serde_json::from_str(json).map_err(|e| format!("invalid bundle metadata: {e}"))?;

    Ok(ContainerMetadata {
        format_version: raw.format_version,
        workspace_path: raw.creating_workspace_file_path,
        actions: raw
            .actions
            .into_iter()
            .map(|action| ContainerAction {
                scheme_command: action.scheme_command,
                coverage_report_path: action.action_result.code_coverage_path,
                coverage_archive_path: action.action_result.code_coverage_archive_path,
                has_coverage: action.action_result.has_code_coverage,
            })
            .collect(),
    })
}

impl ContainerReader for PlistContainerReader {
    fn read_metadata(&self, location: &Path) -> Result<ContainerMetadata, String> {
        let plist = location.join("Info.plist");
        let plist = plist.to_string_lossy();
        let json = run_command("plutil", &["-convert", "json", "-o", "-", &plist])
            .map_err(|e| e.to_string())?;
        decode_bundle_json(&json)
    }
}

// ============================================================================
// Tests
// ============================================================================
