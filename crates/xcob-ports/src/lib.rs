//! Shared port traits and boundary DTOs for xcob's hexagonal architecture.
//!
//! The core pipeline never talks to the platform toolchain directly; it goes
//! through the ports defined here so the aggregation logic stays testable
//! with in-memory fakes.

use std::path::Path;

use thiserror::Error;

// ============================================================================
// Errors
// ============================================================================

/// Errors surfaced by the coverage data source.
///
/// Every variant names the attempted operation so a failed build can report
/// the offending command.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DataSourceError {
    /// The underlying tool exited with a non-zero status.
    #[error("coverage tool exited with status {status} (command: `{command}`)")]
    CommandFailed { command: String, status: i32 },

    /// The underlying tool produced no usable output.
    #[error("coverage tool produced no output (command: `{command}`)")]
    EmptyOutput { command: String },

    /// The underlying tool could not be launched at all.
    #[error("failed to launch coverage tool: {message} (command: `{command}`)")]
    Launch { command: String, message: String },
}

// ============================================================================
// Coverage Data Source
// ============================================================================

/// Port for obtaining raw coverage data from the platform toolchain.
///
/// `location` is the summary or archive path inside the result container,
/// depending on the operation.
pub trait CoverageDataSource {
    /// Fetch the raw JSON coverage summary at `location`.
    fn fetch_summary(&self, location: &Path) -> Result<String, DataSourceError>;

    /// Enumerate the source files covered by the archive at `location`.
    fn list_coverable_files(&self, location: &Path) -> Result<Vec<String>, DataSourceError>;

    /// Fetch the raw per-line hit text for one source file in the archive at
    /// `location`.
    fn fetch_file_coverage_text(
        &self,
        path: &str,
        location: &Path,
    ) -> Result<String, DataSourceError>;
}

// ============================================================================
// Result Container
// ============================================================================

/// One recorded action inside a result container.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContainerAction {
    /// Scheme command that produced the action (e.g. "Test").
    pub scheme_command: String,
    /// Container-relative path to the coverage summary.
    pub coverage_report_path: String,
    /// Container-relative path to the coverage archive.
    pub coverage_archive_path: String,
    /// Whether the action recorded coverage data at all.
    pub has_coverage: bool,
}

/// Typed metadata decoded from a result container.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContainerMetadata {
    /// Container format version string.
    pub format_version: String,
    /// Absolute path to the workspace that produced the container.
    pub workspace_path: String,
    /// Recorded actions, in container order.
    pub actions: Vec<ContainerAction>,
}

/// Port for decoding a result container's metadata.
pub trait ContainerReader {
    /// Read and decode the metadata of the container at `location`.
    fn read_metadata(&self, location: &Path) -> Result<ContainerMetadata, String>;
}

// ============================================================================
// Clock
// ============================================================================

/// Port for obtaining the current UTC time.
pub trait Clock {
    /// Returns the current time in UTC.
    fn now(&self) -> chrono::DateTime<chrono::Utc>;
}

/// System clock backed by the host's wall clock.
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> chrono::DateTime<chrono::Utc> {
        chrono::Utc::now()
    }
}
