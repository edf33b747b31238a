//! Application orchestration for xcob.
//!
//! This crate resolves a platform result container into its coverage inputs
//! and drives the full export pipeline:
//!
//! 1. Read and validate the container metadata
//! 2. Decode the coverage summary
//! 3. Build the line-hit archive (parallel per-file extraction)
//! 4. Aggregate summary + archive into a report tree
//! 5. Render the Cobertura XML document
//!
//! # Example
//!
//! ```rust,ignore
//! use xcob_app::export_from_container;
//! use xcob_domain::ExportOptions;
//! use xcob_ports::SystemClock;
//!
//! let xml = export_from_container(
//!     std::path::Path::new("Test.xcresult"),
//!     &ExportOptions::new(),
//!     &reader,
//!     &source,
//!     &SystemClock,
//! )?;
//! println!("{xml}");
//! ```

use std::path::Path;

use thiserror::Error;

use xcob_adapters_archive::build_archive;
use xcob_adapters_summary::{parse_summary, MalformedSummaryError};
use xcob_domain::{aggregate, ExportOptions};
use xcob_ports::{Clock, ContainerReader, CoverageDataSource, DataSourceError};
use xcob_render::render_cobertura;
use xcob_types::{CoverageArchive, CoverageSummary};

/// The only result-container format version this tool understands.
pub const SUPPORTED_FORMAT_VERSION: &str = "1.2";

/// The scheme command a coverage-bearing action must carry.
pub const TEST_SCHEME_COMMAND: &str = "Test";

// ============================================================================
// Errors
// ============================================================================

/// Errors that can occur during report export.
///
/// All variants are terminal for the current export; nothing is retried.
#[derive(Debug, Error)]
pub enum ExportError {
    /// The container's format version is not supported.
    #[error("incompatible result container: format version {found:?} (supported: {SUPPORTED_FORMAT_VERSION:?})")]
    IncompatibleContainer { found: String },

    /// The container does not hold exactly one test action.
    #[error("unsupported actions in result container: {details}")]
    UnsupportedActions { details: String },

    /// The container reports no coverage data.
    #[error("result container has no coverage data")]
    NoCoverage,

    /// The container metadata could not be read at all.
    #[error("failed to read result container: {0}")]
    ContainerRead(String),

    /// The coverage summary could not be decoded.
    #[error(transparent)]
    MalformedSummary(#[from] MalformedSummaryError),

    /// A data-source fetch failed.
    #[error(transparent)]
    DataSource(#[from] DataSourceError),
}

// ============================================================================
// Export Pipeline
// ============================================================================

/// Render a Cobertura document from already-loaded inputs.
///
/// This is the container-independent seam of the pipeline: aggregation and
/// rendering only, no I/O. Given the same inputs and clock reading the
/// output is byte-identical.
pub fn export_report(
    summary: &CoverageSummary,
    archive: &CoverageArchive,
    source_root: &str,
    options: &ExportOptions,
    clock: &impl Clock,
) -> String {
    let tree = aggregate(summary, archive, source_root, options);
    render_cobertura(&tree, summary, source_root, clock.now())
}

/// Resolve a result container and export its coverage as Cobertura XML.
///
/// Validates the container metadata (format version, a single "Test" action,
/// coverage present), resolves the summary and archive locations relative to
/// the container, derives the source root from the workspace path, and runs
/// the full pipeline.
pub fn export_from_container<S>(
    container_location: &Path,
    options: &ExportOptions,
    reader: &impl ContainerReader,
    source: &S,
    clock: &impl Clock,
) -> Result<String, ExportError>
where
    S: CoverageDataSource + Sync,
{
    let metadata = reader
        .read_metadata(container_location)
        .map_err(ExportError::ContainerRead)?;

    if metadata.format_version != SUPPORTED_FORMAT_VERSION {
        return Err(ExportError::IncompatibleContainer {
            found: metadata.format_version,
        });
    }

    if metadata.actions.len() != 1 {
        return Err(ExportError::UnsupportedActions {
            details: format!("expected exactly one action, found {}", metadata.actions.len()),
        });
    }
    let action = &metadata.actions[0];
    if action.scheme_command != TEST_SCHEME_COMMAND {
        return Err(ExportError::UnsupportedActions {
            details: format!(
                "expected a {TEST_SCHEME_COMMAND:?} action, found {:?}",
                action.scheme_command
            ),
        });
    }

    if !action.has_coverage {
        return Err(ExportError::NoCoverage);
    }

    let summary_location = container_location.join(&action.coverage_report_path);
    let archive_location = container_location.join(&action.coverage_archive_path);
    let source_root = Path::new(&metadata.workspace_path)
        .parent()
        .map(|parent| parent.to_string_lossy().into_owned())
        .unwrap_or_default();

    let raw_summary = source.fetch_summary(&summary_location)?;
    let summary = parse_summary(&raw_summary)?;

    let file_paths = source.list_coverable_files(&archive_location)?;
    let archive = build_archive(&file_paths, source, &archive_location)?;

    Ok(export_report(
        &summary,
        &archive,
        &source_root,
        options,
        clock,
    ))
}

// ============================================================================
// Tests
// ============================================================================
