//! Core types for xcob.
//!
//! This crate defines the data model shared across the pipeline: the
//! hierarchical coverage summary decoded from the platform toolchain, the
//! flat per-file line-hit archive, and the Cobertura-shaped report tree the
//! aggregator produces for rendering.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

// ============================================================================
// Coverage Summary Hierarchy
// ============================================================================

/// Coverage figures for a single function.
///
/// Decoded from the toolchain's JSON summary; all fields use the source's
/// camelCase keys.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FunctionCoverage {
    /// Line number where the function starts (1-indexed).
    pub line_number: u32,
    /// Number of executable lines attributed to the function.
    pub executable_lines: u32,
    /// Number of executable lines that were hit at least once.
    pub covered_lines: u32,
    /// Number of times the function was entered.
    pub execution_count: u64,
    /// Covered/executable ratio in `[0, 1]`.
    pub line_coverage: f64,
    /// Function name as reported by the toolchain.
    pub name: String,
}

/// Coverage figures for a single source file, including its functions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileCoverage {
    /// Absolute path to the source file.
    pub path: String,
    /// File name (last path component).
    pub name: String,
    /// Number of executable lines in the file.
    pub executable_lines: u32,
    /// Number of executable lines that were hit at least once.
    pub covered_lines: u32,
    /// Covered/executable ratio in `[0, 1]`.
    pub line_coverage: f64,
    /// Functions in the file, in summary order.
    pub functions: Vec<FunctionCoverage>,
}

/// Coverage figures for a build target, including its files.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TargetCoverage {
    /// Target name.
    pub name: String,
    /// Path to the built product.
    pub build_product_path: String,
    /// Number of executable lines across the target.
    pub executable_lines: u32,
    /// Number of executable lines that were hit at least once.
    pub covered_lines: u32,
    /// Covered/executable ratio in `[0, 1]`.
    pub line_coverage: f64,
    /// Files in the target, in summary order.
    pub files: Vec<FileCoverage>,
}

/// Root of the parsed coverage summary.
///
/// Immutable once decoded; the aggregator only reads from it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CoverageSummary {
    /// Number of executable lines across all targets.
    pub executable_lines: u32,
    /// Number of executable lines that were hit at least once.
    pub covered_lines: u32,
    /// Covered/executable ratio in `[0, 1]`.
    pub line_coverage: f64,
    /// Targets in the summary, in summary order.
    pub targets: Vec<TargetCoverage>,
}

// ============================================================================
// Line-Hit Archive
// ============================================================================

/// Sparse map of executed line number to positive hit count.
///
/// Zero-hit and non-executable lines are not stored, so a missing key and
/// "zero hits" are synonymous on lookup.
pub type LineHits = BTreeMap<u32, u64>;

/// Per-file record of executed lines.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FileHitRecord {
    /// Absolute path to the source file, as enumerated by the data source.
    pub file_path: String,
    /// Executed line number to hit count (always `> 0`).
    pub hits_per_line: LineHits,
}

impl FileHitRecord {
    /// Create a record for `file_path` with the given hit map.
    pub fn new(file_path: impl Into<String>, hits_per_line: LineHits) -> Self {
        Self {
            file_path: file_path.into(),
            hits_per_line,
        }
    }
}

/// Complete line-hit archive, keyed by absolute file path.
///
/// At most one record per path; the last inserted record wins (in practice
/// each path is produced exactly once per build).
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CoverageArchive {
    /// File path to its hit record.
    pub coverage_per_file: BTreeMap<String, FileHitRecord>,
}

impl CoverageArchive {
    /// Create an empty archive.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a record, keyed by its file path.
    pub fn insert(&mut self, record: FileHitRecord) {
        self.coverage_per_file
            .insert(record.file_path.clone(), record);
    }

    /// Look up the record for a file path.
    pub fn record_for(&self, path: &str) -> Option<&FileHitRecord> {
        self.coverage_per_file.get(path)
    }

    /// Hit count for a specific file and line, if any was recorded.
    pub fn hits_for(&self, path: &str, line: u32) -> Option<u64> {
        self.coverage_per_file
            .get(path)
            .and_then(|record| record.hits_per_line.get(&line).copied())
    }

    /// Number of files in the archive.
    pub fn len(&self) -> usize {
        self.coverage_per_file.len()
    }

    /// Whether the archive holds no records.
    pub fn is_empty(&self) -> bool {
        self.coverage_per_file.is_empty()
    }
}

// ============================================================================
// Report Tree
// ============================================================================

/// One positively-hit line in a class entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineEntry {
    /// Absolute line number (1-indexed).
    pub number: u32,
    /// Recorded hit count (always `> 0`).
    pub hits: u64,
}

/// One source file rendered as a Cobertura class.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassEntry {
    /// Qualified name: package name, a dot, then the file stem.
    pub name: String,
    /// File path relative to the source root.
    pub filename: String,
    /// The file's own covered/executable ratio.
    pub line_rate: f64,
    /// Hit lines, in aggregation order.
    pub lines: Vec<LineEntry>,
}

/// One directory rendered as a Cobertura package.
#[derive(Debug, Clone, PartialEq)]
pub struct PackageEntry {
    /// Dotted directory path relative to the source root.
    pub name: String,
    /// Line rate reported for the package.
    pub line_rate: f64,
    /// Classes in the package, in aggregation order.
    pub classes: Vec<ClassEntry>,
}

/// Ordered report tree handed to the XML writer.
///
/// Built once per report generation and never mutated afterwards. Packages
/// appear in the order they were first encountered while scanning files
/// sorted by descending path.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ReportTree {
    /// Packages, in first-encounter order.
    pub packages: Vec<PackageEntry>,
}

impl ReportTree {
    /// Total number of class entries across all packages.
    pub fn class_count(&self) -> usize {
        self.packages.iter().map(|p| p.classes.len()).sum()
    }
}

// ============================================================================
// Tests
// ============================================================================
