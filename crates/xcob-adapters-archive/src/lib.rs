//! Line-hit extraction and coverage archive assembly for xcob.
//!
//! This crate turns the raw per-file "lineNumber: hits" text produced by the
//! coverage data source into [`FileHitRecord`]s and assembles them into a
//! complete [`CoverageArchive`], fanning the per-file extraction out across a
//! worker pool.

use std::path::Path;

use once_cell::sync::Lazy;
use rayon::prelude::*;
use regex_lite::Regex;

use xcob_ports::{CoverageDataSource, DataSourceError};
use xcob_types::{CoverageArchive, FileHitRecord, LineHits};

// ============================================================================
// Line-Hit Parsing
// ============================================================================

/// Fixed `<digits>: <digits>` pattern for a hit line.
static HIT_LINE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(\d+): (\d+)").expect("valid pattern"));

/// Parse one file's raw line-hit text into a sparse hit map.
///
/// Per line:
/// - no colon: not a coverage line, skipped;
/// - `*` after the separator marks a branch/partial line, skipped;
/// - `0` after the separator marks a zero-hit executable line, skipped —
///   only positive hits are stored, so a missing key and "zero hits" are
///   synonymous on lookup;
/// - anything not matching `<digits>: <digits>` is skipped.
///
/// This parser never fails: malformed or unexpected lines are expected noise
/// in tool output and degrade to a partial (or empty) map.
///
/// # Examples
///
/// ```
/// use xcob_adapters_archive::parse_line_hits;
///
/// let hits = parse_line_hits("1: *\n2: 0\n3: 7\n\ngarbage\n");
/// assert_eq!(hits.get(&3), Some(&7));
/// assert_eq!(hits.len(), 1);
/// ```
pub fn parse_line_hits(text: &str) -> LineHits {
    let mut hits = LineHits::new();

    for line in text.lines() {
        let Some((_, rest)) = line.split_once(':') else {
            continue;
        };

        // Marker character one past the separator space.
        match rest.chars().nth(1) {
            Some('*') | Some('0') | None => continue,
            Some(_) => {}
        }

        let Some(caps) = HIT_LINE.captures(line) else {
            continue;
        };
        let Ok(number) = caps[1].parse::<u32>() else {
            continue;
        };
        let Ok(count) = caps[2].parse::<u64>() else {
            continue;
        };
        if count == 0 {
            continue;
        }

        hits.insert(number, count);
    }

    hits
}

// ============================================================================
// Archive Building
// ============================================================================

/// Build a complete [`CoverageArchive`] for the given file paths.
///
/// One extraction task is fanned out per file path; each task fetches that
/// file's raw text from the data source and parses it. A failed fetch is
/// recorded in place of the record and does not abort the other tasks; the
/// `collect` below is the single join barrier, after which the first recorded
/// failure (in input-path order, so error reporting is deterministic) fails
/// the whole build. No partial archive is ever returned.
///
/// The archive map is only populated by the calling thread after the barrier.
pub fn build_archive<S>(
    file_paths: &[String],
    source: &S,
    location: &Path,
) -> Result<CoverageArchive, DataSourceError>
where
    S: CoverageDataSource + Sync,
{
    let results: Vec<Result<FileHitRecord, DataSourceError>> = file_paths
        .par_iter()
        .map(|path| {
            source
                .fetch_file_coverage_text(path, location)
                .map(|text| FileHitRecord::new(path.clone(), parse_line_hits(&text)))
        })
        .collect();

    let mut archive = CoverageArchive::new();
    for result in results {
        archive.insert(result?);
    }

    Ok(archive)
}

// ============================================================================
// Tests
// ============================================================================
