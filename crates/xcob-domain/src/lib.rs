//! Pure report aggregation for xcob.
//!
//! This crate merges a decoded coverage summary with a line-hit archive into
//! the ordered [`ReportTree`] consumed by the XML writer. It applies the
//! exclusion filters, groups files into packages, and resolves per-line hit
//! counts. No I/O, no side effects; given the same inputs the output is
//! identical regardless of how the archive was extracted.

use xcob_types::{
    ClassEntry, CoverageArchive, CoverageSummary, FileCoverage, LineEntry, PackageEntry,
    ReportTree,
};

// ============================================================================
// Options
// ============================================================================

/// Exclusion filters applied during aggregation.
#[derive(Debug, Clone, Default)]
pub struct ExportOptions {
    /// A target whose name contains any of these substrings is dropped
    /// entirely; its files never appear in the report.
    pub targets_to_exclude: Vec<String>,
    /// A file whose absolute path contains any of these substrings is
    /// dropped.
    pub packages_to_exclude: Vec<String>,
}

impl ExportOptions {
    /// Options that exclude nothing.
    pub fn new() -> Self {
        Self::default()
    }
}

/// Whether `haystack` contains any of the given substrings.
///
/// An empty needle list matches nothing.
fn contains_any(haystack: &str, needles: &[String]) -> bool {
    needles.iter().any(|needle| haystack.contains(needle.as_str()))
}

// ============================================================================
// Aggregation
// ============================================================================

/// Merge a summary and an archive into an ordered [`ReportTree`].
///
/// Steps, in order:
/// 1. Flatten the non-excluded files of every non-excluded target into one
///    sequence.
/// 2. Stable-sort that sequence by descending path. The sort is what groups
///    sibling files of a directory contiguously; a change in the computed
///    package name closes the current package and opens a new one.
/// 3. Per file: the path relative to `source_root` becomes the filename, the
///    directory components joined with `.` become the package name, and the
///    package reports the line rate of the first file encountered in it.
/// 4. Per function, every executable line with a positive recorded hit count
///    becomes a line entry; lines without a recorded hit are omitted.
///
/// Aggregation itself cannot fail; an archive miss is a normal no-op.
pub fn aggregate(
    summary: &CoverageSummary,
    archive: &CoverageArchive,
    source_root: &str,
    options: &ExportOptions,
) -> ReportTree {
    let mut files: Vec<&FileCoverage> = Vec::new();
    for target in &summary.targets {
        if contains_any(&target.name, &options.targets_to_exclude) {
            continue;
        }
        files.extend(
            target
                .files
                .iter()
                .filter(|file| !contains_any(&file.path, &options.packages_to_exclude)),
        );
    }

    // Descending path order groups files of the same directory contiguously.
    files.sort_by(|a, b| b.path.cmp(&a.path));

    let root_prefix = format!("{source_root}/");
    let mut packages: Vec<PackageEntry> = Vec::new();

    for file in files {
        let relative_path = file
            .path
            .strip_prefix(&root_prefix)
            .unwrap_or(file.path.as_str());
        let package_name = package_name_of(relative_path);

        let class = ClassEntry {
            name: format!("{package_name}.{}", file_stem(&file.name)),
            filename: relative_path.to_string(),
            line_rate: file.line_coverage,
            lines: collect_hit_lines(file, archive),
        };

        match packages.last_mut() {
            Some(package) if package.name == package_name => package.classes.push(class),
            _ => packages.push(PackageEntry {
                name: package_name,
                line_rate: file.line_coverage,
                classes: vec![class],
            }),
        }
    }

    ReportTree { packages }
}

/// Directory portion of a relative path, with dots for separators.
///
/// A file sitting directly under the source root gets an empty package name.
fn package_name_of(relative_path: &str) -> String {
    let components: Vec<&str> = relative_path
        .split('/')
        .filter(|component| !component.is_empty())
        .collect();
    match components.split_last() {
        Some((_, dirs)) => dirs.join("."),
        None => String::new(),
    }
}

/// File name without its last extension.
fn file_stem(name: &str) -> &str {
    match name.rsplit_once('.') {
        Some((stem, _)) if !stem.is_empty() => stem,
        _ => name,
    }
}

/// Positively-hit lines for every executable line of every function.
fn collect_hit_lines(file: &FileCoverage, archive: &CoverageArchive) -> Vec<LineEntry> {
    let mut lines = Vec::new();
    for function in &file.functions {
        for index in 0..function.executable_lines {
            let number = function.line_number + index;
            if let Some(hits) = archive.hits_for(&file.path, number) {
                lines.push(LineEntry { number, hits });
            }
        }
    }
    lines
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use xcob_types::{FileHitRecord, FunctionCoverage, TargetCoverage};

    fn function(line_number: u32, executable_lines: u32, name: &str) -> FunctionCoverage {
        FunctionCoverage {
            line_number,
            executable_lines,
            covered_lines: executable_lines,
            execution_count: 1,
            line_coverage: 1.0,
            name: name.to_string(),
        }
    }

    fn file(path: &str, line_coverage: f64, functions: Vec<FunctionCoverage>) -> FileCoverage {
        let name = path.rsplit('/').next().unwrap_or(path).to_string();
        FileCoverage {
            path: path.to_string(),
            name,
            executable_lines: functions.iter().map(|f| f.executable_lines).sum(),
            covered_lines: 0,
            line_coverage,
            functions,
        }
    }

    fn target(name: &str, files: Vec<FileCoverage>) -> TargetCoverage {
        TargetCoverage {
            name: name.to_string(),
            build_product_path: format!("/build/{name}"),
            executable_lines: 0,
            covered_lines: 0,
            line_coverage: 0.0,
            files,
        }
    }

    fn summary(targets: Vec<TargetCoverage>) -> CoverageSummary {
        CoverageSummary {
            executable_lines: 0,
            covered_lines: 0,
            line_coverage: 0.0,
            targets,
        }
    }

    fn archive_with(entries: &[(&str, &[(u32, u64)])]) -> CoverageArchive {
        let mut archive = CoverageArchive::new();
        for (path, hits) in entries {
            archive.insert(FileHitRecord::new(
                *path,
                hits.iter().copied().collect(),
            ));
        }
        archive
    }

    // ------------------------------------------------------------------------
    // Package Grouping Tests
    // ------------------------------------------------------------------------

    #[test]
    fn test_descending_sort_groups_sibling_files() {
        let summary = summary(vec![target(
            "App",
            vec![
                file("/root/a/X.swift", 0.25, Vec::new()),
                file("/root/a/Y.swift", 0.5, Vec::new()),
                file("/root/b/Z.swift", 0.75, Vec::new()),
            ],
        )]);
        let archive = CoverageArchive::new();

        let tree = aggregate(&summary, &archive, "/root", &ExportOptions::new());

        assert_eq!(tree.packages.len(), 2);

        let b = &tree.packages[0];
        assert_eq!(b.name, "b");
        assert_eq!(b.line_rate, 0.75);
        assert_eq!(b.classes.len(), 1);
        assert_eq!(b.classes[0].name, "b.Z");

        let a = &tree.packages[1];
        assert_eq!(a.name, "a");
        assert_eq!(a.classes.len(), 2);
        assert_eq!(a.classes[0].name, "a.Y");
        assert_eq!(a.classes[1].name, "a.X");
    }

    #[test]
    fn test_package_rate_is_first_encountered_file_rate() {
        let summary = summary(vec![target(
            "App",
            vec![
                file("/root/a/X.swift", 0.25, Vec::new()),
                file("/root/a/Y.swift", 0.5, Vec::new()),
            ],
        )]);
        let archive = CoverageArchive::new();

        let tree = aggregate(&summary, &archive, "/root", &ExportOptions::new());

        // Descending sort visits Y first; the package carries Y's rate.
        assert_eq!(tree.packages[0].line_rate, 0.5);
    }

    #[test]
    fn test_file_directly_under_root_gets_empty_package_name() {
        let summary = summary(vec![target(
            "App",
            vec![file("/root/Main.swift", 1.0, Vec::new())],
        )]);
        let archive = CoverageArchive::new();

        let tree = aggregate(&summary, &archive, "/root", &ExportOptions::new());

        assert_eq!(tree.packages.len(), 1);
        assert_eq!(tree.packages[0].name, "");
        assert_eq!(tree.packages[0].classes[0].name, ".Main");
        assert_eq!(tree.packages[0].classes[0].filename, "Main.swift");
    }

    #[test]
    fn test_path_outside_source_root_is_kept_verbatim() {
        let summary = summary(vec![target(
            "App",
            vec![file("/elsewhere/Pkg/File.swift", 1.0, Vec::new())],
        )]);
        let archive = CoverageArchive::new();

        let tree = aggregate(&summary, &archive, "/root", &ExportOptions::new());

        assert_eq!(
            tree.packages[0].classes[0].filename,
            "/elsewhere/Pkg/File.swift"
        );
        assert_eq!(tree.packages[0].name, "elsewhere.Pkg");
    }

    #[test]
    fn test_nested_directories_join_with_dots() {
        let summary = summary(vec![target(
            "App",
            vec![file("/root/Sources/App/Deep/Thing.swift", 1.0, Vec::new())],
        )]);
        let archive = CoverageArchive::new();

        let tree = aggregate(&summary, &archive, "/root", &ExportOptions::new());

        assert_eq!(tree.packages[0].name, "Sources.App.Deep");
        assert_eq!(tree.packages[0].classes[0].name, "Sources.App.Deep.Thing");
    }

    // ------------------------------------------------------------------------
    // Exclusion Tests
    // ------------------------------------------------------------------------

    #[test]
    fn test_excluded_target_contributes_no_classes() {
        let summary = summary(vec![
            target("App", vec![file("/root/a/X.swift", 1.0, Vec::new())]),
            target(
                "AppUnitTests",
                vec![file("/root/t/T.swift", 1.0, Vec::new())],
            ),
        ]);
        let archive = CoverageArchive::new();
        let options = ExportOptions {
            targets_to_exclude: vec!["UnitTests".to_string()],
            packages_to_exclude: Vec::new(),
        };

        let tree = aggregate(&summary, &archive, "/root", &options);

        assert_eq!(tree.class_count(), 1);
        assert_eq!(tree.packages[0].classes[0].name, "a.X");
    }

    #[test]
    fn test_excluded_package_path_contributes_no_classes() {
        let summary = summary(vec![target(
            "App",
            vec![
                file("/root/a/X.swift", 1.0, Vec::new()),
                file("/root/Carthage/Dep.swift", 1.0, Vec::new()),
            ],
        )]);
        let archive = CoverageArchive::new();
        let options = ExportOptions {
            targets_to_exclude: Vec::new(),
            packages_to_exclude: vec!["Carthage".to_string()],
        };

        let tree = aggregate(&summary, &archive, "/root", &options);

        assert_eq!(tree.class_count(), 1);
        assert_eq!(tree.packages[0].classes[0].name, "a.X");
    }

    #[test]
    fn test_empty_exclusion_lists_exclude_nothing() {
        let summary = summary(vec![target(
            "App",
            vec![file("/root/a/X.swift", 1.0, Vec::new())],
        )]);
        let archive = CoverageArchive::new();

        let tree = aggregate(&summary, &archive, "/root", &ExportOptions::new());

        assert_eq!(tree.class_count(), 1);
    }

    // ------------------------------------------------------------------------
    // Line Emission Tests
    // ------------------------------------------------------------------------

    #[test]
    fn test_only_positively_hit_executable_lines_are_emitted() {
        let summary = summary(vec![target(
            "App",
            vec![file(
                "/root/a/X.swift",
                0.5,
                vec![function(10, 3, "f")],
            )],
        )]);
        let archive = archive_with(&[("/root/a/X.swift", &[(10, 5), (12, 2)])]);

        let tree = aggregate(&summary, &archive, "/root", &ExportOptions::new());

        let lines = &tree.packages[0].classes[0].lines;
        assert_eq!(
            lines,
            &vec![
                LineEntry { number: 10, hits: 5 },
                LineEntry { number: 12, hits: 2 },
            ]
        );
    }

    #[test]
    fn test_hits_outside_function_ranges_are_not_emitted() {
        let summary = summary(vec![target(
            "App",
            vec![file("/root/a/X.swift", 0.5, vec![function(10, 2, "f")])],
        )]);
        // Line 40 is hit but belongs to no declared function range.
        let archive = archive_with(&[("/root/a/X.swift", &[(10, 1), (40, 9)])]);

        let tree = aggregate(&summary, &archive, "/root", &ExportOptions::new());

        let lines = &tree.packages[0].classes[0].lines;
        assert_eq!(lines, &vec![LineEntry { number: 10, hits: 1 }]);
    }

    #[test]
    fn test_file_missing_from_archive_emits_no_lines() {
        let summary = summary(vec![target(
            "App",
            vec![file("/root/a/X.swift", 0.5, vec![function(1, 5, "f")])],
        )]);
        let archive = CoverageArchive::new();

        let tree = aggregate(&summary, &archive, "/root", &ExportOptions::new());

        assert!(tree.packages[0].classes[0].lines.is_empty());
    }

    #[test]
    fn test_multiple_functions_emit_in_declaration_order() {
        let summary = summary(vec![target(
            "App",
            vec![file(
                "/root/a/X.swift",
                1.0,
                vec![function(20, 2, "g"), function(5, 2, "f")],
            )],
        )]);
        let archive = archive_with(&[("/root/a/X.swift", &[(5, 1), (6, 1), (20, 2), (21, 2)])]);

        let tree = aggregate(&summary, &archive, "/root", &ExportOptions::new());

        let numbers: Vec<u32> = tree.packages[0].classes[0]
            .lines
            .iter()
            .map(|line| line.number)
            .collect();
        // Function order from the summary is preserved, not sorted by line.
        assert_eq!(numbers, vec![20, 21, 5, 6]);
    }

    // ------------------------------------------------------------------------
    // Helper Tests
    // ------------------------------------------------------------------------

    #[test]
    fn test_file_stem_strips_last_extension_only() {
        assert_eq!(file_stem("File.swift"), "File");
        assert_eq!(file_stem("a.b.swift"), "a.b");
        assert_eq!(file_stem("Makefile"), "Makefile");
        assert_eq!(file_stem(".hidden"), ".hidden");
    }

    #[test]
    fn test_contains_any() {
        let needles = vec!["Tests".to_string(), "Pods".to_string()];
        assert!(contains_any("AppTests", &needles));
        assert!(contains_any("/root/Pods/Dep.swift", &needles));
        assert!(!contains_any("App", &needles));
        assert!(!contains_any("App", &[]));
    }

    #[test]
    fn test_aggregate_is_deterministic() {
        let summary = summary(vec![target(
            "App",
            vec![
                file("/root/a/X.swift", 0.25, vec![function(1, 2, "f")]),
                file("/root/b/Z.swift", 0.75, vec![function(3, 1, "g")]),
            ],
        )]);
        let archive = archive_with(&[
            ("/root/a/X.swift", &[(1, 1)]),
            ("/root/b/Z.swift", &[(3, 4)]),
        ]);

        let first = aggregate(&summary, &archive, "/root", &ExportOptions::new());
        let second = aggregate(&summary, &archive, "/root", &ExportOptions::new());

        assert_eq!(first, second);
    }
}
