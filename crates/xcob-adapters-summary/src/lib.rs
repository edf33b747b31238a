//! Coverage summary decoding for xcob.
//!
//! The toolchain's JSON summary is a nested target → file → function
//! hierarchy with precomputed coverage ratios. This crate is a pure
//! structural decode into [`CoverageSummary`]; no filtering or derived
//! computation happens here.

use thiserror::Error;

use xcob_types::CoverageSummary;

// ============================================================================
// Errors
// ============================================================================

/// Errors that can occur while decoding the coverage summary.
#[derive(Debug, Error)]
pub enum MalformedSummaryError {
    /// The summary was not valid JSON or did not match the expected shape.
    #[error("malformed coverage summary: {0}")]
    Decode(#[from] serde_json::Error),
}

// ============================================================================
// Decoding
// ============================================================================

/// Decode the raw JSON summary into a [`CoverageSummary`].
///
/// # Examples
///
/// ```
/// use xcob_adapters_summary::parse_summary;
///
/// let json = r#"{
///     "executableLines": 2,
///     "coveredLines": 1,
///     "lineCoverage": 0.5,
///     "targets": []
/// }"#;
///
/// let summary = parse_summary(json).unwrap();
/// assert_eq!(summary.executable_lines, 2);
/// assert!(summary.targets.is_empty());
/// ```
pub fn parse_summary(raw: &str) -> Result<CoverageSummary, MalformedSummaryError> {
    Ok(serde_json::from_str(raw)?)
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_parse_full_hierarchy() {
        let json = r#"{
            "executableLines": 4,
            "coveredLines": 2,
            "lineCoverage": 0.5,
            "targets": [
                {
                    "name": "App",
                    "buildProductPath": "/build/App.app/App",
                    "executableLines": 4,
                    "coveredLines": 2,
                    "lineCoverage": 0.5,
                    "files": [
                        {
                            "path": "/root/Sources/Main.swift",
                            "name": "Main.swift",
                            "executableLines": 4,
                            "coveredLines": 2,
                            "lineCoverage": 0.5,
                            "functions": [
                                {
                                    "lineNumber": 3,
                                    "executableLines": 4,
                                    "coveredLines": 2,
                                    "executionCount": 1,
                                    "lineCoverage": 0.5,
                                    "name": "main()"
                                }
                            ]
                        }
                    ]
                }
            ]
        }"#;

        let summary = parse_summary(json).unwrap();

        assert_eq!(summary.targets.len(), 1);
        let target = &summary.targets[0];
        assert_eq!(target.name, "App");
        assert_eq!(target.files.len(), 1);
        let file = &target.files[0];
        assert_eq!(file.path, "/root/Sources/Main.swift");
        assert_eq!(file.functions[0].name, "main()");
        assert_eq!(file.functions[0].line_number, 3);
    }

    #[test]
    fn test_parse_empty_targets() {
        let json = r#"{
            "executableLines": 0,
            "coveredLines": 0,
            "lineCoverage": 0,
            "targets": []
        }"#;

        let summary = parse_summary(json).unwrap();

        assert_eq!(summary.executable_lines, 0);
        assert!(summary.targets.is_empty());
    }

    #[test]
    fn test_parse_rejects_invalid_json() {
        let err = parse_summary("not json at all").unwrap_err();
        assert!(err.to_string().contains("malformed coverage summary"));
    }

    #[test]
    fn test_parse_rejects_missing_fields() {
        // targets is present but files are missing their functions array.
        let json = r#"{
            "executableLines": 1,
            "coveredLines": 1,
            "lineCoverage": 1.0,
            "targets": [
                {
                    "name": "App",
                    "buildProductPath": "/build/App",
                    "executableLines": 1,
                    "coveredLines": 1,
                    "lineCoverage": 1.0,
                    "files": [
                        {
                            "path": "/root/a.swift",
                            "name": "a.swift",
                            "executableLines": 1,
                            "coveredLines": 1,
                            "lineCoverage": 1.0
                        }
                    ]
                }
            ]
        }"#;

        assert!(parse_summary(json).is_err());
    }

    #[test]
    fn test_parse_rejects_wrong_types() {
        let json = r#"{
            "executableLines": "ten",
            "coveredLines": 0,
            "lineCoverage": 0,
            "targets": []
        }"#;

        assert!(parse_summary(json).is_err());
    }
}
