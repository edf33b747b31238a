//! Cobertura XML rendering for xcob.
//!
//! A stateless writer that serializes the aggregator's [`ReportTree`] plus
//! the summary-level totals into one pretty-printed Cobertura document.
//! Branch and complexity attributes are fixed placeholders; this tool never
//! computes them.

use std::fmt::Write;

use chrono::{DateTime, Utc};

use xcob_types::{CoverageSummary, ReportTree};

/// DTD referenced by the generated document.
pub const COBERTURA_DTD: &str = "http://cobertura.sourceforge.net/xml/coverage-04.dtd";

/// Value emitted for every branch-rate attribute.
const PLACEHOLDER_BRANCH_RATE: &str = "1.0";

/// Value emitted for every complexity attribute.
const PLACEHOLDER_COMPLEXITY: &str = "0.0";

/// Version string carried on the root element.
const TOOL_VERSION: &str = concat!("xcob ", env!("CARGO_PKG_VERSION"));

/// Serialize a report tree into a Cobertura XML document.
///
/// The element order is exactly the order built by the aggregator; rendering
/// the same tree twice produces byte-identical output for the same
/// `generated_at`.
pub fn render_cobertura(
    tree: &ReportTree,
    summary: &CoverageSummary,
    source_root: &str,
    generated_at: DateTime<Utc>,
) -> String {
    let mut xml = String::from("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
    let _ = writeln!(xml, "<!DOCTYPE coverage SYSTEM \"{COBERTURA_DTD}\">");

    let _ = writeln!(
        xml,
        "<coverage line-rate=\"{rate}\" branch-rate=\"{branch}\" lines-covered=\"{covered}\" \
         lines-valid=\"{valid}\" timestamp=\"{timestamp}\" version=\"{version}\" \
         complexity=\"{complexity}\" branches-valid=\"1.0\" branches-covered=\"1.0\">",
        rate = format_rate(summary.line_coverage),
        branch = PLACEHOLDER_BRANCH_RATE,
        covered = summary.covered_lines,
        valid = summary.executable_lines,
        timestamp = generated_at.timestamp(),
        version = escape_xml(TOOL_VERSION),
        complexity = PLACEHOLDER_COMPLEXITY,
    );

    xml.push_str("  <sources>\n");
    let _ = writeln!(xml, "    <source>{}</source>", escape_xml(source_root));
    xml.push_str("  </sources>\n");

    xml.push_str("  <packages>\n");
    for package in &tree.packages {
        let _ = writeln!(
            xml,
            "    <package name=\"{name}\" line-rate=\"{rate}\" branch-rate=\"{branch}\" \
             complexity=\"{complexity}\">",
            name = escape_xml(&package.name),
            rate = format_rate(package.line_rate),
            branch = PLACEHOLDER_BRANCH_RATE,
            complexity = PLACEHOLDER_COMPLEXITY,
        );

        for class in &package.classes {
            let _ = writeln!(
                xml,
                "      <class name=\"{name}\" filename=\"{filename}\" line-rate=\"{rate}\" \
                 branch-rate=\"{branch}\" complexity=\"{complexity}\">",
                name = escape_xml(&class.name),
                filename = escape_xml(&class.filename),
                rate = format_rate(class.line_rate),
                branch = PLACEHOLDER_BRANCH_RATE,
                complexity = PLACEHOLDER_COMPLEXITY,
            );

            xml.push_str("        <lines>\n");
            for line in &class.lines {
                let _ = writeln!(
                    xml,
                    "          <line number=\"{number}\" branch=\"false\" hits=\"{hits}\"/>",
                    number = line.number,
                    hits = line.hits,
                );
            }
            xml.push_str("        </lines>\n");

            xml.push_str("      </class>\n");
        }

        xml.push_str("    </package>\n");
    }
    xml.push_str("  </packages>\n");

    xml.push_str("</coverage>\n");
    xml
}

/// Render a coverage ratio attribute value.
fn format_rate(rate: f64) -> String {
    format!("{rate:.4}")
}

/// Escape a string for use in XML text or attribute values.
fn escape_xml(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            other => escaped.push(other),
        }
    }
    escaped
}

// ============================================================================
// Tests
// ============================================================================
