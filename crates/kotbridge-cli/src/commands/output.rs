//! Shared output formatting for extraction reports.

use anyhow::Result;
use kotbridge::{Capture, CaptureKind, ExtractionReport};
use std::fmt::Write as _;

use crate::OutputFormat;

/// Print an extraction report in the specified format.
pub fn print(report: &ExtractionReport, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Text => print!("{}", render_text(report)),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(report)?),
        OutputFormat::Compact => print!("{}", render_compact(report)),
    }
    Ok(())
}

fn render_text(report: &ExtractionReport) -> String {
    let mut out = String::new();
    for capture in report.captures() {
        let kind = match capture.kind {
            CaptureKind::Block => "\x1b[36mblock\x1b[0m",
            CaptureKind::Declaration => "\x1b[35mdeclaration\x1b[0m",
        };
        let _ = writeln!(out, "{kind} {} at {}", capture.subject, capture.source.location);
        for line in capture.source.text.lines() {
            let _ = writeln!(out, "  | {line}");
        }
        if capture.source.is_emitted() {
            let _ = writeln!(out, "  = artifact: {}", capture.source.artifact_ref);
        }
        out.push('\n');
    }

    let _ = writeln!(
        out,
        "\x1b[32mFound {} capture(s) in {} file(s); {} fragment(s) written, {} unchanged\x1b[0m",
        report.capture_count(),
        report.files_processed,
        report.fragments_written,
        report.fragments_unchanged,
    );
    out
}

fn render_compact(report: &ExtractionReport) -> String {
    report.captures().map(compact_line).collect()
}

fn compact_line(capture: &Capture) -> String {
    let location = &capture.source.location;
    let artifact = if capture.source.is_emitted() {
        capture.source.artifact_ref.as_str()
    } else {
        "-"
    };
    format!(
        "{}:{}:{}: {} {} {}\n",
        location.path, location.from.line, location.from.column, capture.kind, capture.subject, artifact,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use kotbridge::runtime::{Source, SourceLocation, SourceOffset};
    use kotbridge::FileCaptures;
    use std::path::PathBuf;

    fn report() -> ExtractionReport {
        let location = SourceLocation::new(
            "src/App.kt",
            SourceOffset::new(120, 13, 8),
            SourceOffset::new(125, 13, 13),
        )
        .unwrap();
        let mut report = ExtractionReport::new();
        report.add_file(FileCaptures {
            path: PathBuf::from("/p/src/App.kt"),
            relative_path: "src/App.kt".to_string(),
            captures: vec![Capture {
                kind: CaptureKind::Block,
                subject: "app.Block".to_string(),
                source: Source::new(location, "2 + 2", "abc.js"),
                imports: Vec::new(),
                converters: None,
                parameter_types: Vec::new(),
                fragment: None,
            }],
        });
        report
    }

    #[test]
    fn compact_is_one_line_per_capture() {
        assert_eq!(
            render_compact(&report()),
            "src/App.kt:13:8: block app.Block abc.js\n"
        );
    }

    #[test]
    fn text_shows_source_and_summary() {
        let text = render_text(&report());
        assert!(text.contains("app.Block at src/App.kt:13:8-13:13"));
        assert!(text.contains("  | 2 + 2"));
        assert!(text.contains("  = artifact: abc.js"));
        assert!(text.contains("Found 1 capture(s) in 1 file(s)"));
    }

    #[test]
    fn json_serializes_captures() {
        let json = serde_json::to_value(report()).unwrap();
        assert_eq!(json["files"][0]["captures"][0]["kind"], "block");
        assert_eq!(json["files"][0]["captures"][0]["source"]["text"], "2 + 2");
    }
}
