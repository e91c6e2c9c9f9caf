use owo_colors::{OwoColorize, Stream, Style};
use serde::Serialize;

use crate::report::format_float;
use crate::types::{Run, StatRecord};

fn style_label() -> Style {
    Style::new().cyan().bold()
}

/// Format elapsed milliseconds compactly: "850ms", "12s", "3m 05s", "1h 02m".
pub fn format_elapsed(ms: i64) -> String {
    let ms = ms.max(0);
    let secs = ms / 1000;
    if ms < 1000 {
        format!("{}ms", ms)
    } else if secs < 60 {
        format!("{}s", secs)
    } else if secs < 3600 {
        format!("{}m {:02}s", secs / 60, secs % 60)
    } else {
        format!("{}h {:02}m", secs / 3600, (secs % 3600) / 60)
    }
}

/// Terminal summary: header, one aligned row per run, footer pointing at the report.
pub fn format_summary(title: &str, records: &[StatRecord], report_path: &str) -> String {
    let mut out = String::new();

    out.push_str(
        &title
            .if_supports_color(Stream::Stdout, |s| s.bold())
            .to_string(),
    );
    out.push_str("\n\n");

    if !records.is_empty() {
        let label_width = records.iter().map(|r| r.label.len()).max().unwrap_or(0);
        let label_style = style_label();

        for record in records {
            let label = format!("{:<width$}", record.label, width = label_width);
            let label_colored = label
                .if_supports_color(Stream::Stdout, |s| s.style(label_style))
                .to_string();

            let mean = format!("{:>12}", format_float(record.mean));
            let mean_colored = mean
                .if_supports_color(Stream::Stdout, |s| s.green())
                .to_string();

            let spread = format!(
                "[{} .. {}]",
                format_float(record.low),
                format_float(record.high)
            );
            let spread_dim = spread
                .if_supports_color(Stream::Stdout, |s| s.dimmed())
                .to_string();

            let elapsed = format!("{:>8}", format_elapsed(record.elapsed_ms));
            let elapsed_colored = elapsed
                .if_supports_color(Stream::Stdout, |s| s.yellow())
                .to_string();

            out.push_str(&format!(
                "  {}  {}  {}  {}  n={}\n",
                label_colored, mean_colored, elapsed_colored, spread_dim, record.samples
            ));
        }

        out.push('\n');
    }

    let footer = format!("Report written to {}", report_path);
    out.push_str(
        &footer
            .if_supports_color(Stream::Stdout, |s| s.dimmed())
            .to_string(),
    );
    out.push('\n');

    out
}

#[derive(Serialize)]
struct JsonSummary<'a> {
    title: &'a str,
    report: &'a str,
    runs: &'a [StatRecord],
}

/// JSON output: the title, report path and every record.
pub fn format_json(title: &str, records: &[StatRecord], report_path: &str) -> String {
    let summary = JsonSummary {
        title,
        report: report_path,
        runs: records,
    };
    let mut out = serde_json::to_string_pretty(&summary).unwrap_or_else(|_| "{}".to_string());
    out.push('\n');
    out
}

/// One line per planned run: repetition, label, commit.
pub fn format_plan<'a>(runs: impl Iterator<Item = Run<'a>>) -> String {
    let mut out = String::new();
    for run in runs {
        out.push_str(&format!(
            "{:>3}  {}  {}\n",
            run.repetition, run.revision.label, run.revision.id
        ));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plan::plan_runs;
    use crate::types::Revision;
    use chrono::Utc;

    fn make_record(label: &str, mean: f64, elapsed_ms: i64) -> StatRecord {
        StatRecord {
            label: label.to_string(),
            low: mean - 1.0,
            mean,
            high: mean + 1.0,
            samples: 4,
            started_at: Utc::now(),
            elapsed_ms,
        }
    }

    #[test]
    fn elapsed_formatting() {
        assert_eq!(format_elapsed(0), "0ms");
        assert_eq!(format_elapsed(-5), "0ms");
        assert_eq!(format_elapsed(850), "850ms");
        assert_eq!(format_elapsed(12_400), "12s");
        assert_eq!(format_elapsed(185_000), "3m 05s");
        assert_eq!(format_elapsed(3_720_000), "1h 02m");
    }

    #[test]
    fn summary_lists_every_record() {
        let records = vec![make_record("ArrayList0", 20.0, 1500), make_record("ImmutableSet0", 3.5, 61_000)];
        let out = format_summary("Nodes per Second", &records, "results.csv");

        assert!(out.contains("Nodes per Second"));
        assert!(out.contains("ArrayList0"));
        assert!(out.contains("ImmutableSet0"));
        assert!(out.contains("20.0"));
        assert!(out.contains("[2.5 .. 4.5]"));
        assert!(out.contains("1m 01s"));
        assert!(out.contains("n=4"));
        assert!(out.contains("Report written to results.csv"));
    }

    #[test]
    fn summary_without_records_has_header_and_footer() {
        let out = format_summary("T", &[], "out.csv");
        assert!(out.contains("T"));
        assert!(out.contains("Report written to out.csv"));
    }

    #[test]
    fn json_is_valid() {
        let records = vec![make_record("A0", 2.0, 10)];
        let out = format_json("Nodes per Second", &records, "results.csv");
        let parsed: serde_json::Value = serde_json::from_str(&out).unwrap();

        assert_eq!(parsed["title"], "Nodes per Second");
        assert_eq!(parsed["report"], "results.csv");
        let runs = parsed["runs"].as_array().unwrap();
        assert_eq!(runs.len(), 1);
        assert_eq!(runs[0]["label"], "A0");
        assert_eq!(runs[0]["mean"], 2.0);
        assert_eq!(runs[0]["low"], 1.0);
        assert_eq!(runs[0]["samples"], 4);
        assert!(runs[0]["started_at"].is_string());
    }

    #[test]
    fn plan_lines() {
        let revisions = vec![
            Revision {
                id: "c1".to_string(),
                label: "A".to_string(),
            },
            Revision {
                id: "c2".to_string(),
                label: "B".to_string(),
            },
        ];
        let out = format_plan(plan_runs(&revisions, 2));
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines, ["  0  A  c1", "  0  B  c2", "  1  A  c1", "  1  B  c2"]);
    }
}
