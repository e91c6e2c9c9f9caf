use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A version-control checkout point paired with its display name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Revision {
    pub id: String,
    pub label: String,
}

/// One (repetition, revision) combination of the benchmark plan.
#[derive(Debug, Clone, Copy)]
pub struct Run<'a> {
    pub repetition: usize,
    pub revision: &'a Revision,
}

impl Run<'_> {
    /// Label used in the report: revision label and repetition index with no separator.
    pub fn run_label(&self) -> String {
        format!("{}{}", self.revision.label, self.repetition)
    }
}

/// Summary statistics for a single run.
#[derive(Debug, Clone, Serialize)]
pub struct StatRecord {
    pub label: String,
    pub low: f64,
    pub mean: f64,
    pub high: f64,
    pub samples: usize,
    pub started_at: DateTime<Utc>,
    pub elapsed_ms: i64,
}

/// What to do when the checkout or benchmark command exits unsuccessfully.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FailurePolicy {
    /// Log a warning and read whatever results file is present.
    #[default]
    Continue,
    /// Stop the pipeline after writing the summary collected so far.
    Abort,
}

/// Wraps a string in single quotes, escaping internal single quotes as `'\''`.
pub fn shell_escape_single_quote(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('\'');
    for c in s.chars() {
        if c == '\'' {
            out.push_str("'\\''");
        } else {
            out.push(c);
        }
    }
    out.push('\'');
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn run_label_concatenates_without_separator() {
        let revision = Revision {
            id: "1915d542".to_string(),
            label: "ArrayList".to_string(),
        };
        let run = Run {
            repetition: 3,
            revision: &revision,
        };
        assert_eq!(run.run_label(), "ArrayList3");
    }

    #[test]
    fn escape_plain_ref() {
        assert_eq!(shell_escape_single_quote("main"), "'main'");
    }

    #[test]
    fn escape_embedded_quote() {
        assert_eq!(shell_escape_single_quote("it's"), "'it'\\''s'");
    }
}
