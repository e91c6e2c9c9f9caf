use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::errors::RevbenchError;
use crate::types::StatRecord;

pub const SUMMARY_COLUMNS: &str = "average - sigma, average, average + sigma";

/// Append-only writer for the results report.
///
/// The report has two blocks: one raw line per run, written and flushed as
/// each run finishes, then a blank line and the summary table.
pub struct ReportWriter<W: Write> {
    path: PathBuf,
    out: W,
}

impl ReportWriter<BufWriter<File>> {
    /// Create (or truncate) the report file at `path`.
    pub fn create(path: &Path) -> Result<Self, RevbenchError> {
        let file = File::create(path).map_err(|source| RevbenchError::ReportWrite {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self::new(path, BufWriter::new(file)))
    }
}

impl<W: Write> ReportWriter<W> {
    pub fn new(path: &Path, out: W) -> Self {
        ReportWriter {
            path: path.to_path_buf(),
            out,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Write the raw lines of one run as `<label><repetition>, <line>, <line>, ...`.
    pub fn write_run(
        &mut self,
        label: &str,
        repetition: usize,
        lines: &[String],
    ) -> Result<(), RevbenchError> {
        let line = format_raw_line(label, repetition, lines);
        self.write_str(&line)?;
        self.out.flush().map_err(|source| self.write_err(source))
    }

    /// Write the blank separator, the header row and one row per record.
    pub fn write_summary(&mut self, title: &str, records: &[StatRecord]) -> Result<(), RevbenchError> {
        let mut block = String::from("\n");
        block.push_str(&format!("{}, {}\n", title, SUMMARY_COLUMNS));
        for record in records {
            block.push_str(&format_summary_row(record));
        }
        self.write_str(&block)?;
        self.out.flush().map_err(|source| self.write_err(source))
    }

    /// Flush and hand back the underlying writer.
    pub fn finish(mut self) -> Result<W, RevbenchError> {
        self.out.flush().map_err(|source| self.write_err(source))?;
        Ok(self.out)
    }

    fn write_str(&mut self, s: &str) -> Result<(), RevbenchError> {
        self.out
            .write_all(s.as_bytes())
            .map_err(|source| self.write_err(source))
    }

    fn write_err(&self, source: std::io::Error) -> RevbenchError {
        RevbenchError::ReportWrite {
            path: self.path.clone(),
            source,
        }
    }
}

pub fn format_raw_line(label: &str, repetition: usize, lines: &[String]) -> String {
    format!("{}{}, {}\n", label, repetition, lines.join(", "))
}

/// One summary row. The space before the first comma is part of the format.
pub fn format_summary_row(record: &StatRecord) -> String {
    format!(
        "{} , {}, {}, {}\n",
        record.label,
        format_float(record.low),
        format_float(record.mean),
        format_float(record.high)
    )
}

/// Render a float the way the legacy report did: shortest round-trip digits,
/// `.0` on integral values, and `1e+16` / `1.5e-05` style exponents outside
/// `[1e-4, 1e16)`.
pub fn format_float(value: f64) -> String {
    if value.is_nan() {
        return "nan".to_string();
    }
    if value.is_infinite() {
        return if value > 0.0 { "inf" } else { "-inf" }.to_string();
    }

    let magnitude = value.abs();
    if magnitude != 0.0 && !(1e-4..1e16).contains(&magnitude) {
        let sci = format!("{:e}", value);
        let Some((mantissa, exponent)) = sci.split_once('e') else {
            return sci;
        };
        let (sign, digits) = match exponent.strip_prefix('-') {
            Some(digits) => ('-', digits),
            None => ('+', exponent),
        };
        return format!("{}e{}{:0>2}", mantissa, sign, digits);
    }

    let plain = value.to_string();
    if plain.contains('.') {
        plain
    } else {
        format!("{}.0", plain)
    }
}
