use std::io::BufRead;
use std::path::Path;

use crate::errors::RevbenchError;

/// Read every line of the results file, trimmed, in file order.
///
/// Blank lines are kept as empty strings so the raw report reproduces the
/// file exactly; they are dropped later by [`numeric_samples`].
pub fn read_samples(path: &Path) -> Result<Vec<String>, RevbenchError> {
    let read_err = |source| RevbenchError::SamplesRead {
        path: path.to_path_buf(),
        source,
    };

    let file = std::fs::File::open(path).map_err(read_err)?;
    let reader = std::io::BufReader::new(file);

    let mut lines = Vec::new();
    for line in reader.lines() {
        let line = line.map_err(read_err)?;
        lines.push(line.trim().to_string());
    }
    Ok(lines)
}

/// True for non-empty lines made only of ASCII decimal digits.
///
/// Signs, decimal points and exponents disqualify a line.
pub fn is_sample(line: &str) -> bool {
    !line.is_empty() && line.bytes().all(|b| b.is_ascii_digit())
}

/// The numeric sample set of a run, in line order.
///
/// Values above 2^53 are rounded to the nearest `f64`; use [`exact_sum`]
/// where the total matters.
pub fn numeric_samples(lines: &[String]) -> Vec<f64> {
    lines
        .iter()
        .filter(|line| is_sample(line))
        .filter_map(|line| line.parse::<f64>().ok())
        .collect()
}

/// Integer sum of the numeric samples, or `None` if a sample or the running
/// total does not fit in a `u128`.
pub fn exact_sum(lines: &[String]) -> Option<u128> {
    lines
        .iter()
        .filter(|line| is_sample(line))
        .try_fold(0u128, |total, line| total.checked_add(line.parse::<u128>().ok()?))
}
