use chrono::{DateTime, TimeDelta, Utc};

use crate::errors::RevbenchError;
use crate::samples::{exact_sum, numeric_samples};
use crate::types::StatRecord;

/// Arithmetic mean. Callers must pass a non-empty slice.
pub fn mean(samples: &[f64]) -> f64 {
    samples.iter().sum::<f64>() / samples.len() as f64
}

/// `sum / count` rounded once to the nearest `f64`.
///
/// Below 2^53 both operands are exact and a plain division suffices. Above
/// that the quotient is taken in integers with 55-56 significant bits and a
/// sticky bit for any remainder, so the final cast rounds correctly.
pub fn exact_mean(sum: u128, count: usize) -> f64 {
    const EXACT: u128 = 1 << f64::MANTISSA_DIGITS;
    let count = count as u128;
    if sum < EXACT && count < EXACT {
        return sum as f64 / count as f64;
    }

    let shift = (u128::BITS - sum.leading_zeros()) as i32
        - (u128::BITS - count.leading_zeros()) as i32
        - (f64::MANTISSA_DIGITS as i32 + 2);
    let (mut quotient, remainder) = if shift >= 0 {
        let divisor = count << shift;
        (sum / divisor, sum % divisor)
    } else {
        let dividend = sum << -shift;
        (dividend / count, dividend % count)
    };
    if remainder != 0 {
        quotient |= 1;
    }
    quotient as f64 * 2f64.powi(shift)
}

/// Population standard deviation (denominator `n`, not `n - 1`).
pub fn population_std_dev(samples: &[f64], mean: f64) -> f64 {
    let variance = samples.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / samples.len() as f64;
    variance.sqrt()
}

impl StatRecord {
    /// Summarize the numeric lines of one run as `mean ± sigma`.
    pub fn from_lines(
        label: String,
        lines: &[String],
        started_at: DateTime<Utc>,
        elapsed: TimeDelta,
    ) -> Result<StatRecord, RevbenchError> {
        let data = numeric_samples(lines);
        if data.is_empty() {
            return Err(RevbenchError::NoNumericSamples { label });
        }

        // Integer samples past 2^53 lose low bits as f64, so sum them exactly.
        let average = match exact_sum(lines) {
            Some(total) => exact_mean(total, data.len()),
            None => mean(&data),
        };
        let sigma = population_std_dev(&data, average);

        Ok(StatRecord {
            label,
            low: average - sigma,
            mean: average,
            high: average + sigma,
            samples: data.len(),
            started_at,
            elapsed_ms: elapsed.num_milliseconds(),
        })
    }
}
