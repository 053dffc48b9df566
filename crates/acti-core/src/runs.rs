//! Boundaries of contiguous `true` runs in a per-point flag vector.
//!
//! The output is a flat list read in pairs. A run that starts at the first
//! point opens at index 0, and a run still open at the last point is closed at
//! the last index, so the list is always even.

use thiserror::Error;

/// Precondition failures for flag vectors coming from outside the engine.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RunError {
    #[error("flag vector has {actual} points, expected {expected}")]
    LengthMismatch { expected: usize, actual: usize },

    #[error("flag at index {index} is {value}, expected 0 or 1")]
    InvalidFlag { index: usize, value: u8 },
}

/// Returns the boundary indices of every `true` run.
///
/// Interior boundaries are transition indices: the first point of a run and
/// the first point after it.
///
/// ```
/// use acti_core::runs::extract_runs;
///
/// let flags = [false, false, false, true, true, false];
/// assert_eq!(extract_runs(&flags), vec![3, 5]);
/// ```
pub fn extract_runs(flags: &[bool]) -> Vec<usize> {
    let Some(&first) = flags.first() else {
        return Vec::new();
    };

    let mut changes: Vec<usize> = Vec::new();
    if first {
        changes.push(0);
    }
    changes.extend(
        flags
            .windows(2)
            .enumerate()
            .filter(|(_, pair)| pair[0] != pair[1])
            .map(|(i, _)| i + 1),
    );
    if changes.len() % 2 != 0 {
        changes.push(flags.len() - 1);
    }
    changes
}

/// Validates a 0/1 vector against the expected window length, then extracts.
pub fn extract_runs_checked(flags: &[u8], expected_len: usize) -> Result<Vec<usize>, RunError> {
    if flags.len() != expected_len {
        return Err(RunError::LengthMismatch {
            expected: expected_len,
            actual: flags.len(),
        });
    }
    let flags = flags
        .iter()
        .enumerate()
        .map(|(index, &value)| match value {
            0 => Ok(false),
            1 => Ok(true),
            _ => Err(RunError::InvalidFlag { index, value }),
        })
        .collect::<Result<Vec<_>, _>>()?;
    Ok(extract_runs(&flags))
}

/// Groups a boundary list into `(start, end)` pairs.
pub fn runs_as_pairs(boundaries: &[usize]) -> Vec<(usize, usize)> {
    boundaries
        .chunks_exact(2)
        .map(|pair| (pair[0], pair[1]))
        .collect()
}
