//! Placement of a dragged sleep window among the other windows of its day.
//!
//! # Algorithm Summary
//!
//! Iterative relaxation over integer timeline points:
//!
//! 1. Compare midpoints to decide whether the dragged window sits to the right
//!    of each other window; that fixes the push direction.
//! 2. Any endpoint inside another window is pushed just past it in that
//!    direction.
//! 3. If the dragged window swallows another window, the endpoint on the push
//!    side is moved past it.
//! 4. Repeat until nothing changes, at most [`MAX_RESOLVE_ITERATIONS`] times.
//!
//! Windows are closed ranges of points, so a converged result may sit directly
//! next to another window (e.g. `[0, 9]` and `[10, 20]`) but never share a point.
//! Only one window is dragged at a time.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Relaxation passes allowed before the constraint set is declared contradictory.
pub const MAX_RESOLVE_ITERATIONS: usize = 10;

/// Errors raised while placing a dragged window.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConflictError {
    /// The relaxation did not settle; the drag must be rejected.
    #[error("sleep window placement did not converge after {iterations} iterations")]
    Divergence { iterations: usize },

    /// An input window ends before it starts.
    #[error("invalid interval [{start}, {end}]")]
    InvalidInterval { start: i64, end: i64 },
}

/// A closed range of timeline points.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Interval {
    pub start: i64,
    pub end: i64,
}

impl Interval {
    pub fn new(start: i64, end: i64) -> Result<Self, ConflictError> {
        if start > end {
            return Err(ConflictError::InvalidInterval { start, end });
        }
        Ok(Self { start, end })
    }

    pub const fn contains(&self, point: i64) -> bool {
        self.start <= point && point <= self.end
    }

    /// True when the two ranges share at least one point.
    pub const fn overlaps(&self, other: &Self) -> bool {
        self.start <= other.end && other.start <= self.end
    }

    /// Twice the midpoint, to compare midpoints without rounding.
    const fn double_mid(&self) -> i64 {
        self.start + self.end
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}]", self.start, self.end)
    }
}

/// Moves `dragged` to the nearest placement that overlaps none of `others`.
///
/// `others` must not include the dragged window itself.
pub fn resolve_conflict(dragged: Interval, others: &[Interval]) -> Result<Interval, ConflictError> {
    for interval in std::iter::once(&dragged).chain(others) {
        if interval.start > interval.end {
            return Err(ConflictError::InvalidInterval {
                start: interval.start,
                end: interval.end,
            });
        }
    }

    let mut current = dragged;
    for iteration in 0..MAX_RESOLVE_ITERATIONS {
        let (next, pushed) = relax(current, others);
        if !pushed {
            if iteration > 0 {
                tracing::debug!(%dragged, resolved = %current, iteration, "resolved sleep window");
            }
            return Ok(current);
        }
        current = next;
    }

    tracing::warn!(%dragged, others = others.len(), "sleep window placement diverged");
    Err(ConflictError::Divergence {
        iterations: MAX_RESOLVE_ITERATIONS,
    })
}

/// One relaxation pass against every other window in turn.
///
/// Returns the new placement and whether any endpoint moved. A pass can push
/// an endpoint out and back again, so comparing placements is not enough.
fn relax(mut current: Interval, others: &[Interval]) -> (Interval, bool) {
    let mut pushed = false;
    for other in others {
        let before = current;
        let on_right = current.double_mid() > other.double_mid();

        if on_right {
            if other.contains(current.start) {
                current.start = other.end + 1;
            }
            if other.contains(current.end) {
                current.end = other.end + 1;
            }
            current.end = current.end.max(current.start);
        } else {
            if other.contains(current.end) {
                current.end = other.start - 1;
            }
            if other.contains(current.start) {
                current.start = other.start - 1;
            }
            current.start = current.start.min(current.end);
        }

        if current.start < other.start && other.end < current.end {
            if on_right {
                current.start = other.end + 1;
            } else {
                current.end = other.start - 1;
            }
        }
        pushed |= current != before;
    }
    (current, pushed)
}
