//! Day segmentation of a subject's sample stream.
//!
//! # Algorithm Summary
//!
//! 1. Scan consecutive timestamps; the first sample of each new local calendar
//!    date starts a new day.
//! 2. Measure each day in points. A day of exactly 25 hours (fall back) drops
//!    its trailing hour; an interior day of exactly 23 hours (spring forward)
//!    gains one zero-filled hour.
//! 3. Pad partial days with zeros to `points_per_day`: the first day at the
//!    front, every other day at the back.
//!
//! The last day cannot hold a full night. It stays in the output so the
//! previous day's window can show it, but [`reviewable_days`] leaves it out.

use std::ops::Range;

use chrono::{DateTime, FixedOffset, NaiveDate};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that abort segmentation. No partial result is returned.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SegmentationError {
    /// The stream contains no samples.
    #[error("cannot segment an empty sample stream")]
    Empty,

    /// The stream never crosses a local midnight.
    #[error("no day boundary found in {samples} samples")]
    NoDayBoundaries { samples: usize },

    /// `points_per_day` must be a positive multiple of 24.
    #[error("{points_per_day} points per day is not a whole number of points per hour")]
    InvalidResolution { points_per_day: usize },

    /// A timestamp is earlier than the one before it.
    #[error("timestamp at index {index} goes backwards")]
    NonMonotonic { index: usize },

    /// A day still exceeds `points_per_day` after DST correction.
    #[error("day {date} has {points} points, more than one day can hold")]
    DayTooLong { date: NaiveDate, points: usize },
}

/// How a day's length was repaired for a daylight-saving transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DstAdjustment {
    None,
    /// A 25-hour day; its final hour of samples is not shown.
    DroppedHour,
    /// A 23-hour day; one hour of zeros is appended.
    ExtendedHour,
}

/// The samples and padding that make up one calendar day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayBounds {
    /// Local calendar date of the day's first sample.
    pub date: NaiveDate,
    /// Index of the first sample.
    pub start: usize,
    /// One past the last sample shown.
    pub end: usize,
    /// Zero points placed before the samples.
    pub leading_pad: usize,
    /// Zero points placed after the samples.
    pub trailing_pad: usize,
    pub dst: DstAdjustment,
}

impl DayBounds {
    /// Sample indices shown for this day.
    pub const fn samples(&self) -> Range<usize> {
        self.start..self.end
    }

    /// Total points, padding included. Equals `points_per_day` for every day.
    pub const fn len(&self) -> usize {
        self.leading_pad + (self.end - self.start) + self.trailing_pad
    }

    pub const fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Lays the day's slice of a full-stream vector out on its points,
    /// filling the padding with `fill`.
    ///
    /// Returns `None` if `values` does not cover the day's samples.
    pub fn layout<T: Copy>(&self, values: &[T], fill: T) -> Option<Vec<T>> {
        let body = values.get(self.samples())?;
        let mut out = Vec::with_capacity(self.len());
        out.extend(std::iter::repeat_n(fill, self.leading_pad));
        out.extend_from_slice(body);
        out.extend(std::iter::repeat_n(fill, self.trailing_pad));
        Some(out)
    }
}

/// Splits a chronologically ordered timestamp stream into calendar days.
pub fn segment(
    timestamps: &[DateTime<FixedOffset>],
    points_per_day: usize,
) -> Result<Vec<DayBounds>, SegmentationError> {
    if points_per_day == 0 || points_per_day % 24 != 0 {
        return Err(SegmentationError::InvalidResolution { points_per_day });
    }
    if timestamps.is_empty() {
        return Err(SegmentationError::Empty);
    }
    let points_per_hour = points_per_day / 24;

    let boundaries = day_boundaries(timestamps)?;
    if boundaries.is_empty() {
        return Err(SegmentationError::NoDayBoundaries {
            samples: timestamps.len(),
        });
    }
    tracing::debug!(days = boundaries.len() + 1, "found day boundaries");

    let starts = std::iter::once(0).chain(boundaries.iter().copied());
    let ends = boundaries.iter().copied().chain(std::iter::once(timestamps.len()));
    let last = boundaries.len();

    starts
        .zip(ends)
        .enumerate()
        .map(|(index, (start, end))| {
            let date = timestamps[start].date_naive();
            let mut bounds = DayBounds {
                date,
                start,
                end,
                leading_pad: 0,
                trailing_pad: 0,
                dst: DstAdjustment::None,
            };

            // Only exact 25h/23h counts are transitions; anything else is a
            // gapped or partial day and is padded below.
            let samples = end - start;
            if samples == 25 * points_per_hour {
                bounds.end -= points_per_hour;
                bounds.dst = DstAdjustment::DroppedHour;
                tracing::info!(%date, "25-hour day, dropping trailing hour");
            } else if samples == 23 * points_per_hour && index != 0 && index != last {
                bounds.trailing_pad = points_per_hour;
                bounds.dst = DstAdjustment::ExtendedHour;
                tracing::info!(%date, "23-hour day, extending by one hour");
            }

            let shown = bounds.len();
            if shown > points_per_day {
                return Err(SegmentationError::DayTooLong {
                    date,
                    points: shown,
                });
            }
            let missing = points_per_day - shown;
            if index == 0 {
                bounds.leading_pad += missing;
            } else {
                bounds.trailing_pad += missing;
            }
            Ok(bounds)
        })
        .collect()
}

/// Indices of the first sample of each new local date.
fn day_boundaries(timestamps: &[DateTime<FixedOffset>]) -> Result<Vec<usize>, SegmentationError> {
    let mut boundaries = Vec::new();
    for (i, pair) in timestamps.windows(2).enumerate() {
        if pair[1] < pair[0] {
            return Err(SegmentationError::NonMonotonic { index: i + 1 });
        }
        if pair[0].date_naive() != pair[1].date_naive() {
            boundaries.push(i + 1);
        }
    }
    Ok(boundaries)
}

/// Days an evaluator reviews: every day except the trailing partial one.
pub fn reviewable_days(days: &[DayBounds]) -> &[DayBounds] {
    match days.split_last() {
        Some((_, rest)) => rest,
        None => &[],
    }
}
