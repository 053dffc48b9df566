//! Point and time commands: conversions between instants and timeline points.

use std::io::Write;

use acti_core::{DstCorrection, point_to_time, time_to_point};
use anyhow::Result;
use chrono::{DateTime, FixedOffset, NaiveDate};

/// Prints the timeline point of `time` on the timeline of `date`.
pub fn run_point<W: Write>(
    writer: &mut W,
    time: &DateTime<FixedOffset>,
    date: NaiveDate,
    dst_shift: Option<i64>,
) -> Result<()> {
    let point = time_to_point(time, date, dst_shift);
    writeln!(writer, "{point}")?;
    Ok(())
}

/// Prints the instant of `point` on the timeline of `date` as RFC 3339.
pub fn run_time<W: Write>(
    writer: &mut W,
    point: i64,
    date: NaiveDate,
    offset: FixedOffset,
    dst: Option<DstCorrection>,
) -> Result<()> {
    let instant = point_to_time(point, date, offset, dst);
    writeln!(writer, "{}", instant.to_rfc3339())?;
    Ok(())
}
