//! Segment command: the calendar days of a sample file.

use std::io::Write;

use acti_core::{DataPoint, DayBounds, DstAdjustment, reviewable_days, segment};
use anyhow::{Context, Result};
use serde::Serialize;

use crate::Config;

#[derive(Debug, Serialize)]
struct JsonSegments<'a> {
    points_per_day: usize,
    reviewable: usize,
    days: &'a [DayBounds],
}

pub fn run<W: Write>(
    writer: &mut W,
    samples: &[DataPoint],
    config: &Config,
    json: bool,
) -> Result<()> {
    let points_per_day = config.session().points_per_day()?;
    let timestamps: Vec<_> = samples.iter().map(|s| s.timestamp).collect();
    let days = segment(&timestamps, points_per_day).context("failed to segment samples")?;
    let reviewable = reviewable_days(&days).len();

    if json {
        let output = JsonSegments {
            points_per_day,
            reviewable,
            days: &days,
        };
        serde_json::to_writer_pretty(&mut *writer, &output)?;
        writeln!(writer)?;
        return Ok(());
    }

    writeln!(
        writer,
        "{} days, {reviewable} reviewable, {points_per_day} points per day",
        days.len()
    )?;
    for (index, day) in days.iter().enumerate() {
        write!(
            writer,
            "{}  samples {}..{}  pad {}+{}",
            day.date, day.start, day.end, day.leading_pad, day.trailing_pad
        )?;
        match day.dst {
            DstAdjustment::DroppedHour => write!(writer, "  dropped DST hour")?,
            DstAdjustment::ExtendedHour => write!(writer, "  extended DST hour")?,
            DstAdjustment::None => {}
        }
        if index >= reviewable {
            write!(writer, "  (not reviewable)")?;
        }
        writeln!(writer)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    use insta::assert_snapshot;

    use crate::commands::fixtures;

    fn render(samples: &[DataPoint], json: bool) -> String {
        let mut output = Vec::new();
        run(&mut output, samples, &fixtures::config(), json).unwrap();
        String::from_utf8(output).unwrap()
    }

    #[test]
    fn lists_days_and_marks_the_trailing_one() {
        assert_snapshot!(render(&fixtures::may_samples(), false), @r"
        3 days, 2 reviewable, 288 points per day
        2024-05-01  samples 0..288  pad 0+0
        2024-05-02  samples 288..576  pad 0+0
        2024-05-03  samples 576..864  pad 0+0  (not reviewable)
        ");
    }

    #[test]
    fn shows_dst_repair() {
        assert_snapshot!(render(&fixtures::spring_samples(), false), @r"
        5 days, 4 reviewable, 288 points per day
        2024-03-29  samples 0..288  pad 0+0
        2024-03-30  samples 288..576  pad 0+0
        2024-03-31  samples 576..852  pad 0+12  extended DST hour
        2024-04-01  samples 852..1140  pad 0+0
        2024-04-02  samples 1140..1152  pad 0+276  (not reviewable)
        ");
    }

    #[test]
    fn json_output() {
        let output = render(&fixtures::spring_samples(), true);
        let value: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert_eq!(value["points_per_day"], 288);
        assert_eq!(value["reviewable"], 4);
        assert_eq!(value["days"][2]["dst"], "extended_hour");
        assert_eq!(value["days"][2]["date"], "2024-03-31");
    }

    #[test]
    fn single_day_is_an_error() {
        let samples = fixtures::may_samples();
        let mut output = Vec::new();
        let err = run(&mut output, &samples[..100], &fixtures::config(), false).unwrap_err();
        assert_eq!(err.to_string(), "failed to segment samples");
        assert_eq!(
            err.root_cause().to_string(),
            "no day boundary found in 100 samples"
        );
    }
}
