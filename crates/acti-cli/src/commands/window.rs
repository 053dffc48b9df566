//! Window command: the 36-hour review window of one day.

use std::io::Write;

use acti_core::SubjectSession;
use acti_core::coordinate::{duration_hh_mm, point_label, slider_to_graph_points};
use acti_core::runs::runs_as_pairs;
use anyhow::{Context, Result};

const TIME_FORMAT: &str = "%H:%M";

pub fn run<W: Write>(
    writer: &mut W,
    session: &SubjectSession,
    day: usize,
    json: bool,
) -> Result<()> {
    let window = session
        .day_window(day)
        .with_context(|| format!("failed to build the window of day {day}"))?;

    if json {
        serde_json::to_writer_pretty(&mut *writer, &window)?;
        writeln!(writer)?;
        return Ok(());
    }

    let points_per_day = i64::try_from(session.subject().n_points_per_day())?;
    writeln!(
        writer,
        "Day {day} of {}: {}",
        session.day_count(),
        window.coordinates()
    )?;
    writeln!(writer, "Points: {}", window.len())?;
    match window.dst {
        Some(dst) => writeln!(
            writer,
            "DST: shift {} s from point {}",
            dst.shift_seconds, dst.timepoint
        )?,
        None => writeln!(writer, "DST: none")?,
    }

    let runs = runs_as_pairs(&window.non_wear_runs);
    writeln!(writer, "Non-wear runs: {}", runs.len())?;
    for (start, end) in runs {
        let (start, end) = (i64::try_from(start)?, i64::try_from(end)?);
        writeln!(
            writer,
            "  {start}..{end}  {}-{}",
            point_label(start, points_per_day, 12),
            point_label(end, points_per_day, 12)
        )?;
    }

    let sleep_times = session.subject().day(day)?.sleep_times();
    let points = session.sleep_window_points(day)?;
    writeln!(writer, "Sleep windows: {}", sleep_times.len())?;
    for (sleep, interval) in sleep_times.iter().zip(points) {
        let samples = slider_to_graph_points(&[interval.start, interval.end], points_per_day);
        write!(writer, "  {interval}  samples {}..{}", samples[0], samples[1])?;
        if sleep.is_unset() {
            writeln!(writer, "  unset")?;
        } else {
            writeln!(
                writer,
                "  {}-{} ({})",
                sleep.onset_local().format(TIME_FORMAT),
                sleep.wakeup_local().format(TIME_FORMAT),
                duration_hh_mm(sleep.duration())
            )?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    use insta::assert_snapshot;

    use crate::commands::fixtures;

    fn render(session: &SubjectSession, day: usize) -> String {
        let mut output = Vec::new();
        run(&mut output, session, day, false).unwrap();
        String::from_utf8(output).unwrap()
    }

    #[test]
    fn fresh_day_shows_non_wear_and_placeholder() {
        let session = fixtures::session(fixtures::may_samples());
        assert_snapshot!(render(&session, 0), @r"
        Day 0 of 2: 2024-05-01 noon +02:00
        Points: 432
        DST: none
        Non-wear runs: 1
          156..166  01:00-01:50
        Sleep windows: 1
          [900, 900]  samples 180..180  unset
        ");
    }

    #[test]
    fn annotated_day() {
        let mut session = fixtures::session(fixtures::may_samples());
        session.set_sleep_window(1, 0, 630, 1170).unwrap();
        assert_snapshot!(render(&session, 1), @r"
        Day 1 of 2: 2024-05-02 noon +02:00
        Points: 432
        DST: none
        Non-wear runs: 0
        Sleep windows: 1
          [630, 1170]  samples 126..234  22:30-07:30 (09:00)
        ");
    }

    #[test]
    fn dst_window() {
        let session = fixtures::session(fixtures::spring_samples());
        let output = render(&session, 1);
        assert!(output.starts_with("Day 1 of 4: 2024-03-30 noon +01:00 -> +02:00 at point 900\n"));
        assert!(output.contains("DST: shift -3600 s from point 900\n"));
    }

    #[test]
    fn json_output_has_vectors() {
        let session = fixtures::session(fixtures::may_samples());
        let mut output = Vec::new();
        run(&mut output, &session, 0, true).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&output).unwrap();
        assert_eq!(value["sensor_angle"].as_array().unwrap().len(), 432);
        assert_eq!(value["non_wear_runs"], serde_json::json!([156, 166]));
        assert!(value["dst"].is_null());
    }

    #[test]
    fn day_out_of_range() {
        let session = fixtures::session(fixtures::may_samples());
        let mut output = Vec::new();
        let err = run(&mut output, &session, 5, false).unwrap_err();
        assert_eq!(err.to_string(), "failed to build the window of day 5");
    }
}
