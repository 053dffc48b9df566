//! Command-line argument definitions.

use std::path::PathBuf;

use acti_core::Interval;
use chrono::{DateTime, FixedOffset, NaiveDate};
use clap::{Parser, Subcommand};

/// Actigraphy sleep review engine.
///
/// Splits a wrist-sensor recording into wear-days, maps instants onto the
/// noon-anchored review timeline and keeps sleep windows from overlapping.
#[derive(Debug, Parser)]
#[command(name = "acti", version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to config file.
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Split a sample file into calendar days.
    Segment {
        /// JSON Lines file of samples.
        samples: PathBuf,

        /// Output as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Show the 36-hour review window of one day.
    Window {
        /// JSON Lines file of samples.
        samples: PathBuf,

        /// Zero-based reviewable day.
        #[arg(long)]
        day: usize,

        /// Output as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Boundaries of the contiguous runs in a 0/1 flag list.
    Runs {
        /// Comma-separated flags, e.g. `0,0,1,1,0`.
        flags: String,

        /// Fail unless the list has exactly this many flags.
        #[arg(long)]
        len: Option<usize>,
    },

    /// Place a dragged sleep window among the other windows of its day.
    Resolve {
        /// Dragged window as `START,END` timeline points.
        #[arg(long, value_parser = parse_interval, allow_hyphen_values = true)]
        dragged: Interval,

        /// Another window on the same day; repeat for each.
        #[arg(long = "other", value_parser = parse_interval, allow_hyphen_values = true)]
        others: Vec<Interval>,
    },

    /// Convert an instant to a timeline point.
    Point {
        /// RFC 3339 instant, e.g. `2024-05-01T23:00:00+02:00`.
        #[arg(long)]
        time: DateTime<FixedOffset>,

        /// Reference date of the timeline.
        #[arg(long)]
        date: NaiveDate,

        /// Daylight-saving shift in seconds, added before converting.
        #[arg(long, allow_negative_numbers = true)]
        dst_shift: Option<i64>,
    },

    /// Convert a timeline point to an instant.
    Time {
        /// Minutes past local noon of the reference date.
        #[arg(long, allow_negative_numbers = true)]
        point: i64,

        /// Reference date of the timeline.
        #[arg(long)]
        date: NaiveDate,

        /// Base UTC offset of the timeline, e.g. `+02:00`.
        #[arg(long, allow_hyphen_values = true)]
        offset: FixedOffset,

        /// First point displayed at the post-transition offset.
        #[arg(long, requires = "dst_shift", allow_negative_numbers = true)]
        dst_at: Option<i64>,

        /// Base offset minus post-transition offset, in seconds.
        #[arg(long, requires = "dst_at", allow_negative_numbers = true)]
        dst_shift: Option<i64>,
    },

    /// Replay evaluator actions on a subject and print the sleep log.
    Review {
        /// JSON Lines file of samples.
        samples: PathBuf,

        /// JSON file holding a list of actions.
        #[arg(long)]
        actions: PathBuf,

        /// Subject identifier; defaults to the sample file's stem.
        #[arg(long)]
        subject: Option<String>,
    },
}

/// Parses `START,END` into a timeline interval.
fn parse_interval(value: &str) -> Result<Interval, String> {
    let (start, end) = value
        .split_once(',')
        .ok_or_else(|| format!("expected START,END, got {value:?}"))?;
    let start: i64 = start
        .trim()
        .parse()
        .map_err(|e| format!("invalid start {start:?}: {e}"))?;
    let end: i64 = end
        .trim()
        .parse()
        .map_err(|e| format!("invalid end {end:?}: {e}"))?;
    Interval::new(start, end).map_err(|e| e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_interval() {
        assert_eq!(parse_interval("5, 15").unwrap(), Interval::new(5, 15).unwrap());
        assert_eq!(parse_interval("-10,3").unwrap(), Interval::new(-10, 3).unwrap());
        assert!(parse_interval("5").is_err());
        assert!(parse_interval("15,5").is_err());
        assert!(parse_interval("a,5").is_err());
    }

    #[test]
    fn parses_resolve_arguments() {
        let cli = Cli::try_parse_from([
            "acti", "resolve", "--dragged", "5,15", "--other", "0,9", "--other", "20,30",
        ])
        .unwrap();
        match cli.command {
            Some(Commands::Resolve { dragged, others }) => {
                assert_eq!(dragged, Interval::new(5, 15).unwrap());
                assert_eq!(others.len(), 2);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn dst_options_come_in_pairs() {
        let result = Cli::try_parse_from([
            "acti", "time", "--point", "900", "--date", "2024-03-30", "--offset", "+01:00",
            "--dst-at", "900",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn negative_offset_and_shift() {
        let cli = Cli::try_parse_from([
            "acti", "time", "--point", "-30", "--date", "2024-11-02", "--offset", "-04:00",
            "--dst-at", "840", "--dst-shift", "3600",
        ])
        .unwrap();
        match cli.command {
            Some(Commands::Time { point, offset, .. }) => {
                assert_eq!(point, -30);
                assert_eq!(offset.local_minus_utc(), -4 * 3600);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }
}
