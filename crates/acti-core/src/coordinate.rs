//! Conversions between absolute instants and wear-day timeline points.
//!
//! A timeline point is a whole number of minutes past local noon of a
//! wear-day's reference date, measured on the wall clock. Point `0` is noon of
//! the reference date and [`WINDOW_MINUTES`] is midnight at the end of the
//! following date, so a night's sleep never crosses the window edge.
//!
//! The free functions are stateless. [`DayWindow`] binds them to one rendered
//! window and carries the daylight-saving correction detected from the
//! window's samples.

use std::fmt;

use chrono::{DateTime, Duration, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Minutes in one calendar day.
pub const MINUTES_PER_DAY: i64 = 24 * 60;

/// Width of the draggable timeline: noon of day `d` to midnight after `d + 1`.
pub const WINDOW_MINUTES: i64 = 36 * 60;

/// Errors raised when a window's offsets cannot be reconciled unambiguously.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TimezoneError {
    /// A window needs at least one sample to know its offset.
    #[error("cannot derive a UTC offset from an empty window")]
    NoSamples,

    /// More than two distinct offsets inside one rendered window.
    #[error("more than two UTC offsets in one window: {offsets:?} (seconds east of UTC)")]
    AmbiguousOffsets { offsets: Vec<i32> },

    /// Two offsets, but the window switches between them more than once.
    #[error("UTC offset changes {changes} times in one window; at most one transition is supported")]
    MultipleTransitions { changes: usize },

    /// The point names a wall-clock time skipped by a spring-forward transition.
    #[error("timeline point {point} falls in a skipped daylight-saving hour")]
    NonexistentLocalTime { point: i64 },

    /// The point names a wall-clock time that occurred twice (fall-back).
    #[error("timeline point {point} falls in a repeated daylight-saving hour")]
    AmbiguousLocalTime { point: i64 },
}

/// A daylight-saving correction visible inside one window.
///
/// Points at or after `timepoint` are shifted by `shift_seconds` before being
/// combined with the reference noon at the window's base offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DstCorrection {
    /// First timeline point (wall clock) displayed at the new offset.
    pub timepoint: i64,
    /// Base offset minus new offset, in seconds.
    pub shift_seconds: i64,
}

impl DstCorrection {
    /// The shift expressed in whole minutes.
    pub const fn shift_minutes(&self) -> i64 {
        self.shift_seconds / 60
    }

    /// Range of wall-clock points that either never happened (spring forward)
    /// or happened twice (fall back).
    pub const fn discontinuity(&self) -> (i64, i64) {
        let minutes = self.shift_minutes();
        if minutes < 0 {
            (self.timepoint + minutes, self.timepoint)
        } else {
            (self.timepoint, self.timepoint + minutes)
        }
    }
}

/// Local noon of `date`, the origin of the timeline.
pub fn local_noon(date: NaiveDate) -> NaiveDateTime {
    date.and_time(NaiveTime::MIN) + Duration::hours(12)
}

/// Minutes from local noon of `reference_date` to the wall-clock time of `instant`.
///
/// The instant's own offset determines its wall clock. A `dst_shift` (signed
/// seconds) is added to that wall clock before subtracting. Seconds are
/// floored, so points before noon are negative.
pub fn time_to_point(
    instant: &DateTime<FixedOffset>,
    reference_date: NaiveDate,
    dst_shift: Option<i64>,
) -> i64 {
    let mut wall = instant.naive_local();
    if let Some(shift) = dst_shift {
        wall += Duration::seconds(shift);
    }
    (wall - local_noon(reference_date))
        .num_seconds()
        .div_euclid(60)
}

/// Inverse of [`time_to_point`] for a window rendered at `base_offset`.
///
/// When `dst` is given and `point >= dst.timepoint`, the wall clock is shifted
/// by `dst.shift_seconds` first. The result carries `base_offset`.
pub fn point_to_time(
    point: i64,
    reference_date: NaiveDate,
    base_offset: FixedOffset,
    dst: Option<DstCorrection>,
) -> DateTime<FixedOffset> {
    let mut wall = local_noon(reference_date) + Duration::minutes(point);
    if let Some(dst) = dst {
        if point >= dst.timepoint {
            wall += Duration::seconds(dst.shift_seconds);
        }
    }
    let utc = wall - Duration::seconds(i64::from(base_offset.local_minus_utc()));
    DateTime::from_naive_utc_and_offset(utc, base_offset)
}

/// `HH:MM` label for a sample index when a day has `points_per_day` samples.
///
/// `offset_hours` moves the origin, e.g. `12` for a noon-anchored axis.
pub fn point_label(point: i64, points_per_day: i64, offset_hours: i64) -> String {
    let minutes = (point * MINUTES_PER_DAY).div_euclid(points_per_day.max(1)) + offset_hours * 60;
    let minutes = minutes.rem_euclid(MINUTES_PER_DAY);
    format!("{:02}:{:02}", minutes / 60, minutes % 60)
}

/// Scales minute-resolution slider values to sample indices.
pub fn slider_to_graph_points(values: &[i64], points_per_day: i64) -> Vec<i64> {
    values
        .iter()
        .map(|value| value * points_per_day / MINUTES_PER_DAY)
        .collect()
}

/// Formats a duration as `HH:MM`, truncating seconds.
pub fn duration_hh_mm(delta: Duration) -> String {
    let minutes = delta.num_minutes();
    let sign = if minutes < 0 { "-" } else { "" };
    let minutes = minutes.abs();
    format!("{sign}{:02}:{:02}", minutes / 60, minutes % 60)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Transition {
    at: DateTime<Utc>,
    offset: FixedOffset,
    correction: DstCorrection,
}

/// The coordinate space of one rendered wear-day window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DayWindow {
    reference_date: NaiveDate,
    base_offset: FixedOffset,
    transition: Option<Transition>,
}

impl DayWindow {
    /// A window with a single offset throughout.
    pub const fn new(reference_date: NaiveDate, base_offset: FixedOffset) -> Self {
        Self {
            reference_date,
            base_offset,
            transition: None,
        }
    }

    /// Derives the base offset and any DST correction from the window's samples.
    ///
    /// Samples must be in chronological order. The base offset is that of the
    /// first sample. One change of offset yields a [`DstCorrection`]; a third
    /// distinct offset or a change back is rejected rather than guessed.
    pub fn detect(
        reference_date: NaiveDate,
        timestamps: &[DateTime<FixedOffset>],
    ) -> Result<Self, TimezoneError> {
        let first = timestamps.first().ok_or(TimezoneError::NoSamples)?;
        let base_offset = *first.offset();

        let mut offsets = vec![base_offset.local_minus_utc()];
        let mut changes = 0;
        let mut transition = None;
        for pair in timestamps.windows(2) {
            if pair[0].offset() == pair[1].offset() {
                continue;
            }
            changes += 1;
            let seconds = pair[1].offset().local_minus_utc();
            if !offsets.contains(&seconds) {
                offsets.push(seconds);
            }
            // The first sample at the new offset marks the switch. This
            // assumes no sampling gap straddles the transition; with one, the
            // switch lands on the sample after the gap.
            if transition.is_none() {
                let offset = *pair[1].offset();
                transition = Some(Transition {
                    at: pair[1].to_utc(),
                    offset,
                    correction: DstCorrection {
                        timepoint: time_to_point(&pair[1], reference_date, None),
                        shift_seconds: i64::from(
                            base_offset.local_minus_utc() - offset.local_minus_utc(),
                        ),
                    },
                });
            }
        }

        if offsets.len() > 2 {
            return Err(TimezoneError::AmbiguousOffsets { offsets });
        }
        if changes > 1 {
            return Err(TimezoneError::MultipleTransitions { changes });
        }
        if let Some(transition) = &transition {
            tracing::debug!(
                date = %reference_date,
                timepoint = transition.correction.timepoint,
                shift_seconds = transition.correction.shift_seconds,
                "daylight-saving transition inside window"
            );
        }

        Ok(Self {
            reference_date,
            base_offset,
            transition,
        })
    }

    pub const fn reference_date(&self) -> NaiveDate {
        self.reference_date
    }

    pub const fn base_offset(&self) -> FixedOffset {
        self.base_offset
    }

    /// The correction in force for this window, if an offset change occurs in it.
    pub fn dst_correction(&self) -> Option<DstCorrection> {
        self.transition.map(|t| t.correction)
    }

    pub const fn has_dst_transition(&self) -> bool {
        self.transition.is_some()
    }

    /// The offset in force at `instant`.
    pub fn offset_at(&self, instant: DateTime<Utc>) -> FixedOffset {
        match self.transition {
            Some(transition) if instant >= transition.at => transition.offset,
            _ => self.base_offset,
        }
    }

    /// Places an instant on the timeline using the offset in force at that instant.
    pub fn to_point<Tz: chrono::TimeZone>(&self, instant: &DateTime<Tz>) -> i64 {
        let utc = instant.to_utc();
        let local = utc.with_timezone(&self.offset_at(utc));
        time_to_point(&local, self.reference_date, None)
    }

    /// Recovers the instant for a point, expressed at the offset in force then.
    ///
    /// Points inside a DST discontinuity resolve to the post-transition
    /// reading; use [`Self::to_instant_checked`] to reject them instead.
    pub fn to_instant(&self, point: i64) -> DateTime<FixedOffset> {
        let instant = point_to_time(
            point,
            self.reference_date,
            self.base_offset,
            self.dst_correction(),
        );
        instant.with_timezone(&self.offset_at(instant.to_utc()))
    }

    /// Like [`Self::to_instant`], but fails for points whose wall-clock time
    /// was skipped or repeated by the window's transition.
    pub fn to_instant_checked(&self, point: i64) -> Result<DateTime<FixedOffset>, TimezoneError> {
        if let Some(correction) = self.dst_correction() {
            let (start, end) = correction.discontinuity();
            if (start..end).contains(&point) {
                return Err(if correction.shift_seconds < 0 {
                    TimezoneError::NonexistentLocalTime { point }
                } else {
                    TimezoneError::AmbiguousLocalTime { point }
                });
            }
        }
        Ok(self.to_instant(point))
    }
}

impl fmt::Display for DayWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} noon {}", self.reference_date, self.base_offset)?;
        if let Some(t) = self.transition {
            write!(f, " -> {} at point {}", t.offset, t.correction.timepoint)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn offset(hours: i32) -> FixedOffset {
        FixedOffset::east_opt(hours * 3600).unwrap()
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn at(tz: FixedOffset, y: i32, m: u32, d: u32, h: u32, min: u32) -> DateTime<FixedOffset> {
        tz.with_ymd_and_hms(y, m, d, h, min, 0).single().unwrap()
    }

    #[test]
    fn time_to_point_counts_minutes_from_noon() {
        let t = at(offset(0), 1993, 8, 26, 15, 0);
        assert_eq!(time_to_point(&t, date(1993, 8, 26), None), 180);

        let next_morning = at(offset(2), 1993, 8, 27, 3, 0);
        assert_eq!(time_to_point(&next_morning, date(1993, 8, 26), None), 15 * 60);
    }

    #[test]
    fn time_to_point_floors_before_noon() {
        let t = at(offset(0), 1993, 8, 26, 11, 59) + Duration::seconds(30);
        assert_eq!(time_to_point(&t, date(1993, 8, 26), None), -1);
    }

    #[test]
    fn time_to_point_applies_shift_before_subtracting() {
        let t = at(offset(1), 2024, 3, 31, 4, 0);
        assert_eq!(time_to_point(&t, date(2024, 3, 30), Some(-3600)), 15 * 60);
    }

    #[test]
    fn point_to_time_builds_instant_at_base_offset() {
        let result = point_to_time(180, date(1993, 8, 26), offset(0), None);
        assert_eq!(result, at(offset(0), 1993, 8, 26, 15, 0));
        assert_eq!(*result.offset(), offset(0));
    }

    #[test]
    fn round_trip_without_transition() {
        let d = date(2023, 5, 10);
        for tz in [offset(-5), offset(0), offset(9)] {
            for minutes in [-30, 0, 1, 719, 720, 1439, 2159] {
                let t = DateTime::from_naive_utc_and_offset(
                    local_noon(d) + Duration::minutes(minutes)
                        - Duration::seconds(i64::from(tz.local_minus_utc())),
                    tz,
                );
                let point = time_to_point(&t, d, None);
                assert_eq!(point, minutes);
                assert_eq!(point_to_time(point, d, tz, None), t);
            }
        }
    }

    #[test]
    fn point_to_time_shifts_points_after_transition() {
        let correction = DstCorrection {
            timepoint: 900,
            shift_seconds: -3600,
        };
        let before = point_to_time(899, date(2024, 3, 30), offset(1), Some(correction));
        let after = point_to_time(930, date(2024, 3, 30), offset(1), Some(correction));
        assert_eq!(before, at(offset(1), 2024, 3, 31, 2, 59));
        // 03:30 at +02:00 is 02:30 at +01:00.
        assert_eq!(after, at(offset(2), 2024, 3, 31, 3, 30));
    }

    #[test]
    fn point_label_matches_noon_anchored_axis() {
        assert_eq!(point_label(180, 1440, 12), "15:00");
        assert_eq!(point_label(0, 17_280, 12), "12:00");
        assert_eq!(point_label(17_280 / 2, 17_280, 12), "00:00");
        assert_eq!(point_label(6, 17_280, 0), "00:00");
        assert_eq!(point_label(12, 17_280, 0), "00:01");
    }

    #[test]
    fn slider_values_scale_to_graph_points() {
        assert_eq!(slider_to_graph_points(&[0, 60], 2880), vec![0, 120]);
        assert_eq!(slider_to_graph_points(&[90], 17_280), vec![1080]);
    }

    #[test]
    fn duration_formats_hours_and_minutes() {
        assert_eq!(duration_hh_mm(Duration::minutes(485)), "08:05");
        assert_eq!(duration_hh_mm(Duration::seconds(59)), "00:00");
        assert_eq!(duration_hh_mm(Duration::minutes(-90)), "-01:30");
    }

    fn hourly(start: DateTime<FixedOffset>, count: i64) -> Vec<DateTime<FixedOffset>> {
        (0..count).map(|h| start + Duration::hours(h)).collect()
    }

    #[test]
    fn detect_single_offset_has_no_correction() {
        let samples = hourly(at(offset(1), 2024, 6, 1, 12, 0), 36);
        let window = DayWindow::detect(date(2024, 6, 1), &samples).unwrap();
        assert_eq!(window.base_offset(), offset(1));
        assert!(!window.has_dst_transition());
        assert_eq!(window.dst_correction(), None);
    }

    #[test]
    fn detect_rejects_empty_window() {
        assert_eq!(
            DayWindow::detect(date(2024, 6, 1), &[]),
            Err(TimezoneError::NoSamples)
        );
    }

    /// Europe-style spring forward: 02:00 +01:00 becomes 03:00 +02:00.
    fn spring_forward_samples() -> Vec<DateTime<FixedOffset>> {
        let mut samples = Vec::new();
        let mut t = at(offset(1), 2024, 3, 30, 12, 0).to_utc();
        let switch = Utc.with_ymd_and_hms(2024, 3, 31, 1, 0, 0).unwrap();
        while t < Utc.with_ymd_and_hms(2024, 3, 31, 22, 0, 0).unwrap() {
            let tz = if t < switch { offset(1) } else { offset(2) };
            samples.push(t.with_timezone(&tz));
            t += Duration::minutes(30);
        }
        samples
    }

    /// Fall back: 03:00 +02:00 becomes 02:00 +01:00.
    fn fall_back_samples() -> Vec<DateTime<FixedOffset>> {
        let mut samples = Vec::new();
        let mut t = at(offset(2), 2024, 10, 26, 12, 0).to_utc();
        let switch = Utc.with_ymd_and_hms(2024, 10, 27, 1, 0, 0).unwrap();
        while t < Utc.with_ymd_and_hms(2024, 10, 27, 23, 0, 0).unwrap() {
            let tz = if t < switch { offset(2) } else { offset(1) };
            samples.push(t.with_timezone(&tz));
            t += Duration::minutes(30);
        }
        samples
    }

    #[test]
    fn detect_spring_forward_correction() {
        let window = DayWindow::detect(date(2024, 3, 30), &spring_forward_samples()).unwrap();
        assert_eq!(
            window.dst_correction(),
            Some(DstCorrection {
                timepoint: 15 * 60,
                shift_seconds: -3600,
            })
        );
        assert_eq!(window.dst_correction().unwrap().discontinuity(), (840, 900));
    }

    #[test]
    fn window_round_trips_every_sample_across_spring_forward() {
        let samples = spring_forward_samples();
        let window = DayWindow::detect(date(2024, 3, 30), &samples).unwrap();
        for sample in &samples {
            let point = window.to_point(sample);
            let back = window.to_instant_checked(point).unwrap();
            assert_eq!(back, *sample);
            assert_eq!(back.offset(), sample.offset());
        }
    }

    #[test]
    fn window_round_trips_unambiguous_samples_across_fall_back() {
        let samples = fall_back_samples();
        let window = DayWindow::detect(date(2024, 10, 26), &samples).unwrap();
        let correction = window.dst_correction().unwrap();
        assert_eq!(correction.shift_seconds, 3600);
        assert_eq!(correction.timepoint, 14 * 60);

        let (start, end) = correction.discontinuity();
        for sample in &samples {
            let point = window.to_point(sample);
            if (start..end).contains(&point) {
                assert_eq!(
                    window.to_instant_checked(point),
                    Err(TimezoneError::AmbiguousLocalTime { point })
                );
            } else {
                assert_eq!(window.to_instant(point), *sample);
            }
        }
    }

    #[test]
    fn checked_conversion_flags_skipped_hour() {
        let window = DayWindow::detect(date(2024, 3, 30), &spring_forward_samples()).unwrap();
        assert_eq!(
            window.to_instant_checked(14 * 60 + 30),
            Err(TimezoneError::NonexistentLocalTime { point: 870 })
        );
        assert!(window.to_instant_checked(15 * 60).is_ok());
    }

    #[test]
    fn detect_rejects_three_offsets() {
        let samples = vec![
            at(offset(0), 2024, 6, 1, 12, 0),
            at(offset(1), 2024, 6, 1, 14, 0),
            at(offset(2), 2024, 6, 1, 16, 0),
        ];
        assert_eq!(
            DayWindow::detect(date(2024, 6, 1), &samples),
            Err(TimezoneError::AmbiguousOffsets {
                offsets: vec![0, 3600, 7200],
            })
        );
    }

    #[test]
    fn detect_rejects_offset_switching_back() {
        let samples = vec![
            at(offset(0), 2024, 6, 1, 12, 0),
            at(offset(1), 2024, 6, 1, 14, 0),
            at(offset(0), 2024, 6, 1, 14, 0),
        ];
        assert_eq!(
            DayWindow::detect(date(2024, 6, 1), &samples),
            Err(TimezoneError::MultipleTransitions { changes: 2 })
        );
    }
}
