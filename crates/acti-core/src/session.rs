//! One evaluator's working session on one subject.
//!
//! A [`SubjectSession`] is built once when a subject is opened. It holds the
//! parsed sample stream, the day segmentation and the subject record, and
//! every rendering query or evaluator action goes through it.

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::coordinate::{
    DayWindow, DstCorrection, TimezoneError, WINDOW_MINUTES, duration_hh_mm, time_to_point,
};
use crate::model::{DataPoint, SleepTime, Subject};
use crate::resolve::{ConflictError, Interval, resolve_conflict};
use crate::runs::{RunError, extract_runs};
use crate::segment::{DayBounds, SegmentationError};
use crate::types::{SubjectId, ValidationError};

const SECONDS_PER_HOUR: u32 = 60 * 60;
const SECONDS_PER_DAY: u32 = 24 * SECONDS_PER_HOUR;

/// Errors surfaced by session queries and evaluator actions.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SessionError {
    #[error(transparent)]
    Segmentation(#[from] SegmentationError),

    #[error(transparent)]
    Timezone(#[from] TimezoneError),

    #[error(transparent)]
    Conflict(#[from] ConflictError),

    #[error(transparent)]
    Run(#[from] RunError),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The sampling epoch does not split an hour into whole samples.
    #[error("window size of {seconds} seconds does not divide an hour")]
    InvalidWindowSize { seconds: u32 },

    /// A resolved sleep window does not fit on the day's timeline.
    #[error("sleep window {interval} falls outside the timeline [0, {max}]")]
    OutsideWindow { interval: Interval, max: i64 },

    /// A resolved sleep window has no length and would read as unset.
    #[error("sleep window {interval} has zero length")]
    EmptyWindow { interval: Interval },
}

/// Settings that shape a session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Sampling epoch of the sensor output, in seconds.
    pub window_size_secs: u32,
    /// Clock time of the "not yet reviewed" placeholder window.
    pub default_sleep_time: NaiveTime,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            window_size_secs: 5,
            default_sleep_time: NaiveTime::from_hms_opt(3, 0, 0).unwrap_or(NaiveTime::MIN),
        }
    }
}

impl SessionConfig {
    /// Samples per calendar day.
    pub fn points_per_day(&self) -> Result<usize, SessionError> {
        let seconds = self.window_size_secs;
        if seconds == 0 || SECONDS_PER_HOUR % seconds != 0 {
            return Err(SessionError::InvalidWindowSize { seconds });
        }
        Ok((SECONDS_PER_DAY / seconds) as usize)
    }
}

/// The 36-hour display of one wear-day: the afternoon and evening of its date
/// followed by the whole next date.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WearDayWindow {
    pub day: usize,
    pub date: NaiveDate,
    pub sensor_angle: Vec<f64>,
    pub sensor_acceleration: Vec<f64>,
    pub non_wear: Vec<bool>,
    /// Boundary pairs of the non-wear runs, as sample indices into this window.
    pub non_wear_runs: Vec<usize>,
    pub dst: Option<DstCorrection>,
    #[serde(skip)]
    coordinates: DayWindow,
}

impl WearDayWindow {
    /// The timeline mapping for this window.
    pub const fn coordinates(&self) -> &DayWindow {
        &self.coordinates
    }

    pub fn len(&self) -> usize {
        self.sensor_angle.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sensor_angle.is_empty()
    }
}

/// A sleep window as written to the sleep log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SleepLogWindow {
    pub onset: DateTime<FixedOffset>,
    pub wakeup: DateTime<FixedOffset>,
    /// `HH:MM`.
    pub duration: String,
    pub is_unset: bool,
}

/// One row of the sleep log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SleepLogEntry {
    pub date: NaiveDate,
    pub is_missing_sleep: bool,
    pub is_multiple_sleep: bool,
    pub is_reviewed: bool,
    pub windows: Vec<SleepLogWindow>,
}

/// A subject together with its samples and computed day bounds.
#[derive(Debug, Clone)]
pub struct SubjectSession {
    subject: Subject,
    samples: Vec<DataPoint>,
    bounds: Vec<DayBounds>,
    config: SessionConfig,
}

impl SubjectSession {
    /// Opens a subject from its chronologically ordered samples.
    pub fn from_samples(
        id: SubjectId,
        samples: Vec<DataPoint>,
        config: SessionConfig,
    ) -> Result<Self, SessionError> {
        let points_per_day = config.points_per_day()?;
        let (subject, bounds) =
            Subject::from_samples(id, &samples, points_per_day, config.default_sleep_time)?;
        Ok(Self {
            subject,
            samples,
            bounds,
            config,
        })
    }

    pub const fn subject(&self) -> &Subject {
        &self.subject
    }

    pub fn samples(&self) -> &[DataPoint] {
        &self.samples
    }

    /// Every segmented day, including the trailing partial one.
    pub fn bounds(&self) -> &[DayBounds] {
        &self.bounds
    }

    pub const fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Days the evaluator can review.
    pub fn day_count(&self) -> usize {
        self.subject.days().len()
    }

    /// Assembles the display window of reviewable day `day`.
    pub fn day_window(&self, day: usize) -> Result<WearDayWindow, SessionError> {
        let bounds = self.reviewable_bounds(day)?;
        let coordinates = self.coordinates(day)?;
        let half = self.subject.n_points_per_day() / 2;

        let sensor_angle = self.window_values(day, half, 0.0, |s| s.sensor_angle)?;
        let sensor_acceleration = self.window_values(day, half, 0.0, |s| s.sensor_acceleration)?;
        let non_wear = self.window_values(day, half, false, |s| s.non_wear)?;
        let non_wear_runs = extract_runs(&non_wear);

        Ok(WearDayWindow {
            day,
            date: bounds.date,
            sensor_angle,
            sensor_acceleration,
            non_wear,
            non_wear_runs,
            dst: coordinates.dst_correction(),
            coordinates,
        })
    }

    /// The first reviewable day whose window spans a change of UTC offset.
    pub fn first_dst_day(&self) -> Result<Option<usize>, SessionError> {
        for day in 0..self.day_count() {
            if self.coordinates(day)?.has_dst_transition() {
                return Ok(Some(day));
            }
        }
        Ok(None)
    }

    /// The day's sleep windows as timeline points, in stored order.
    pub fn sleep_window_points(&self, day: usize) -> Result<Vec<Interval>, SessionError> {
        let coordinates = self.coordinates(day)?;
        let points = self
            .subject
            .day(day)?
            .sleep_times()
            .iter()
            .map(|sleep| to_interval(&coordinates, sleep))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(points)
    }

    /// Moves window `index` of `day` to the dragged timeline points.
    ///
    /// The drag is first resolved against the day's other annotated windows;
    /// the stored window is the resolved one.
    pub fn set_sleep_window(
        &mut self,
        day: usize,
        index: usize,
        start: i64,
        end: i64,
    ) -> Result<SleepTime, SessionError> {
        self.subject.day(day)?.sleep_time(index)?;
        let sleep = self.place(day, Some(index), start, end)?;
        self.subject.day_mut(day)?.set_sleep_time(index, sleep)?;
        tracing::info!(day, index, onset = %sleep.onset_local(), wakeup = %sleep.wakeup_local(), "set sleep window");
        Ok(sleep)
    }

    /// Adds a window to `day` from dragged points and returns its index.
    pub fn add_sleep_window(
        &mut self,
        day: usize,
        start: i64,
        end: i64,
    ) -> Result<usize, SessionError> {
        let sleep = self.place(day, None, start, end)?;
        let index = self.subject.day_mut(day)?.add_sleep_time(sleep)?;
        tracing::info!(day, index, onset = %sleep.onset_local(), wakeup = %sleep.wakeup_local(), "added sleep window");
        Ok(index)
    }

    pub fn remove_sleep_window(&mut self, day: usize, index: usize) -> Result<SleepTime, SessionError> {
        let removed = self.subject.day_mut(day)?.remove_sleep_time(index)?;
        tracing::info!(day, index, "removed sleep window");
        Ok(removed)
    }

    pub fn set_missing_sleep(&mut self, day: usize, value: bool) -> Result<(), SessionError> {
        self.subject.day_mut(day)?.set_missing_sleep(value);
        tracing::info!(day, value, "set missing sleep");
        Ok(())
    }

    pub fn set_multiple_sleep(&mut self, day: usize, value: bool) -> Result<(), SessionError> {
        self.subject.day_mut(day)?.set_multiple_sleep(value);
        tracing::info!(day, value, "set multiple sleep");
        Ok(())
    }

    pub fn set_reviewed(&mut self, day: usize, value: bool) -> Result<(), SessionError> {
        self.subject.day_mut(day)?.set_reviewed(value);
        tracing::info!(day, value, "set reviewed");
        Ok(())
    }

    pub fn set_finished(&mut self, value: bool) {
        self.subject.set_finished(value);
        tracing::info!(subject = %self.subject.id(), value, "set finished");
    }

    /// Per-day flags and local sleep windows.
    pub fn sleep_log(&self) -> Vec<SleepLogEntry> {
        self.subject
            .days()
            .iter()
            .map(|day| SleepLogEntry {
                date: day.date(),
                is_missing_sleep: day.is_missing_sleep(),
                is_multiple_sleep: day.is_multiple_sleep(),
                is_reviewed: day.is_reviewed(),
                windows: day
                    .sleep_times()
                    .iter()
                    .map(|sleep| SleepLogWindow {
                        onset: sleep.onset_local(),
                        wakeup: sleep.wakeup_local(),
                        duration: duration_hh_mm(sleep.duration()),
                        is_unset: sleep.is_unset(),
                    })
                    .collect(),
            })
            .collect()
    }

    fn reviewable_bounds(&self, day: usize) -> Result<&DayBounds, SessionError> {
        let days = self.day_count();
        if day >= days {
            return Err(ValidationError::DayOutOfRange { index: day, days }.into());
        }
        Ok(&self.bounds[day])
    }

    /// Timeline mapping for `day`, detected from the samples shown in its window.
    fn coordinates(&self, day: usize) -> Result<DayWindow, SessionError> {
        let bounds = self.reviewable_bounds(day)?;
        let end = self.bounds.get(day + 1).map_or(bounds.end, |next| next.end);
        let timestamps: Vec<_> = self.samples[bounds.start..end]
            .iter()
            .map(|s| s.timestamp)
            .filter(|ts| time_to_point(ts, bounds.date, None) >= 0)
            .collect();
        if timestamps.is_empty() {
            let offset = *self.samples[bounds.start].timestamp.offset();
            return Ok(DayWindow::new(bounds.date, offset));
        }
        Ok(DayWindow::detect(bounds.date, &timestamps)?)
    }

    /// The second half of `day` followed by the whole next day, padding
    /// included. A missing next day is filled with `fill`.
    fn window_values<T: Copy>(
        &self,
        day: usize,
        half: usize,
        fill: T,
        field: impl Fn(&DataPoint) -> T,
    ) -> Result<Vec<T>, SessionError> {
        let values: Vec<T> = self.samples.iter().map(field).collect();
        let points_per_day = self.subject.n_points_per_day();
        let mut out = Vec::with_capacity(half + points_per_day);

        let today = self.layout(day, &values, fill)?;
        out.extend_from_slice(&today[half.min(today.len())..]);
        match self.bounds.get(day + 1) {
            Some(_) => out.extend(self.layout(day + 1, &values, fill)?),
            None => out.extend(std::iter::repeat_n(fill, points_per_day)),
        }
        Ok(out)
    }

    fn layout<T: Copy>(&self, index: usize, values: &[T], fill: T) -> Result<Vec<T>, SessionError> {
        let bounds = &self.bounds[index];
        bounds.layout(values, fill).ok_or_else(|| {
            RunError::LengthMismatch {
                expected: bounds.end,
                actual: values.len(),
            }
            .into()
        })
    }

    /// Resolves a drag against the day's other annotated windows and converts
    /// the result to instants.
    fn place(
        &self,
        day: usize,
        skip: Option<usize>,
        start: i64,
        end: i64,
    ) -> Result<SleepTime, SessionError> {
        let coordinates = self.coordinates(day)?;
        let dragged = Interval::new(start, end)?;
        let others = self
            .subject
            .day(day)?
            .sleep_times()
            .iter()
            .enumerate()
            .filter(|(i, sleep)| Some(*i) != skip && !sleep.is_unset())
            .map(|(_, sleep)| to_interval(&coordinates, sleep))
            .collect::<Result<Vec<_>, _>>()?;

        let resolved = resolve_conflict(dragged, &others)?;
        if resolved.start < 0 || resolved.end > WINDOW_MINUTES {
            return Err(SessionError::OutsideWindow {
                interval: resolved,
                max: WINDOW_MINUTES,
            });
        }
        if resolved.start == resolved.end {
            return Err(SessionError::EmptyWindow { interval: resolved });
        }

        let onset = coordinates.to_instant_checked(resolved.start)?;
        let wakeup = coordinates.to_instant_checked(resolved.end)?;
        Ok(SleepTime::new(onset, wakeup)?)
    }
}

fn to_interval(coordinates: &DayWindow, sleep: &SleepTime) -> Result<Interval, ConflictError> {
    Interval::new(
        coordinates.to_point(&sleep.onset_local()),
        coordinates.to_point(&sleep.wakeup_local()),
    )
}
