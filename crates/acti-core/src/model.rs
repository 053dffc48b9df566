//! Subject, day and sleep-window records.
//!
//! A [`Subject`] owns its [`Day`]s and each day owns its [`SleepTime`]s.
//! Sensor samples ([`DataPoint`]) belong to the subject's session and are
//! looked up per day by index range, never copied into a day.

use chrono::{DateTime, Duration, FixedOffset, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

use crate::segment::{self, DayBounds, SegmentationError};
use crate::types::{SubjectId, ValidationError, offset_from_seconds};

/// One epoch of sensor output.
///
/// The timestamp keeps the offset it was recorded at; comparisons use the
/// absolute instant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataPoint {
    pub timestamp: DateTime<FixedOffset>,
    pub sensor_angle: f64,
    pub sensor_acceleration: f64,
    #[serde(default)]
    pub non_wear: bool,
}

/// An annotated sleep window.
///
/// Onset and wakeup are absolute instants that keep their original UTC
/// offsets, so they can be re-rendered on the evaluator's wall clock.
/// `onset == wakeup` is the "not yet reviewed" placeholder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawSleepTime")]
pub struct SleepTime {
    onset: DateTime<FixedOffset>,
    wakeup: DateTime<FixedOffset>,
}

#[derive(Deserialize)]
struct RawSleepTime {
    onset: DateTime<FixedOffset>,
    wakeup: DateTime<FixedOffset>,
}

impl TryFrom<RawSleepTime> for SleepTime {
    type Error = ValidationError;

    fn try_from(raw: RawSleepTime) -> Result<Self, Self::Error> {
        Self::new(raw.onset, raw.wakeup)
    }
}

impl SleepTime {
    /// Creates a window, rejecting one that ends before it starts.
    pub fn new(
        onset: DateTime<FixedOffset>,
        wakeup: DateTime<FixedOffset>,
    ) -> Result<Self, ValidationError> {
        if onset > wakeup {
            return Err(ValidationError::OnsetAfterWakeup {
                onset: onset.to_utc(),
                wakeup: wakeup.to_utc(),
            });
        }
        Ok(Self { onset, wakeup })
    }

    /// Rebuilds a window from UTC instants and the offsets they were recorded at.
    pub fn from_utc(
        onset: DateTime<Utc>,
        onset_utc_offset: i32,
        wakeup: DateTime<Utc>,
        wakeup_utc_offset: i32,
    ) -> Result<Self, ValidationError> {
        Self::new(
            onset.with_timezone(&offset_from_seconds(onset_utc_offset)?),
            wakeup.with_timezone(&offset_from_seconds(wakeup_utc_offset)?),
        )
    }

    /// The placeholder for a fresh day: `time` on the date after `date`, at `offset`.
    pub fn placeholder(date: NaiveDate, offset: FixedOffset, time: NaiveTime) -> Self {
        let wall = (date + Duration::days(1)).and_time(time);
        let utc = wall - Duration::seconds(i64::from(offset.local_minus_utc()));
        let instant = DateTime::from_naive_utc_and_offset(utc, offset);
        Self {
            onset: instant,
            wakeup: instant,
        }
    }

    pub fn is_unset(&self) -> bool {
        self.onset == self.wakeup
    }

    /// Onset on the wall clock it was recorded at.
    pub const fn onset_local(&self) -> DateTime<FixedOffset> {
        self.onset
    }

    /// Wakeup on the wall clock it was recorded at.
    pub const fn wakeup_local(&self) -> DateTime<FixedOffset> {
        self.wakeup
    }

    pub fn onset(&self) -> DateTime<Utc> {
        self.onset.to_utc()
    }

    pub fn wakeup(&self) -> DateTime<Utc> {
        self.wakeup.to_utc()
    }

    pub fn onset_utc_offset(&self) -> i32 {
        self.onset.offset().local_minus_utc()
    }

    pub fn wakeup_utc_offset(&self) -> i32 {
        self.wakeup.offset().local_minus_utc()
    }

    pub fn duration(&self) -> Duration {
        self.wakeup - self.onset
    }

    /// True when the two windows share more than a boundary instant.
    pub fn overlaps(&self, other: &Self) -> bool {
        self.onset < other.wakeup && other.onset < self.wakeup
    }
}

/// One reviewable wear-day of a subject.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Day {
    date: NaiveDate,
    #[serde(default)]
    is_missing_sleep: bool,
    #[serde(default)]
    is_multiple_sleep: bool,
    #[serde(default)]
    is_reviewed: bool,
    sleep_times: Vec<SleepTime>,
}

impl Day {
    /// A fresh day holding a single sleep window.
    pub fn new(date: NaiveDate, sleep_time: SleepTime) -> Self {
        Self {
            date,
            is_missing_sleep: false,
            is_multiple_sleep: false,
            is_reviewed: false,
            sleep_times: vec![sleep_time],
        }
    }

    pub const fn date(&self) -> NaiveDate {
        self.date
    }

    pub const fn is_missing_sleep(&self) -> bool {
        self.is_missing_sleep
    }

    pub const fn is_multiple_sleep(&self) -> bool {
        self.is_multiple_sleep
    }

    pub const fn is_reviewed(&self) -> bool {
        self.is_reviewed
    }

    pub fn set_missing_sleep(&mut self, value: bool) {
        self.is_missing_sleep = value;
    }

    pub fn set_multiple_sleep(&mut self, value: bool) {
        self.is_multiple_sleep = value;
    }

    pub fn set_reviewed(&mut self, value: bool) {
        self.is_reviewed = value;
    }

    /// Sleep windows in insertion order. Never empty.
    pub fn sleep_times(&self) -> &[SleepTime] {
        &self.sleep_times
    }

    pub fn sleep_time(&self, index: usize) -> Result<&SleepTime, ValidationError> {
        self.sleep_times
            .get(index)
            .ok_or(ValidationError::UnknownInterval {
                index,
                len: self.sleep_times.len(),
            })
    }

    /// Replaces the window at `index`.
    ///
    /// Fails if the new window overlaps another window on this day.
    pub fn set_sleep_time(
        &mut self,
        index: usize,
        sleep_time: SleepTime,
    ) -> Result<(), ValidationError> {
        self.sleep_time(index)?;
        self.check_overlap(Some(index), &sleep_time)?;
        self.sleep_times[index] = sleep_time;
        Ok(())
    }

    /// Appends a window and returns its index.
    pub fn add_sleep_time(&mut self, sleep_time: SleepTime) -> Result<usize, ValidationError> {
        self.check_overlap(None, &sleep_time)?;
        self.sleep_times.push(sleep_time);
        Ok(self.sleep_times.len() - 1)
    }

    /// Removes the window at `index`; the last remaining window cannot be removed.
    pub fn remove_sleep_time(&mut self, index: usize) -> Result<SleepTime, ValidationError> {
        self.sleep_time(index)?;
        if self.sleep_times.len() == 1 {
            return Err(ValidationError::LastInterval);
        }
        Ok(self.sleep_times.remove(index))
    }

    fn check_overlap(
        &self,
        skip: Option<usize>,
        candidate: &SleepTime,
    ) -> Result<(), ValidationError> {
        if candidate.is_unset() {
            return Ok(());
        }
        let clash = self
            .sleep_times
            .iter()
            .enumerate()
            .filter(|(i, existing)| Some(*i) != skip && !existing.is_unset())
            .find(|(_, existing)| existing.overlaps(candidate));
        match clash {
            Some((other, _)) => Err(ValidationError::OverlappingInterval { other }),
            None => Ok(()),
        }
    }
}

/// A study participant and their reviewable days.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subject {
    id: SubjectId,
    n_points_per_day: usize,
    days: Vec<Day>,
    #[serde(default)]
    is_finished: bool,
}

impl Subject {
    pub fn new(id: SubjectId, n_points_per_day: usize, days: Vec<Day>) -> Self {
        Self {
            id,
            n_points_per_day,
            days,
            is_finished: false,
        }
    }

    /// Segments `samples` and creates one day per reviewable segment.
    ///
    /// Each day starts with the placeholder window at `default_sleep_time` on
    /// the following date, at the offset of the following segment's first
    /// sample. The full segmentation is returned alongside, trailing day
    /// included.
    pub fn from_samples(
        id: SubjectId,
        samples: &[DataPoint],
        n_points_per_day: usize,
        default_sleep_time: NaiveTime,
    ) -> Result<(Self, Vec<DayBounds>), SegmentationError> {
        let timestamps: Vec<_> = samples.iter().map(|s| s.timestamp).collect();
        let bounds = segment::segment(&timestamps, n_points_per_day)?;

        let days = bounds
            .windows(2)
            .map(|pair| {
                let offset = *timestamps[pair[1].start].offset();
                let placeholder = SleepTime::placeholder(pair[0].date, offset, default_sleep_time);
                Day::new(pair[0].date, placeholder)
            })
            .collect::<Vec<_>>();
        tracing::info!(subject = %id, days = days.len(), "initialised subject");

        Ok((Self::new(id, n_points_per_day, days), bounds))
    }

    pub const fn id(&self) -> &SubjectId {
        &self.id
    }

    pub const fn n_points_per_day(&self) -> usize {
        self.n_points_per_day
    }

    pub fn days(&self) -> &[Day] {
        &self.days
    }

    pub fn day(&self, index: usize) -> Result<&Day, ValidationError> {
        self.days.get(index).ok_or(ValidationError::DayOutOfRange {
            index,
            days: self.days.len(),
        })
    }

    pub fn day_mut(&mut self, index: usize) -> Result<&mut Day, ValidationError> {
        let days = self.days.len();
        self.days
            .get_mut(index)
            .ok_or(ValidationError::DayOutOfRange { index, days })
    }

    pub const fn is_finished(&self) -> bool {
        self.is_finished
    }

    pub fn set_finished(&mut self, value: bool) {
        self.is_finished = value;
    }
}
