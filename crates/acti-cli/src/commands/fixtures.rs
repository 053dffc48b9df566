//! Sample streams shared by command tests.

use acti_core::{DataPoint, SessionConfig, SubjectId, SubjectSession};
use chrono::{DateTime, Duration, FixedOffset, TimeZone, Utc};

use crate::Config;

pub const EPOCH_SECS: u32 = 300;

pub fn config() -> Config {
    Config {
        window_size_secs: EPOCH_SECS,
        ..Config::default()
    }
}

pub fn offset(hours: i32) -> FixedOffset {
    FixedOffset::east_opt(hours * 3600).unwrap()
}

/// Five-minute samples whose angle is their stream index.
pub fn stream(
    start: DateTime<Utc>,
    count: usize,
    offset_at: impl Fn(DateTime<Utc>) -> FixedOffset,
) -> Vec<DataPoint> {
    (0..count)
        .map(|i| {
            let utc = start + Duration::seconds(i as i64 * i64::from(EPOCH_SECS));
            DataPoint {
                timestamp: utc.with_timezone(&offset_at(utc)),
                sensor_angle: i as f64,
                sensor_acceleration: 0.5,
                non_wear: false,
            }
        })
        .collect()
}

/// 2024-05-01 through 2024-05-03 at +02:00, not worn from 01:00 to 01:50 on
/// 2024-05-02.
pub fn may_samples() -> Vec<DataPoint> {
    let start = Utc.with_ymd_and_hms(2024, 4, 30, 22, 0, 0).unwrap();
    let mut samples = stream(start, 3 * 288, |_| offset(2));
    for sample in &mut samples[300..310] {
        sample.non_wear = true;
    }
    samples
}

/// 2024-03-29 through the first hour of 2024-04-02, clocks going from +01:00
/// to +02:00 on 2024-03-31.
pub fn spring_samples() -> Vec<DataPoint> {
    let start = Utc.with_ymd_and_hms(2024, 3, 28, 23, 0, 0).unwrap();
    let switch = Utc.with_ymd_and_hms(2024, 3, 31, 1, 0, 0).unwrap();
    stream(start, 4 * 288, |utc| {
        if utc >= switch { offset(2) } else { offset(1) }
    })
}

pub fn session(samples: Vec<DataPoint>) -> SubjectSession {
    let config = SessionConfig {
        window_size_secs: EPOCH_SECS,
        ..SessionConfig::default()
    };
    SubjectSession::from_samples(SubjectId::new("1001").unwrap(), samples, config).unwrap()
}
