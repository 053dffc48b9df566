//! Core engine for reviewing actigraphy recordings.
//!
//! This crate contains the fundamental types and logic for:
//! - Segmentation: splitting a sample stream into calendar wear-days
//! - Coordinates: mapping instants to and from noon-anchored timeline points
//! - Conflict resolution: keeping a dragged sleep window off its neighbours
//! - Non-wear runs: boundary indices of contiguous flagged spans
//! - Sessions: evaluator actions on one subject's days

pub mod coordinate;
pub mod model;
pub mod resolve;
pub mod runs;
pub mod segment;
pub mod session;
pub mod types;

pub use coordinate::{DayWindow, DstCorrection, TimezoneError, point_to_time, time_to_point};
pub use model::{DataPoint, Day, SleepTime, Subject};
pub use resolve::{ConflictError, Interval, MAX_RESOLVE_ITERATIONS, resolve_conflict};
pub use runs::{RunError, extract_runs};
pub use segment::{DayBounds, DstAdjustment, SegmentationError, reviewable_days, segment};
pub use session::{SessionConfig, SessionError, SleepLogEntry, SubjectSession, WearDayWindow};
pub use types::{SubjectId, ValidationError};
