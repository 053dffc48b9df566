//! Review command: replay evaluator actions and print the sleep log.
//!
//! Actions are read from a JSON array, for example:
//!
//! ```json
//! [
//!   {"action": "set_window", "day": 0, "index": 0, "start": 660, "end": 1140},
//!   {"action": "reviewed", "day": 0, "value": true}
//! ]
//! ```
//!
//! Points are minutes past local noon of the day's date. Each action runs
//! against the state left by the previous one; the first failing action stops
//! the replay.

use std::io::Write;
use std::path::Path;

use acti_core::{SleepLogEntry, SubjectId, SubjectSession};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// One evaluator action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Action {
    SetWindow {
        day: usize,
        index: usize,
        start: i64,
        end: i64,
    },
    AddWindow {
        day: usize,
        start: i64,
        end: i64,
    },
    RemoveWindow {
        day: usize,
        index: usize,
    },
    MissingSleep {
        day: usize,
        value: bool,
    },
    MultipleSleep {
        day: usize,
        value: bool,
    },
    Reviewed {
        day: usize,
        value: bool,
    },
    Finished {
        value: bool,
    },
}

#[derive(Debug, Serialize)]
struct JsonReview<'a> {
    subject: &'a SubjectId,
    is_finished: bool,
    first_dst_day: Option<usize>,
    days: Vec<SleepLogEntry>,
}

/// Reads a JSON array of actions.
pub fn read_actions(path: &Path) -> Result<Vec<Action>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    serde_json::from_str(&content).with_context(|| format!("invalid actions in {}", path.display()))
}

pub fn run<W: Write>(writer: &mut W, session: &mut SubjectSession, actions: &[Action]) -> Result<()> {
    for (number, action) in actions.iter().enumerate() {
        apply(session, action).with_context(|| format!("action {number} ({action:?}) failed"))?;
    }

    let output = JsonReview {
        subject: session.subject().id(),
        is_finished: session.subject().is_finished(),
        first_dst_day: session.first_dst_day()?,
        days: session.sleep_log(),
    };
    serde_json::to_writer_pretty(&mut *writer, &output)?;
    writeln!(writer)?;
    Ok(())
}

fn apply(session: &mut SubjectSession, action: &Action) -> Result<()> {
    match *action {
        Action::SetWindow {
            day,
            index,
            start,
            end,
        } => {
            session.set_sleep_window(day, index, start, end)?;
        }
        Action::AddWindow { day, start, end } => {
            session.add_sleep_window(day, start, end)?;
        }
        Action::RemoveWindow { day, index } => {
            session.remove_sleep_window(day, index)?;
        }
        Action::MissingSleep { day, value } => session.set_missing_sleep(day, value)?,
        Action::MultipleSleep { day, value } => session.set_multiple_sleep(day, value)?,
        Action::Reviewed { day, value } => session.set_reviewed(day, value)?,
        Action::Finished { value } => session.set_finished(value),
    }
    Ok(())
}
