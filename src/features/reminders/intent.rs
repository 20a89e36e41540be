//! Schedule intent construction.
//!
//! Combines the parsed keyword fragments into a validated, fully resolved
//! [`ScheduleIntent`] ready for the scheduler core.

use std::time::Duration;

use chrono::{DateTime, Local};

use super::command::{Keyword, ParsedCommand};
use super::error::ParseError;
use super::timeparse::{resolve_absolute, resolve_duration};

/// Literal in the `with` fragment that requests text-to-speech delivery.
pub const TTS_MARKER: &str = "tts";

/// A validated, fully-resolved reminder command.
#[derive(Debug, Clone, PartialEq)]
pub struct ScheduleIntent {
    pub mention: String,
    pub message: String,
    pub requester: String,
    pub tts: bool,
    pub timing: Timing,
}

/// Job lifecycle selected by the command's time keywords.
#[derive(Debug, Clone, PartialEq)]
pub enum Timing {
    /// Fires every `interval` until cancelled; first fire at `start_at`
    /// when given, otherwise after one interval.
    Recurring {
        interval: Duration,
        start_at: Option<DateTime<Local>>,
    },
    /// Fires exactly once.
    OneShot(FireTime),
}

#[derive(Debug, Clone, PartialEq)]
pub enum FireTime {
    At(DateTime<Local>),
    After(Duration),
}

/// Build a [`ScheduleIntent`] from a tokenized command.
///
/// `requester` is the issuer's mention, carried into the delivered text for
/// attribution.
pub fn build(cmd: &ParsedCommand, requester: &str) -> Result<ScheduleIntent, ParseError> {
    let at = cmd
        .fragment(Keyword::At)
        .map(resolve_absolute)
        .transpose()
        .map_err(|_| ParseError::InvalidAt)?;
    let from = cmd
        .fragment(Keyword::From)
        .map(resolve_absolute)
        .transpose()
        .map_err(|_| ParseError::InvalidFrom)?;
    let every = cmd
        .fragment(Keyword::Every)
        .map(resolve_duration)
        .transpose()
        .map_err(|_| ParseError::InvalidEvery)?;
    let delay = cmd
        .fragment(Keyword::In)
        .map(resolve_duration)
        .transpose()
        .map_err(|_| ParseError::InvalidIn)?;

    let message = cmd
        .fragment(Keyword::To)
        .ok_or(ParseError::EmptyMessage)?
        .to_string();
    let tts = cmd
        .fragment(Keyword::With)
        .is_some_and(|f| f.contains(TTS_MARKER));

    if at.is_none() && from.is_none() && every.is_none() && delay.is_none() {
        return Err(ParseError::NoTimeSpecified);
    }
    // An absolute point and a recurrence cannot describe the same job. The
    // parser's keyword state machine already rejects these combinations;
    // this is the rule stated where the mode is decided.
    if at.is_some() && (every.is_some() || from.is_some()) {
        return Err(ParseError::ConflictingTimeKeywords);
    }

    let timing = match (at, delay) {
        (None, None) => {
            // A start time without an interval is not a schedule.
            let interval = every.ok_or(ParseError::InvalidEvery)?;
            Timing::Recurring {
                interval: Duration::from_secs(u64::from(interval)),
                start_at: from,
            }
        }
        (Some(at), _) => Timing::OneShot(FireTime::At(at)),
        (None, Some(secs)) => Timing::OneShot(FireTime::After(Duration::from_secs(u64::from(secs)))),
    };

    Ok(ScheduleIntent {
        mention: cmd.mention.clone(),
        message,
        requester: requester.to_string(),
        tts,
        timing,
    })
}
