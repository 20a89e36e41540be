//! Time fragment resolution.
//!
//! Two small parsers with no side effects: absolute date/time phrasing in
//! day-first convention, and compact duration shorthand like `1h30m`.

use chrono::{DateTime, Local, NaiveDate, NaiveDateTime, NaiveTime, TimeZone};

use super::error::TimeError;

/// Combined date + time phrasings, day-first where ambiguous.
const DATE_TIME_FORMATS: &[&str] = &[
    "%d/%m/%Y %H:%M:%S",
    "%d/%m/%Y %H:%M",
    "%d-%m-%Y %H:%M",
    "%d.%m.%Y %H:%M",
    "%d/%m/%y %H:%M",
    "%d %b %Y %H:%M",
    "%d %B %Y %H:%M",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M:%S",
];

/// Date-only phrasings; the time defaults to midnight.
const DATE_FORMATS: &[&str] = &[
    "%d/%m/%Y",
    "%d-%m-%Y",
    "%d.%m.%Y",
    "%d/%m/%y",
    "%d %b %Y",
    "%d %B %Y",
    "%Y-%m-%d",
];

/// Time-only phrasings; resolved against today, rolling to tomorrow when the
/// instant has already passed.
const TIME_FORMATS: &[&str] = &["%H:%M:%S", "%H:%M", "%I:%M%p", "%I%p"];

/// Resolve a text fragment to an absolute point in the host's local zone.
pub fn resolve_absolute(text: &str) -> Result<DateTime<Local>, TimeError> {
    let text = text.trim();
    if text.is_empty() {
        return Err(TimeError::InvalidTimestamp);
    }

    for fmt in DATE_TIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(text, fmt) {
            return to_local(dt);
        }
    }
    for fmt in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(text, fmt) {
            return to_local(date.and_time(NaiveTime::MIN));
        }
    }
    for fmt in TIME_FORMATS {
        if let Ok(time) = NaiveTime::parse_from_str(text, fmt) {
            return resolve_bare_time(time);
        }
    }

    Err(TimeError::InvalidTimestamp)
}

/// Resolve a duration shorthand fragment to whole seconds.
///
/// Accepts concatenated `<number><unit>` segments with units s/m/h/d/w,
/// e.g. `45m`, `2d`, `1h30m`. Zero, stray characters, and numbers without a
/// unit are rejected.
pub fn resolve_duration(text: &str) -> Result<u32, TimeError> {
    let text = text.trim().to_lowercase();
    let mut total: u64 = 0;
    let mut current_number = String::new();

    for c in text.chars() {
        if c.is_ascii_digit() {
            current_number.push(c);
            continue;
        }
        if current_number.is_empty() {
            return Err(TimeError::InvalidDuration);
        }
        let value: u64 = current_number
            .parse()
            .map_err(|_| TimeError::InvalidDuration)?;
        current_number.clear();

        let per_unit: u64 = match c {
            's' => 1,
            'm' => 60,
            'h' => 60 * 60,
            'd' => 60 * 60 * 24,
            'w' => 60 * 60 * 24 * 7,
            _ => return Err(TimeError::InvalidDuration),
        };
        total = value
            .checked_mul(per_unit)
            .and_then(|v| total.checked_add(v))
            .ok_or(TimeError::InvalidDuration)?;
    }

    // A trailing number without a unit is as unparsable as a stray letter.
    if !current_number.is_empty() || total == 0 || total > u64::from(u32::MAX) {
        return Err(TimeError::InvalidDuration);
    }
    Ok(total as u32)
}

fn to_local(dt: NaiveDateTime) -> Result<DateTime<Local>, TimeError> {
    // earliest() picks the first wall-clock occurrence across DST folds.
    Local
        .from_local_datetime(&dt)
        .earliest()
        .ok_or(TimeError::InvalidTimestamp)
}

fn resolve_bare_time(time: NaiveTime) -> Result<DateTime<Local>, TimeError> {
    let now = Local::now();
    let today = now.date_naive();
    let candidate = to_local(today.and_time(time))?;
    if candidate > now {
        return Ok(candidate);
    }
    let tomorrow = today.succ_opt().ok_or(TimeError::InvalidTimestamp)?;
    to_local(tomorrow.and_time(time))
}
