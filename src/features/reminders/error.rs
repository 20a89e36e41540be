use thiserror::Error;

/// Errors from resolving a time fragment into a point or a duration.
///
/// Internal to the time resolver; the intent builder maps these onto the
/// keyword-specific [`ParseError`] variants.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TimeError {
    /// The fragment does not match any supported date/time phrasing.
    #[error("unparsable date/time")]
    InvalidTimestamp,

    /// The fragment is not a positive duration in shorthand form.
    #[error("invalid duration")]
    InvalidDuration,
}

/// Errors produced while turning a raw `remind` command into an intent.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseError {
    /// The second token names no resolvable reminder target.
    #[error("unknown reminder target")]
    UnknownTarget,

    /// `him`/`her`/`them` used on a message that replies to nothing.
    #[error("target refers to a replied-to message, but there is none")]
    NoReferencedMessage,

    /// More than one absolute/duration time construct was supplied.
    #[error("conflicting time keywords")]
    ConflictingTimeKeywords,

    #[error("invalid 'at' date/time fragment")]
    InvalidAt,

    #[error("invalid 'from' date/time fragment")]
    InvalidFrom,

    #[error("invalid 'every' duration fragment")]
    InvalidEvery,

    #[error("invalid 'in' duration fragment")]
    InvalidIn,

    /// No `to` fragment, or it was blank after trimming.
    #[error("no message text")]
    EmptyMessage,

    /// None of `at`, `in`, `every`, `from` carried a usable value.
    #[error("no time specified")]
    NoTimeSpecified,
}

impl ParseError {
    /// Short reply sent back to the user, naming the offending keyword
    /// where one is known.
    pub fn user_reply(&self) -> &'static str {
        match self {
            ParseError::UnknownTarget => "Sorry remind who? Try again!",
            ParseError::NoReferencedMessage => {
                "You're not replying to anyone, so I don't know who that is. Try again!"
            }
            ParseError::ConflictingTimeKeywords => {
                "Can't understand! A very weird combination of keywords, try again!"
            }
            ParseError::InvalidAt => "Can't understand the 'at' date/time. Try again!",
            ParseError::InvalidFrom => "Can't understand the 'from' date/time. Try again!",
            ParseError::InvalidEvery => "Can't understand the 'every' duration. Try again!",
            ParseError::InvalidIn => "Can't understand the 'in' duration. Try again!",
            ParseError::EmptyMessage => "What's the message??? Try again!",
            ParseError::NoTimeSpecified => "When??? Try again!",
        }
    }
}

/// Errors from registering a job with the scheduler core.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SchedulerError {
    /// Interval or delay of zero. Normally rejected at intent validation.
    #[error("interval or delay must be greater than zero")]
    InvalidInterval,

    /// A one-shot absolute fire time that is not in the future.
    #[error("fire time is in the past")]
    PastFireTime,

    /// The job could not be registered (e.g. the tag is already live).
    #[error("job registration failed: {0}")]
    RegistrationFailed(String),
}

impl SchedulerError {
    pub fn user_reply(&self) -> &'static str {
        match self {
            SchedulerError::PastFireTime => "That time is already in the past. Try again!",
            SchedulerError::InvalidInterval | SchedulerError::RegistrationFailed(_) => {
                "Error with scheduler. Let the creator know!!"
            }
        }
    }
}

/// Errors from handing a composed notification to the transport.
#[derive(Debug, Error)]
pub enum DeliveryError {
    #[error("transport send failed: {0}")]
    TransportFailure(String),
}
