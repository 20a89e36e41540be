//! Reminder command tokenization.
//!
//! Splits a raw `remind ...` message into a mention target and a map of
//! keyword fragments. Purely lexical; time fragments are resolved later by
//! the intent builder.

use std::collections::HashMap;

use super::error::ParseError;

/// Leading trigger word for reminder commands.
pub const TRIGGER: &str = "remind";

/// Broadcast target marker.
pub const BROADCAST_MENTION: &str = "@everyone";

/// Keywords that introduce a fragment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Keyword {
    At,
    In,
    Every,
    From,
    To,
    With,
}

impl Keyword {
    fn from_token(token: &str) -> Option<Self> {
        match token {
            "at" => Some(Keyword::At),
            "in" => Some(Keyword::In),
            "every" => Some(Keyword::Every),
            "from" => Some(Keyword::From),
            "to" => Some(Keyword::To),
            "with" => Some(Keyword::With),
            _ => None,
        }
    }

    /// Time-keyword class, if any. `to`/`with` carry no time meaning.
    fn time_class(self) -> Option<TimeClass> {
        match self {
            Keyword::At | Keyword::In => Some(TimeClass::Point),
            Keyword::Every | Keyword::From => Some(TimeClass::Recur),
            Keyword::To | Keyword::With => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TimeClass {
    /// `at` / `in`: a single absolute point or delay.
    Point,
    /// `every` / `from`: a recurrence interval or its start.
    Recur,
}

/// Conflict detector over the time-keyword stream.
///
/// Transition table (anything not listed is a conflict):
///
/// | state  | point      | recur      |
/// |--------|------------|------------|
/// | Empty  | Point      | Recur1     |
/// | Point  | conflict   | conflict   |
/// | Recur1 | conflict   | Recur2     |
/// | Recur2 | conflict   | conflict   |
///
/// So a command carries either one point keyword or up to two recurrence
/// keywords, never a mix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TimeKeywordState {
    Empty,
    Point,
    Recur1,
    Recur2,
}

impl TimeKeywordState {
    fn advance(self, class: TimeClass) -> Result<Self, ParseError> {
        match (self, class) {
            (TimeKeywordState::Empty, TimeClass::Point) => Ok(TimeKeywordState::Point),
            (TimeKeywordState::Empty, TimeClass::Recur) => Ok(TimeKeywordState::Recur1),
            (TimeKeywordState::Recur1, TimeClass::Recur) => Ok(TimeKeywordState::Recur2),
            _ => Err(ParseError::ConflictingTimeKeywords),
        }
    }
}

/// Tokenized command: resolved mention target plus keyword fragments.
#[derive(Debug, PartialEq, Eq)]
pub struct ParsedCommand {
    pub mention: String,
    fragments: HashMap<Keyword, String>,
}

impl ParsedCommand {
    /// Trimmed fragment for a keyword; `None` when absent or blank.
    pub fn fragment(&self, keyword: Keyword) -> Option<&str> {
        self.fragments
            .get(&keyword)
            .map(|f| f.trim())
            .filter(|f| !f.is_empty())
    }
}

/// Whether the message is a reminder command at all.
pub fn is_trigger(content: &str) -> bool {
    content.split_whitespace().next() == Some(TRIGGER)
}

/// Tokenize a raw command into a [`ParsedCommand`].
///
/// `author_mention` is the issuer's own mention; `referenced_author` is the
/// mention of the author of the message being replied to, when there is one.
pub fn parse(
    raw: &str,
    author_mention: &str,
    referenced_author: Option<&str>,
) -> Result<ParsedCommand, ParseError> {
    let mut tokens = raw.split_whitespace();
    // Leading trigger word, already checked by is_trigger().
    tokens.next();

    let target = tokens.next().ok_or(ParseError::UnknownTarget)?;
    let mention = match target {
        "me" => author_mention.to_string(),
        "everyone" => BROADCAST_MENTION.to_string(),
        "him" | "her" | "them" => referenced_author
            .ok_or(ParseError::NoReferencedMessage)?
            .to_string(),
        t if t.starts_with('@') || t.starts_with("<@") => t.to_string(),
        _ => return Err(ParseError::UnknownTarget),
    };

    let mut fragments: HashMap<Keyword, String> = HashMap::new();
    let mut state = TimeKeywordState::Empty;
    let mut current: Option<Keyword> = None;

    for token in tokens {
        if let Some(keyword) = Keyword::from_token(token) {
            if let Some(class) = keyword.time_class() {
                state = state.advance(class)?;
            }
            current = Some(keyword);
            continue;
        }
        // Tokens before the first keyword have nowhere to go.
        if let Some(keyword) = current {
            let fragment = fragments.entry(keyword).or_default();
            if !fragment.is_empty() {
                fragment.push(' ');
            }
            fragment.push_str(token);
        }
    }

    Ok(ParsedCommand { mention, fragments })
}

#[cfg(test)]
mod tests {
    use super::*;

    const AUTHOR: &str = "<@100>";
    const REPLIED: &str = "<@200>";

    #[test]
    fn test_target_me() {
        let cmd = parse("remind me in 10m to buy milk", AUTHOR, None).unwrap();
        assert_eq!(cmd.mention, AUTHOR);
        assert_eq!(cmd.fragment(Keyword::In), Some("10m"));
        assert_eq!(cmd.fragment(Keyword::To), Some("buy milk"));
    }

    #[test]
    fn test_target_everyone() {
        let cmd = parse("remind everyone every 1h to stretch", AUTHOR, None).unwrap();
        assert_eq!(cmd.mention, BROADCAST_MENTION);
    }

    #[test]
    fn test_target_replied_author() {
        let cmd = parse("remind her in 5m to call back", AUTHOR, Some(REPLIED)).unwrap();
        assert_eq!(cmd.mention, REPLIED);

        assert_eq!(
            parse("remind them in 5m to call back", AUTHOR, None),
            Err(ParseError::NoReferencedMessage)
        );
    }

    #[test]
    fn test_target_verbatim_mention() {
        let cmd = parse("remind @ops in 5m to rotate", AUTHOR, None).unwrap();
        assert_eq!(cmd.mention, "@ops");

        let cmd = parse("remind <@300> in 5m to rotate", AUTHOR, None).unwrap();
        assert_eq!(cmd.mention, "<@300>");
    }

    #[test]
    fn test_target_unknown() {
        assert_eq!(
            parse("remind somebody in 5m to x", AUTHOR, None),
            Err(ParseError::UnknownTarget)
        );
        assert_eq!(parse("remind", AUTHOR, None), Err(ParseError::UnknownTarget));
    }

    #[test]
    fn test_fragments_accumulate_space_joined() {
        let cmd = parse(
            "remind me at 25/12/2030 18:30 to open the presents with tts please",
            AUTHOR,
            None,
        )
        .unwrap();
        assert_eq!(cmd.fragment(Keyword::At), Some("25/12/2030 18:30"));
        assert_eq!(cmd.fragment(Keyword::To), Some("open the presents"));
        assert_eq!(cmd.fragment(Keyword::With), Some("tts please"));
    }

    #[test]
    fn test_keyword_tokens_inside_message_are_keywords() {
        // "to" inside the message text re-selects the `to` fragment, so the
        // inner token itself is dropped. Matches the keyword-first grammar.
        let cmd = parse("remind me in 5m to go to bed", AUTHOR, None).unwrap();
        assert_eq!(cmd.fragment(Keyword::To), Some("go bed"));
    }

    #[test]
    fn test_conflicting_point_keywords() {
        assert_eq!(
            parse("remind him at in to x", AUTHOR, Some(REPLIED)),
            Err(ParseError::ConflictingTimeKeywords)
        );
        assert_eq!(
            parse("remind me in 5m in 10m to x", AUTHOR, None),
            Err(ParseError::ConflictingTimeKeywords)
        );
    }

    #[test]
    fn test_point_and_recur_conflict_in_either_order() {
        assert_eq!(
            parse("remind me at 18:00 every 1h to x", AUTHOR, None),
            Err(ParseError::ConflictingTimeKeywords)
        );
        assert_eq!(
            parse("remind me every 1h in 5m to x", AUTHOR, None),
            Err(ParseError::ConflictingTimeKeywords)
        );
        assert_eq!(
            parse("remind me from 18:00 at 19:00 to x", AUTHOR, None),
            Err(ParseError::ConflictingTimeKeywords)
        );
    }

    #[test]
    fn test_two_recur_keywords_allowed() {
        let cmd = parse(
            "remind me every 1h from 25/12/2030 09:00 to stretch",
            AUTHOR,
            None,
        )
        .unwrap();
        assert_eq!(cmd.fragment(Keyword::Every), Some("1h"));
        assert_eq!(cmd.fragment(Keyword::From), Some("25/12/2030 09:00"));
    }

    #[test]
    fn test_three_time_keywords_conflict() {
        assert_eq!(
            parse("remind me every 1h from 09:00 every 2h to x", AUTHOR, None),
            Err(ParseError::ConflictingTimeKeywords)
        );
    }

    #[test]
    fn test_to_and_with_never_conflict() {
        let cmd = parse("remind me in 5m to x with tts", AUTHOR, None).unwrap();
        assert_eq!(cmd.fragment(Keyword::In), Some("5m"));
    }

    #[test]
    fn test_is_trigger() {
        assert!(is_trigger("remind me in 5m to x"));
        assert!(is_trigger("  remind me"));
        assert!(!is_trigger("reminders are nice"));
        assert!(!is_trigger("please remind me"));
        assert!(!is_trigger(""));
    }
}
