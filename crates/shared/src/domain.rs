use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

macro_rules! string_id_newtype {
    ($name:ident) => {
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub String);

        impl $name {
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
}

string_id_newtype!(WordId);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GameMode {
    #[default]
    Playing,
    Demo,
}

impl GameMode {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Playing => "playing",
            Self::Demo => "demo",
        }
    }

    /// Demo rounds come from the how-to-play flow and never reach the leaderboard.
    pub fn is_scored(self) -> bool {
        self == Self::Playing
    }
}

/// Per-letter verdict returned by the server for a spelling attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum FeedbackMarker {
    Correct,
    Present,
    Absent,
}

impl FeedbackMarker {
    pub const CORRECT_WIRE: &'static str = "🟩";
    pub const PRESENT_WIRE: &'static str = "🟨";
    pub const ABSENT_WIRE: &'static str = "⬛";

    pub fn from_wire(raw: &str) -> Self {
        match raw.trim() {
            Self::CORRECT_WIRE | "correct" => Self::Correct,
            Self::PRESENT_WIRE | "present" | "partial" => Self::Present,
            _ => Self::Absent,
        }
    }

    pub fn wire(self) -> &'static str {
        match self {
            Self::Correct => Self::CORRECT_WIRE,
            Self::Present => Self::PRESENT_WIRE,
            Self::Absent => Self::ABSENT_WIRE,
        }
    }
}

impl From<String> for FeedbackMarker {
    fn from(value: String) -> Self {
        Self::from_wire(&value)
    }
}

impl From<FeedbackMarker> for String {
    fn from(value: FeedbackMarker) -> Self {
        value.wire().to_string()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimeFilter {
    Daily,
    Weekly,
    Monthly,
    #[default]
    All,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortBy {
    #[default]
    Score,
    Attempts,
    CompletionTime,
    Timestamp,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

pub const USERNAME_MIN_LEN: usize = 3;
pub const USERNAME_MAX_LEN: usize = 20;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UsernameError {
    #[error("Please enter a username")]
    Empty,
    #[error("Username must be between 3 and 20 characters")]
    Length,
    #[error("Username can only contain letters, numbers, and underscores")]
    Charset,
}

/// Leaderboard display name, already trimmed and validated.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Username(String);

impl Username {
    pub fn parse(raw: &str) -> Result<Self, UsernameError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(UsernameError::Empty);
        }
        let len = trimmed.chars().count();
        if !(USERNAME_MIN_LEN..=USERNAME_MAX_LEN).contains(&len) {
            return Err(UsernameError::Length);
        }
        if !trimmed
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_')
        {
            return Err(UsernameError::Charset);
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for Username {
    type Error = UsernameError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Username> for String {
    fn from(value: Username) -> Self {
        value.0
    }
}

impl fmt::Display for Username {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_emoji_and_word_markers() {
        assert_eq!(FeedbackMarker::from_wire("🟩"), FeedbackMarker::Correct);
        assert_eq!(FeedbackMarker::from_wire("🟨"), FeedbackMarker::Present);
        assert_eq!(FeedbackMarker::from_wire("⬛"), FeedbackMarker::Absent);
        assert_eq!(FeedbackMarker::from_wire("partial"), FeedbackMarker::Present);
        assert_eq!(FeedbackMarker::from_wire("correct"), FeedbackMarker::Correct);
        assert_eq!(FeedbackMarker::from_wire("anything"), FeedbackMarker::Absent);
    }

    #[test]
    fn feedback_list_deserializes_from_server_json() {
        let markers: Vec<FeedbackMarker> =
            serde_json::from_str(r#"["🟩","🟨","⬛"]"#).expect("markers");
        assert_eq!(
            markers,
            vec![
                FeedbackMarker::Correct,
                FeedbackMarker::Present,
                FeedbackMarker::Absent
            ]
        );
    }

    #[test]
    fn username_rules_match_score_form() {
        assert_eq!(Username::parse("  "), Err(UsernameError::Empty));
        assert_eq!(Username::parse("ab"), Err(UsernameError::Length));
        assert_eq!(
            Username::parse("a_very_long_username_x"),
            Err(UsernameError::Length)
        );
        assert_eq!(Username::parse("bad name"), Err(UsernameError::Charset));
        assert_eq!(
            Username::parse(" speller_42 ").expect("valid").as_str(),
            "speller_42"
        );
    }

    #[test]
    fn game_mode_serializes_lowercase() {
        assert_eq!(
            serde_json::to_string(&GameMode::Demo).expect("json"),
            "\"demo\""
        );
        assert!(GameMode::Playing.is_scored());
        assert!(!GameMode::Demo.is_scored());
    }
}
