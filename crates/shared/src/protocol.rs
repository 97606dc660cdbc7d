use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::domain::{FeedbackMarker, GameMode, SortBy, SortOrder, TimeFilter, Username, WordId};

pub const HEALTHY_STATUS: &str = "healthy";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl HealthResponse {
    pub fn is_healthy(&self) -> bool {
        self.status == HEALTHY_STATUS
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StartGameRequest {
    pub difficulty: String,
    pub mode: GameMode,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StartGameResponse {
    pub word_id: WordId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub word: Option<String>,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub length_options: Vec<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hint1: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hint2: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hint3: Option<String>,
}

impl StartGameResponse {
    /// Hints in reveal order, skipping any the server left blank.
    pub fn hints(&self) -> Vec<String> {
        [&self.hint1, &self.hint2, &self.hint3]
            .into_iter()
            .flatten()
            .filter(|hint| !hint.trim().is_empty())
            .cloned()
            .collect()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GuessLengthRequest {
    pub word_id: WordId,
    pub guessed_length: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GuessLengthResponse {
    pub is_correct: bool,
    #[serde(default)]
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub word_length: Option<usize>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmitSpellingRequest {
    pub word_id: WordId,
    pub guess: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmitSpellingResponse {
    pub is_correct: bool,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub feedback: Vec<FeedbackMarker>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub correct_word: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub example_sentence: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WordRequest {
    pub word_id: WordId,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RevealAnswerResponse {
    pub correct_word: String,
    #[serde(default)]
    pub example_sentence: String,
    #[serde(default)]
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HintUsageResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hints_used: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmitScoreRequest {
    pub username: Username,
    pub word_id: WordId,
    /// Seconds from round start to completion.
    pub completion_time: f64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmitScoreResponse {
    #[serde(default)]
    pub success: bool,
    pub score: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rank: Option<u32>,
    #[serde(default)]
    pub message: String,
}

pub const LEADERBOARD_DEFAULT_LIMIT: u32 = 50;
pub const LEADERBOARD_MAX_LIMIT: u32 = 100;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LeaderboardQuery {
    pub limit: u32,
    pub offset: u32,
    pub time_filter: TimeFilter,
    pub sort_by: SortBy,
    pub sort_order: SortOrder,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
}

impl Default for LeaderboardQuery {
    fn default() -> Self {
        Self {
            limit: LEADERBOARD_DEFAULT_LIMIT,
            offset: 0,
            time_filter: TimeFilter::default(),
            sort_by: SortBy::default(),
            sort_order: SortOrder::default(),
            username: None,
        }
    }
}

impl LeaderboardQuery {
    /// Clamps `limit` into the range the server accepts.
    pub fn normalized(mut self) -> Self {
        self.limit = self.limit.clamp(1, LEADERBOARD_MAX_LIMIT);
        self.username = self
            .username
            .map(|name| name.trim().to_string())
            .filter(|name| !name.is_empty());
        self
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LeaderboardEntry {
    pub username: String,
    pub word: String,
    pub score: i64,
    pub attempts: u32,
    pub hints_used: u32,
    pub completion_time: f64,
    pub timestamp: NaiveDateTime,
    #[serde(default)]
    pub word_length: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LeaderboardResponse {
    #[serde(default)]
    pub entries: Vec<LeaderboardEntry>,
    #[serde(default)]
    pub total_entries: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_rank: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_best_score: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserStatsResponse {
    pub username: String,
    pub total_games: u32,
    pub best_score: i64,
    pub average_score: f64,
    pub total_words_completed: u32,
    pub average_attempts: f64,
    pub average_completion_time: f64,
}
