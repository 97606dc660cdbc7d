//! The `GameSession` aggregate and its transition functions.
//!
//! Everything in here is synchronous and free of I/O; [`crate::GameController`]
//! performs the remote calls and feeds their responses into these methods
//! while holding the session lock.

use std::time::Duration;

use shared::{
    domain::{FeedbackMarker, GameMode, WordId},
    protocol::{GuessLengthResponse, RevealAnswerResponse, StartGameResponse, SubmitSpellingResponse},
};
use tokio::time::Instant;

use crate::error::{ControllerError, ValidationError};

pub const MAX_HINTS: u8 = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Connectivity {
    #[default]
    Unknown,
    Connected,
    Disconnected,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    LengthGuess,
    Spelling { word_length: usize },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outcome {
    pub is_winner: bool,
    pub correct_word: String,
    pub example_sentence: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Screen {
    #[default]
    Start,
    InRound {
        mode: GameMode,
        phase: Phase,
    },
    Complete {
        outcome: Outcome,
    },
}

/// Flattened top-level screen selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameState {
    Start,
    Playing,
    Demo,
    Complete,
}

impl GameState {
    pub fn label(self) -> &'static str {
        match self {
            Self::Start => "on the start screen",
            Self::Playing | Self::Demo => "a round is in progress",
            Self::Complete => "the round is complete",
        }
    }
}

#[derive(Debug, Clone)]
pub struct Round {
    pub word_id: WordId,
    pub word: Option<String>,
    pub description: String,
    pub hints: Vec<String>,
    pub length_options: Vec<usize>,
    pub started_at: Instant,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LengthFeedback {
    pub correct: bool,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpellingAttempt {
    pub guess: String,
    pub feedback: Vec<FeedbackMarker>,
}

/// Per-round fields; always replaced as a whole.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RoundProgress {
    pub length_feedback: Option<LengthFeedback>,
    pub current_guess: String,
    pub spelling_history: Vec<SpellingAttempt>,
    pub attempts: u32,
    pub hints_used: u8,
    pub last_message: String,
    pub score_submitted: bool,
    /// When the round reached `Complete`; stops the completion clock.
    pub completed_at: Option<Instant>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GameCompletionData {
    pub word_id: WordId,
    pub word: String,
    pub attempts: u32,
    pub hints_used: u8,
    pub completion_time: Duration,
}

#[derive(Debug, Clone, Default)]
pub struct GameSession {
    screen: Screen,
    round: Option<Round>,
    progress: RoundProgress,
    last_game_mode: Option<GameMode>,
    connectivity: Connectivity,
    is_loading: bool,
    epoch: u64,
}

impl GameSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn screen(&self) -> &Screen {
        &self.screen
    }

    pub fn state(&self) -> GameState {
        match &self.screen {
            Screen::Start => GameState::Start,
            Screen::InRound {
                mode: GameMode::Playing,
                ..
            } => GameState::Playing,
            Screen::InRound {
                mode: GameMode::Demo,
                ..
            } => GameState::Demo,
            Screen::Complete { .. } => GameState::Complete,
        }
    }

    pub fn phase(&self) -> Option<Phase> {
        match &self.screen {
            Screen::InRound { phase, .. } => Some(*phase),
            _ => None,
        }
    }

    /// Confirmed letter count; zero until the length guess succeeds.
    pub fn word_length(&self) -> usize {
        match self.phase() {
            Some(Phase::Spelling { word_length }) => word_length,
            _ => 0,
        }
    }

    pub fn round(&self) -> Option<&Round> {
        self.round.as_ref()
    }

    pub fn progress(&self) -> &RoundProgress {
        &self.progress
    }

    pub fn current_guess(&self) -> &str {
        &self.progress.current_guess
    }

    pub fn spelling_history(&self) -> &[SpellingAttempt] {
        &self.progress.spelling_history
    }

    pub fn attempts(&self) -> u32 {
        self.progress.attempts
    }

    pub fn hints_used(&self) -> u8 {
        self.progress.hints_used
    }

    pub fn length_feedback(&self) -> Option<&LengthFeedback> {
        self.progress.length_feedback.as_ref()
    }

    pub fn last_message(&self) -> &str {
        &self.progress.last_message
    }

    /// Hints revealed so far, in order.
    pub fn revealed_hints(&self) -> &[String] {
        let Some(round) = &self.round else {
            return &[];
        };
        let shown = usize::from(self.progress.hints_used).min(round.hints.len());
        &round.hints[..shown]
    }

    pub fn outcome(&self) -> Option<&Outcome> {
        match &self.screen {
            Screen::Complete { outcome } => Some(outcome),
            _ => None,
        }
    }

    pub fn last_game_mode(&self) -> Option<GameMode> {
        self.last_game_mode
    }

    pub fn connectivity(&self) -> Connectivity {
        self.connectivity
    }

    pub fn is_loading(&self) -> bool {
        self.is_loading
    }

    /// Score submission is offered only after a completed, scored round.
    pub fn can_submit_score(&self) -> bool {
        self.outcome().is_some()
            && self.last_game_mode.is_some_and(GameMode::is_scored)
            && !self.progress.score_submitted
    }

    pub(crate) fn epoch(&self) -> u64 {
        self.epoch
    }

    pub(crate) fn set_connectivity(&mut self, connectivity: Connectivity) {
        self.connectivity = connectivity;
    }

    /// Claims the in-flight slot. Fails with `Busy` if another action holds it.
    pub(crate) fn begin_request(&mut self) -> Result<u64, ControllerError> {
        if self.is_loading {
            return Err(ControllerError::Busy);
        }
        self.is_loading = true;
        Ok(self.epoch)
    }

    pub(crate) fn finish_request(&mut self) {
        self.is_loading = false;
    }

    fn invalid(&self, operation: &'static str) -> ControllerError {
        ControllerError::InvalidState {
            operation,
            state: self.state().label(),
        }
    }

    pub(crate) fn active_word_id(&self, operation: &'static str) -> Result<WordId, ControllerError> {
        match (&self.screen, &self.round) {
            (Screen::InRound { .. }, Some(round)) => Ok(round.word_id.clone()),
            _ => Err(self.invalid(operation)),
        }
    }

    pub(crate) fn length_guess_target(&self) -> Result<WordId, ControllerError> {
        match self.phase() {
            Some(Phase::LengthGuess) => self.active_word_id("guess_length"),
            _ => Err(self.invalid("guess_length")),
        }
    }

    /// Checks the in-progress guess locally and returns what should be sent.
    pub(crate) fn spelling_target(&self) -> Result<(WordId, String), ControllerError> {
        let Some(Phase::Spelling { word_length }) = self.phase() else {
            return Err(self.invalid("submit_spelling"));
        };
        let guess = self.progress.current_guess.trim();
        if guess.is_empty() {
            return Err(ValidationError::EmptyGuess.into());
        }
        if guess.chars().count() != word_length {
            return Err(ValidationError::WrongLength {
                expected: word_length,
            }
            .into());
        }
        Ok((self.active_word_id("submit_spelling")?, guess.to_string()))
    }

    pub(crate) fn begin_round(&mut self, mode: GameMode, response: StartGameResponse, now: Instant) {
        let hints = response.hints();
        self.round = Some(Round {
            word_id: response.word_id,
            word: response.word,
            description: response.description,
            hints,
            length_options: response.length_options,
            started_at: now,
        });
        self.progress = RoundProgress::default();
        self.last_game_mode = Some(mode);
        self.screen = Screen::InRound {
            mode,
            phase: Phase::LengthGuess,
        };
        self.epoch += 1;
    }

    /// Applies a length-guess response. Returns `Err` with a reason, leaving
    /// the session untouched, if a "correct" response carries no usable length.
    pub(crate) fn apply_length_guess(
        &mut self,
        response: GuessLengthResponse,
    ) -> Result<bool, String> {
        let Screen::InRound { mode, .. } = self.screen else {
            return Err("no round in progress".to_string());
        };
        let confirmed = if response.is_correct {
            match response.word_length {
                Some(length) if length > 0 => Some(length),
                _ => return Err("server did not report the word length".to_string()),
            }
        } else {
            None
        };

        self.progress.length_feedback = Some(LengthFeedback {
            correct: response.is_correct,
            message: response.message,
        });
        if let Some(word_length) = confirmed {
            self.screen = Screen::InRound {
                mode,
                phase: Phase::Spelling { word_length },
            };
            self.progress.current_guess.clear();
        }
        Ok(response.is_correct)
    }

    /// Records a spelling attempt; returns whether the round was won.
    pub(crate) fn apply_spelling(
        &mut self,
        guess: String,
        response: SubmitSpellingResponse,
        now: Instant,
    ) -> bool {
        self.progress.spelling_history.push(SpellingAttempt {
            guess: guess.clone(),
            feedback: response.feedback,
        });
        self.progress.attempts += 1;
        self.progress.last_message = response.message;
        self.progress.current_guess.clear();

        if response.is_correct {
            self.progress.completed_at = Some(now);
            self.screen = Screen::Complete {
                outcome: Outcome {
                    is_winner: true,
                    correct_word: response.correct_word.unwrap_or(guess),
                    example_sentence: response.example_sentence.unwrap_or_default(),
                },
            };
        }
        response.is_correct
    }

    pub(crate) fn apply_reveal(&mut self, response: RevealAnswerResponse, now: Instant) {
        self.progress.last_message = response.message;
        self.progress.completed_at = Some(now);
        self.screen = Screen::Complete {
            outcome: Outcome {
                is_winner: false,
                correct_word: response.correct_word,
                example_sentence: response.example_sentence,
            },
        };
    }

    /// Replaces the guess with sanitized input: upper-cased ASCII letters,
    /// truncated to the confirmed length. Ignored outside the spelling phase.
    pub fn set_current_guess(&mut self, raw: &str) -> bool {
        let word_length = self.word_length();
        if word_length == 0 {
            return false;
        }
        self.progress.current_guess = raw
            .chars()
            .filter(char::is_ascii_alphabetic)
            .map(|c| c.to_ascii_uppercase())
            .take(word_length)
            .collect();
        true
    }

    /// Takes a whole typed line as the guess. Unlike keystroke input nothing
    /// is dropped or truncated: the line must be exactly `word_length` ASCII
    /// letters, otherwise the guess is left as it was.
    pub(crate) fn accept_typed_guess(&mut self, line: &str) -> Result<(), ControllerError> {
        let Some(Phase::Spelling { word_length }) = self.phase() else {
            return Err(self.invalid("submit_spelling"));
        };
        let typed = line.trim();
        if typed.is_empty() {
            return Err(ValidationError::EmptyGuess.into());
        }
        if typed.chars().count() != word_length || !typed.chars().all(|c| c.is_ascii_alphabetic())
        {
            return Err(ValidationError::WrongLength {
                expected: word_length,
            }
            .into());
        }
        self.progress.current_guess = typed.to_ascii_uppercase();
        Ok(())
    }

    pub fn push_letter(&mut self, letter: char) -> bool {
        let word_length = self.word_length();
        if word_length == 0
            || !letter.is_ascii_alphabetic()
            || self.progress.current_guess.len() >= word_length
        {
            return false;
        }
        self.progress
            .current_guess
            .push(letter.to_ascii_uppercase());
        true
    }

    pub fn pop_letter(&mut self) -> Option<char> {
        if self.word_length() == 0 {
            return None;
        }
        self.progress.current_guess.pop()
    }

    /// Counts a hint as revealed and returns its text. The local counter is
    /// the source of truth for display and completion data.
    pub(crate) fn record_hint(&mut self) -> Option<(WordId, String)> {
        let round = match (&self.screen, &self.round) {
            (Screen::InRound { .. }, Some(round)) => round,
            _ => return None,
        };
        let available = round.hints.len().min(usize::from(MAX_HINTS));
        let index = usize::from(self.progress.hints_used);
        if index >= available {
            return None;
        }
        let hint = round.hints[index].clone();
        let word_id = round.word_id.clone();
        self.progress.hints_used += 1;
        Some((word_id, hint))
    }

    pub(crate) fn mark_score_submitted(&mut self) {
        self.progress.score_submitted = true;
    }

    pub fn reset(&mut self) {
        self.screen = Screen::Start;
        self.round = None;
        self.progress = RoundProgress::default();
        self.epoch += 1;
    }

    pub fn completion_data(&self, now: Instant) -> Option<GameCompletionData> {
        let round = self.round.as_ref()?;
        Some(GameCompletionData {
            word_id: round.word_id.clone(),
            word: self
                .outcome()
                .map(|outcome| outcome.correct_word.clone())
                .unwrap_or_default(),
            attempts: self.progress.attempts,
            hints_used: self.progress.hints_used,
            completion_time: self
                .progress
                .completed_at
                .unwrap_or(now)
                .saturating_duration_since(round.started_at),
        })
    }
}

#[cfg(test)]
#[path = "tests/session_tests.rs"]
mod tests;
