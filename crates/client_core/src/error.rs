use shared::domain::UsernameError;
use thiserror::Error;

/// Local guess checks that run before any network call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Please enter a guess")]
    EmptyGuess,
    #[error("Word must be {expected} letters long")]
    WrongLength { expected: usize },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ControllerError {
    #[error("another game action is still in flight")]
    Busy,
    #[error("{operation} is not available while {state}")]
    InvalidState {
        operation: &'static str,
        state: &'static str,
    },
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("{0}")]
    Request(String),
    #[error("response for a finished round was discarded")]
    Stale,
    #[error("demo rounds cannot submit scores")]
    DemoRound,
    #[error("the round has not been completed yet")]
    RoundNotComplete,
    #[error("score already submitted for this round")]
    ScoreAlreadySubmitted,
    #[error(transparent)]
    InvalidUsername(#[from] UsernameError),
}
