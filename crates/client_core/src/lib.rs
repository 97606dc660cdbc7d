//! Client-side core of the Orthoplay spelling game: the session state machine,
//! its orchestration of the remote game API, and the best-effort audio seams.

pub mod api;
pub mod audio;
mod controller;
pub mod error;
pub mod events;
pub mod notice;
pub mod session;

pub use api::{ApiClientError, GameApi, HttpGameApi, DEFAULT_API_BASE_URL};
pub use audio::{SilentSound, SoundEffects, SpeechPlayer, SpeechSynthesizer, DEFAULT_SPEECH_RATE};
pub use controller::{ControllerOptions, GameController, DEFAULT_DIFFICULTY};
pub use error::{ControllerError, ValidationError};
pub use events::GameEvent;
pub use notice::NOTICE_TTL;
pub use session::{
    Connectivity, GameCompletionData, GameSession, GameState, LengthFeedback, Outcome, Phase,
    Round, Screen, SpellingAttempt, MAX_HINTS,
};
