use std::{
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
    time::Duration,
};

use shared::{
    domain::{GameMode, Username, WordId},
    protocol::{
        GuessLengthRequest, LeaderboardQuery, LeaderboardResponse, StartGameRequest,
        SubmitScoreRequest, SubmitScoreResponse, SubmitSpellingRequest, UserStatsResponse,
        WordRequest,
    },
};
use tokio::{
    sync::{broadcast, Mutex, MutexGuard},
    task::JoinHandle,
    time::Instant,
};
use tracing::{debug, error, info, warn};

use crate::{
    api::GameApi,
    audio::{SilentSound, SoundEffects},
    error::ControllerError,
    events::GameEvent,
    notice::{TransientNotice, NOTICE_TTL},
    session::{Connectivity, GameCompletionData, GameSession, GameState},
};

pub const DEFAULT_DIFFICULTY: &str = "medium";

#[derive(Debug, Clone)]
pub struct ControllerOptions {
    pub difficulty: String,
    pub notice_ttl: Duration,
}

impl Default for ControllerOptions {
    fn default() -> Self {
        Self {
            difficulty: DEFAULT_DIFFICULTY.to_string(),
            notice_ttl: NOTICE_TTL,
        }
    }
}

/// Owns the live [`GameSession`] and mediates every call to the game server.
///
/// Remote failures never escape as panics or partial updates: the session is
/// left as it was, the failure text is shown in the transient notice, and the
/// same text comes back as `Err` for callers that care.
pub struct GameController {
    api: Arc<dyn GameApi>,
    sound: Arc<dyn SoundEffects>,
    options: ControllerOptions,
    session: Mutex<GameSession>,
    notice: TransientNotice,
    events: broadcast::Sender<GameEvent>,
    closed: AtomicBool,
}

impl GameController {
    pub fn new(api: Arc<dyn GameApi>) -> Arc<Self> {
        Self::new_with_dependencies(api, Arc::new(SilentSound), ControllerOptions::default())
    }

    pub fn new_with_dependencies(
        api: Arc<dyn GameApi>,
        sound: Arc<dyn SoundEffects>,
        options: ControllerOptions,
    ) -> Arc<Self> {
        let (events, _) = broadcast::channel(256);
        Arc::new(Self {
            api,
            sound,
            notice: TransientNotice::new(options.notice_ttl, events.clone()),
            options,
            session: Mutex::new(GameSession::new()),
            events,
            closed: AtomicBool::new(false),
        })
    }

    pub fn subscribe_events(&self) -> broadcast::Receiver<GameEvent> {
        self.events.subscribe()
    }

    pub async fn snapshot(&self) -> GameSession {
        self.session.lock().await.clone()
    }

    pub async fn notice(&self) -> Option<String> {
        self.notice.current().await
    }

    pub async fn dismiss_notice(&self) {
        self.notice.clear().await;
    }

    fn emit(&self, event: GameEvent) {
        let _ = self.events.send(event);
    }

    fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    /// Stops timers and makes every later response a no-op.
    pub async fn shutdown(&self) {
        self.closed.store(true, Ordering::Release);
        self.notice.shutdown().await;
    }

    /// Claims the in-flight slot after `precondition` accepts the session.
    async fn begin<T>(
        &self,
        precondition: impl FnOnce(&GameSession) -> Result<T, ControllerError>,
    ) -> Result<(u64, T), ControllerError> {
        if self.is_closed() {
            return Err(ControllerError::Stale);
        }
        let mut session = self.session.lock().await;
        if session.is_loading() {
            return Err(ControllerError::Busy);
        }
        let value = precondition(&session)?;
        let epoch = session.begin_request()?;
        Ok((epoch, value))
    }

    /// Releases the in-flight slot and returns the session only if the
    /// response still belongs to the live round.
    async fn settle(
        &self,
        epoch: u64,
        operation: &'static str,
    ) -> Result<MutexGuard<'_, GameSession>, ControllerError> {
        let mut session = self.session.lock().await;
        session.finish_request();
        if self.is_closed() || session.epoch() != epoch {
            debug!(operation, "discarding response for a finished round");
            return Err(ControllerError::Stale);
        }
        Ok(session)
    }

    async fn fail<T>(&self, message: String) -> Result<T, ControllerError> {
        self.notice.show(message.clone()).await;
        Err(ControllerError::Request(message))
    }

    pub async fn check_connectivity(&self) -> Connectivity {
        let connectivity = match self.api.health().await {
            Ok(health) if health.is_healthy() => Connectivity::Connected,
            Ok(health) => {
                warn!(status = %health.status, "game api reported unhealthy status");
                Connectivity::Disconnected
            }
            Err(err) => {
                warn!("game api connection failed: {err}");
                Connectivity::Disconnected
            }
        };
        if self.is_closed() {
            return connectivity;
        }
        self.session.lock().await.set_connectivity(connectivity);
        self.emit(GameEvent::ConnectivityChanged(connectivity));
        connectivity
    }

    pub async fn start(&self, mode: GameMode) -> Result<(), ControllerError> {
        let (epoch, ()) = self.begin(|_| Ok(())).await?;
        self.notice.clear().await;

        let request = StartGameRequest {
            difficulty: self.options.difficulty.clone(),
            mode,
        };
        let result = self.api.start_game(&request).await;
        let mut session = self.settle(epoch, "start").await?;
        match result {
            Ok(response) => {
                info!(
                    word_id = %response.word_id,
                    mode = mode.as_str(),
                    options = ?response.length_options,
                    "round started"
                );
                session.begin_round(mode, response, Instant::now());
                let state = session.state();
                drop(session);
                self.emit(GameEvent::ScreenChanged(state));
                Ok(())
            }
            Err(err) => {
                drop(session);
                error!("error starting game: {err}");
                self.fail(format!("Failed to start game: {err}")).await
            }
        }
    }

    /// Returns whether the guessed length was correct.
    pub async fn guess_length(&self, length: usize) -> Result<bool, ControllerError> {
        let (epoch, word_id) = self.begin(GameSession::length_guess_target).await?;
        self.notice.clear().await;

        let request = GuessLengthRequest {
            word_id,
            guessed_length: length,
        };
        let result = self.api.guess_length(&request).await;
        let mut session = self.settle(epoch, "guess_length").await?;
        let response = match result {
            Ok(response) => response,
            Err(err) => {
                drop(session);
                error!("error guessing length: {err}");
                return self.fail(format!("Failed to guess length: {err}")).await;
            }
        };
        match session.apply_length_guess(response) {
            Ok(correct) => {
                let state = session.state();
                drop(session);
                debug!(length, correct, "length guess applied");
                self.emit(if correct {
                    GameEvent::ScreenChanged(state)
                } else {
                    GameEvent::RoundUpdated
                });
                Ok(correct)
            }
            Err(reason) => {
                drop(session);
                error!("error guessing length: {reason}");
                self.fail(format!("Failed to guess length: {reason}")).await
            }
        }
    }

    pub async fn set_current_guess(&self, text: &str) -> bool {
        let changed = self.session.lock().await.set_current_guess(text);
        if changed {
            self.emit(GameEvent::RoundUpdated);
        }
        changed
    }

    pub async fn push_letter(&self, letter: char) -> bool {
        let changed = self.session.lock().await.push_letter(letter);
        if changed {
            self.emit(GameEvent::RoundUpdated);
        }
        changed
    }

    pub async fn pop_letter(&self) -> Option<char> {
        let popped = self.session.lock().await.pop_letter();
        if popped.is_some() {
            self.emit(GameEvent::RoundUpdated);
        }
        popped
    }

    /// Returns whether the round was won by this attempt.
    pub async fn submit_spelling(&self) -> Result<bool, ControllerError> {
        let (epoch, (word_id, guess)) = match self.begin(GameSession::spelling_target).await {
            Ok(claimed) => claimed,
            Err(ControllerError::Validation(invalid)) => {
                self.notice.show(invalid.to_string()).await;
                return Err(invalid.into());
            }
            Err(err) => return Err(err),
        };
        self.notice.clear().await;

        let request = SubmitSpellingRequest {
            word_id,
            guess: guess.clone(),
        };
        let result = self.api.submit_spelling(&request).await;
        let mut session = self.settle(epoch, "submit_spelling").await?;
        let response = match result {
            Ok(response) => response,
            Err(err) => {
                drop(session);
                error!("error submitting spelling: {err}");
                return self.fail(format!("Failed to submit spelling: {err}")).await;
            }
        };

        let won = session.apply_spelling(guess, response, Instant::now());
        let state = session.state();
        let attempts = session.attempts();
        drop(session);

        info!(attempts, won, "spelling attempt recorded");
        if won {
            self.play_success_sound();
            self.emit(GameEvent::ScreenChanged(state));
        } else {
            self.emit(GameEvent::RoundUpdated);
        }
        Ok(won)
    }

    /// Line-based entry: replaces the guess with `line` and submits it. A line
    /// that is not exactly the word's length in letters is rejected with the
    /// same notice as `submit_spelling`, without touching the guess.
    pub async fn submit_typed_guess(&self, line: &str) -> Result<bool, ControllerError> {
        let accepted = self.session.lock().await.accept_typed_guess(line);
        match accepted {
            Ok(()) => self.emit(GameEvent::RoundUpdated),
            Err(ControllerError::Validation(invalid)) => {
                self.notice.show(invalid.to_string()).await;
                return Err(invalid.into());
            }
            Err(err) => return Err(err),
        }
        self.submit_spelling().await
    }

    fn play_success_sound(&self) -> JoinHandle<()> {
        let sound = Arc::clone(&self.sound);
        tokio::spawn(async move {
            if let Err(err) = sound.play_success().await {
                error!("correct sound error: {err:#}");
            }
        })
    }

    pub async fn reveal_answer(&self) -> Result<(), ControllerError> {
        let (epoch, word_id) = self
            .begin(|session| session.active_word_id("reveal_answer"))
            .await?;
        self.notice.clear().await;

        let result = self.api.reveal_answer(&WordRequest { word_id }).await;
        let mut session = self.settle(epoch, "reveal_answer").await?;
        match result {
            Ok(response) => {
                session.apply_reveal(response, Instant::now());
                let state = session.state();
                drop(session);
                info!("answer revealed");
                self.emit(GameEvent::ScreenChanged(state));
                Ok(())
            }
            Err(err) => {
                drop(session);
                error!("error revealing answer: {err}");
                self.fail(format!("Failed to reveal answer: {err}")).await
            }
        }
    }

    pub async fn reset_game(&self) {
        self.session.lock().await.reset();
        self.emit(GameEvent::ScreenChanged(GameState::Start));
    }

    /// Reveals the next hint locally, then reports it to the server in the
    /// background. Returns `None` when every hint is already showing.
    pub async fn reveal_hint(&self) -> Option<String> {
        let (word_id, hint) = self.session.lock().await.record_hint()?;
        self.emit(GameEvent::RoundUpdated);
        self.spawn_hint_tracking(word_id);
        Some(hint)
    }

    /// Fire-and-forget hint notification for the live round.
    pub async fn track_hint_usage(&self) -> Option<JoinHandle<()>> {
        let word_id = self
            .session
            .lock()
            .await
            .round()
            .map(|round| round.word_id.clone())?;
        Some(self.spawn_hint_tracking(word_id))
    }

    fn spawn_hint_tracking(&self, word_id: WordId) -> JoinHandle<()> {
        let api = Arc::clone(&self.api);
        tokio::spawn(async move {
            match api.use_hint(&WordRequest { word_id }).await {
                Ok(response) => debug!(hints_used = ?response.hints_used, "hint usage tracked"),
                Err(err) => error!("failed to track hint usage: {err}"),
            }
        })
    }

    pub async fn game_completion_data(&self) -> Option<GameCompletionData> {
        self.session.lock().await.completion_data(Instant::now())
    }

    pub async fn submit_score(&self, username: &str) -> Result<SubmitScoreResponse, ControllerError> {
        let username = Username::parse(username)?;
        let (epoch, completion) = self
            .begin(|session| {
                if session.outcome().is_none() {
                    return Err(ControllerError::RoundNotComplete);
                }
                if !session.last_game_mode().is_some_and(GameMode::is_scored) {
                    return Err(ControllerError::DemoRound);
                }
                if session.progress().score_submitted {
                    return Err(ControllerError::ScoreAlreadySubmitted);
                }
                session
                    .completion_data(Instant::now())
                    .ok_or(ControllerError::RoundNotComplete)
            })
            .await?;

        let request = SubmitScoreRequest {
            username: username.clone(),
            word_id: completion.word_id,
            completion_time: completion.completion_time.as_secs_f64(),
        };
        let result = self.api.submit_score(&request).await;

        // The server has the score once the call succeeds, so a reset while it
        // was in flight still returns the response.
        let mut session = self.session.lock().await;
        session.finish_request();
        let response = result.map_err(|err| {
            error!("failed to submit score: {err}");
            ControllerError::Request(format!("Failed to submit score: {err}"))
        })?;
        if session.epoch() == epoch {
            session.mark_score_submitted();
        }
        drop(session);
        info!(%username, score = response.score, rank = ?response.rank, "score submitted");
        Ok(response)
    }

    pub async fn leaderboard(
        &self,
        query: LeaderboardQuery,
    ) -> Result<LeaderboardResponse, ControllerError> {
        self.api
            .leaderboard(&query.normalized())
            .await
            .map_err(|err| {
                error!("failed to get leaderboard: {err}");
                ControllerError::Request(format!("Failed to load leaderboard: {err}"))
            })
    }

    pub async fn user_stats(&self, username: &str) -> Result<UserStatsResponse, ControllerError> {
        let username = Username::parse(username)?;
        self.api.user_stats(&username).await.map_err(|err| {
            error!("failed to get user stats: {err}");
            ControllerError::Request(format!("Failed to load user statistics: {err}"))
        })
    }
}

#[cfg(test)]
#[path = "tests/controller_tests.rs"]
mod tests;
