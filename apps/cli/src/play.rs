use std::{io::Write, sync::Arc};

use anyhow::{Context, Result};
use client_core::{
    ControllerError, GameController, GameEvent, GameState, Phase, Screen, SpeechPlayer,
};
use colored::Colorize;
use shared::domain::{GameMode, Username};
use tokio::{
    io::{AsyncBufReadExt, BufReader, Lines, Stdin},
    sync::broadcast::{self, error::TryRecvError},
};
use tracing::warn;

use crate::{profile::Profile, render};

const HELP: &str = "commands: :hint  :say  :reveal  :new  :quit  :help";

/// Line-oriented prompt over stdin.
struct Prompt {
    lines: Lines<BufReader<Stdin>>,
}

impl Prompt {
    fn new() -> Self {
        Self {
            lines: BufReader::new(tokio::io::stdin()).lines(),
        }
    }

    /// `None` once stdin is closed.
    async fn ask(&mut self, prompt: &str) -> Result<Option<String>> {
        print!("{prompt} ");
        std::io::stdout().flush()?;
        Ok(self
            .lines
            .next_line()
            .await?
            .map(|line| line.trim().to_string()))
    }
}

enum Command {
    Hint,
    Say,
    Reveal,
    NewRound,
    Quit,
    Help,
    Input(String),
}

impl Command {
    fn parse(line: &str) -> Self {
        match line.to_ascii_lowercase().as_str() {
            ":hint" | ":h" => Self::Hint,
            ":say" | ":s" => Self::Say,
            ":reveal" | ":r" => Self::Reveal,
            ":new" | ":n" => Self::NewRound,
            ":quit" | ":q" => Self::Quit,
            ":help" | "?" => Self::Help,
            _ => Self::Input(line.to_string()),
        }
    }
}

pub struct PlaySession {
    controller: Arc<GameController>,
    speech: Arc<SpeechPlayer>,
    profile: Option<Profile>,
    events: broadcast::Receiver<GameEvent>,
    prompt: Prompt,
}

impl PlaySession {
    pub fn new(
        controller: Arc<GameController>,
        speech: Arc<SpeechPlayer>,
        profile: Option<Profile>,
    ) -> Self {
        let events = controller.subscribe_events();
        Self {
            controller,
            speech,
            profile,
            events,
            prompt: Prompt::new(),
        }
    }

    /// Plays rounds in `mode` until the player quits or stdin closes.
    pub async fn run(&mut self, mode: GameMode) -> Result<()> {
        println!("{}", HELP.dimmed());
        loop {
            let started = self.controller.start(mode).await;
            self.flush_notices();
            started.context("could not start a round")?;
            if !self.play_round().await? {
                return Ok(());
            }
            if !self.wrap_up_round().await? {
                return Ok(());
            }
            self.controller.reset_game().await;
        }
    }

    /// Returns `false` when the player asked to stop playing.
    async fn play_round(&mut self) -> Result<bool> {
        loop {
            let session = self.controller.snapshot().await;
            let phase = match session.screen() {
                Screen::InRound { phase, .. } => *phase,
                Screen::Complete { outcome } => {
                    render::print_outcome(outcome, &session);
                    return Ok(true);
                }
                Screen::Start => return Ok(false),
            };
            render::print_round(&session);

            let label = match phase {
                Phase::LengthGuess => "length>",
                Phase::Spelling { .. } => "spell>",
            };
            let Some(line) = self.prompt.ask(&label.bright_cyan().to_string()).await? else {
                return Ok(false);
            };
            if line.is_empty() && matches!(phase, Phase::LengthGuess) {
                continue;
            }

            match Command::parse(&line) {
                Command::Quit => return Ok(false),
                Command::Help => println!("{}", HELP.dimmed()),
                Command::NewRound => {
                    self.controller.reset_game().await;
                    return Ok(true);
                }
                Command::Hint => match self.controller.reveal_hint().await {
                    Some(_) => {}
                    None => println!("{}", "No more hints for this word.".dimmed()),
                },
                Command::Say => self.say_word(session.round().and_then(|r| r.word.clone())),
                Command::Reveal => {
                    if let Err(err) = self.controller.reveal_answer().await {
                        report(&err);
                    }
                }
                Command::Input(text) => self.submit_input(phase, &text).await,
            }
            self.flush_notices();
        }
    }

    async fn submit_input(&self, phase: Phase, text: &str) {
        let result = match phase {
            Phase::LengthGuess => match text.parse::<usize>() {
                Ok(length) => self.controller.guess_length(length).await.map(|_| ()),
                Err(_) => {
                    println!("{}", "Enter one of the offered lengths.".yellow());
                    return;
                }
            },
            Phase::Spelling { .. } => self.controller.submit_typed_guess(text).await.map(|_| ()),
        };
        if let Err(err) = result {
            report(&err);
        }
    }

    fn say_word(&self, word: Option<String>) {
        let Some(word) = word else {
            println!("{}", "No pronunciation available for this word.".dimmed());
            return;
        };
        if self.speech.is_playing() {
            return;
        }
        let speech = Arc::clone(&self.speech);
        tokio::spawn(async move {
            speech.play(&word).await;
        });
    }

    /// Offers score submission, then asks whether to keep playing.
    async fn wrap_up_round(&mut self) -> Result<bool> {
        let session = self.controller.snapshot().await;
        if session.state() == GameState::Start {
            return Ok(true);
        }
        let won = session.outcome().is_some_and(|outcome| outcome.is_winner);
        if won && session.can_submit_score() {
            self.submit_score().await?;
        }
        let answer = self.prompt.ask("Play another word? [Y/n]").await?;
        Ok(matches!(answer.as_deref(), Some("") | Some("y") | Some("Y")))
    }

    async fn submit_score(&mut self) -> Result<()> {
        if let Some(data) = self.controller.game_completion_data().await {
            println!(
                "Finished in {:.1}s with {} hint(s).",
                data.completion_time.as_secs_f64(),
                data.hints_used
            );
        }
        let mut remembered = self
            .profile
            .as_ref()
            .and_then(Profile::load_username)
            .map(|name| name.to_string());

        loop {
            let username = match remembered.take() {
                Some(name) => {
                    println!("Submitting score as {}", name.bright_yellow());
                    name
                }
                None => {
                    let Some(line) = self
                        .prompt
                        .ask("Name for the leaderboard (blank to skip):")
                        .await?
                    else {
                        return Ok(());
                    };
                    if line.is_empty() {
                        return Ok(());
                    }
                    line
                }
            };

            match self.controller.submit_score(&username).await {
                Ok(response) => {
                    render::print_score(&response);
                    self.remember(&username);
                    return Ok(());
                }
                Err(ControllerError::InvalidUsername(err)) => println!("{}", err.to_string().red()),
                Err(err) => {
                    report(&err);
                    return Ok(());
                }
            }
        }
    }

    fn remember(&self, username: &str) {
        let (Some(profile), Ok(username)) = (&self.profile, Username::parse(username)) else {
            return;
        };
        if let Err(err) = profile.save_username(&username) {
            warn!(path = %profile.path().display(), "failed to remember username: {err:#}");
        }
    }

    /// Prints notices raised since the last call and drops other events.
    fn flush_notices(&mut self) {
        loop {
            match self.events.try_recv() {
                Ok(GameEvent::NoticeShown(message)) => eprintln!("{}", message.red().bold()),
                Ok(_) | Err(TryRecvError::Lagged(_)) => {}
                Err(TryRecvError::Empty) | Err(TryRecvError::Closed) => break,
            }
        }
    }
}

/// Request and validation failures already surface as notices.
fn report(err: &ControllerError) {
    match err {
        ControllerError::Request(_) | ControllerError::Validation(_) => {}
        other => eprintln!("{}", other.to_string().yellow()),
    }
}
