mod audio;
mod config;
mod play;
mod profile;
mod render;

use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use client_core::{Connectivity, ControllerOptions, GameController, HttpGameApi, SpeechPlayer};
use shared::{
    domain::{GameMode, SortBy, SortOrder, TimeFilter},
    protocol::LeaderboardQuery,
};
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::{
    audio::{CommandSpeech, TerminalBell},
    config::Settings,
    play::PlaySession,
    profile::Profile,
};

#[derive(Parser, Debug)]
#[command(name = "orthoplay", version, about = "Spell words by ear against the Orthoplay server")]
struct Cli {
    /// Game server base URL.
    #[arg(long, global = true)]
    api_url: Option<String>,
    #[arg(long, global = true)]
    difficulty: Option<String>,
    /// espeak-compatible program used for `:say`.
    #[arg(long, global = true)]
    speech_program: Option<String>,
    #[arg(long, global = true)]
    speech_rate: Option<f32>,
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Play scored rounds (default).
    Play,
    /// Practice rounds that never reach the leaderboard.
    Demo,
    Leaderboard {
        #[arg(long, default_value_t = 10)]
        limit: u32,
        #[arg(long, default_value_t = 0)]
        offset: u32,
        #[arg(long, value_enum, default_value_t = Period::All)]
        period: Period,
        #[arg(long, value_enum, default_value_t = SortField::Score)]
        sort_by: SortField,
        #[arg(long)]
        ascending: bool,
        /// Include this player's best score and rank.
        #[arg(long)]
        username: Option<String>,
    },
    /// Per-player statistics; defaults to the remembered name.
    Stats { username: Option<String> },
    /// Probe the game server.
    Health,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Period {
    Daily,
    Weekly,
    Monthly,
    All,
}

impl From<Period> for TimeFilter {
    fn from(value: Period) -> Self {
        match value {
            Period::Daily => Self::Daily,
            Period::Weekly => Self::Weekly,
            Period::Monthly => Self::Monthly,
            Period::All => Self::All,
        }
    }
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum SortField {
    Score,
    Attempts,
    CompletionTime,
    Timestamp,
}

impl From<SortField> for SortBy {
    fn from(value: SortField) -> Self {
        match value {
            SortField::Score => Self::Score,
            SortField::Attempts => Self::Attempts,
            SortField::CompletionTime => Self::CompletionTime,
            SortField::Timestamp => Self::Timestamp,
        }
    }
}

impl Cli {
    fn apply_overrides(&self, mut settings: Settings) -> Settings {
        if let Some(v) = &self.api_url {
            settings.api_base_url = v.clone();
        }
        if let Some(v) = &self.difficulty {
            settings.difficulty = v.clone();
        }
        if let Some(v) = &self.speech_program {
            settings.speech_program = v.clone();
        }
        if let Some(v) = self.speech_rate {
            config::set_speech_rate(&mut settings, v);
        }
        settings
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let settings = cli.apply_overrides(config::load_settings());
    let api = Arc::new(HttpGameApi::new(&settings.api_base_url)?);
    let base_url = api.base_url().to_string();
    info!(%base_url, difficulty = %settings.difficulty, "starting orthoplay");

    let controller = GameController::new_with_dependencies(
        api,
        Arc::new(TerminalBell),
        ControllerOptions {
            difficulty: settings.difficulty.clone(),
            ..ControllerOptions::default()
        },
    );
    let profile = Profile::default_location();

    let command = cli.command.unwrap_or(Command::Play);
    let result = run(command, &controller, &settings, profile, &base_url).await;
    controller.shutdown().await;
    result
}

async fn run(
    command: Command,
    controller: &Arc<GameController>,
    settings: &Settings,
    profile: Option<Profile>,
    base_url: &str,
) -> Result<()> {
    match command {
        Command::Play => play(controller, settings, profile, base_url, GameMode::Playing).await,
        Command::Demo => play(controller, settings, profile, base_url, GameMode::Demo).await,
        Command::Leaderboard {
            limit,
            offset,
            period,
            sort_by,
            ascending,
            username,
        } => {
            let query = LeaderboardQuery {
                limit,
                offset,
                time_filter: period.into(),
                sort_by: sort_by.into(),
                sort_order: if ascending {
                    SortOrder::Asc
                } else {
                    SortOrder::Desc
                },
                username: username.or_else(|| {
                    profile
                        .as_ref()
                        .and_then(Profile::load_username)
                        .map(|name| name.to_string())
                }),
            };
            let board = controller.leaderboard(query).await?;
            render::print_leaderboard(&board, offset);
            Ok(())
        }
        Command::Stats { username } => {
            let username = match username {
                Some(name) => name,
                None => profile
                    .as_ref()
                    .and_then(Profile::load_username)
                    .map(|name| name.to_string())
                    .context("no username given and none remembered yet")?,
            };
            let stats = controller.user_stats(&username).await?;
            render::print_stats(&stats);
            Ok(())
        }
        Command::Health => match controller.check_connectivity().await {
            Connectivity::Connected => {
                println!("Game server at {base_url} is healthy.");
                Ok(())
            }
            _ => bail!("game server at {base_url} is not reachable"),
        },
    }
}

async fn play(
    controller: &Arc<GameController>,
    settings: &Settings,
    profile: Option<Profile>,
    base_url: &str,
    mode: GameMode,
) -> Result<()> {
    if controller.check_connectivity().await == Connectivity::Disconnected {
        eprintln!("Game server at {base_url} is not reachable; start it and try again.");
    }
    let speech = Arc::new(SpeechPlayer::new(
        Arc::new(CommandSpeech::new(settings.speech_program.clone())),
        settings.speech_rate,
    ));
    PlaySession::new(Arc::clone(controller), speech, profile)
        .run(mode)
        .await
}
