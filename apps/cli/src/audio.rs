use std::{
    io::{self, Write},
    process::Stdio,
};

use anyhow::{ensure, Context, Result};
use async_trait::async_trait;
use client_core::{SoundEffects, SpeechSynthesizer};
use tokio::process::Command;

/// espeak's default speed; the configured rate scales it.
const BASE_WORDS_PER_MINUTE: f32 = 175.0;

/// Speaks through an external espeak-compatible program.
pub struct CommandSpeech {
    program: String,
}

impl CommandSpeech {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

fn words_per_minute(rate: f32) -> u32 {
    (BASE_WORDS_PER_MINUTE * rate).round().max(40.0) as u32
}

#[async_trait]
impl SpeechSynthesizer for CommandSpeech {
    async fn speak(&self, text: &str, rate: f32) -> Result<()> {
        let status = Command::new(&self.program)
            .arg("-s")
            .arg(words_per_minute(rate).to_string())
            .arg(text)
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .await
            .with_context(|| format!("failed to launch speech program '{}'", self.program))?;
        ensure!(status.success(), "speech program '{}' exited with {status}", self.program);
        Ok(())
    }
}

/// Rings the terminal bell on a win.
pub struct TerminalBell;

#[async_trait]
impl SoundEffects for TerminalBell {
    async fn play_success(&self) -> Result<()> {
        let mut stdout = io::stdout();
        stdout.write_all(b"\x07")?;
        stdout.flush()?;
        Ok(())
    }
}
