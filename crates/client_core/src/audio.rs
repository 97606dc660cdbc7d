use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

use anyhow::Result;
use async_trait::async_trait;
use tracing::{debug, warn};

pub const DEFAULT_SPEECH_RATE: f32 = 0.7;

/// Short cue played when a round is won.
#[async_trait]
pub trait SoundEffects: Send + Sync {
    async fn play_success(&self) -> Result<()>;
}

pub struct SilentSound;

#[async_trait]
impl SoundEffects for SilentSound {
    async fn play_success(&self) -> Result<()> {
        Ok(())
    }
}

#[async_trait]
pub trait SpeechSynthesizer: Send + Sync {
    /// Speaks `text` and resolves when playback ends.
    async fn speak(&self, text: &str, rate: f32) -> Result<()>;
}

/// Owns the "playing" flag for word playback. Playback never touches the
/// game session.
pub struct SpeechPlayer {
    synthesizer: Arc<dyn SpeechSynthesizer>,
    rate: f32,
    playing: AtomicBool,
}

struct PlayingGuard<'a>(&'a AtomicBool);

impl Drop for PlayingGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl SpeechPlayer {
    pub fn new(synthesizer: Arc<dyn SpeechSynthesizer>, rate: f32) -> Self {
        Self {
            synthesizer,
            rate,
            playing: AtomicBool::new(false),
        }
    }

    pub fn is_playing(&self) -> bool {
        self.playing.load(Ordering::Acquire)
    }

    /// Returns `true` if playback ran to completion. A second call while one
    /// is still playing is ignored.
    pub async fn play(&self, text: &str) -> bool {
        if text.trim().is_empty() {
            return false;
        }
        if self
            .playing
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            debug!("speech playback already in progress");
            return false;
        }
        let _guard = PlayingGuard(&self.playing);

        match self.synthesizer.speak(text, self.rate).await {
            Ok(()) => true,
            Err(err) => {
                warn!("speech playback failed: {err:#}");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use anyhow::anyhow;
    use tokio::sync::Mutex;

    use super::*;

    struct RecordingSpeech {
        spoken: Mutex<Vec<(String, f32)>>,
        fail: bool,
    }

    #[async_trait]
    impl SpeechSynthesizer for RecordingSpeech {
        async fn speak(&self, text: &str, rate: f32) -> Result<()> {
            tokio::time::sleep(Duration::from_millis(50)).await;
            self.spoken.lock().await.push((text.to_string(), rate));
            if self.fail {
                return Err(anyhow!("no audio device"));
            }
            Ok(())
        }
    }

    #[tokio::test(start_paused = true)]
    async fn overlapping_playback_is_ignored_and_flag_resets() {
        let speech = Arc::new(RecordingSpeech {
            spoken: Mutex::new(Vec::new()),
            fail: false,
        });
        let player = Arc::new(SpeechPlayer::new(speech.clone(), DEFAULT_SPEECH_RATE));

        let first = tokio::spawn({
            let player = Arc::clone(&player);
            async move { player.play("harbor").await }
        });
        tokio::task::yield_now().await;
        assert!(player.is_playing());
        assert!(!player.play("harbor").await);

        assert!(first.await.expect("join"));
        assert!(!player.is_playing());
        assert_eq!(
            speech.spoken.lock().await.as_slice(),
            &[("harbor".to_string(), DEFAULT_SPEECH_RATE)]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn failed_playback_clears_flag() {
        let player = SpeechPlayer::new(
            Arc::new(RecordingSpeech {
                spoken: Mutex::new(Vec::new()),
                fail: true,
            }),
            1.0,
        );
        assert!(!player.play("harbor").await);
        assert!(!player.is_playing());
    }
}
