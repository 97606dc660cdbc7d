use std::{collections::HashMap, fs, path::Path};

use client_core::{DEFAULT_API_BASE_URL, DEFAULT_DIFFICULTY, DEFAULT_SPEECH_RATE};
use tracing::warn;

pub const CONFIG_FILE: &str = "orthoplay.toml";

const SPEECH_RATE_RANGE: std::ops::RangeInclusive<f32> = 0.1..=2.0;

#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub api_base_url: String,
    pub difficulty: String,
    pub speech_program: String,
    pub speech_rate: f32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.into(),
            difficulty: DEFAULT_DIFFICULTY.into(),
            speech_program: "espeak".into(),
            speech_rate: DEFAULT_SPEECH_RATE,
        }
    }
}

pub fn load_settings() -> Settings {
    load_settings_from(Path::new(CONFIG_FILE), |key| std::env::var(key).ok())
}

/// Defaults, then the optional config file, then environment overrides.
fn load_settings_from(
    config_path: &Path,
    env: impl Fn(&str) -> Option<String>,
) -> Settings {
    let mut settings = Settings::default();

    if let Ok(raw) = fs::read_to_string(config_path) {
        match toml::from_str::<HashMap<String, String>>(&raw) {
            Ok(file_cfg) => {
                if let Some(v) = file_cfg.get("api_base_url") {
                    settings.api_base_url = v.clone();
                }
                if let Some(v) = file_cfg.get("difficulty") {
                    settings.difficulty = v.clone();
                }
                if let Some(v) = file_cfg.get("speech_program") {
                    settings.speech_program = v.clone();
                }
                if let Some(v) = file_cfg.get("speech_rate") {
                    apply_speech_rate(&mut settings, v);
                }
            }
            Err(err) => warn!(path = %config_path.display(), "ignoring unreadable config: {err}"),
        }
    }

    if let Some(v) = env("ORTHOPLAY_API_BASE_URL") {
        settings.api_base_url = v;
    }
    if let Some(v) = env("APP__API_BASE_URL") {
        settings.api_base_url = v;
    }

    if let Some(v) = env("ORTHOPLAY_DIFFICULTY") {
        settings.difficulty = v;
    }

    if let Some(v) = env("ORTHOPLAY_SPEECH_PROGRAM") {
        settings.speech_program = v;
    }

    if let Some(v) = env("ORTHOPLAY_SPEECH_RATE") {
        apply_speech_rate(&mut settings, &v);
    }

    settings
}

fn apply_speech_rate(settings: &mut Settings, raw: &str) {
    match raw.trim().parse::<f32>() {
        Ok(rate) => set_speech_rate(settings, rate),
        Err(_) => warn!(value = raw, "ignoring speech rate that is not a number"),
    }
}

/// Every source of a speech rate goes through here; out-of-range values keep
/// the current rate.
pub fn set_speech_rate(settings: &mut Settings, rate: f32) {
    if SPEECH_RATE_RANGE.contains(&rate) {
        settings.speech_rate = rate;
    } else {
        warn!(rate, "ignoring speech rate outside 0.1..=2.0");
    }
}

#[cfg(test)]
mod tests {
    use std::{
        env,
        time::{SystemTime, UNIX_EPOCH},
    };

    use super::*;

    fn no_env(_: &str) -> Option<String> {
        None
    }

    fn temp_config(contents: &str) -> std::path::PathBuf {
        let suffix = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("clock")
            .as_nanos();
        let path = env::temp_dir().join(format!("orthoplay_config_test_{suffix}.toml"));
        fs::write(&path, contents).expect("write config");
        path
    }

    #[test]
    fn missing_file_yields_defaults() {
        let settings = load_settings_from(Path::new("./does-not-exist.toml"), no_env);
        assert_eq!(settings, Settings::default());
        assert_eq!(settings.api_base_url, "http://localhost:8000");
        assert_eq!(settings.speech_rate, 0.7);
    }

    #[test]
    fn env_overrides_file_which_overrides_defaults() {
        let path = temp_config(
            "api_base_url = \"http://game.internal:9000\"\ndifficulty = \"hard\"\nspeech_rate = \"0.9\"\n",
        );

        let from_file = load_settings_from(&path, no_env);
        assert_eq!(from_file.api_base_url, "http://game.internal:9000");
        assert_eq!(from_file.difficulty, "hard");
        assert_eq!(from_file.speech_rate, 0.9);
        assert_eq!(from_file.speech_program, "espeak");

        let vars: HashMap<&str, &str> = HashMap::from([
            ("ORTHOPLAY_API_BASE_URL", "http://ignored:1"),
            ("APP__API_BASE_URL", "https://orthoplay.example"),
            ("ORTHOPLAY_SPEECH_PROGRAM", "say"),
        ]);
        let from_env = load_settings_from(&path, |key| vars.get(key).map(|v| v.to_string()));
        assert_eq!(from_env.api_base_url, "https://orthoplay.example");
        assert_eq!(from_env.difficulty, "hard");
        assert_eq!(from_env.speech_program, "say");

        fs::remove_file(path).expect("cleanup");
    }

    #[test]
    fn out_of_range_speech_rate_is_ignored() {
        let vars: HashMap<&str, &str> = HashMap::from([("ORTHOPLAY_SPEECH_RATE", "7")]);
        let settings = load_settings_from(Path::new("./does-not-exist.toml"), |key| {
            vars.get(key).map(|v| v.to_string())
        });
        assert_eq!(settings.speech_rate, DEFAULT_SPEECH_RATE);
    }

    #[test]
    fn speech_rate_setter_enforces_range() {
        let mut settings = Settings::default();
        set_speech_rate(&mut settings, 1.5);
        assert_eq!(settings.speech_rate, 1.5);
        set_speech_rate(&mut settings, 2.5);
        assert_eq!(settings.speech_rate, 1.5);
        set_speech_rate(&mut settings, f32::NAN);
        assert_eq!(settings.speech_rate, 1.5);
    }
}
