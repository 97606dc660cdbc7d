use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::Context;
use shared::domain::Username;
use tracing::warn;

/// Remembers the last display name used for a score submission.
#[derive(Debug, Clone)]
pub struct Profile {
    path: PathBuf,
}

impl Profile {
    /// `~/.orthoplay/username`, or `None` when no home directory is known.
    pub fn default_location() -> Option<Self> {
        dirs::home_dir().map(|home| Self::at(home.join(".orthoplay").join("username")))
    }

    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn load_username(&self) -> Option<Username> {
        let raw = fs::read_to_string(&self.path).ok()?;
        match Username::parse(&raw) {
            Ok(username) => Some(username),
            Err(err) => {
                warn!(path = %self.path.display(), "ignoring stored username: {err}");
                None
            }
        }
    }

    pub fn save_username(&self, username: &Username) -> anyhow::Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("failed to create profile directory '{}'", parent.display())
            })?;
        }
        fs::write(&self.path, username.as_str())
            .with_context(|| format!("failed to write '{}'", self.path.display()))
    }
}

#[cfg(test)]
mod tests {
    use std::{
        env,
        time::{SystemTime, UNIX_EPOCH},
    };

    use super::*;

    fn temp_root() -> PathBuf {
        let suffix = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("clock")
            .as_nanos();
        env::temp_dir().join(format!("orthoplay_profile_test_{suffix}"))
    }

    #[test]
    fn remembers_username_across_loads() {
        let root = temp_root();
        let profile = Profile::at(root.join(".orthoplay").join("username"));
        assert!(profile.load_username().is_none());

        let username = Username::parse("speller_42").expect("name");
        profile.save_username(&username).expect("save");

        let reloaded = Profile::at(profile.path().to_path_buf());
        assert_eq!(reloaded.load_username(), Some(username));

        fs::remove_dir_all(root).expect("cleanup");
    }

    #[test]
    fn invalid_stored_name_is_ignored() {
        let root = temp_root();
        fs::create_dir_all(&root).expect("root");
        let profile = Profile::at(root.join("username"));
        fs::write(profile.path(), "no spaces allowed").expect("write");

        assert!(profile.load_username().is_none());

        fs::remove_dir_all(root).expect("cleanup");
    }
}
