//! Widget configuration.
//!
//! Loaded once at startup from a TOML file and never mutated afterwards.  The
//! config is passed explicitly to whatever needs it: the refresh routines get
//! their own section at construction time.
//!
//! ```toml
//! log_file = "statusdeck.log"
//! overlap = "allow"   # or "skip"
//!
//! [spotify]
//! client_id = "..."
//! client_secret = "..."
//! refresh_token = "..."
//! poll_interval_ms = 60000
//!
//! [discord]
//! user_id = "1098267680638767125"
//! username = "someone"
//! avatar_fallback = "https://cdn.discordapp.com/embed/avatars/0.png"
//! poll_interval_ms = 45000
//!
//! [[socials]]
//! label = "GitHub"
//! url = "https://github.com/someone"
//! icon = "ri-github-line"
//! ```

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::poll::OverlapPolicy;

/// Default Spotify refresh period.
pub const DEFAULT_SPOTIFY_INTERVAL: Duration = Duration::from_millis(60_000);

/// Default Discord refresh period.
pub const DEFAULT_DISCORD_INTERVAL: Duration = Duration::from_millis(45_000);

/// Where logs go when the config does not say otherwise.
pub const DEFAULT_LOG_FILE: &str = "statusdeck.log";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct WidgetConfig {
    pub spotify: SpotifyConfig,
    pub discord: DiscordConfig,
    pub socials: Vec<SocialLink>,
    /// Log file path.  The terminal belongs to the UI, so logs cannot go to
    /// stderr.
    pub log_file: Option<PathBuf>,
    /// Whether a routine may start again before its previous run finished.
    pub overlap: OverlapPolicy,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SpotifyConfig {
    pub client_id: Option<String>,
    pub client_secret: Option<String>,
    pub refresh_token: Option<String>,
    pub poll_interval_ms: Option<u64>,
}

/// The three values needed for a refresh-token exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpotifyCredentials<'a> {
    pub client_id: &'a str,
    pub client_secret: &'a str,
    pub refresh_token: &'a str,
}

impl SpotifyConfig {
    /// All three credentials, or `None` if any is missing or empty.
    pub fn credentials(&self) -> Option<SpotifyCredentials<'_>> {
        Some(SpotifyCredentials {
            client_id: present(&self.client_id)?,
            client_secret: present(&self.client_secret)?,
            refresh_token: present(&self.refresh_token)?,
        })
    }

    pub fn poll_interval(&self) -> Duration {
        interval_or(self.poll_interval_ms, DEFAULT_SPOTIFY_INTERVAL)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct DiscordConfig {
    pub user_id: Option<String>,
    pub username: Option<String>,
    pub avatar_fallback: Option<String>,
    pub poll_interval_ms: Option<u64>,
}

impl DiscordConfig {
    pub fn user_id(&self) -> Option<&str> {
        present(&self.user_id)
    }

    pub fn username(&self) -> Option<&str> {
        present(&self.username)
    }

    pub fn avatar_fallback(&self) -> Option<&str> {
        present(&self.avatar_fallback)
    }

    pub fn poll_interval(&self) -> Duration {
        interval_or(self.poll_interval_ms, DEFAULT_DISCORD_INTERVAL)
    }
}

/// One entry of the static social links list.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SocialLink {
    pub label: String,
    pub url: String,
    #[serde(default)]
    pub icon: Option<String>,
}

impl WidgetConfig {
    /// Parse a config from TOML text.
    pub fn from_toml(text: &str) -> Result<Self> {
        toml::from_str(text).context("failed to parse config")
    }

    /// Load the config file at `path`.
    ///
    /// A missing file is not an error: every routine then shows its
    /// "not configured" state.  Unreadable or malformed files are.
    pub fn load(path: &Path) -> Result<Self> {
        match fs::read_to_string(path) {
            Ok(text) => Self::from_toml(&text)
                .with_context(|| format!("invalid config file '{}'", path.display())),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(Self::default()),
            Err(e) => Err(e)
                .with_context(|| format!("failed to read config file '{}'", path.display())),
        }
    }

    pub fn log_file(&self) -> &Path {
        self.log_file
            .as_deref()
            .unwrap_or_else(|| Path::new(DEFAULT_LOG_FILE))
    }
}

/// Empty strings count as unset.
fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}

fn interval_or(ms: Option<u64>, default: Duration) -> Duration {
    match ms {
        Some(ms) if ms > 0 => Duration::from_millis(ms),
        _ => default,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    const FULL: &str = r#"
log_file = "/tmp/deck.log"
overlap = "skip"

[spotify]
client_id = "id"
client_secret = "secret"
refresh_token = "refresh"
poll_interval_ms = 30000

[discord]
user_id = "42"
username = "someone"
avatar_fallback = "https://cdn.discordapp.com/embed/avatars/0.png"

[[socials]]
label = "GitHub"
url = "https://github.com/someone"
icon = "ri-github-line"

[[socials]]
label = "Blog"
url = "https://example.com"
"#;

    #[test]
    fn parses_full_config() {
        let config = WidgetConfig::from_toml(FULL).unwrap();

        let creds = config.spotify.credentials().unwrap();
        assert_eq!(creds.client_id, "id");
        assert_eq!(creds.client_secret, "secret");
        assert_eq!(creds.refresh_token, "refresh");
        assert_eq!(config.spotify.poll_interval(), Duration::from_secs(30));

        assert_eq!(config.discord.user_id(), Some("42"));
        assert_eq!(config.discord.username(), Some("someone"));
        assert_eq!(config.discord.poll_interval(), DEFAULT_DISCORD_INTERVAL);

        assert_eq!(config.socials.len(), 2);
        assert_eq!(config.socials[0].icon.as_deref(), Some("ri-github-line"));
        assert!(config.socials[1].icon.is_none());
        assert_eq!(config.log_file(), Path::new("/tmp/deck.log"));
        assert_eq!(config.overlap, OverlapPolicy::Skip);
    }

    #[test]
    fn empty_config_is_unconfigured() {
        let config = WidgetConfig::from_toml("").unwrap();
        assert!(config.spotify.credentials().is_none());
        assert!(config.discord.user_id().is_none());
        assert!(config.socials.is_empty());
        assert_eq!(config.log_file(), Path::new(DEFAULT_LOG_FILE));
        assert_eq!(config.overlap, OverlapPolicy::Allow);
    }

    #[test]
    fn empty_strings_count_as_missing() {
        let config = WidgetConfig::from_toml(
            r#"
[spotify]
client_id = "id"
client_secret = ""
refresh_token = "refresh"

[discord]
user_id = ""
"#,
        )
        .unwrap();
        assert!(config.spotify.credentials().is_none());
        assert!(config.discord.user_id().is_none());
    }

    #[test]
    fn zero_interval_uses_default() {
        let config = WidgetConfig::from_toml(
            r#"
[spotify]
poll_interval_ms = 0
"#,
        )
        .unwrap();
        assert_eq!(config.spotify.poll_interval(), DEFAULT_SPOTIFY_INTERVAL);
    }

    #[test]
    fn malformed_toml_is_an_error() {
        assert!(WidgetConfig::from_toml("[spotify\nclient_id = ").is_err());
    }

    #[test]
    fn missing_file_yields_default() {
        let config = WidgetConfig::load(Path::new("/nonexistent/statusdeck.toml")).unwrap();
        assert!(config.spotify.credentials().is_none());
    }
}
