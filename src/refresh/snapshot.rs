//! Normalized, per-refresh views of the remote data.
//!
//! Both routines convert the raw API payloads into these structs before
//! rendering, so the rendering code never touches JSON field names.  Nothing
//! here is stored between refreshes.

use crate::surface::{PlaybackState, PresenceStatus};

/// What Spotify says is (or was) playing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackSnapshot {
    pub name: String,
    pub artists: Vec<String>,
    pub is_playing: bool,
    /// Taken from the recently-played history rather than the live player.
    pub from_history: bool,
}

impl TrackSnapshot {
    pub fn state(&self) -> PlaybackState {
        if self.is_playing {
            PlaybackState::Live
        } else if self.from_history {
            PlaybackState::History
        } else {
            PlaybackState::Paused
        }
    }

    fn prefix(&self) -> &'static str {
        if self.is_playing {
            "live"
        } else if self.from_history {
            "last played"
        } else {
            "paused"
        }
    }

    /// `"<prefix> — <artist>, <artist>"`.
    pub fn artist_line(&self) -> String {
        format!("{} — {}", self.prefix(), self.artists.join(", "))
    }
}

/// A user's normalized Discord presence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PresenceSnapshot {
    pub status: PresenceStatus,
    pub tag: String,
    pub activity_text: String,
    pub avatar_url: Option<String>,
    pub avatar_alt: String,
}
