//! The display surface.
//!
//! Refresh routines write into named slots through [`DisplaySurface`]; they
//! never read back.  The view layer owns the actual state ([`SurfaceState`])
//! and decides how slots look on screen.
//!
//! ```text
//! refresh routine ──write(SurfaceWrite)──► ChannelSurface ──mpsc──► App::apply
//! ```

use std::fmt;
use std::sync::mpsc;

/// Playback state tag shown next to the Spotify panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlaybackState {
    /// Credentials are not configured.
    Disabled,
    #[default]
    Loading,
    Live,
    Paused,
    History,
    Idle,
    Error,
}

impl PlaybackState {
    pub fn as_str(self) -> &'static str {
        match self {
            PlaybackState::Disabled => "disabled",
            PlaybackState::Loading => "loading",
            PlaybackState::Live => "live",
            PlaybackState::Paused => "paused",
            PlaybackState::History => "history",
            PlaybackState::Idle => "idle",
            PlaybackState::Error => "error",
        }
    }
}

impl fmt::Display for PlaybackState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Normalized Discord status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PresenceStatus {
    Online,
    Idle,
    Dnd,
    #[default]
    Offline,
}

impl PresenceStatus {
    /// Map a raw status string; anything unrecognized is offline.
    pub fn from_raw(raw: Option<&str>) -> Self {
        match raw {
            Some("online") => PresenceStatus::Online,
            Some("idle") => PresenceStatus::Idle,
            Some("dnd") => PresenceStatus::Dnd,
            _ => PresenceStatus::Offline,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            PresenceStatus::Online => "online",
            PresenceStatus::Idle => "idle",
            PresenceStatus::Dnd => "dnd",
            PresenceStatus::Offline => "offline",
        }
    }
}

impl fmt::Display for PresenceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One rendered social link.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SocialEntry {
    pub label: String,
    pub url: String,
    /// Decorative only; never read out as content.
    pub icon: Option<String>,
}

/// A single write into one slot of the surface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SurfaceWrite {
    TrackTitle(String),
    ArtistLine(String),
    PlaybackState(PlaybackState),
    DiscordTag(String),
    /// Drives the indicator's colour and text together.
    DiscordStatus(PresenceStatus),
    Activity(String),
    AvatarSrc(String),
    AvatarAlt(String),
    LastSync(String),
    ClearSocials,
    PushSocial(SocialEntry),
}

/// Write-only sink the refresh routines render into.
pub trait DisplaySurface: Send + Sync + 'static {
    fn write(&self, update: SurfaceWrite);
}

/// Current contents of every slot.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SurfaceState {
    pub track_title: String,
    pub artist_line: String,
    pub playback_state: PlaybackState,
    pub discord_tag: String,
    pub discord_status: PresenceStatus,
    pub activity: String,
    pub avatar_src: Option<String>,
    pub avatar_alt: String,
    pub last_sync: Option<String>,
    pub socials: Vec<SocialEntry>,
}

impl SurfaceState {
    pub fn apply(&mut self, update: SurfaceWrite) {
        match update {
            SurfaceWrite::TrackTitle(v) => self.track_title = v,
            SurfaceWrite::ArtistLine(v) => self.artist_line = v,
            SurfaceWrite::PlaybackState(v) => self.playback_state = v,
            SurfaceWrite::DiscordTag(v) => self.discord_tag = v,
            SurfaceWrite::DiscordStatus(v) => self.discord_status = v,
            SurfaceWrite::Activity(v) => self.activity = v,
            SurfaceWrite::AvatarSrc(v) => self.avatar_src = Some(v),
            SurfaceWrite::AvatarAlt(v) => self.avatar_alt = v,
            SurfaceWrite::LastSync(v) => self.last_sync = Some(v),
            SurfaceWrite::ClearSocials => self.socials.clear(),
            SurfaceWrite::PushSocial(entry) => self.socials.push(entry),
        }
    }
}

/// Forwards writes to the UI thread.
///
/// A closed channel means the UI has exited, so send failures are dropped.
#[derive(Debug, Clone)]
pub struct ChannelSurface {
    tx: mpsc::Sender<SurfaceWrite>,
}

impl ChannelSurface {
    pub fn new() -> (Self, mpsc::Receiver<SurfaceWrite>) {
        let (tx, rx) = mpsc::channel();
        (Self { tx }, rx)
    }
}

impl DisplaySurface for ChannelSurface {
    fn write(&self, update: SurfaceWrite) {
        let _ = self.tx.send(update);
    }
}

/// Local wall-clock time as shown in the last-sync slot.
pub fn timestamp() -> String {
    chrono::Local::now().format("%H:%M").to_string()
}

// ---------------------------------------------------------------------------
// Test double
// ---------------------------------------------------------------------------

/// In-memory surface that keeps both the write log and the applied state.
#[cfg(test)]
#[derive(Default)]
pub struct RecordingSurface {
    writes: std::sync::Mutex<Vec<SurfaceWrite>>,
}

#[cfg(test)]
impl RecordingSurface {
    pub fn writes(&self) -> Vec<SurfaceWrite> {
        self.writes.lock().unwrap().clone()
    }

    pub fn state(&self) -> SurfaceState {
        let mut state = SurfaceState::default();
        for w in self.writes() {
            state.apply(w);
        }
        state
    }
}

#[cfg(test)]
impl DisplaySurface for RecordingSurface {
    fn write(&self, update: SurfaceWrite) {
        self.writes.lock().unwrap().push(update);
    }
}
