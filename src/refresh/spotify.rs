//! Spotify playback refresh.
//!
//! Each run exchanges the configured refresh token for a short-lived access
//! token, asks for the currently playing item and, when nothing is active,
//! falls back to the single most recent entry of the listening history.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use reqwest::StatusCode;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, error};

use super::{null_as_default, parse_json, Refresh, TrackSnapshot};
use crate::config::{SpotifyConfig, SpotifyCredentials};
use crate::error::{Endpoint, RefreshError};
use crate::http::{Auth, Request, Transport};
use crate::surface::{timestamp, DisplaySurface, PlaybackState, SurfaceWrite};

pub const TOKEN_URL: &str = "https://accounts.spotify.com/api/token";
pub const CURRENTLY_PLAYING_URL: &str = "https://api.spotify.com/v1/me/player/currently-playing";
pub const RECENTLY_PLAYED_URL: &str =
    "https://api.spotify.com/v1/me/player/recently-played?limit=1";

// -- wire types --------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
}

#[derive(Debug, Deserialize)]
struct CurrentlyPlaying {
    item: Option<TrackObject>,
    #[serde(default, deserialize_with = "null_as_default")]
    is_playing: bool,
}

#[derive(Debug, Deserialize)]
struct RecentlyPlayed {
    #[serde(default, deserialize_with = "null_as_default")]
    items: Vec<PlayHistory>,
}

#[derive(Debug, Deserialize)]
struct PlayHistory {
    track: Option<TrackObject>,
}

#[derive(Debug, Deserialize)]
struct TrackObject {
    name: String,
    // Podcast episodes carry no artists.
    #[serde(default, deserialize_with = "null_as_default")]
    artists: Vec<ArtistObject>,
}

#[derive(Debug, Deserialize)]
struct ArtistObject {
    name: String,
}

impl TrackObject {
    fn into_snapshot(self, is_playing: bool, from_history: bool) -> TrackSnapshot {
        TrackSnapshot {
            name: self.name,
            artists: self.artists.into_iter().map(|a| a.name).collect(),
            is_playing,
            from_history,
        }
    }
}

// -- routine -----------------------------------------------------------------

/// Refreshes the Spotify panel.
pub struct SpotifyRefresher<T> {
    config: SpotifyConfig,
    transport: T,
}

impl<T: Transport> SpotifyRefresher<T> {
    pub fn new(config: SpotifyConfig, transport: T) -> Self {
        Self { config, transport }
    }

    /// Resolve what should be shown.  `None` means Spotify has neither a live
    /// session nor any history.
    async fn fetch(
        &self,
        creds: &SpotifyCredentials<'_>,
    ) -> Result<Option<TrackSnapshot>, RefreshError> {
        let token = self.access_token(creds).await?;
        if let Some(track) = self.currently_playing(&token).await? {
            return Ok(Some(track));
        }
        debug!("no active spotify session, checking history");
        self.last_played(&token).await
    }

    async fn access_token(&self, creds: &SpotifyCredentials<'_>) -> Result<String, RefreshError> {
        let basic = STANDARD.encode(format!("{}:{}", creds.client_id, creds.client_secret));
        let request = Request::post_form(
            TOKEN_URL,
            vec![
                ("grant_type", "refresh_token".to_string()),
                ("refresh_token", creds.refresh_token.to_string()),
            ],
        )
        .with_auth(Auth::Basic(basic));

        let resp = self
            .transport
            .send(request)
            .await
            .map_err(|e| RefreshError::transport(Endpoint::SpotifyToken, e))?;
        if !resp.status.is_success() {
            return Err(RefreshError::Auth {
                status: resp.status,
            });
        }
        let token: TokenResponse = parse_json(Endpoint::SpotifyToken, &resp.body)?;
        Ok(token.access_token)
    }

    /// `None` when there is no active session or no item in it.
    async fn currently_playing(&self, token: &str) -> Result<Option<TrackSnapshot>, RefreshError> {
        let endpoint = Endpoint::CurrentlyPlaying;
        let resp = self
            .transport
            .send(Request::get(CURRENTLY_PLAYING_URL).with_auth(Auth::Bearer(token.to_string())))
            .await
            .map_err(|e| RefreshError::transport(endpoint, e))?;

        if matches!(resp.status, StatusCode::NO_CONTENT | StatusCode::ACCEPTED) {
            return Ok(None);
        }
        if !resp.status.is_success() {
            return Err(RefreshError::Status {
                endpoint,
                status: resp.status,
            });
        }
        if resp.body.iter().all(u8::is_ascii_whitespace) {
            return Ok(None);
        }

        let payload: CurrentlyPlaying = parse_json(endpoint, &resp.body)?;
        let is_playing = payload.is_playing;
        Ok(payload.item.map(|item| item.into_snapshot(is_playing, false)))
    }

    async fn last_played(&self, token: &str) -> Result<Option<TrackSnapshot>, RefreshError> {
        let endpoint = Endpoint::RecentlyPlayed;
        let resp = self
            .transport
            .send(Request::get(RECENTLY_PLAYED_URL).with_auth(Auth::Bearer(token.to_string())))
            .await
            .map_err(|e| RefreshError::transport(endpoint, e))?;
        if !resp.status.is_success() {
            return Err(RefreshError::Status {
                endpoint,
                status: resp.status,
            });
        }

        let payload: RecentlyPlayed = parse_json(endpoint, &resp.body)?;
        Ok(payload
            .items
            .into_iter()
            .next()
            .and_then(|entry| entry.track)
            .map(|track| track.into_snapshot(false, true)))
    }
}

impl<T: Transport> Refresh for SpotifyRefresher<T> {
    fn name(&self) -> &'static str {
        "spotify"
    }

    fn interval(&self) -> Duration {
        self.config.poll_interval()
    }

    async fn refresh<S: DisplaySurface>(&self, surface: &S) {
        let Some(creds) = self.config.credentials() else {
            debug!("spotify credentials not configured");
            set_fallback(
                surface,
                "configure your spotify keys",
                "set them inside the config file",
                PlaybackState::Disabled,
            );
            return;
        };

        surface.write(SurfaceWrite::PlaybackState(PlaybackState::Loading));
        match self.fetch(&creds).await {
            Ok(Some(track)) => render_track(surface, &track),
            Ok(None) => set_fallback(
                surface,
                "no playback detected",
                "the deck is quiet",
                PlaybackState::Idle,
            ),
            Err(err) => {
                error!(
                    code = err.error_code(),
                    kind = ?err.kind(),
                    error = %err,
                    "spotify refresh failed"
                );
                let detail = match err.endpoint() {
                    Endpoint::RecentlyPlayed => "spotify history fetch failed",
                    _ => "spotify api request failed",
                };
                set_fallback(surface, "signal lost", detail, PlaybackState::Error);
            }
        }
    }
}

fn set_fallback<S: DisplaySurface>(
    surface: &S,
    primary: &str,
    secondary: &str,
    state: PlaybackState,
) {
    surface.write(SurfaceWrite::TrackTitle(primary.to_string()));
    surface.write(SurfaceWrite::ArtistLine(secondary.to_string()));
    surface.write(SurfaceWrite::PlaybackState(state));
}

fn render_track<S: DisplaySurface>(surface: &S, track: &TrackSnapshot) {
    surface.write(SurfaceWrite::TrackTitle(track.name.clone()));
    surface.write(SurfaceWrite::ArtistLine(track.artist_line()));
    surface.write(SurfaceWrite::PlaybackState(track.state()));
    surface.write(SurfaceWrite::LastSync(timestamp()));
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
