//! Discord presence refresh via the Lanyard aggregation API.

use std::time::Duration;

use serde::Deserialize;
use tracing::{debug, error};

use super::{null_as_default, parse_json, PresenceSnapshot, Refresh};
use crate::config::DiscordConfig;
use crate::error::{Endpoint, RefreshError};
use crate::http::{Request, Transport};
use crate::surface::{timestamp, DisplaySurface, PresenceStatus, SurfaceWrite};

pub const LANYARD_USERS_URL: &str = "https://api.lanyard.rest/v1/users";
pub const AVATAR_CDN_URL: &str = "https://cdn.discordapp.com/avatars";

/// Activity type code for "Playing".
const ACTIVITY_PLAYING: i64 = 0;

const IDLE_ACTIVITY: &str = "idle in the matrix";
const DEFAULT_AVATAR_ALT: &str = "Discord avatar";

// -- wire types --------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct Envelope {
    data: Presence,
}

#[derive(Debug, Deserialize)]
struct Presence {
    discord_status: Option<String>,
    discord_user: Option<DiscordUser>,
    #[serde(default, deserialize_with = "null_as_default")]
    activities: Vec<Activity>,
}

#[derive(Debug, Deserialize)]
struct DiscordUser {
    id: Option<String>,
    username: Option<String>,
    discriminator: Option<String>,
    avatar: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Activity {
    #[serde(rename = "type")]
    kind: Option<i64>,
    name: Option<String>,
    details: Option<String>,
    state: Option<String>,
}

// -- normalization -------------------------------------------------------------

/// `username#1234`, or the bare username for the new unique-name system
/// (discriminator `"0"`) and when no discriminator is present.
fn user_tag(username: &str, discriminator: Option<&str>) -> String {
    match discriminator {
        Some(d) if !d.is_empty() && d != "0" => format!("{username}#{d}"),
        _ => username.to_string(),
    }
}

/// Text for the first "Playing" activity, if there is one.
fn activity_text(activities: &[Activity]) -> Option<String> {
    let playing = activities
        .iter()
        .find(|a| a.kind == Some(ACTIVITY_PLAYING))?;
    let parts: Vec<&str> = [&playing.name, &playing.details, &playing.state]
        .into_iter()
        .filter_map(|field| field.as_deref())
        .filter(|field| !field.is_empty())
        .collect();
    Some(parts.join(" • "))
}

fn avatar_url(user_id: &str, hash: &str) -> String {
    format!("{AVATAR_CDN_URL}/{user_id}/{hash}.png?size=128")
}

impl Presence {
    fn into_snapshot(self, config: &DiscordConfig, requested_id: &str) -> PresenceSnapshot {
        let user = self.discord_user.as_ref();
        let username = user.and_then(|u| u.username.as_deref()).filter(|u| !u.is_empty());

        let tag = match username {
            Some(name) => user_tag(name, user.and_then(|u| u.discriminator.as_deref())),
            None => config.username().unwrap_or_default().to_string(),
        };

        let avatar_url = user
            .and_then(|u| {
                let hash = u.avatar.as_deref().filter(|h| !h.is_empty())?;
                let id = u.id.as_deref().unwrap_or(requested_id);
                Some(avatar_url(id, hash))
            })
            .or_else(|| config.avatar_fallback().map(String::from));

        let avatar_alt = match username {
            Some(name) => format!("{name}'s avatar"),
            None => DEFAULT_AVATAR_ALT.to_string(),
        };

        PresenceSnapshot {
            status: PresenceStatus::from_raw(self.discord_status.as_deref()),
            tag,
            activity_text: activity_text(&self.activities)
                .unwrap_or_else(|| IDLE_ACTIVITY.to_string()),
            avatar_url,
            avatar_alt,
        }
    }
}

// -- routine -----------------------------------------------------------------

/// Refreshes the Discord panel.
pub struct DiscordRefresher<T> {
    config: DiscordConfig,
    transport: T,
}

impl<T: Transport> DiscordRefresher<T> {
    pub fn new(config: DiscordConfig, transport: T) -> Self {
        Self { config, transport }
    }

    async fn fetch(&self, user_id: &str) -> Result<PresenceSnapshot, RefreshError> {
        let endpoint = Endpoint::Presence;
        let url = format!("{LANYARD_USERS_URL}/{user_id}");
        let resp = self
            .transport
            .send(Request::get(url))
            .await
            .map_err(|e| RefreshError::transport(endpoint, e))?;
        if !resp.status.is_success() {
            return Err(RefreshError::Status {
                endpoint,
                status: resp.status,
            });
        }
        let envelope: Envelope = parse_json(endpoint, &resp.body)?;
        Ok(envelope.data.into_snapshot(&self.config, user_id))
    }

    fn render_unconfigured<S: DisplaySurface>(&self, surface: &S) {
        surface.write(SurfaceWrite::DiscordStatus(PresenceStatus::Offline));
        surface.write(SurfaceWrite::DiscordTag(
            "configure your discord userId".to_string(),
        ));
        surface.write(SurfaceWrite::Activity(
            "set it inside the config file".to_string(),
        ));
        self.render_avatar_fallback(surface);
    }

    fn render_offline<S: DisplaySurface>(&self, surface: &S) {
        surface.write(SurfaceWrite::DiscordStatus(PresenceStatus::Offline));
        surface.write(SurfaceWrite::DiscordTag(
            self.config.username().unwrap_or("discord").to_string(),
        ));
        surface.write(SurfaceWrite::Activity("discord signal jammed".to_string()));
        self.render_avatar_fallback(surface);
    }

    fn render_avatar_fallback<S: DisplaySurface>(&self, surface: &S) {
        if let Some(fallback) = self.config.avatar_fallback() {
            surface.write(SurfaceWrite::AvatarSrc(fallback.to_string()));
        }
    }
}

impl<T: Transport> Refresh for DiscordRefresher<T> {
    fn name(&self) -> &'static str {
        "discord"
    }

    fn interval(&self) -> Duration {
        self.config.poll_interval()
    }

    async fn refresh<S: DisplaySurface>(&self, surface: &S) {
        let Some(user_id) = self.config.user_id() else {
            debug!("discord user id not configured");
            self.render_unconfigured(surface);
            return;
        };

        match self.fetch(user_id).await {
            Ok(presence) => render_presence(surface, presence),
            Err(err) => {
                error!(
                    code = err.error_code(),
                    kind = ?err.kind(),
                    error = %err,
                    "discord refresh failed"
                );
                self.render_offline(surface);
            }
        }
    }
}

fn render_presence<S: DisplaySurface>(surface: &S, presence: PresenceSnapshot) {
    surface.write(SurfaceWrite::DiscordStatus(presence.status));
    surface.write(SurfaceWrite::DiscordTag(presence.tag));
    surface.write(SurfaceWrite::Activity(presence.activity_text));
    if let Some(src) = presence.avatar_url {
        surface.write(SurfaceWrite::AvatarSrc(src));
    }
    surface.write(SurfaceWrite::AvatarAlt(presence.avatar_alt));
    surface.write(SurfaceWrite::LastSync(timestamp()));
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
