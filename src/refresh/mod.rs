//! Refresh routines.
//!
//! A refresh routine fetches remote state and writes it into a
//! [`DisplaySurface`].  Each routine is self-contained: it owns its config
//! section and its transport, shares no mutable state with the others, and
//! never fails past its own boundary.  Failures are logged and rendered as a
//! fallback state instead.
//!
//! ## Adding a new routine
//!
//! 1. Create a file in this directory and define a struct holding the config
//!    it needs plus a [`Transport`](crate::http::Transport).
//! 2. Implement [`Refresh`] for it.  Keep fallible work in a private method
//!    returning `Result<_, RefreshError>` and do the fallback rendering in one
//!    place inside `refresh()`.
//! 3. Register it with the scheduler in `poll::spawn`.

mod discord;
mod snapshot;
mod spotify;

pub use discord::DiscordRefresher;
pub use snapshot::{PresenceSnapshot, TrackSnapshot};
pub use spotify::SpotifyRefresher;

use std::future::Future;
use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};

use crate::error::{Endpoint, RefreshError};
use crate::surface::DisplaySurface;

/// A unit of work invoked on a timer that updates the display surface.
pub trait Refresh: Send + Sync + 'static {
    /// Short label used in log lines.
    fn name(&self) -> &'static str;

    /// How often the scheduler should invoke [`refresh()`](Refresh::refresh).
    fn interval(&self) -> Duration;

    /// Fetch and render.  Never panics on remote failures; always leaves the
    /// surface in either a result state or a fallback state.
    fn refresh<S: DisplaySurface>(&self, surface: &S) -> impl Future<Output = ()> + Send;
}

/// Decode a JSON response body, tagging failures with the endpoint.
fn parse_json<T: DeserializeOwned>(endpoint: Endpoint, body: &[u8]) -> Result<T, RefreshError> {
    serde_json::from_slice(body).map_err(|source| RefreshError::Malformed { endpoint, source })
}

/// Treat an explicit JSON `null` like a missing field.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
