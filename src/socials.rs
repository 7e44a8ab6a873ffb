//! Static content rendered once at startup.

use crate::config::{DiscordConfig, SocialLink, WidgetConfig};
use crate::surface::{DisplaySurface, SocialEntry, SurfaceWrite};

/// Clear the social links slot and repopulate it, one entry per link.
///
/// Clearing first makes repeated calls with the same input idempotent.
pub fn render_social_links<S: DisplaySurface>(surface: &S, links: &[SocialLink]) {
    surface.write(SurfaceWrite::ClearSocials);
    for link in links {
        surface.write(SurfaceWrite::PushSocial(SocialEntry {
            label: link.label.clone(),
            url: link.url.clone(),
            icon: link.icon.clone().filter(|icon| !icon.is_empty()),
        }));
    }
}

/// Render everything that does not come from a refresh routine.
pub fn initialize<S: DisplaySurface>(surface: &S, config: &WidgetConfig) {
    render_social_links(surface, &config.socials);
    render_discord_placeholders(surface, &config.discord);
}

/// Show the configured avatar and name until the first presence arrives.
fn render_discord_placeholders<S: DisplaySurface>(surface: &S, discord: &DiscordConfig) {
    if let Some(fallback) = discord.avatar_fallback() {
        surface.write(SurfaceWrite::AvatarSrc(fallback.to_string()));
        surface.write(SurfaceWrite::AvatarAlt("Discord avatar".to_string()));
    }
    if let Some(username) = discord.username() {
        surface.write(SurfaceWrite::DiscordTag(username.to_string()));
    }
}
