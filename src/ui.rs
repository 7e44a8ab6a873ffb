//! Terminal UI rendering.
//!
//! All drawing logic lives here, separated from application state ([`App`])
//! and input handling ([`crate::input`]).  The layout is three stacked panels
//! (Spotify, Discord, links) above a one-line status bar.

use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, Paragraph},
    Frame,
};

use crate::app::App;
use crate::surface::{PlaybackState, PresenceStatus};

/// Draw the complete UI for one frame.
pub fn draw(app: &App, frame: &mut Frame) {
    let [spotify_area, discord_area, links_area, status_area] = Layout::vertical([
        Constraint::Length(5),
        Constraint::Length(6),
        Constraint::Min(3),
        Constraint::Length(1),
    ])
    .areas(frame.area());

    draw_spotify(app, frame, spotify_area);
    draw_discord(app, frame, discord_area);
    draw_links(app, frame, links_area);
    draw_status_bar(app, frame, status_area);
}

fn playback_color(state: PlaybackState) -> Color {
    match state {
        PlaybackState::Live => Color::Green,
        PlaybackState::Paused => Color::Yellow,
        PlaybackState::History => Color::Cyan,
        PlaybackState::Loading => Color::Blue,
        PlaybackState::Error => Color::Red,
        PlaybackState::Disabled | PlaybackState::Idle => Color::DarkGray,
    }
}

fn status_color(status: PresenceStatus) -> Color {
    match status {
        PresenceStatus::Online => Color::Green,
        PresenceStatus::Idle => Color::Yellow,
        PresenceStatus::Dnd => Color::Red,
        PresenceStatus::Offline => Color::DarkGray,
    }
}

fn draw_spotify(app: &App, frame: &mut Frame, area: Rect) {
    let s = &app.surface;
    let state = s.playback_state;
    let lines = vec![
        Line::from(vec![
            Span::styled(
                format!("[{state}]"),
                Style::default().fg(playback_color(state)),
            ),
            Span::raw(" "),
            Span::styled(
                &s.track_title,
                Style::default().add_modifier(Modifier::BOLD),
            ),
        ]),
        Line::from(Span::styled(&s.artist_line, Style::default().fg(Color::Gray))),
    ];

    let panel = Paragraph::new(lines).block(
        Block::default()
            .title(" Spotify ")
            .borders(Borders::ALL),
    );
    frame.render_widget(panel, area);
}

fn draw_discord(app: &App, frame: &mut Frame, area: Rect) {
    let s = &app.surface;
    let status = s.discord_status;
    let avatar = match &s.avatar_src {
        Some(src) if s.avatar_alt.is_empty() => src.clone(),
        Some(src) => format!("{} ({src})", s.avatar_alt),
        None => "no avatar".to_string(),
    };

    let lines = vec![
        Line::from(vec![
            Span::styled(
                format!("● {status}"),
                Style::default().fg(status_color(status)),
            ),
            Span::raw("  "),
            Span::styled(&s.discord_tag, Style::default().add_modifier(Modifier::BOLD)),
        ]),
        Line::from(Span::raw(&s.activity)),
        Line::from(Span::styled(avatar, Style::default().fg(Color::DarkGray))),
    ];

    let panel = Paragraph::new(lines).block(
        Block::default()
            .title(" Discord ")
            .borders(Borders::ALL),
    );
    frame.render_widget(panel, area);
}

fn draw_links(app: &App, frame: &mut Frame, area: Rect) {
    let items: Vec<ListItem> = app
        .surface
        .socials
        .iter()
        .map(|entry| {
            // The icon is decorative: it only changes the bullet.
            let bullet = if entry.icon.is_some() { "◆ " } else { "  " };
            ListItem::new(Line::from(vec![
                Span::styled(bullet, Style::default().fg(Color::Magenta)),
                Span::styled(&entry.label, Style::default().fg(Color::White)),
                Span::raw("  "),
                Span::styled(&entry.url, Style::default().fg(Color::Cyan)),
            ]))
        })
        .collect();

    let list = List::new(items).block(
        Block::default()
            .title(" Links ")
            .borders(Borders::ALL),
    );
    frame.render_widget(list, area);
}

/// Render the bottom status bar.
fn draw_status_bar(app: &App, frame: &mut Frame, area: Rect) {
    let status = Paragraph::new(Line::from(vec![
        Span::raw(" "),
        Span::styled(app.sync_label(), Style::default().fg(Color::Yellow)),
        Span::raw("  q: quit"),
    ]));
    frame.render_widget(status, area);
}
