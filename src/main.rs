//! statusdeck — a live Spotify + Discord status deck for the terminal.
//!
//! ## Architecture overview
//!
//! ```text
//! ┌──────────┐ SurfaceWrite ┌──────────┐  draw()  ┌──────────┐
//! │ poll.rs  │ ───────────► │  app.rs  │ ───────► │  ui.rs   │
//! │ (thread) │   (channel)  │ (state)  │          │ (render) │
//! └──────────┘              └──────────┘          └──────────┘
//!      │                         ▲
//!      │ refresh()               │ handle_key_event()
//! ┌──────────┐              ┌──────────┐
//! │ refresh/ │              │ input.rs │
//! └──────────┘              └──────────┘
//! ```
//!
//! * **`config`** — the TOML config, loaded once and passed explicitly.
//! * **`refresh/`** — the `Refresh` trait and the Spotify and Discord routines.
//! * **`http`** — the transport seam the routines send requests through.
//! * **`surface`** — the write-only display surface the routines render into.
//! * **`socials`** — static content rendered once at startup.
//! * **`poll`** — a background thread scheduling both routines on timers.
//! * **`app`** / **`ui`** / **`input`** — terminal state, drawing and keys.
//! * **`main`** — wires everything together and runs the event loop.

mod app;
mod config;
mod error;
mod http;
mod input;
mod logging;
mod poll;
mod refresh;
mod socials;
mod surface;
mod ui;

use std::io;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;
use crossterm::{
    event::{self, Event},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;
use tracing::info;

use app::App;
use config::WidgetConfig;
use surface::ChannelSurface;

const DEFAULT_CONFIG_PATH: &str = "statusdeck.toml";

// ---------------------------------------------------------------------------
// RAII terminal guard
// ---------------------------------------------------------------------------

/// Enters raw mode + alternate screen on construction and restores the
/// terminal when dropped, including during unwinding.
struct TerminalGuard {
    terminal: Terminal<CrosstermBackend<io::Stdout>>,
}

impl TerminalGuard {
    fn new() -> Result<Self> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen)?;
        let backend = CrosstermBackend::new(stdout);
        let terminal = Terminal::new(backend)?;
        Ok(Self { terminal })
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = execute!(self.terminal.backend_mut(), LeaveAlternateScreen);
        let _ = self.terminal.show_cursor();
    }
}

/// Restore the terminal before the panic message is printed.
fn install_panic_hook() {
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
        original_hook(info);
    }));
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

fn main() -> Result<()> {
    // -- configuration -------------------------------------------------------
    let config_path = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH));
    let config = WidgetConfig::load(&config_path)?;

    logging::init_logging(config.log_file())?;
    info!(config = %config_path.display(), "statusdeck starting");

    install_panic_hook();

    // -- static content, then background refreshes ---------------------------
    let (surface, rx) = ChannelSurface::new();
    socials::initialize(&surface, &config);
    poll::spawn(config, surface)?;

    // -- terminal setup (Drop restores on exit or panic) ---------------------
    let mut guard = TerminalGuard::new()?;
    let mut app = App::new();

    // ~10 fps: drain surface writes, render, then wait up to one tick for
    // keyboard input.
    let tick_rate = Duration::from_millis(100);

    loop {
        app.apply_all(rx.try_iter());

        guard.terminal.draw(|f| ui::draw(&app, f))?;

        if event::poll(tick_rate)? {
            if let Event::Key(key) = event::read()? {
                input::handle_key_event(&mut app, key);
            }
        }

        if app.quit {
            break;
        }
    }

    info!("statusdeck exiting");
    Ok(())
}
