use crate::surface::{SurfaceState, SurfaceWrite};

pub struct App {
    /// Everything the refresh routines have written so far.
    pub surface: SurfaceState,
    /// Whether the user has requested to quit.
    pub quit: bool,
}

impl App {
    pub fn new() -> Self {
        Self {
            surface: SurfaceState::default(),
            quit: false,
        }
    }

    /// Apply a batch of surface writes in arrival order.
    pub fn apply_all(&mut self, writes: impl IntoIterator<Item = SurfaceWrite>) {
        for write in writes {
            self.surface.apply(write);
        }
    }

    /// Text for the status bar's sync indicator.
    pub fn sync_label(&self) -> String {
        match &self.surface.last_sync {
            Some(ts) => format!("last sync {ts}"),
            None => "waiting for first sync".to_string(),
        }
    }
}
