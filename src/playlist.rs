use std::io::Write;
use std::path::{Path, PathBuf};

use tracing::warn;

use crate::constants::PROGRESS_INTERVAL;
use crate::error::ViewerError;
use crate::state::{Command, Flow, PlaybackState};

/// One image file and its decoded form. `texture` is `None` when decoding failed.
pub struct Entry<T> {
    pub path: PathBuf,
    pub texture: Option<T>,
}

/// Ordered, fixed set of entries plus the playback cursor.
///
/// The entry list never changes after construction, so `current` stays in
/// `0..len()` for the lifetime of a non-empty playlist.
pub struct Playlist<T> {
    entries: Vec<Entry<T>>,
    current: usize,
    state: PlaybackState,
}

impl<T> Playlist<T> {
    /// Decode every path up front. Failures are logged and leave an empty slot.
    pub fn load<F>(paths: Vec<PathBuf>, mut decode: F) -> Self
    where
        F: FnMut(&Path) -> Result<T, ViewerError>,
    {
        let total = paths.len();
        println!("Loading {} images...", total);

        let mut entries = Vec::with_capacity(total);
        for (i, path) in paths.into_iter().enumerate() {
            let texture = match decode(&path) {
                Ok(texture) => Some(texture),
                Err(e) => {
                    warn!("{}", e);
                    None
                }
            };
            entries.push(Entry { path, texture });

            if should_report_progress(i, total) {
                print!("Loaded {}/{} images\r", i + 1, total);
                let _ = std::io::stdout().flush();
            }
        }

        let playlist = Self::from_entries(entries);
        println!();
        println!(
            "{} of {} images ready for playback",
            playlist.renderable_count(),
            playlist.len()
        );
        playlist
    }

    pub fn from_entries(entries: Vec<Entry<T>>) -> Self {
        Self {
            entries,
            current: 0,
            state: PlaybackState::Paused,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn renderable_count(&self) -> usize {
        self.entries.iter().filter(|e| e.texture.is_some()).count()
    }

    pub fn current_index(&self) -> usize {
        self.current
    }

    pub fn current(&self) -> Option<&Entry<T>> {
        self.entries.get(self.current)
    }

    pub fn state(&self) -> PlaybackState {
        self.state
    }

    pub fn is_playing(&self) -> bool {
        self.state == PlaybackState::Playing
    }

    pub fn advance(&mut self) {
        if self.entries.is_empty() {
            return;
        }
        self.current = (self.current + 1) % self.entries.len();
    }

    pub fn retreat(&mut self) {
        if self.entries.is_empty() {
            return;
        }
        let len = self.entries.len();
        self.current = (self.current + len - 1) % len;
    }

    /// Apply one input command. Arrow keys only step while paused.
    pub fn apply(&mut self, command: Command) -> Flow {
        match command {
            Command::Quit => Flow::Exit,
            Command::TogglePlay => {
                self.state = self.state.toggled();
                Flow::Idle
            }
            Command::Next if !self.is_playing() => {
                self.advance();
                Flow::Redraw
            }
            Command::Previous if !self.is_playing() => {
                self.retreat();
                Flow::Redraw
            }
            Command::Next | Command::Previous => Flow::Idle,
        }
    }

    /// Drop every decoded texture. Paths stay so repeated calls are harmless.
    pub fn release_textures(&mut self) {
        for entry in self.entries.iter_mut().rev() {
            entry.texture = None;
        }
    }
}

pub fn should_report_progress(index: usize, total: usize) -> bool {
    index % PROGRESS_INTERVAL == 0 || index + 1 == total
}
