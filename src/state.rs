#[derive(Debug, PartialEq, Eq, Clone, Copy, Default)]
pub enum PlaybackState {
    #[default]
    Paused,  // Manual stepping with the arrow keys
    Playing, // Timed auto-advance
}

impl PlaybackState {
    pub fn toggled(self) -> Self {
        match self {
            PlaybackState::Paused => PlaybackState::Playing,
            PlaybackState::Playing => PlaybackState::Paused,
        }
    }
}

/// Input intent decoded from one poll of the keyboard/window.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum Command {
    TogglePlay,
    Next,
    Previous,
    Quit,
}

/// What the loop should do after a command has been applied.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum Flow {
    Idle,
    Redraw,
    Exit,
}
