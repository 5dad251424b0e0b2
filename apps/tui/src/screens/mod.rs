//! TUI screen definitions.
//!
//! Each screen corresponds to a tab in the TUI and encapsulates its
//! own state and rendering logic.

mod code;
mod legend;

use std::fmt;

use crossterm::event::{KeyCode, KeyModifiers};
use ratatui::prelude::*;
use tokio::runtime::Handle;
use transcoder_shared::AppConfig;

/// Screen identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ScreenId {
    Code,
    Legend,
}

impl fmt::Display for ScreenId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Code => write!(f, "Code"),
            Self::Legend => write!(f, "Legend"),
        }
    }
}

/// Per-screen state and behaviour.
pub(crate) enum Screen {
    Code(code::CodeScreen),
    Legend(legend::LegendScreen),
}

impl Screen {
    pub(crate) fn new(id: ScreenId, runtime: &Handle, config: &AppConfig) -> Self {
        match id {
            ScreenId::Code => Self::Code(code::CodeScreen::new(runtime.clone(), config.clone())),
            ScreenId::Legend => Self::Legend(legend::LegendScreen::new()),
        }
    }

    /// Whether the current screen has an active text input field.
    pub(crate) fn is_editing(&self) -> bool {
        match self {
            Self::Code(screen) => screen.is_editing(),
            Self::Legend(_) => false,
        }
    }

    /// Drain background work; called once per event-loop tick.
    pub(crate) fn tick(&mut self) {
        if let Self::Code(screen) = self {
            screen.poll_worker();
        }
    }

    /// Abort any in-flight work before exit.
    pub(crate) fn shutdown(&mut self) {
        if let Self::Code(screen) = self {
            screen.cancel();
        }
    }

    pub(crate) fn draw(&self, f: &mut Frame, area: Rect) {
        match self {
            Self::Code(screen) => screen.draw(f, area),
            Self::Legend(screen) => screen.draw(f, area),
        }
    }

    pub(crate) fn handle_key(&mut self, code: KeyCode, modifiers: KeyModifiers) {
        match self {
            Self::Code(screen) => screen.handle_key(code, modifiers),
            Self::Legend(screen) => screen.handle_key(code, modifiers),
        }
    }
}
