// Copyright (C) 2026  Caprica Software Limited
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License
// along with this program.  If not, see <https://www.gnu.org/licenses/>.

//! Platform boundary: decoded keys, the clock, and frame presentation.
//!
//! The pump never looks at raw terminal events. A [`Platform`] hands it
//! already-decoded [`InputEvent`]s and a monotonic clock, and is told when a
//! frame should be presented.
//!
//! # Implementations
//!
//! * [`TerminalPlatform`]: crossterm-backed, used by the binary.
//! * [`ScriptedPlatform`]: virtual time and a scripted input queue, used for
//!   headless runs and tests.

mod scripted;
pub mod term;

pub use scripted::ScriptedPlatform;
pub use term::TerminalPlatform;

use std::{fmt, time::Duration};

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::error::Result;

/// A fully decoded key: the symbol plus modifier bits.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Key {
    pub code: KeyCode,
    pub modifiers: KeyModifiers,
}

impl Key {
    pub const fn new(code: KeyCode, modifiers: KeyModifiers) -> Self {
        Self { code, modifiers }
    }

    /// A plain character key without modifiers.
    pub const fn char(c: char) -> Self {
        Self::new(KeyCode::Char(c), KeyModifiers::NONE)
    }

    pub const fn ctrl(c: char) -> Self {
        Self::new(KeyCode::Char(c), KeyModifiers::CONTROL)
    }

    pub const fn alt(c: char) -> Self {
        Self::new(KeyCode::Char(c), KeyModifiers::ALT)
    }

    /// The character this key produces, if any.
    pub fn as_char(&self) -> Option<char> {
        match self.code {
            KeyCode::Char(c) => Some(c),
            KeyCode::Enter => Some('\r'),
            KeyCode::Esc => Some('\x1b'),
            KeyCode::Backspace => Some('\x08'),
            KeyCode::Tab => Some('\t'),
            _ => None,
        }
    }
}

impl From<KeyEvent> for Key {
    fn from(event: KeyEvent) -> Self {
        Self::new(event.code, event.modifiers)
    }
}

impl From<KeyCode> for Key {
    fn from(code: KeyCode) -> Self {
        Self::new(code, KeyModifiers::NONE)
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.modifiers.is_empty() {
            write!(f, "{:?}", self.code)
        } else {
            write!(f, "{:?}+{:?}", self.modifiers, self.code)
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InputEvent {
    Key(Key),

    /// The user asked the application to close (window closed, SIGHUP...).
    Quit,
}

/// The services the pump needs from the host environment.
pub trait Platform {
    /// Monotonic time since an arbitrary, fixed origin.
    fn now(&self) -> Duration;

    /// Blocks for at most `timeout` waiting for input, then returns every
    /// event that is pending. An empty result means the timeout elapsed.
    fn wait_input(&mut self, timeout: Duration) -> Result<Vec<InputEvent>>;

    /// Presents the most recently rendered frame.
    fn present(&mut self) {}
}
