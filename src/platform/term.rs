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

//! Terminal input source and environment styling.
//!
//! Key presses are read with crossterm and decoded into [`Key`]s. Key release
//! and repeat reports are dropped, as are mouse, focus and resize events.
//!
//! # Compatibility
//!
//! The background colour helpers rely on the terminal emulator supporting
//! OSC 11/111. Most modern terminals (XTerm, iTerm2, Alacritty, Kitty) do.

use std::{
    io::{self, Write},
    time::{Duration, Instant},
};

use crossterm::event::{self, Event, KeyEventKind};

use crate::{
    error::Result,
    platform::{InputEvent, Key, Platform},
};

/// Crossterm-backed [`Platform`].
///
/// Raw mode and the alternate screen are owned by the caller; this type only
/// reads events and keeps the clock.
pub struct TerminalPlatform {
    started: Instant,
}

impl TerminalPlatform {
    pub fn new() -> Self {
        Self {
            started: Instant::now(),
        }
    }

    fn decode(event: Event) -> Option<InputEvent> {
        match event {
            Event::Key(key) if key.kind == KeyEventKind::Press => {
                Some(InputEvent::Key(Key::from(key)))
            }
            _ => None,
        }
    }
}

impl Default for TerminalPlatform {
    fn default() -> Self {
        Self::new()
    }
}

impl Platform for TerminalPlatform {
    fn now(&self) -> Duration {
        self.started.elapsed()
    }

    fn wait_input(&mut self, timeout: Duration) -> Result<Vec<InputEvent>> {
        let mut events = Vec::new();

        if !event::poll(timeout)? {
            return Ok(events);
        }

        // Drain everything already queued without blocking again
        loop {
            if let Some(input) = Self::decode(event::read()?) {
                events.push(input);
            }
            if !event::poll(Duration::ZERO)? {
                break;
            }
        }

        Ok(events)
    }

    fn present(&mut self) {
        io::stdout().flush().ok();
    }
}

/// Paints the whole terminal window `#rrggbb` (OSC 11).
pub fn set_terminal_bg(hex_color: &str) -> io::Result<()> {
    let mut stdout = io::stdout();
    write!(stdout, "\x1b]11;{}\x07", hex_color)?;
    stdout.flush()
}

/// Resets the terminal background to its default color (OSC 111).
pub fn reset_terminal_bg() -> io::Result<()> {
    let mut stdout = io::stdout();
    write!(stdout, "\x1b]111\x07")?;
    stdout.flush()
}
