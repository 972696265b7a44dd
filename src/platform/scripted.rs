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

//! Deterministic platform running on virtual time.
//!
//! Input is scheduled at virtual instants. Waiting never sleeps: the clock
//! jumps straight to the next scheduled event or to the end of the timeout,
//! whichever comes first. Once the script runs dry a quit request is
//! delivered, so a pump driven by a finished script always terminates.

use std::{cell::Cell, collections::VecDeque, rc::Rc, time::Duration};

use crate::{
    error::Result,
    platform::{InputEvent, Key, Platform},
};

pub struct ScriptedPlatform {
    now: Duration,
    script: VecDeque<(Duration, InputEvent)>,
    quit_when_exhausted: bool,
    frames: Rc<Cell<usize>>,
}

impl ScriptedPlatform {
    pub fn new() -> Self {
        Self {
            now: Duration::ZERO,
            script: VecDeque::new(),
            quit_when_exhausted: true,
            frames: Rc::new(Cell::new(0)),
        }
    }

    /// Schedules `event` at virtual time `at`.
    ///
    /// Events must be scheduled in non-decreasing time order.
    pub fn at(mut self, at: Duration, event: InputEvent) -> Self {
        debug_assert!(
            self.script.back().is_none_or(|(last, _)| *last <= at),
            "scripted events out of order"
        );
        self.script.push_back((at, event));
        self
    }

    pub fn key_at(self, at_ms: u64, key: Key) -> Self {
        self.at(Duration::from_millis(at_ms), InputEvent::Key(key))
    }

    /// Types every character of `text`, one per millisecond from `at_ms`.
    pub fn type_at(mut self, at_ms: u64, text: &str) -> Self {
        for (i, c) in text.chars().enumerate() {
            self = self.key_at(at_ms + i as u64, Key::char(c));
        }
        self
    }

    /// Keeps the pump idling on timer ticks after the script runs out.
    ///
    /// Only useful when something else (a sleep deadline, a timer callback)
    /// is guaranteed to stop the pump.
    pub fn idle_when_exhausted(mut self) -> Self {
        self.quit_when_exhausted = false;
        self
    }

    /// Shared counter of presented frames.
    pub fn frames(&self) -> Rc<Cell<usize>> {
        Rc::clone(&self.frames)
    }

    pub fn pending(&self) -> usize {
        self.script.len()
    }
}

impl Default for ScriptedPlatform {
    fn default() -> Self {
        Self::new()
    }
}

impl Platform for ScriptedPlatform {
    fn now(&self) -> Duration {
        self.now
    }

    fn wait_input(&mut self, timeout: Duration) -> Result<Vec<InputEvent>> {
        let deadline = self.now + timeout;

        match self.script.front() {
            Some((at, _)) if *at <= deadline => self.now = self.now.max(*at),
            Some(_) => {
                self.now = deadline;
                return Ok(Vec::new());
            }
            None if self.quit_when_exhausted => return Ok(vec![InputEvent::Quit]),
            None => {
                self.now = deadline;
                return Ok(Vec::new());
            }
        }

        let mut events = Vec::new();
        while let Some((at, _)) = self.script.front() {
            if *at > self.now {
                break;
            }
            if let Some((_, event)) = self.script.pop_front() {
                events.push(event);
            }
        }

        Ok(events)
    }

    fn present(&mut self) {
        self.frames.set(self.frames.get() + 1);
    }
}
