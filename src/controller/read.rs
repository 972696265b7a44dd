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

//! Stock waitable controllers for reading answers from the player.

use std::{cell::RefCell, rc::Rc, time::Duration};

use crossterm::event::KeyCode;
use tui_input::{Input, InputRequest};

use crate::{
    controller::{Controller, Wait, Waitable, WaitableController},
    error::Result,
    events::EventHandler,
    platform::Key,
};

const DEFAULT_STRING_LEN: usize = 16;
const INT_LEN: usize = 9;

/// Reads a single key out of a set of accepted characters.
///
/// Matching ignores case; the result is the character as written in the
/// choice string.
pub struct ReadChoiceController {
    choices: String,
    escape: Option<char>,
    waitable: Waitable<char>,
}

impl ReadChoiceController {
    pub fn new(choices: impl Into<String>) -> Self {
        Self {
            choices: choices.into(),
            escape: None,
            waitable: Waitable::new(),
        }
    }

    /// Makes Escape answer with `choice`.
    pub fn with_escape(mut self, choice: char) -> Self {
        self.escape = Some(choice);
        self
    }

    pub fn choices(&self) -> &str {
        &self.choices
    }

    fn find(&self, c: char) -> Option<char> {
        let wanted = c.to_ascii_lowercase();
        self.choices
            .chars()
            .find(|choice| choice.to_ascii_lowercase() == wanted)
    }
}

impl Controller for ReadChoiceController {
    fn key_pressed(&mut self, events: &mut EventHandler, key: Key) -> bool {
        if self.waitable.is_done() {
            return false;
        }

        let answer = match key.code {
            KeyCode::Esc => self.escape,
            _ => key.as_char().and_then(|c| self.find(c)),
        };

        match answer {
            Some(choice) => {
                self.waitable.mark_done(events.signals(), choice);
                true
            }
            None => false,
        }
    }
}

impl WaitableController for ReadChoiceController {
    type Output = char;

    fn waitable(&self) -> &Waitable<char> {
        &self.waitable
    }

    fn waitable_mut(&mut self) -> &mut Waitable<char> {
        &mut self.waitable
    }
}

/// Outcome of feeding one key to a line editor.
enum Edit {
    Submitted(String),
    Cancelled,
    Changed,
    Ignored,
}

/// Line editor state shared by the string and number readers.
struct LineEditor {
    input: Input,
    max_len: usize,
    accepted: Option<String>,
}

impl LineEditor {
    fn new(max_len: usize) -> Self {
        Self {
            input: Input::default(),
            max_len,
            accepted: None,
        }
    }

    fn accepts(&self, c: char) -> bool {
        !c.is_control()
            && self
                .accepted
                .as_ref()
                .is_none_or(|accepted| accepted.contains(c))
    }

    fn edit(&mut self, key: Key) -> Edit {
        match key.code {
            KeyCode::Enter => Edit::Submitted(self.input.value().to_string()),
            KeyCode::Esc => Edit::Cancelled,
            KeyCode::Backspace => {
                self.input.handle(InputRequest::DeletePrevChar);
                Edit::Changed
            }
            KeyCode::Char(c) if self.accepts(c) => {
                if self.input.value().chars().count() < self.max_len {
                    self.input.handle(InputRequest::InsertChar(c));
                }
                Edit::Changed
            }
            _ => Edit::Ignored,
        }
    }
}

/// Reads a line of text. Enter submits, Escape gives up with an empty string.
pub struct ReadStringController {
    editor: LineEditor,
    waitable: Waitable<String>,
}

impl ReadStringController {
    pub fn new() -> Self {
        Self::with_max_len(DEFAULT_STRING_LEN)
    }

    pub fn with_max_len(max_len: usize) -> Self {
        Self {
            editor: LineEditor::new(max_len),
            waitable: Waitable::new(),
        }
    }

    /// Restricts input to the characters in `accepted`.
    pub fn accepting(mut self, accepted: impl Into<String>) -> Self {
        self.editor.accepted = Some(accepted.into());
        self
    }

    /// The text typed so far.
    pub fn value(&self) -> &str {
        self.editor.input.value()
    }

    /// Cursor position within [`value`](Self::value), for rendering.
    pub fn cursor(&self) -> usize {
        self.editor.input.cursor()
    }
}

impl Default for ReadStringController {
    fn default() -> Self {
        Self::new()
    }
}

impl Controller for ReadStringController {
    fn key_pressed(&mut self, events: &mut EventHandler, key: Key) -> bool {
        if self.waitable.is_done() {
            return false;
        }

        match self.editor.edit(key) {
            Edit::Submitted(text) => self.waitable.mark_done(events.signals(), text),
            Edit::Cancelled => self.waitable.mark_done(events.signals(), String::new()),
            Edit::Changed => {}
            Edit::Ignored => return false,
        }
        true
    }
}

impl WaitableController for ReadStringController {
    type Output = String;

    fn waitable(&self) -> &Waitable<String> {
        &self.waitable
    }

    fn waitable_mut(&mut self) -> &mut Waitable<String> {
        &mut self.waitable
    }
}

/// Reads a non-negative number. An empty or cancelled entry reads as zero.
pub struct ReadIntController {
    editor: LineEditor,
    waitable: Waitable<i32>,
}

impl ReadIntController {
    pub fn new() -> Self {
        Self::with_max_len(INT_LEN)
    }

    pub fn with_max_len(max_len: usize) -> Self {
        let mut editor = LineEditor::new(max_len.min(INT_LEN));
        editor.accepted = Some("0123456789".to_string());

        Self {
            editor,
            waitable: Waitable::new(),
        }
    }

    pub fn value(&self) -> &str {
        self.editor.input.value()
    }
}

impl Default for ReadIntController {
    fn default() -> Self {
        Self::new()
    }
}

impl Controller for ReadIntController {
    fn key_pressed(&mut self, events: &mut EventHandler, key: Key) -> bool {
        if self.waitable.is_done() {
            return false;
        }

        match self.editor.edit(key) {
            Edit::Submitted(text) => {
                let value = text.parse().unwrap_or(0);
                self.waitable.mark_done(events.signals(), value);
            }
            Edit::Cancelled => self.waitable.mark_done(events.signals(), 0),
            Edit::Changed => {}
            Edit::Ignored => return false,
        }
        true
    }
}

impl WaitableController for ReadIntController {
    type Output = i32;

    fn waitable(&self) -> &Waitable<i32> {
        &self.waitable
    }

    fn waitable_mut(&mut self) -> &mut Waitable<i32> {
        &mut self.waitable
    }
}

/// Waits for any key at all.
///
/// The result is `None` only when [`wait_timeout`](Self::wait_timeout) ran
/// out of time first.
#[derive(Default)]
pub struct AnyKeyController {
    waitable: Waitable<Option<Key>>,
}

impl AnyKeyController {
    pub fn new() -> Self {
        Self::default()
    }

    /// Waits for a key, giving up after roughly `timeout`.
    ///
    /// The timeout is counted in base ticks, rounded up, so it stretches and
    /// shrinks with the game speed like every other timed event.
    pub fn wait_timeout(
        this: &Rc<RefCell<Self>>,
        events: &mut EventHandler,
        timeout: Duration,
    ) -> Result<Option<Key>> {
        let base = events.timers().base_tick().as_millis().max(1);
        let ticks = timeout.as_millis().div_ceil(base).clamp(1, u32::MAX as u128) as u32;

        let target = Rc::clone(this);
        let signals = events.signals().clone();
        let timer = events.timers_mut().add(ticks, move |timers, me| {
            if let Ok(mut controller) = target.try_borrow_mut() {
                controller.waitable.mark_done(&signals, None);
            }
            timers.remove(me);
        });

        let result = this.wait(events);

        if events.timers().contains(timer) {
            events.timers_mut().remove(timer);
        }
        result
    }
}

impl Controller for AnyKeyController {
    fn key_pressed(&mut self, events: &mut EventHandler, key: Key) -> bool {
        self.waitable.mark_done(events.signals(), Some(key));
        true
    }
}

impl WaitableController for AnyKeyController {
    type Output = Option<Key>;

    fn waitable(&self) -> &Waitable<Option<Key>> {
        &self.waitable
    }

    fn waitable_mut(&mut self) -> &mut Waitable<Option<Key>> {
        &mut self.waitable
    }
}

/// Finishes after a number of its own ticks, swallowing every key meanwhile.
pub struct WaitController {
    cycles: u32,
    elapsed: u32,
    waitable: Waitable<()>,
}

impl WaitController {
    pub fn new(cycles: u32) -> Self {
        Self {
            cycles,
            elapsed: 0,
            waitable: Waitable::new(),
        }
    }
}

impl Controller for WaitController {
    fn key_pressed(&mut self, _events: &mut EventHandler, _key: Key) -> bool {
        true
    }

    fn timer_fired(&mut self, events: &mut EventHandler) {
        self.elapsed += 1;
        if self.elapsed >= self.cycles {
            self.waitable.mark_done(events.signals(), ());
        }
    }

    fn tick_interval(&self) -> Option<u32> {
        Some(1)
    }
}

impl WaitableController for WaitController {
    type Output = ();

    fn waitable(&self) -> &Waitable<()> {
        &self.waitable
    }

    fn waitable_mut(&mut self) -> &mut Waitable<()> {
        &mut self.waitable
    }
}
