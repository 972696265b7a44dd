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

//! The title screen game mode.
//!
//! This is the bottom controller of the demo. Each command opens a nested
//! interaction written as straight-line code: ask, wait, act on the answer.

use std::{cell::RefCell, collections::VecDeque, rc::Rc, time::Duration};

use crossterm::event::KeyCode;
use modalpump::{
    Controller, EventHandler, Key, Settings, Wait,
    config,
    controller::{AnyKeyController, ReadChoiceController, ReadIntController, ReadStringController},
};

const MAX_MESSAGES: usize = 8;
const NAME_LEN: usize = 12;
const DROWSY_PAUSE: Duration = Duration::from_millis(1500);
const ANY_KEY_TIMEOUT: Duration = Duration::from_secs(3);

/// What the bottom line of the screen is asking for.
pub(crate) enum Prompt {
    None,
    Choice(String),
    Text(String, Rc<RefCell<ReadStringController>>),
    Number(String, Rc<RefCell<ReadIntController>>),
    AnyKey(String),
    Sleeping,
}

/// Everything the renderer shows, shared between controllers, timers and the
/// screen update hook.
pub(crate) struct DemoState {
    pub(crate) settings: Settings,
    pub(crate) messages: VecDeque<String>,
    pub(crate) prompt: Prompt,
    pub(crate) name: Option<String>,
    pub(crate) cursor_visible: bool,
    pub(crate) frame: usize,
}

impl DemoState {
    pub(crate) fn new(settings: Settings) -> Self {
        Self {
            settings,
            messages: VecDeque::new(),
            prompt: Prompt::None,
            name: None,
            cursor_visible: true,
            frame: 0,
        }
    }

    pub(crate) fn say(&mut self, message: impl Into<String>) {
        if self.messages.len() == MAX_MESSAGES {
            self.messages.pop_front();
        }
        self.messages.push_back(message.into());
    }
}

/// Registers the free-running animations: the cursor blink and the
/// spinner.
pub(crate) fn start_animations(events: &mut EventHandler, state: &Rc<RefCell<DemoState>>) {
    let blink_ticks = state.borrow().settings.cursor_blink_ticks;

    let blink_state = Rc::clone(state);
    events.timers_mut().add_tagged(blink_ticks, "cursor", move |_, _| {
        let mut state = blink_state.borrow_mut();
        state.cursor_visible = !state.cursor_visible;
    });

    let spin_state = Rc::clone(state);
    events.timers_mut().add_tagged(1, "spinner", move |_, _| {
        let mut state = spin_state.borrow_mut();
        state.frame = state.frame.wrapping_add(1);
    });
}

pub(crate) struct TitleController {
    state: Rc<RefCell<DemoState>>,
}

impl TitleController {
    pub(crate) fn new(state: Rc<RefCell<DemoState>>) -> Self {
        Self { state }
    }

    fn set_prompt(&self, prompt: Prompt) {
        self.state.borrow_mut().prompt = prompt;
    }

    fn say(&self, message: impl Into<String>) {
        self.state.borrow_mut().say(message);
    }

    fn confirm_quit(&mut self, events: &mut EventHandler) {
        self.set_prompt(Prompt::Choice("Really quit? (y/n)".to_string()));
        let choice = Rc::new(RefCell::new(ReadChoiceController::new("yn").with_escape('n')));
        let answer = choice.wait(events);
        self.set_prompt(Prompt::None);

        match answer {
            Ok('y') => events.end(),
            Ok(_) => self.say("Onward, then."),
            Err(e) => tracing::debug!(error = %e, "quit prompt abandoned"),
        }
    }

    fn ask_name(&mut self, events: &mut EventHandler) {
        let reader = Rc::new(RefCell::new(ReadStringController::with_max_len(NAME_LEN)));
        self.set_prompt(Prompt::Text("Name thyself:".to_string(), Rc::clone(&reader)));
        let answer = reader.wait(events);
        self.set_prompt(Prompt::None);

        match answer {
            Ok(name) if !name.is_empty() => {
                self.say(format!("Welcome, {name}."));
                self.state.borrow_mut().name = Some(name);
            }
            Ok(_) => self.say("Thou art nameless."),
            Err(e) => tracing::debug!(error = %e, "name prompt abandoned"),
        }
    }

    fn ask_count(&mut self, events: &mut EventHandler) {
        let reader = Rc::new(RefCell::new(ReadIntController::new()));
        self.set_prompt(Prompt::Number("How many gold?".to_string(), Rc::clone(&reader)));
        let answer = reader.wait(events);
        self.set_prompt(Prompt::None);

        if let Ok(count) = answer {
            self.say(format!("Thou offerest {count} gold."));
        }
    }

    fn meditate(&mut self, events: &mut EventHandler) {
        self.say("Thou dost feel drowsy...");
        self.set_prompt(Prompt::Sleeping);
        if let Err(e) = events.sleep(DROWSY_PAUSE) {
            tracing::warn!(error = %e, "sleep interrupted");
        }
        self.set_prompt(Prompt::None);
        self.say("Thou dost awaken.");
    }

    fn wait_any_key(&mut self, events: &mut EventHandler) {
        self.set_prompt(Prompt::AnyKey("Press any key...".to_string()));
        let any = Rc::new(RefCell::new(AnyKeyController::new()));
        let answer = AnyKeyController::wait_timeout(&any, events, ANY_KEY_TIMEOUT);
        self.set_prompt(Prompt::None);

        match answer {
            Ok(Some(key)) => self.say(format!("Thou didst press {key}.")),
            Ok(None) => self.say("Thou didst hesitate."),
            Err(e) => tracing::debug!(error = %e, "any key prompt abandoned"),
        }
    }

    fn change_speed(&mut self, events: &mut EventHandler, delta: i32) {
        let settings = {
            let mut state = self.state.borrow_mut();
            if !state.settings.adjust_speed(delta) {
                return;
            }
            state.settings.clone()
        };

        if let Err(e) = events.apply_settings(&settings) {
            tracing::warn!(error = %e, "failed to apply game speed");
            return;
        }
        if let Err(e) = config::save_settings(&settings) {
            tracing::warn!(error = %e, "failed to save settings");
        }
        self.say(format!("Game speed is now {}.", settings.game_speed));
    }
}

impl Controller for TitleController {
    fn key_pressed(&mut self, events: &mut EventHandler, key: Key) -> bool {
        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => self.confirm_quit(events),
            KeyCode::Char('n') => self.ask_name(events),
            KeyCode::Char('g') => self.ask_count(events),
            KeyCode::Char('m') => self.meditate(events),
            KeyCode::Char('w') => self.wait_any_key(events),
            KeyCode::Char('+') | KeyCode::Char('=') => self.change_speed(events, 1),
            KeyCode::Char('-') | KeyCode::Char('_') => self.change_speed(events, -1),
            _ => return false,
        }
        true
    }
}
