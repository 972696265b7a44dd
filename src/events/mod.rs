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

//! The controller stack dispatcher and event pump.
//!
//! [`EventHandler`] owns the controller stack, the timed event manager and
//! the platform. It routes every decoded key to the top controller (after the
//! global interceptor has had a look) and every base tick to the timed events
//! and the top controller.
//!
//! # Organization
//!
//! * `signals`: The `controller_done`/`ended` flags that stop pumps.
//! * `stack`: The controller stack itself.
//! * `pump`: The outer and nested pumps, `wait_for` and `sleep`.

mod pump;
mod signals;
mod stack;

pub use signals::PumpSignals;

use std::{collections::VecDeque, fmt, rc::Rc, time::Duration};

use crate::{
    config::Settings,
    controller::{ControllerRef, key_handler},
    error::Result,
    platform::{InputEvent, Key, Platform},
    timer::TimedEventMgr,
};
use stack::ControllerStack;

type KeyInterceptor = Box<dyn FnMut(&PumpSignals, Key) -> bool>;
type UnhandledKeyHandler = Box<dyn FnMut(Key)>;
type ScreenUpdate = Box<dyn FnMut()>;

pub struct EventHandler {
    platform: Box<dyn Platform>,
    stack: ControllerStack,
    timers: TimedEventMgr,
    signals: PumpSignals,

    /// Input received but not yet dispatched. Survives the end of a nested
    /// pump so keys typed ahead reach the next controller in order.
    pending: VecDeque<InputEvent>,

    interceptor: Option<KeyInterceptor>,
    unhandled: UnhandledKeyHandler,
    screen_update: Option<ScreenUpdate>,

    /// Number of pumps currently running.
    depth: usize,
}

impl EventHandler {
    /// Creates an event handler whose base tick lasts `base_tick`.
    ///
    /// The tick source is armed immediately, so the first tick is due one
    /// period from now.
    ///
    /// # Errors
    ///
    /// Returns [`PumpError::InvalidTickPeriod`](crate::PumpError) if the base
    /// tick is zero.
    pub fn new(platform: Box<dyn Platform>, base_tick: Duration) -> Result<Self> {
        let mut timers = TimedEventMgr::new(base_tick)?;
        timers.source_mut().arm(platform.now());

        Ok(Self {
            platform,
            stack: ControllerStack::default(),
            timers,
            signals: PumpSignals::default(),
            pending: VecDeque::new(),
            interceptor: None,
            unhandled: Box::new(|key: Key| tracing::debug!(%key, "unhandled key")),
            screen_update: None,
            depth: 0,
        })
    }

    /// Creates an event handler paced by `settings`.
    pub fn with_settings(platform: Box<dyn Platform>, settings: &Settings) -> Result<Self> {
        Self::new(platform, settings.base_tick())
    }

    /// Re-paces the scheduler after a settings change.
    pub fn apply_settings(&mut self, settings: &Settings) -> Result<()> {
        let now = self.platform.now();
        self.timers.reset(settings.base_tick(), now)
    }

    pub fn push_controller(&mut self, controller: ControllerRef) {
        tracing::debug!(depth = self.stack.len() + 1, "controller pushed");
        self.stack.push(controller);
    }

    /// Wraps `handler` in a controller and pushes it.
    pub fn push_key_handler<F>(&mut self, handler: F) -> ControllerRef
    where
        F: FnMut(&mut EventHandler, Key) -> bool + 'static,
    {
        let controller = key_handler(handler);
        self.push_controller(Rc::clone(&controller));
        controller
    }

    /// Removes and returns the top controller.
    ///
    /// Popping the last controller while a pump is running leaves nothing to
    /// dispatch to and is a programmer error.
    pub fn pop_controller(&mut self) -> Option<ControllerRef> {
        debug_assert!(
            !(self.depth > 0 && self.stack.len() == 1),
            "popping the only controller while a pump is running"
        );

        let popped = self.stack.pop();
        tracing::debug!(depth = self.stack.len(), "controller popped");
        popped
    }

    pub fn top_controller(&self) -> Option<ControllerRef> {
        self.stack.top()
    }

    /// Discards the whole stack and makes `controller` the only entry.
    pub fn set_controller(&mut self, controller: ControllerRef) {
        let discarded = self.stack.replace(controller);
        tracing::debug!(discarded = discarded.len(), "controller stack replaced");
    }

    /// Replaces the whole stack with a closure-backed controller.
    pub fn set_key_handler<F>(&mut self, handler: F) -> ControllerRef
    where
        F: FnMut(&mut EventHandler, Key) -> bool + 'static,
    {
        let controller = key_handler(handler);
        self.set_controller(Rc::clone(&controller));
        controller
    }

    pub fn stack_depth(&self) -> usize {
        self.stack.len()
    }

    pub fn is_on_stack(&self, controller: &ControllerRef) -> bool {
        self.stack.contains(controller)
    }

    /// Number of pumps currently running, nested ones included.
    pub fn pump_depth(&self) -> usize {
        self.depth
    }

    pub fn timers(&self) -> &TimedEventMgr {
        &self.timers
    }

    pub fn timers_mut(&mut self) -> &mut TimedEventMgr {
        &mut self.timers
    }

    /// Changes the base tick, rescaling every timed event.
    pub fn reset_base_tick(&mut self, base_tick: Duration) -> Result<()> {
        let now = self.platform.now();
        self.timers.reset(base_tick, now)
    }

    pub fn signals(&self) -> &PumpSignals {
        &self.signals
    }

    /// Stops the innermost running pump once the current dispatch returns.
    pub fn set_controller_done(&self) {
        self.signals.set_controller_done();
    }

    /// Stops every running pump.
    pub fn end(&self) {
        self.signals.end();
    }

    pub fn is_ended(&self) -> bool {
        self.signals.is_ended()
    }

    pub fn now(&self) -> Duration {
        self.platform.now()
    }

    /// Installs the process-wide interceptor consulted before any controller
    /// sees a key. There is exactly one; installing another replaces it.
    pub fn set_key_interceptor<F>(&mut self, interceptor: F)
    where
        F: FnMut(&PumpSignals, Key) -> bool + 'static,
    {
        self.interceptor = Some(Box::new(interceptor));
    }

    /// Installs the handler for keys the top controller did not consume.
    pub fn set_unhandled_key_handler<F>(&mut self, handler: F)
    where
        F: FnMut(Key) + 'static,
    {
        self.unhandled = Box::new(handler);
    }

    /// Installs the hook that redraws the screen.
    pub fn set_screen_update<F>(&mut self, update: F)
    where
        F: FnMut() + 'static,
    {
        self.screen_update = Some(Box::new(update));
    }

    /// Routes `key` through the interceptor, then the top controller, then
    /// the default handler. Returns whether anything before the default
    /// handler consumed it.
    pub fn dispatch_key(&mut self, key: Key) -> bool {
        if let Some(interceptor) = self.interceptor.as_mut() {
            if interceptor(&self.signals, key) {
                tracing::trace!(%key, "key intercepted");
                return true;
            }
        }

        let Some(top) = self.stack.top() else {
            debug_assert!(false, "key dispatched with an empty controller stack");
            return false;
        };

        let consumed = match top.try_borrow_mut() {
            Ok(mut controller) => controller.key_pressed(self, key),
            Err(_) => {
                debug_assert!(false, "top controller is already dispatching");
                false
            }
        };

        if !consumed {
            (self.unhandled)(key);
        }
        consumed
    }

    /// Advances the timed events by one base tick, then ticks the top
    /// controller if its own interval has come round.
    pub fn dispatch_tick(&mut self) {
        if self.stack.is_empty() {
            debug_assert!(false, "tick dispatched with an empty controller stack");
            return;
        }

        self.timers.tick();

        if let Some(top) = self.stack.advance_top() {
            if let Ok(mut controller) = top.try_borrow_mut() {
                controller.timer_fired(self);
            }
        }
    }

    fn refresh(&mut self) {
        if let Some(update) = self.screen_update.as_mut() {
            update();
        }
    }
}

impl fmt::Debug for EventHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventHandler")
            .field("stack_depth", &self.stack.len())
            .field("pump_depth", &self.depth)
            .field("pending", &self.pending.len())
            .field("signals", &self.signals)
            .field("timers", &self.timers)
            .finish_non_exhaustive()
    }
}
