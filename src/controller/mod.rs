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

//! Modal controllers.
//!
//! A [`Controller`] is one "screen" of modal behaviour: a menu, a prompt, a
//! cutscene, the live game. Controllers are stacked on the
//! [`EventHandler`]; only the top one receives keys and ticks.
//!
//! # Ownership
//!
//! The stack holds shared [`ControllerRef`] handles. Whoever creates a
//! controller keeps its own typed `Rc<RefCell<C>>` if it needs to talk to it
//! later; the controller is dropped when the last handle goes. A closure
//! pushed with [`key_handler`] and never retained is therefore dropped as
//! soon as it is popped.
//!
//! # Waiting
//!
//! A [`WaitableController`] produces a typed result. Calling
//! [`Wait::wait`] on it pushes it, runs a nested pump until it calls
//! [`Waitable::mark_done`], pops it and returns the result. This lets a
//! scripted sequence read as straight-line code:
//!
//! ```ignore
//! let choice = Rc::new(RefCell::new(ReadChoiceController::new("yn")));
//! if choice.wait(events)? == 'y' {
//!     events.sleep(Duration::from_millis(500))?;
//! }
//! ```

pub mod read;

pub use read::{
    AnyKeyController, ReadChoiceController, ReadIntController, ReadStringController,
    WaitController,
};

use std::{cell::RefCell, rc::Rc};

use crate::{
    error::Result,
    events::{EventHandler, PumpSignals},
    platform::Key,
};

/// A unit of modal input and tick handling.
pub trait Controller {
    /// Handles a decoded key, returning whether it was consumed.
    ///
    /// Unconsumed keys go to the event handler's default key handler and no
    /// further.
    fn key_pressed(&mut self, events: &mut EventHandler, key: Key) -> bool;

    /// Called every [`tick_interval`](Self::tick_interval) base ticks while
    /// this controller is on top of the stack.
    fn timer_fired(&mut self, _events: &mut EventHandler) {}

    /// Tick rate in base ticks, or `None` for a controller that never ticks.
    fn tick_interval(&self) -> Option<u32> {
        None
    }
}

/// Shared handle to a stacked controller.
pub type ControllerRef = Rc<RefCell<dyn Controller>>;

/// Wraps a controller for pushing onto the stack.
pub fn controller_ref<C: Controller + 'static>(controller: C) -> ControllerRef {
    Rc::new(RefCell::new(controller))
}

/// Completion state and result slot of a waitable controller.
#[derive(Debug)]
pub struct Waitable<T> {
    done: bool,
    value: Option<T>,
}

impl<T> Waitable<T> {
    pub fn new() -> Self {
        Self {
            done: false,
            value: None,
        }
    }

    /// Stores the result and stops the innermost pump once the current
    /// dispatch returns.
    pub fn mark_done(&mut self, signals: &PumpSignals, value: T) {
        if self.done {
            tracing::debug!("controller marked done twice, keeping first result");
            return;
        }

        self.done = true;
        self.value = Some(value);
        signals.set_controller_done();
    }

    pub fn is_done(&self) -> bool {
        self.done
    }

    pub fn value(&self) -> Option<&T> {
        self.value.as_ref()
    }

    /// Moves the result out; the waitable stays finished.
    pub fn take(&mut self) -> Option<T> {
        self.value.take()
    }
}

impl<T> Default for Waitable<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// A controller that finishes with a typed result.
pub trait WaitableController: Controller {
    type Output;

    fn waitable(&self) -> &Waitable<Self::Output>;

    fn waitable_mut(&mut self) -> &mut Waitable<Self::Output>;
}

/// Synchronous-looking access to a waitable controller's result.
pub trait Wait {
    type Output;

    /// Pushes the controller, pumps until it is done, pops it and returns
    /// its result.
    ///
    /// # Errors
    ///
    /// * [`PumpError::Cancelled`](crate::PumpError) if the pump ended first.
    /// * [`PumpError::AlreadyFinished`](crate::PumpError) if the controller
    ///   was already done.
    fn wait(&self, events: &mut EventHandler) -> Result<Self::Output>;
}

impl<C> Wait for Rc<RefCell<C>>
where
    C: WaitableController + 'static,
{
    type Output = C::Output;

    fn wait(&self, events: &mut EventHandler) -> Result<C::Output> {
        events.wait_for(self)
    }
}

/// Adapts a bare closure into a controller.
pub struct KeyHandlerController<F> {
    handler: F,
}

impl<F> KeyHandlerController<F>
where
    F: FnMut(&mut EventHandler, Key) -> bool,
{
    pub fn new(handler: F) -> Self {
        Self { handler }
    }
}

impl<F> Controller for KeyHandlerController<F>
where
    F: FnMut(&mut EventHandler, Key) -> bool,
{
    fn key_pressed(&mut self, events: &mut EventHandler, key: Key) -> bool {
        (self.handler)(events, key)
    }
}

/// Wraps `handler` as a stackable controller.
pub fn key_handler<F>(handler: F) -> ControllerRef
where
    F: FnMut(&mut EventHandler, Key) -> bool + 'static,
{
    controller_ref(KeyHandlerController::new(handler))
}

/// Key handler that swallows every key.
pub fn ignore_keys(_events: &mut EventHandler, _key: Key) -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mark_done_keeps_first_result_and_signals() {
        let signals = PumpSignals::default();
        let mut waitable = Waitable::new();

        waitable.mark_done(&signals, 1);
        assert!(signals.is_controller_done());

        signals.clear_controller_done();
        waitable.mark_done(&signals, 2);

        assert!(!signals.is_controller_done());
        assert_eq!(waitable.value(), Some(&1));
    }

    #[test]
    fn take_leaves_waitable_finished() {
        let signals = PumpSignals::default();
        let mut waitable = Waitable::new();
        waitable.mark_done(&signals, "yes");

        assert_eq!(waitable.take(), Some("yes"));
        assert_eq!(waitable.take(), None);
        assert!(waitable.is_done());
    }
}
