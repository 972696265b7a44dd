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

//! Event pumps.
//!
//! [`EventHandler::run`] is re-entrant: a controller callback may call it
//! again (usually through [`EventHandler::wait_for`]) and it will not return
//! until the nested controller signals completion. Each iteration drains the
//! pending input first, then every base tick that has come due, then redraws
//! once.

use std::{cell::RefCell, rc::Rc, time::Duration};

use crate::{
    controller::{ControllerRef, WaitableController},
    error::{PumpError, Result},
    events::EventHandler,
    platform::InputEvent,
};

impl EventHandler {
    /// Runs a pump until the innermost controller is done or every pump is
    /// ended.
    ///
    /// The `controller_done` flag is cleared on the way out, so the next pump
    /// always starts fresh.
    ///
    /// # Errors
    ///
    /// Returns an error if the platform fails to deliver input.
    pub fn run(&mut self) -> Result<()> {
        if !self.timers.source().is_armed() {
            let now = self.platform.now();
            self.timers.source_mut().arm(now);
        }

        self.depth += 1;
        tracing::debug!(depth = self.depth, "pump started");

        let mut result = Ok(());
        while !self.signals.should_stop() {
            if let Err(e) = self.pump_once() {
                result = Err(e);
                break;
            }
        }

        tracing::debug!(depth = self.depth, ended = self.signals.is_ended(), "pump stopped");
        self.depth -= 1;
        self.signals.clear_controller_done();

        result
    }

    fn pump_once(&mut self) -> Result<()> {
        if self.pending.is_empty() {
            let timeout = self.timers.source().until_next(self.platform.now());
            let events = self.platform.wait_input(timeout)?;
            self.pending.extend(events);
        }

        let mut handled = false;

        while !self.signals.should_stop() {
            let Some(event) = self.pending.pop_front() else {
                break;
            };
            handled = true;

            match event {
                InputEvent::Key(key) => {
                    self.dispatch_key(key);
                }
                InputEvent::Quit => {
                    tracing::info!("quit requested");
                    self.signals.end();
                }
            }
        }

        while !self.signals.should_stop() && self.timers.source_mut().take_due(self.platform.now())
        {
            handled = true;
            self.dispatch_tick();
        }

        if handled {
            self.refresh();
        }
        self.platform.present();

        Ok(())
    }

    /// Pushes `controller`, pumps until it is done, pops it and returns its
    /// result.
    ///
    /// # Errors
    ///
    /// * [`PumpError::AlreadyFinished`] if the controller was already done.
    /// * [`PumpError::Busy`] if the controller is mid-dispatch further up the
    ///   call stack.
    /// * [`PumpError::Cancelled`] if the pump stopped without a result.
    pub fn wait_for<C>(&mut self, controller: &Rc<RefCell<C>>) -> Result<C::Output>
    where
        C: WaitableController + 'static,
    {
        {
            let current = controller.try_borrow().map_err(|_| PumpError::Busy)?;
            if current.waitable().is_done() {
                debug_assert!(false, "waiting on a controller that already finished");
                return Err(PumpError::AlreadyFinished);
            }
        }

        let handle: ControllerRef = controller.clone();
        self.push_controller(Rc::clone(&handle));

        let outcome = self.run();

        if self.stack.is_top(&handle) {
            self.pop_controller();
        } else {
            // Replaced by set_controller or buried by an unbalanced push
            tracing::warn!("waited controller is no longer on top, leaving stack as is");
        }

        outcome?;

        controller
            .try_borrow_mut()
            .map_err(|_| PumpError::Busy)?
            .waitable_mut()
            .take()
            .ok_or(PumpError::Cancelled)
    }

    /// Suspends input handling for `duration`.
    ///
    /// Every input event arriving in the meantime is discarded. Timed events
    /// keep firing and frames keep being presented, so animations continue.
    /// Controller ticks are not delivered. A quit request ends the sleep
    /// early, and so does an already ended pump.
    ///
    /// # Errors
    ///
    /// Returns an error if the platform fails to deliver input.
    pub fn sleep(&mut self, duration: Duration) -> Result<()> {
        let deadline = self.platform.now() + duration;
        tracing::debug!(?duration, "sleeping");

        // Input fetched before the sleep began is discarded too
        for event in std::mem::take(&mut self.pending) {
            self.discard_while_sleeping(event);
        }

        while !self.signals.is_ended() {
            let now = self.platform.now();
            let timeout = self
                .timers
                .source()
                .until_next(now)
                .min(deadline.saturating_sub(now));

            for event in self.platform.wait_input(timeout)? {
                self.discard_while_sleeping(event);
            }

            let now = self.platform.now();
            while self.timers.source_mut().take_due(now) {
                self.timers.tick();
            }

            self.refresh();
            self.platform.present();

            if now >= deadline {
                break;
            }
        }

        Ok(())
    }

    fn discard_while_sleeping(&self, event: InputEvent) {
        match event {
            InputEvent::Key(key) => tracing::trace!(%key, "key discarded while sleeping"),
            InputEvent::Quit => self.signals.end(),
        }
    }
}
