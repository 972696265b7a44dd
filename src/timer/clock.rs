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

//! Base tick source.
//!
//! Turns the platform clock into a stream of evenly spaced ticks. The source
//! is polled: the pump asks how long it may block, then drains every tick
//! that has come due.

use std::time::Duration;

use crate::error::{PumpError, Result};

/// After a long stall (debugger, suspended terminal) only this many ticks are
/// replayed; the rest are dropped so the game does not fast-forward.
const MAX_BACKLOG_TICKS: u32 = 8;

#[derive(Debug, Clone)]
pub(crate) struct TickSource {
    period: Duration,
    next_due: Option<Duration>,
}

impl TickSource {
    pub(crate) fn new(period: Duration) -> Result<Self> {
        if period.is_zero() {
            return Err(PumpError::InvalidTickPeriod);
        }

        Ok(Self {
            period,
            next_due: None,
        })
    }

    pub(crate) fn period(&self) -> Duration {
        self.period
    }

    pub(crate) fn is_armed(&self) -> bool {
        self.next_due.is_some()
    }

    /// Starts counting; the first tick comes one period after `now`.
    pub(crate) fn arm(&mut self, now: Duration) {
        self.next_due = Some(now + self.period);
    }

    pub(crate) fn disarm(&mut self) {
        self.next_due = None;
    }

    /// Tears down the source and re-arms it with a new period.
    pub(crate) fn rearm(&mut self, period: Duration, now: Duration) -> Result<()> {
        if period.is_zero() {
            return Err(PumpError::InvalidTickPeriod);
        }

        self.period = period;
        self.disarm();
        self.arm(now);
        Ok(())
    }

    /// How long the pump may block before the next tick is due.
    pub(crate) fn until_next(&self, now: Duration) -> Duration {
        match self.next_due {
            Some(due) => due.saturating_sub(now),
            None => self.period,
        }
    }

    /// Consumes one due tick, returning whether there was one.
    pub(crate) fn take_due(&mut self, now: Duration) -> bool {
        let Some(due) = self.next_due else {
            return false;
        };

        if due > now {
            return false;
        }

        let backlog = self.period * MAX_BACKLOG_TICKS;
        let next = if now - due > backlog {
            tracing::debug!(behind = ?(now - due), "tick source stalled, dropping backlog");
            now + self.period
        } else {
            due + self.period
        };

        self.next_due = Some(next);
        true
    }
}
