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

//! Recurring timed events.
//!
//! Every event fires at a whole multiple of the base tick. Changing the base
//! tick with [`TimedEventMgr::reset`] rescales every event at once, which is
//! how a single game speed setting governs animation, cursor blink and
//! gameplay cadence.
//!
//! # Mutation while firing
//!
//! Callbacks receive the manager itself, so they can add events, remove other
//! events or remove themselves. While a pass is in progress the manager is
//! locked: removals and additions are queued and applied once the pass
//! completes. An event removed mid-pass never fires again, including later in
//! the same pass.

mod clock;

pub(crate) use clock::TickSource;

use std::{fmt, time::Duration};

use crate::error::Result;

/// Identity of a registered [`TimedEvent`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerId(u64);

/// Callback invoked when an event fires.
///
/// The callback gets the manager (locked) and its own id, which is all it
/// needs to cancel itself.
pub type TimerCallback = Box<dyn FnMut(&mut TimedEventMgr, TimerId)>;

pub struct TimedEvent {
    id: TimerId,
    // Only `None` while the callback is running
    callback: Option<TimerCallback>,
    interval: u32,
    elapsed: u32,
    tag: Option<&'static str>,
}

impl TimedEvent {
    pub fn id(&self) -> TimerId {
        self.id
    }

    /// Firing interval in base ticks.
    pub fn interval(&self) -> u32 {
        self.interval
    }

    /// Base ticks since this event last fired.
    pub fn elapsed(&self) -> u32 {
        self.elapsed
    }

    pub fn tag(&self) -> Option<&'static str> {
        self.tag
    }

    /// Advances by one base tick, returning whether the event is due.
    fn advance(&mut self) -> bool {
        self.elapsed += 1;
        if self.elapsed >= self.interval {
            self.elapsed = 0;
            true
        } else {
            false
        }
    }
}

impl fmt::Debug for TimedEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TimedEvent")
            .field("id", &self.id)
            .field("interval", &self.interval)
            .field("elapsed", &self.elapsed)
            .field("tag", &self.tag)
            .finish_non_exhaustive()
    }
}

pub struct TimedEventMgr {
    events: Vec<TimedEvent>,
    deferred_removals: Vec<TimerId>,
    deferred_adds: Vec<TimedEvent>,
    /// Set while `tick` walks the event list.
    in_pass: bool,
    /// Outstanding `lock` calls made by callers.
    lock_depth: u32,
    next_id: u64,
    source: TickSource,
}

impl TimedEventMgr {
    /// Creates a manager whose base tick lasts `period`.
    ///
    /// # Errors
    ///
    /// Returns [`PumpError::InvalidTickPeriod`](crate::PumpError) for a zero
    /// period.
    pub fn new(period: Duration) -> Result<Self> {
        Ok(Self {
            events: Vec::new(),
            deferred_removals: Vec::new(),
            deferred_adds: Vec::new(),
            in_pass: false,
            lock_depth: 0,
            next_id: 0,
            source: TickSource::new(period)?,
        })
    }

    /// Registers `callback` to fire every `interval` base ticks, starting
    /// from the next tick. An interval of zero is treated as one.
    pub fn add<F>(&mut self, interval: u32, callback: F) -> TimerId
    where
        F: FnMut(&mut TimedEventMgr, TimerId) + 'static,
    {
        self.insert(interval, None, Box::new(callback))
    }

    /// Like [`add`](Self::add), labelled so it can be removed with
    /// [`remove_tagged`](Self::remove_tagged).
    pub fn add_tagged<F>(&mut self, interval: u32, tag: &'static str, callback: F) -> TimerId
    where
        F: FnMut(&mut TimedEventMgr, TimerId) + 'static,
    {
        self.insert(interval, Some(tag), Box::new(callback))
    }

    fn insert(&mut self, interval: u32, tag: Option<&'static str>, callback: TimerCallback) -> TimerId {
        let id = TimerId(self.next_id);
        self.next_id += 1;

        let event = TimedEvent {
            id,
            callback: Some(callback),
            interval: interval.max(1),
            elapsed: 0,
            tag,
        };
        tracing::trace!(?id, interval = event.interval, ?tag, "timed event added");

        if self.is_locked() {
            self.deferred_adds.push(event);
        } else {
            self.events.push(event);
        }
        id
    }

    /// Unregisters an event.
    ///
    /// While a pass is in progress the removal is deferred until it ends.
    /// Removing an event that is not registered is a programmer error.
    pub fn remove(&mut self, id: TimerId) {
        if !self.contains(id) {
            debug_assert!(false, "removing unregistered timed event {id:?}");
            tracing::warn!(?id, "removing unregistered timed event");
            return;
        }

        if self.is_locked() {
            if !self.deferred_removals.contains(&id) {
                self.deferred_removals.push(id);
            }
        } else {
            self.erase(id);
        }
    }

    /// Unregisters every event carrying `tag`, returning how many matched.
    pub fn remove_tagged(&mut self, tag: &str) -> usize {
        let ids: Vec<TimerId> = self
            .events
            .iter()
            .chain(self.deferred_adds.iter())
            .filter(|event| event.tag == Some(tag))
            .map(|event| event.id)
            .filter(|id| !self.deferred_removals.contains(id))
            .collect();

        for id in &ids {
            self.remove(*id);
        }
        ids.len()
    }

    /// Whether `id` is registered and not already scheduled for removal.
    pub fn contains(&self, id: TimerId) -> bool {
        !self.deferred_removals.contains(&id)
            && (self.events.iter().any(|event| event.id == id)
                || self.deferred_adds.iter().any(|event| event.id == id))
    }

    pub fn get(&self, id: TimerId) -> Option<&TimedEvent> {
        self.events.iter().find(|event| event.id == id)
    }

    /// Number of live events, counting pending additions and removals.
    pub fn len(&self) -> usize {
        self.events.len() + self.deferred_adds.len() - self.deferred_removals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Advances every event by one base tick and fires those that are due.
    pub fn tick(&mut self) {
        if self.in_pass {
            debug_assert!(false, "re-entrant timed event tick");
            return;
        }

        self.in_pass = true;

        // Events added or removed during the pass are queued, so the list is
        // stable for the whole loop whatever the callbacks do with the lock.
        for i in 0..self.events.len() {
            let id = self.events[i].id;
            if self.deferred_removals.contains(&id) {
                continue;
            }
            if !self.events[i].advance() {
                continue;
            }

            if let Some(mut callback) = self.events[i].callback.take() {
                callback(self, id);
                self.events[i].callback = Some(callback);
            }
        }

        self.in_pass = false;
        self.flush_if_unlocked();
    }

    /// Defers removals and additions until the matching
    /// [`unlock`](Self::unlock). Locks nest.
    pub fn lock(&mut self) {
        self.lock_depth += 1;
    }

    /// Releases one [`lock`](Self::lock). Deferred removals and additions are
    /// applied once no lock is held and no pass is in progress.
    pub fn unlock(&mut self) {
        if self.lock_depth == 0 {
            debug_assert!(false, "unlocking a timed event manager that is not locked");
            tracing::warn!("unbalanced timed event unlock");
            return;
        }

        self.lock_depth -= 1;
        self.flush_if_unlocked();
    }

    /// Whether mutations are currently deferred, either by a pass in progress
    /// or by an outstanding [`lock`](Self::lock).
    pub fn is_locked(&self) -> bool {
        self.in_pass || self.lock_depth > 0
    }

    fn flush_if_unlocked(&mut self) {
        if self.is_locked() {
            return;
        }

        for id in std::mem::take(&mut self.deferred_removals) {
            self.erase(id);
        }
        self.events.append(&mut self.deferred_adds);
    }

    /// Re-arms the tick source with a new base period.
    ///
    /// Intervals are kept in base ticks, so every event's real-time period
    /// scales by the same factor.
    ///
    /// # Errors
    ///
    /// Returns [`PumpError::InvalidTickPeriod`](crate::PumpError) for a zero
    /// period; the previous period stays in effect.
    pub fn reset(&mut self, period: Duration, now: Duration) -> Result<()> {
        tracing::debug!(old = ?self.source.period(), new = ?period, "resetting base tick");
        self.source.rearm(period, now)
    }

    /// The current base tick period.
    pub fn base_tick(&self) -> Duration {
        self.source.period()
    }

    pub(crate) fn source(&self) -> &TickSource {
        &self.source
    }

    pub(crate) fn source_mut(&mut self) -> &mut TickSource {
        &mut self.source
    }

    fn erase(&mut self, id: TimerId) {
        self.events.retain(|event| event.id != id);
        self.deferred_adds.retain(|event| event.id != id);
        tracing::trace!(?id, "timed event removed");
    }
}

impl fmt::Debug for TimedEventMgr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TimedEventMgr")
            .field("events", &self.events)
            .field("locked", &self.is_locked())
            .field("base_tick", &self.source.period())
            .finish_non_exhaustive()
    }
}
