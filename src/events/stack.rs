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

//! The controller stack.
//!
//! A plain LIFO of controller handles. Each entry also counts the base ticks
//! it has seen while on top, so a controller asking for a tick every N base
//! ticks gets one on every Nth tick it actually receives.

use std::rc::Rc;

use crate::controller::ControllerRef;

struct StackEntry {
    controller: ControllerRef,
    elapsed: u32,
}

#[derive(Default)]
pub(crate) struct ControllerStack {
    entries: Vec<StackEntry>,
}

impl ControllerStack {
    pub(crate) fn push(&mut self, controller: ControllerRef) {
        self.entries.push(StackEntry {
            controller,
            elapsed: 0,
        });
    }

    pub(crate) fn pop(&mut self) -> Option<ControllerRef> {
        self.entries.pop().map(|entry| entry.controller)
    }

    pub(crate) fn top(&self) -> Option<ControllerRef> {
        self.entries.last().map(|entry| Rc::clone(&entry.controller))
    }

    pub(crate) fn is_top(&self, controller: &ControllerRef) -> bool {
        self.entries
            .last()
            .is_some_and(|entry| Rc::ptr_eq(&entry.controller, controller))
    }

    pub(crate) fn contains(&self, controller: &ControllerRef) -> bool {
        self.entries
            .iter()
            .any(|entry| Rc::ptr_eq(&entry.controller, controller))
    }

    /// Replaces every entry with `controller`, returning the old entries
    /// bottom first.
    pub(crate) fn replace(&mut self, controller: ControllerRef) -> Vec<ControllerRef> {
        let old = std::mem::take(&mut self.entries)
            .into_iter()
            .map(|entry| entry.controller)
            .collect();
        self.push(controller);
        old
    }

    /// Counts one base tick for the top entry, returning it when its own
    /// tick interval has been reached.
    pub(crate) fn advance_top(&mut self) -> Option<ControllerRef> {
        let entry = self.entries.last_mut()?;
        let interval = entry.controller.try_borrow().ok()?.tick_interval()?.max(1);

        entry.elapsed += 1;
        if entry.elapsed < interval {
            return None;
        }

        entry.elapsed = 0;
        Some(Rc::clone(&entry.controller))
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        controller::{Controller, controller_ref, key_handler},
        events::EventHandler,
        platform::Key,
    };

    struct Ticking(u32);

    impl Controller for Ticking {
        fn key_pressed(&mut self, _events: &mut EventHandler, _key: Key) -> bool {
            false
        }

        fn tick_interval(&self) -> Option<u32> {
            Some(self.0)
        }
    }

    #[test]
    fn top_tracks_last_push() {
        let mut stack = ControllerStack::default();
        let a = key_handler(|_, _| true);
        let b = key_handler(|_, _| true);

        stack.push(Rc::clone(&a));
        stack.push(Rc::clone(&b));
        assert!(stack.is_top(&b));
        assert!(stack.contains(&a));

        let popped = stack.pop().unwrap();
        assert!(Rc::ptr_eq(&popped, &b));
        assert!(stack.is_top(&a));
        assert_eq!(stack.len(), 1);
    }

    #[test]
    fn replace_leaves_single_entry() {
        let mut stack = ControllerStack::default();
        for _ in 0..3 {
            stack.push(key_handler(|_, _| true));
        }

        let mode = key_handler(|_, _| true);
        let old = stack.replace(Rc::clone(&mode));

        assert_eq!(old.len(), 3);
        assert_eq!(stack.len(), 1);
        assert!(stack.is_top(&mode));
    }

    #[test]
    fn advance_top_honours_interval() {
        let mut stack = ControllerStack::default();
        stack.push(controller_ref(Ticking(3)));

        let fired: Vec<bool> = (0..6).map(|_| stack.advance_top().is_some()).collect();
        assert_eq!(fired, vec![false, false, true, false, false, true]);
    }

    #[test]
    fn non_ticking_controller_never_advances() {
        let mut stack = ControllerStack::default();
        stack.push(key_handler(|_, _| true));
        assert!(stack.advance_top().is_none());
        assert!(ControllerStack::default().advance_top().is_none());
    }
}
