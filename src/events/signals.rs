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

//! Pump termination flags.

use std::{cell::Cell, rc::Rc};

/// The two flags that stop pumps, shareable with timer callbacks.
///
/// * `controller_done` stops the innermost pump and is cleared when that
///   pump exits.
/// * `ended` stops every pump and is never cleared.
///
/// Clones share the same flags.
#[derive(Clone, Debug, Default)]
pub struct PumpSignals {
    controller_done: Rc<Cell<bool>>,
    ended: Rc<Cell<bool>>,
}

impl PumpSignals {
    pub fn set_controller_done(&self) {
        self.controller_done.set(true);
    }

    pub fn is_controller_done(&self) -> bool {
        self.controller_done.get()
    }

    pub(crate) fn clear_controller_done(&self) {
        self.controller_done.set(false);
    }

    /// Ends every running pump. Idempotent.
    pub fn end(&self) {
        if !self.ended.replace(true) {
            tracing::debug!("event pumps ending");
        }
    }

    pub fn is_ended(&self) -> bool {
        self.ended.get()
    }

    pub(crate) fn should_stop(&self) -> bool {
        self.is_ended() || self.is_controller_done()
    }
}
