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

//! # Modal controller stack and cooperative timer scheduler.
//!
//! A game built on this crate is a stack of nested, re-entrant "screens"
//! sharing one thread, one input source and one timer.
//!
//! * A [`Controller`] handles keys and ticks while it is on top of the stack.
//! * A [`WaitableController`] can be waited on from straight-line code; the
//!   wait runs a nested pump until the controller is done.
//! * [`TimedEventMgr`] fires recurring callbacks at multiples of a base tick
//!   and tolerates callbacks that add or remove events mid-pass.
//! * [`EventHandler`] owns all of the above and runs the pumps, including
//!   [`EventHandler::sleep`], which suspends input while timers keep running.
//!
//! ## Architecture
//!
//! Everything runs on one thread. The only place execution blocks is the
//! platform wait inside a pump; `wait` and `sleep` are re-entries into that
//! same loop. Completion is strictly LIFO: `controller_done` stops the
//! innermost pump, `ended` stops them all.

pub mod config;
pub mod controller;
pub mod error;
pub mod events;
pub mod platform;
pub mod timer;

pub use config::Settings;
pub use controller::{
    Controller, ControllerRef, KeyHandlerController, Wait, Waitable, WaitableController,
};
pub use error::{PumpError, Result};
pub use events::{EventHandler, PumpSignals};
pub use platform::{InputEvent, Key, Platform};
pub use timer::{TimedEvent, TimedEventMgr, TimerId};
