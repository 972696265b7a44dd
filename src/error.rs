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

//! Error types for the event pump.
//!
//! Steady-state dispatch never fails; everything here is either a platform
//! failure (fatal, reported once by the caller) or a misuse of the pump that
//! debug builds would already have asserted on.

use std::io;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum PumpError {
    /// The input or tick source could not be used.
    #[error("platform failure: {0}")]
    Platform(#[from] io::Error),

    /// A zero base tick would make the scheduler spin forever.
    #[error("invalid base tick period, must be greater than zero")]
    InvalidTickPeriod,

    /// The pump was ended before the awaited controller finished.
    #[error("event pump ended before the controller finished")]
    Cancelled,

    /// `wait` was called on a controller that already produced its result.
    #[error("controller has already finished")]
    AlreadyFinished,

    /// The controller is already borrowed further up the call stack.
    #[error("controller is busy dispatching an event")]
    Busy,
}

pub type Result<T> = std::result::Result<T, PumpError>;
