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

//! Application settings.
//!
//! This module manages the settings file. The game speed is the only input
//! the scheduler takes from it: it fixes the base tick, and changing it is
//! what re-paces every timed event.

use std::time::Duration;

use serde::{Deserialize, Serialize};

const CONFIG_NAME: &str = "modalpump";

pub const MIN_GAME_SPEED: u32 = 1;
pub const MAX_GAME_SPEED: u32 = 20;

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Settings {
    pub version: u32,

    /// Base ticks per second.
    pub game_speed: u32,

    /// Base ticks between cursor blinks.
    pub cursor_blink_ticks: u32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            version: 1,
            game_speed: 4,
            cursor_blink_ticks: 2,
        }
    }
}

impl Settings {
    /// Length of one base tick at the configured speed.
    pub fn base_tick(&self) -> Duration {
        let speed = self.game_speed.clamp(MIN_GAME_SPEED, MAX_GAME_SPEED);
        Duration::from_millis(1000 / u64::from(speed))
    }

    /// Changes the speed by `delta`, staying within the supported range.
    /// Returns whether the speed actually changed.
    pub fn adjust_speed(&mut self, delta: i32) -> bool {
        let speed = self
            .game_speed
            .saturating_add_signed(delta)
            .clamp(MIN_GAME_SPEED, MAX_GAME_SPEED);
        let changed = speed != self.game_speed;
        self.game_speed = speed;
        changed
    }
}

pub fn load_settings() -> Settings {
    confy::load(CONFIG_NAME, None).unwrap_or_default()
}

pub fn save_settings(settings: &Settings) -> Result<(), confy::ConfyError> {
    confy::store(CONFIG_NAME, None, settings)
}
