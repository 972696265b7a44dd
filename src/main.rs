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

//! # Modal pump demo.
//!
//! A terminal title screen driven entirely by the controller stack and timer
//! scheduler.
//!
//! * The **title screen** is the bottom controller; its commands open nested
//!   prompts and wait for them in straight-line code.
//! * **Timed events** blink the cursor and spin an indicator at multiples of
//!   the base tick, so changing the game speed re-paces both.
//! * The **screen update hook** redraws the whole frame with `ratatui`.
//!
//! The terminal is restored after the outer pump returns, whether it ended
//! normally or with an error.

mod render;
mod theme;
mod title;

use std::{cell::RefCell, fs::File, io, path::PathBuf, rc::Rc, sync::Mutex};

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::{
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use modalpump::{
    EventHandler, Key, Settings, config,
    controller::controller_ref,
    platform::{self, TerminalPlatform},
};
use ratatui::{Terminal, backend::CrosstermBackend};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use crate::{
    theme::Theme,
    title::{DemoState, TitleController},
};

type Term = Terminal<CrosstermBackend<io::Stdout>>;

#[derive(Parser, Debug)]
#[command(version, about = "Modal controller stack and timer scheduler demo")]
struct Args {
    /// Base ticks per second for this run (not saved)
    #[arg(long)]
    speed: Option<u32>,

    /// Write diagnostics to this file instead of stderr
    #[arg(long)]
    log_file: Option<PathBuf>,
}

/// Loads settings, applies command line overrides and runs the demo inside
/// the alternate screen.
fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing(args.log_file.as_ref())?;

    let mut settings = config::load_settings();
    if let Some(speed) = args.speed {
        settings.game_speed = speed;
    }

    let theme = Theme::default();
    let terminal = Rc::new(RefCell::new(setup_terminal(&theme)?));
    let res = run(Rc::clone(&terminal), settings, theme);
    restore_terminal(&mut terminal.borrow_mut());

    res.context("Application error occurred")
}

/// Installs the `tracing` subscriber, filtered by `RUST_LOG` (default
/// `warn`).
fn init_tracing(log_file: Option<&PathBuf>) -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let registry = tracing_subscriber::registry().with(filter);

    match log_file {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("Failed to create log file {}", path.display()))?;
            registry
                .with(
                    tracing_subscriber::fmt::layer()
                        .with_ansi(false)
                        .with_writer(Mutex::new(file)),
                )
                .init();
        }
        None => registry
            .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
            .init(),
    }

    Ok(())
}

/// Paints the theme background, enters raw mode and the alternate screen.
fn setup_terminal(theme: &Theme) -> Result<Term> {
    // Covers the margin ratatui does not draw
    if let Some(hex) = Theme::to_hex(theme.background_colour) {
        platform::term::set_terminal_bg(&hex).context("Failed to set terminal background")?;
    }

    enable_raw_mode().context("Failed to enable raw mode")?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen).context("Failed to enter alternate screen")?;

    let backend = CrosstermBackend::new(stdout);
    let terminal = Terminal::new(backend).context("Failed to create terminal")?;

    Ok(terminal)
}

/// Leaves raw mode and the alternate screen. Failures are ignored so every
/// step gets a chance to run.
fn restore_terminal(terminal: &mut Term) {
    disable_raw_mode().ok();
    execute!(terminal.backend_mut(), LeaveAlternateScreen).ok();
    platform::term::reset_terminal_bg().ok();
    terminal.show_cursor().ok();
}

/// Builds the event handler, pushes the title screen and runs the outer pump
/// until the player quits.
///
/// # Errors
///
/// Returns an error if the tick source cannot be armed or the terminal stops
/// delivering input.
fn run(terminal: Rc<RefCell<Term>>, settings: Settings, theme: Theme) -> Result<()> {
    let mut events = EventHandler::with_settings(Box::new(TerminalPlatform::new()), &settings)
        .context("Failed to start the event pump")?;

    let state = Rc::new(RefCell::new(DemoState::new(settings)));
    state.borrow_mut().say("Welcome to the demo.");

    // Unconditional exits, whatever screen is showing
    events.set_key_interceptor(|signals, key| {
        if key == Key::ctrl('c') || key == Key::alt('x') {
            signals.end();
            true
        } else {
            false
        }
    });

    let draw_state = Rc::clone(&state);
    events.set_screen_update(move || {
        let Ok(state) = draw_state.try_borrow() else {
            return;
        };
        if let Err(e) = terminal
            .borrow_mut()
            .draw(|f| render::draw(f, &state, &theme))
        {
            tracing::warn!(error = %e, "failed to draw frame");
        }
    });

    title::start_animations(&mut events, &state);
    events.set_controller(controller_ref(TitleController::new(Rc::clone(&state))));

    events.run()?;

    Ok(())
}
