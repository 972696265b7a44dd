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

//! User interface rendering logic.
//!
//! This module turns the [`DemoState`] into widgets using the `ratatui`
//! framework. The event handler's screen update hook calls [`draw`] after
//! every pump iteration that handled something, and on every sleep
//! iteration.

mod prompt;

use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout},
    style::{Modifier, Style},
    text::Line,
    widgets::{Block, Borders, Padding, Paragraph},
};

use crate::{render::prompt::draw_prompt, theme::Theme, title::DemoState};

const SPINNER: [char; 4] = ['|', '/', '-', '\\'];

const HELP: &str = "n name  g gold  m meditate  w wait  +/- speed  q quit";

/// Renders the title screen to the terminal frame.
///
/// The screen is split into a header showing the game speed and spinner, a
/// message log, and a prompt line at the bottom.
pub(crate) fn draw(f: &mut Frame, state: &DemoState, theme: &Theme) {
    let area = f.area();

    // Outer layout: header, messages, prompt
    let outer = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(0),
            Constraint::Length(1),
        ])
        .split(area);

    let spinner = SPINNER[state.frame % SPINNER.len()];
    let who = state.name.as_deref().unwrap_or("stranger");
    let header = Paragraph::new(Line::from(format!(
        "{spinner}  Greetings, {who}.  Speed {}",
        state.settings.game_speed
    )))
    .alignment(Alignment::Center)
    .style(
        Style::default()
            .fg(theme.accent_colour)
            .add_modifier(Modifier::BOLD),
    )
    .block(
        Block::default()
            .borders(Borders::BOTTOM)
            .border_style(Style::default().fg(theme.border_colour)),
    );
    f.render_widget(header, outer[0]);

    let mut lines: Vec<Line> = state
        .messages
        .iter()
        .map(|message| Line::from(message.as_str()))
        .collect();
    lines.push(Line::from(""));
    lines.push(Line::styled(HELP, Style::default().fg(theme.dim_colour)));

    let messages = Paragraph::new(lines)
        .style(Style::default().fg(theme.text_colour))
        .block(Block::default().padding(Padding::horizontal(1)));
    f.render_widget(messages, outer[1]);

    draw_prompt(f, outer[2], state, theme);
}
