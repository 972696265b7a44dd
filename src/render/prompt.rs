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

//! Render the prompt line.
//!
//! Shows whatever the innermost waiting controller is asking for, the text
//! typed so far and the blinking cursor.

use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::Style,
    widgets::Paragraph,
};

use crate::{
    theme::Theme,
    title::{DemoState, Prompt},
};

pub(crate) fn draw_prompt(f: &mut Frame, area: Rect, state: &DemoState, theme: &Theme) {
    let container = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Min(1)])
        .horizontal_margin(1)
        .split(area);

    // (label, typed text, cursor offset within the text)
    let (label, typed, cursor) = match &state.prompt {
        Prompt::None => (String::from(">"), String::new(), Some(0)),
        Prompt::Choice(question) | Prompt::AnyKey(question) => {
            (question.clone(), String::new(), Some(0))
        }
        Prompt::Text(question, reader) => match reader.try_borrow() {
            Ok(reader) => (question.clone(), reader.value().to_string(), Some(reader.cursor())),
            Err(_) => (question.clone(), String::new(), None),
        },
        Prompt::Number(question, reader) => match reader.try_borrow() {
            Ok(reader) => {
                let value = reader.value().to_string();
                let cursor = value.chars().count();
                (question.clone(), value, Some(cursor))
            }
            Err(_) => (question.clone(), String::new(), None),
        },
        Prompt::Sleeping => (String::from("Zzz..."), String::new(), None),
    };

    let text = format!("{label} {typed}");
    f.render_widget(
        Paragraph::new(text).style(
            Style::default()
                .fg(theme.prompt_colour)
                .bg(theme.background_colour),
        ),
        container[0],
    );

    if let Some(cursor) = cursor {
        if state.cursor_visible {
            let offset = label.chars().count() + 1 + cursor;
            let cursor_x = container[0].x + offset as u16;
            let cursor_y = container[0].y;
            f.set_cursor_position((cursor_x, cursor_y));
        }
    }
}
