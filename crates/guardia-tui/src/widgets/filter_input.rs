//! FilterInput: one-line text box built on tui-input, used for search.

use ratatui::crossterm::event::{Event, KeyCode, KeyEvent};
use ratatui::{
    layout::Rect,
    style::Style,
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};
use tui_input::{backend::crossterm::EventHandler, Input};

use crate::theme::{C_FILTER_BG, C_FILTER_FG, C_MUTED};

#[derive(Debug, PartialEq)]
pub enum FilterAction {
    /// Text changed; carries the new value.
    Changed(String),
    /// Enter: apply now.
    Confirmed(String),
    /// Esc on an empty box.
    Cancelled,
    None,
}

pub struct FilterInput {
    input: Input,
    active: bool,
    placeholder: String,
}

impl FilterInput {
    pub fn new(placeholder: impl Into<String>) -> Self {
        Self {
            input: Input::default(),
            active: false,
            placeholder: placeholder.into(),
        }
    }

    pub fn activate(&mut self) {
        self.active = true;
    }

    pub fn deactivate(&mut self) {
        self.active = false;
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn set_value(&mut self, value: &str) {
        self.input = Input::new(value.to_string());
    }

    pub fn text(&self) -> &str {
        self.input.value()
    }

    /// Esc clears a non-empty box first and closes it on the second press.
    pub fn handle_key(&mut self, key: KeyEvent) -> FilterAction {
        match key.code {
            KeyCode::Esc if !self.input.value().is_empty() => {
                self.input = Input::default();
                FilterAction::Changed(String::new())
            }
            KeyCode::Esc => {
                self.deactivate();
                FilterAction::Cancelled
            }
            KeyCode::Enter => {
                self.deactivate();
                FilterAction::Confirmed(self.input.value().to_string())
            }
            _ => {
                let before = self.input.value().to_string();
                self.input.handle_event(&Event::Key(key));
                if self.input.value() == before {
                    FilterAction::None
                } else {
                    FilterAction::Changed(self.input.value().to_string())
                }
            }
        }
    }

    pub fn draw(&self, frame: &mut Frame, area: Rect) {
        if area.width < 3 {
            return;
        }
        let width = area.width.saturating_sub(3) as usize;
        let scroll = self.input.visual_scroll(width);
        let value = self.input.value();

        let span = if value.is_empty() && !self.active {
            Span::styled(format!("/ {}", self.placeholder), Style::default().fg(C_MUTED))
        } else {
            let visible: String = value.chars().skip(scroll).collect();
            Span::styled(format!("/ {}", visible), Style::default().fg(C_FILTER_FG))
        };
        frame.render_widget(
            Paragraph::new(Line::from(span)).style(Style::default().bg(C_FILTER_BG)),
            area,
        );

        if self.active {
            let x = area.x + 2 + self.input.visual_cursor().saturating_sub(scroll) as u16;
            frame.set_cursor_position((x.min(area.x + area.width - 1), area.y));
        }
    }
}
