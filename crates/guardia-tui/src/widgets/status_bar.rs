//! Bottom rows: key hints, and the latest warning or a first-run tip.

use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

use crate::action::ComponentId;
use crate::theme::{C_ERROR, C_HINT, C_MODE_NORMAL, C_MODE_SEARCH, C_MUTED, C_SECONDARY, C_SEPARATOR};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    Normal,
    Search,
}

impl InputMode {
    pub fn label(self) -> &'static str {
        match self {
            Self::Normal => "BROWSE",
            Self::Search => "SEARCH",
        }
    }

    fn color(self) -> ratatui::style::Color {
        match self {
            Self::Normal => C_MODE_NORMAL,
            Self::Search => C_MODE_SEARCH,
        }
    }
}

fn key_hints(mode: InputMode, focus: ComponentId) -> &'static str {
    match (mode, focus) {
        (InputMode::Search, _) => " type to search  Enter apply  Esc clear/close",
        (InputMode::Normal, ComponentId::Episodes) => {
            " ↑↓ select  Enter play  Space pause  f/l mark  F/L only  h/H hide  s/S sort  [/] page  A queue  / search  Tab pane  q quit"
        }
        (InputMode::Normal, ComponentId::Tags) => " ↑↓ select  Enter toggle tag  Backspace clear tags  Tab pane  q quit",
        (InputMode::Normal, ComponentId::Playlist) => {
            " ↑↓ select  Enter play  d remove  C clear  n/p next/prev  Tab pane  q quit"
        }
    }
}

pub fn draw_keys_bar(frame: &mut Frame, area: Rect, mode: InputMode, focus: ComponentId) {
    let line = Line::from(vec![
        Span::styled(
            format!(" {} ", mode.label()),
            Style::default().fg(mode.color()).add_modifier(Modifier::BOLD),
        ),
        Span::styled(key_hints(mode, focus), Style::default().fg(C_MUTED)),
    ]);
    frame.render_widget(Paragraph::new(line), area);
}

/// A pending tip wins over the last log line.
pub fn draw_log_bar(frame: &mut Frame, area: Rect, last_log: Option<&str>, tip: Option<&str>) {
    let span = match (tip, last_log) {
        (Some(tip), _) => Span::styled(format!(" tip: {}", tip), Style::default().fg(C_HINT)),
        (None, Some(log)) if log.contains("[ERROR]") => {
            Span::styled(format!(" {}", log), Style::default().fg(C_ERROR))
        }
        (None, Some(log)) => Span::styled(format!(" {}", log), Style::default().fg(C_SECONDARY)),
        (None, None) => Span::raw(""),
    };
    frame.render_widget(Paragraph::new(Line::from(span)), area);
}

pub fn draw_separator(frame: &mut Frame, area: Rect) {
    let line = Line::from(Span::styled(
        "─".repeat(area.width as usize),
        Style::default().fg(C_SEPARATOR),
    ));
    frame.render_widget(Paragraph::new(line), area);
}
