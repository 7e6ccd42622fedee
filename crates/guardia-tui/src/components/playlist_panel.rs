//! PlaylistPanel: the queue, with the cursor entry marked.

use guardia_core::catalog::format_duration;
use ratatui::crossterm::event::{KeyCode, KeyEvent, KeyEventKind};
use ratatui::{
    layout::Rect,
    text::{Line, Span},
    widgets::{List, ListItem, ListState, Paragraph},
    Frame,
};

use crate::{
    action::{Action, ComponentId},
    app_state::AppState,
    component::Component,
    theme::{
        style_default, style_muted, style_selected, style_selected_focused, C_ACCENT, C_PLAYING,
        C_SECONDARY,
    },
    widgets::{
        pane_chrome::{pane_chrome, Badge},
        scrollable_list::ScrollableList,
    },
};

#[derive(Default)]
pub struct PlaylistPanel {
    list: ScrollableList,
    list_state: ListState,
}

impl PlaylistPanel {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Component for PlaylistPanel {
    fn id(&self) -> ComponentId {
        ComponentId::Playlist
    }

    fn handle_key(&mut self, key: KeyEvent, state: &AppState) -> Vec<Action> {
        if key.kind == KeyEventKind::Release {
            return vec![];
        }
        let selected = self.list.selected();
        match key.code {
            KeyCode::Up | KeyCode::Char('k') => self.list.select_up(1),
            KeyCode::Down | KeyCode::Char('j') => self.list.select_down(1),
            KeyCode::Home | KeyCode::Char('g') => self.list.select_first(),
            KeyCode::End | KeyCode::Char('G') => self.list.select_last(),
            KeyCode::Enter => {
                if let Some(i) = selected {
                    return vec![Action::PlayIndex(i)];
                }
            }
            KeyCode::Char('d') | KeyCode::Delete => {
                if let Some(ep) = selected.and_then(|i| state.playlist.items().get(i)) {
                    return vec![Action::RemoveFromPlaylist(ep.id.clone())];
                }
            }
            _ => {}
        }
        vec![]
    }

    fn sync(&mut self, state: &AppState) {
        self.list.set_len(state.playlist.len());
    }

    fn draw(&mut self, frame: &mut Frame, area: Rect, focused: bool, state: &AppState) {
        let badge = (!state.playlist.is_empty()).then(|| Badge {
            text: format!("{}/{}", state.playlist.cursor() + 1, state.playlist.len()),
            color: C_ACCENT,
        });
        let block = pane_chrome("playlist", Some('3'), focused, badge);
        let inner = block.inner(area);
        frame.render_widget(block, area);

        if state.playlist.is_empty() {
            frame.render_widget(
                Paragraph::new(Span::styled("  empty · A adds the selected episode", style_muted())),
                inner,
            );
            return;
        }

        let height = inner.height as usize;
        self.list.ensure_visible(height);
        let cursor = state.playlist.cursor();
        let items: Vec<ListItem> = self
            .list
            .visible_range(height)
            .map(|i| {
                let ep = &state.playlist.items()[i];
                let base = match (i == self.list.selected, focused) {
                    (true, true) => style_selected_focused(),
                    (true, false) => style_selected(),
                    _ => style_default(),
                };
                let marker = if i == cursor && state.is_current(&ep.id) {
                    Span::styled("▶ ", base.fg(C_PLAYING))
                } else if i == cursor {
                    Span::styled("› ", base.fg(C_ACCENT))
                } else {
                    Span::styled("  ", base)
                };
                ListItem::new(Line::from(vec![
                    marker,
                    Span::styled(format!("{:>2}. ", i + 1), base.fg(C_SECONDARY)),
                    Span::styled(ep.title.clone(), base),
                    Span::styled(
                        format!("  {}", format_duration(ep.duration_secs())),
                        base.fg(C_SECONDARY),
                    ),
                ]))
            })
            .collect();

        self.list_state.select(Some(self.list.selected_in_view()));
        frame.render_stateful_widget(List::new(items), inner, &mut self.list_state);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use guardia_core::browse::Browser;
    use ratatui::crossterm::event::KeyModifiers;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn test_empty_playlist_ignores_enter_and_delete() {
        let state = AppState::new(Browser::new());
        let mut panel = PlaylistPanel::new();
        panel.sync(&state);
        assert!(panel.handle_key(key(KeyCode::Enter), &state).is_empty());
        assert!(panel.handle_key(key(KeyCode::Char('d')), &state).is_empty());
    }
}
