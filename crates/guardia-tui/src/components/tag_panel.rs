//! TagPanel: the tag vocabulary with the selected tags highlighted.

use ratatui::crossterm::event::{KeyCode, KeyEvent, KeyEventKind};
use ratatui::{
    layout::Rect,
    style::Modifier,
    text::{Line, Span},
    widgets::{List, ListItem, ListState, Paragraph},
    Frame,
};

use crate::{
    action::{Action, ComponentId},
    app_state::AppState,
    component::Component,
    theme::{style_default, style_muted, style_selected, style_selected_focused, C_SECONDARY, C_TAG},
    widgets::{
        pane_chrome::{pane_chrome, Badge},
        scrollable_list::ScrollableList,
    },
};

#[derive(Default)]
pub struct TagPanel {
    list: ScrollableList,
    list_state: ListState,
}

impl TagPanel {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Component for TagPanel {
    fn id(&self) -> ComponentId {
        ComponentId::Tags
    }

    fn handle_key(&mut self, key: KeyEvent, state: &AppState) -> Vec<Action> {
        if key.kind == KeyEventKind::Release {
            return vec![];
        }
        match key.code {
            KeyCode::Up | KeyCode::Char('k') => self.list.select_up(1),
            KeyCode::Down | KeyCode::Char('j') => self.list.select_down(1),
            KeyCode::Home | KeyCode::Char('g') => self.list.select_first(),
            KeyCode::End | KeyCode::Char('G') => self.list.select_last(),
            KeyCode::Enter | KeyCode::Char(' ') => {
                if let Some(tag) = self.list.selected().and_then(|i| state.tags.get(i)) {
                    return vec![Action::ToggleTag(tag.clone())];
                }
            }
            KeyCode::Backspace | KeyCode::Delete => return vec![Action::ClearTags],
            _ => {}
        }
        vec![]
    }

    fn sync(&mut self, state: &AppState) {
        self.list.set_len(state.tags.len());
    }

    fn draw(&mut self, frame: &mut Frame, area: Rect, focused: bool, state: &AppState) {
        let selected_tags = &state.browser.filters().tags;
        let badge = (!selected_tags.is_empty()).then(|| Badge {
            text: format!("{} selected", selected_tags.len()),
            color: C_TAG,
        });
        let block = pane_chrome("tags", Some('2'), focused, badge);
        let inner = block.inner(area);
        frame.render_widget(block, area);

        if state.tags.is_empty() {
            frame.render_widget(
                Paragraph::new(Span::styled("  no tags", style_muted())),
                inner,
            );
            return;
        }

        let height = inner.height as usize;
        self.list.ensure_visible(height);
        let items: Vec<ListItem> = self
            .list
            .visible_range(height)
            .map(|i| {
                let tag = &state.tags[i];
                let on = selected_tags.iter().any(|t| t == tag);
                let base = match (i == self.list.selected, focused) {
                    (true, true) => style_selected_focused(),
                    (true, false) => style_selected(),
                    _ => style_default(),
                };
                let (marker, style) = if on {
                    ("● ", base.fg(C_TAG).add_modifier(Modifier::BOLD))
                } else {
                    ("  ", base.fg(C_SECONDARY))
                };
                ListItem::new(Line::from(vec![
                    Span::styled(marker, base.fg(C_TAG)),
                    Span::styled(tag.clone(), style),
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
    fn test_enter_toggles_selected_tag() {
        let mut state = AppState::new(Browser::new());
        state.tags = vec!["guerra".into(), "rei".into()];
        let mut panel = TagPanel::new();
        panel.sync(&state);

        panel.handle_key(key(KeyCode::Down), &state);
        assert_eq!(
            panel.handle_key(key(KeyCode::Enter), &state),
            vec![Action::ToggleTag("rei".into())]
        );
        assert_eq!(panel.handle_key(key(KeyCode::Backspace), &state), vec![Action::ClearTags]);
    }

    #[test]
    fn test_no_tags_no_toggle() {
        let state = AppState::new(Browser::new());
        let mut panel = TagPanel::new();
        panel.sync(&state);
        assert!(panel.handle_key(key(KeyCode::Enter), &state).is_empty());
    }
}
