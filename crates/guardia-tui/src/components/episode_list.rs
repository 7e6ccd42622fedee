//! EpisodeList: the main pane: search box, active filters and one page of
//! episodes.

use guardia_core::catalog::{format_duration, Episode};
use guardia_core::filters::{FilterState, SortDirection};
use guardia_core::player::PlayerStatus;
use guardia_core::prefs::Mark;
use ratatui::crossterm::event::{KeyCode, KeyEvent, KeyEventKind};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{List, ListItem, ListState, Paragraph},
    Frame,
};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use crate::{
    action::{Action, ComponentId},
    app_state::AppState,
    component::Component,
    theme::{
        style_default, style_muted, style_selected, style_selected_focused, C_CATEGORY, C_ERROR,
        C_FAVOURITE, C_LISTENED, C_LOADING, C_MUTED, C_PLAYING, C_SECONDARY, C_TAG,
    },
    widgets::{
        filter_input::{FilterAction, FilterInput},
        pane_chrome::{pane_chrome, Badge},
        scrollable_list::ScrollableList,
    },
};

pub struct EpisodeList {
    list: ScrollableList,
    list_state: ListState,
    search: FilterInput,
    shown_page: usize,
    visible_rows: usize,
}

impl Default for EpisodeList {
    fn default() -> Self {
        Self::new()
    }
}

impl EpisodeList {
    pub fn new() -> Self {
        Self {
            list: ScrollableList::new(),
            list_state: ListState::default(),
            search: FilterInput::new("search titles, descriptions, tags"),
            shown_page: 0,
            visible_rows: 10,
        }
    }

    pub fn open_search(&mut self, current: &str) {
        self.search.set_value(current);
        self.search.activate();
    }

    pub fn close_search(&mut self) {
        self.search.deactivate();
    }

    /// Keys while the search box has focus.
    pub fn handle_search_key(&mut self, key: KeyEvent) -> Vec<Action> {
        match self.search.handle_key(key) {
            FilterAction::Changed(text) => vec![Action::SearchInput(text)],
            FilterAction::Confirmed(text) => vec![Action::SearchSubmit(text), Action::CloseSearch],
            FilterAction::Cancelled => vec![Action::CloseSearch],
            FilterAction::None => Vec::new(),
        }
    }

    fn selected_episode<'a>(&self, state: &'a AppState) -> Option<&'a Episode> {
        self.list.selected().and_then(|i| state.page.items.get(i))
    }

    fn render_row(&self, episode: &Episode, width: usize, selected: bool, focused: bool, state: &AppState) -> ListItem<'static> {
        let base = match (selected, focused) {
            (true, true) => style_selected_focused(),
            (true, false) => style_selected(),
            _ => style_default(),
        };

        let playing_marker = if state.is_current(&episode.id) {
            let color = match state.session.status {
                PlayerStatus::Playing => C_PLAYING,
                PlayerStatus::Loading => C_LOADING,
                PlayerStatus::Error => C_ERROR,
                _ => C_SECONDARY,
            };
            Span::styled("▶ ", base.fg(color))
        } else {
            Span::styled("  ", base)
        };
        let fav = if state.prefs.is_favourite(&episode.id) {
            Span::styled("★", base.fg(C_FAVOURITE))
        } else {
            Span::styled(" ", base)
        };
        let heard = if state.prefs.is_listened(&episode.id) {
            Span::styled("✓ ", base.fg(C_LISTENED))
        } else {
            Span::styled("  ", base)
        };

        let date: String = episode.parsed_date.chars().take(10).collect();
        let duration = format_duration(episode.duration_secs());
        let right = format!(" {:>8}  {:<10}", duration, date);
        let title_w = width.saturating_sub(5 + right.width());

        let title_style = if episode.available { base } else { base.fg(C_MUTED) };
        let mut spans = vec![
            playing_marker,
            fav,
            heard,
            Span::styled(truncate(&episode.title, title_w), title_style),
        ];

        let mut room = title_w.saturating_sub(episode.title.width().min(title_w));
        if let Some(category) = episode.category.as_deref().filter(|c| !c.is_empty()) {
            let label = format!(" [{}]", category);
            if label.width() <= room {
                room -= label.width();
                spans.push(Span::styled(label, base.fg(C_CATEGORY)));
            }
        }
        for tag in &episode.tags {
            let label = format!(" #{}", tag);
            if label.width() > room {
                break;
            }
            room -= label.width();
            spans.push(Span::styled(label, base.fg(C_TAG)));
        }
        spans.push(Span::styled(" ".repeat(room), base));
        spans.push(Span::styled(right, base.fg(C_SECONDARY)));
        ListItem::new(Line::from(spans))
    }
}

impl Component for EpisodeList {
    fn id(&self) -> ComponentId {
        ComponentId::Episodes
    }

    fn handle_key(&mut self, key: KeyEvent, state: &AppState) -> Vec<Action> {
        if key.kind == KeyEventKind::Release {
            return vec![];
        }
        match key.code {
            KeyCode::Up | KeyCode::Char('k') => self.list.select_up(1),
            KeyCode::Down | KeyCode::Char('j') => self.list.select_down(1),
            KeyCode::PageUp => self.list.select_up(self.visible_rows),
            KeyCode::PageDown => self.list.select_down(self.visible_rows),
            KeyCode::Home | KeyCode::Char('g') => self.list.select_first(),
            KeyCode::End | KeyCode::Char('G') => self.list.select_last(),
            KeyCode::Char(']') | KeyCode::Right => return vec![Action::NextPage],
            KeyCode::Char('[') | KeyCode::Left => return vec![Action::PrevPage],
            KeyCode::Enter => {
                if let Some(ep) = self.selected_episode(state) {
                    return vec![Action::PlayEpisode(ep.id.clone())];
                }
            }
            KeyCode::Char('f') => {
                if let Some(ep) = self.selected_episode(state) {
                    return vec![Action::ToggleMark(Mark::Favourite, ep.id.clone())];
                }
            }
            KeyCode::Char('l') => {
                if let Some(ep) = self.selected_episode(state) {
                    return vec![Action::ToggleMark(Mark::Listened, ep.id.clone())];
                }
            }
            KeyCode::Char('A') => {
                if let Some(ep) = self.selected_episode(state) {
                    return vec![Action::AddToPlaylist(ep.id.clone())];
                }
            }
            KeyCode::Char('d') => {
                if let Some(ep) = self.selected_episode(state) {
                    return vec![Action::RemoveFromPlaylist(ep.id.clone())];
                }
            }
            _ => {}
        }
        Vec::new()
    }

    fn sync(&mut self, state: &AppState) {
        if state.page.page != self.shown_page {
            self.shown_page = state.page.page;
            self.list.select_first();
        }
        self.list.set_len(state.page.items.len());
    }

    fn draw(&mut self, frame: &mut Frame, area: Rect, focused: bool, state: &AppState) {
        let badge = Badge {
            text: format!(
                "{}/{} · {} episodes",
                state.page.page,
                state.page.total_pages.max(1),
                state.page.total_items
            ),
            color: C_SECONDARY,
        };
        let block = pane_chrome("episodes", Some('1'), focused, Some(badge));
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(1), Constraint::Length(1), Constraint::Min(1)])
            .split(inner);

        self.search.draw(frame, rows[0]);
        frame.render_widget(
            Paragraph::new(Span::styled(filter_summary(state.browser.filters()), style_muted())),
            rows[1],
        );

        let list_area = rows[2];
        if state.page.items.is_empty() {
            let msg = if state.catalog.is_loading() {
                "  loading catalog…".to_string()
            } else if let Some(err) = state.catalog.last_error() {
                format!("  {}", err)
            } else if state.catalog.episodes().is_empty() {
                "  no episodes in catalog".to_string()
            } else {
                "  no episodes match the current filters".to_string()
            };
            frame.render_widget(Paragraph::new(Span::styled(msg, style_muted())), list_area);
            return;
        }

        let height = list_area.height as usize;
        self.visible_rows = height.max(1);
        self.list.ensure_visible(height);
        let width = list_area.width as usize;
        let selected = self.list.selected;
        let items: Vec<ListItem> = self
            .list
            .visible_range(height)
            .filter_map(|i| state.page.items.get(i).map(|ep| (i, ep)))
            .map(|(i, ep)| self.render_row(ep, width, i == selected, focused, state))
            .collect();

        self.list_state.select(Some(self.list.selected_in_view()));
        frame.render_stateful_widget(List::new(items), list_area, &mut self.list_state);
    }
}

/// Cut `s` to at most `width` display columns, marking the cut with `…`.
fn truncate(s: &str, width: usize) -> String {
    if s.width() <= width {
        return s.to_string();
    }
    if width == 0 {
        return String::new();
    }
    let mut out = String::new();
    let mut used = 0;
    for c in s.chars() {
        let w = c.width().unwrap_or(0);
        if used + w + 1 > width {
            break;
        }
        used += w;
        out.push(c);
    }
    out.push('…');
    out
}

/// One-line description of the active filters.
fn filter_summary(filters: &FilterState) -> String {
    let arrow = match filters.sort_direction {
        SortDirection::Ascending => "↑",
        SortDirection::Descending => "↓",
    };
    let mut parts = vec![format!("sort {}{}", filters.sort_key.label(), arrow)];
    if !filters.tags.is_empty() {
        parts.push(format!("tags {}", filters.tags.join("+")));
    }
    if let Some(category) = &filters.category {
        parts.push(format!("category {}", category));
    }
    if filters.favourites_only {
        parts.push("only ★".to_string());
    }
    if filters.listened_only {
        parts.push("only ✓".to_string());
    }
    if filters.hide_favourites {
        parts.push("hide ★".to_string());
    }
    if filters.hide_listened {
        parts.push("hide ✓".to_string());
    }
    if filters.available_only {
        parts.push("available".to_string());
    }
    format!(" {}", parts.join(" · "))
}
