//! Browsing state: the filter inputs plus the current page.
//!
//! Any change to the filters sends the user back to page 1.  The UI's
//! mutual exclusion between "only" and "hide" for the same mark lives here
//! too; the pipeline itself evaluates the four toggles independently.

use chrono::NaiveDate;

use crate::catalog::Episode;
use crate::filters::{FilterState, PersistedFilters, SortDirection, SortKey};
use crate::pipeline::{self, Page};
use crate::prefs::{Mark, Preferences};

#[derive(Debug, Clone, PartialEq)]
pub struct Browser {
    filters: FilterState,
    page: usize,
}

impl Default for Browser {
    fn default() -> Self {
        Self {
            filters: FilterState::default(),
            page: 1,
        }
    }
}

impl Browser {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from the persisted subset of a previous session.
    pub fn restore(persisted: PersistedFilters) -> Self {
        let mut browser = Self::default();
        browser.filters.query = persisted.search_term;
        for tag in persisted.selected_tags {
            if !browser.filters.tags.contains(&tag) {
                browser.filters.tags.push(tag);
            }
        }
        browser.filters.sort_key = persisted.sort_by;
        browser.filters.sort_direction = persisted.sort_order;
        browser
    }

    pub fn persisted(&self) -> PersistedFilters {
        PersistedFilters {
            search_term: self.filters.query.clone(),
            selected_tags: self.filters.tags.clone(),
            sort_by: self.filters.sort_key,
            sort_order: self.filters.sort_direction,
        }
    }

    pub fn filters(&self) -> &FilterState {
        &self.filters
    }

    pub fn page(&self) -> usize {
        self.page
    }

    /// Apply `f` to the filters and reset to the first page.
    fn update(&mut self, f: impl FnOnce(&mut FilterState)) {
        f(&mut self.filters);
        self.page = 1;
    }

    pub fn set_query(&mut self, query: impl Into<String>) {
        let query = query.into();
        self.update(|f| f.query = query);
    }

    /// Add `tag` to the selection, or remove it if already selected.
    pub fn toggle_tag(&mut self, tag: &str) {
        self.update(|f| {
            if let Some(pos) = f.tags.iter().position(|t| t == tag) {
                f.tags.remove(pos);
            } else {
                f.tags.push(tag.to_string());
            }
        });
    }

    pub fn clear_tags(&mut self) {
        self.update(|f| f.tags.clear());
    }

    pub fn set_category(&mut self, category: Option<String>) {
        self.update(|f| f.category = category);
    }

    pub fn set_date_range(&mut self, from: Option<NaiveDate>, to: Option<NaiveDate>) {
        self.update(|f| {
            f.date_from = from;
            f.date_to = to;
        });
    }

    pub fn toggle_available_only(&mut self) {
        self.update(|f| f.available_only = !f.available_only);
    }

    /// Flip "only `mark`", clearing "hide `mark`" when turning it on.
    pub fn toggle_only(&mut self, mark: Mark) {
        self.update(|f| match mark {
            Mark::Favourite => {
                f.favourites_only = !f.favourites_only;
                if f.favourites_only {
                    f.hide_favourites = false;
                }
            }
            Mark::Listened => {
                f.listened_only = !f.listened_only;
                if f.listened_only {
                    f.hide_listened = false;
                }
            }
        });
    }

    /// Flip "hide `mark`", clearing "only `mark`" when turning it on.
    pub fn toggle_hide(&mut self, mark: Mark) {
        self.update(|f| match mark {
            Mark::Favourite => {
                f.hide_favourites = !f.hide_favourites;
                if f.hide_favourites {
                    f.favourites_only = false;
                }
            }
            Mark::Listened => {
                f.hide_listened = !f.hide_listened;
                if f.hide_listened {
                    f.listened_only = false;
                }
            }
        });
    }

    pub fn set_sort(&mut self, key: SortKey, direction: SortDirection) {
        self.update(|f| {
            f.sort_key = key;
            f.sort_direction = direction;
        });
    }

    pub fn cycle_sort_key(&mut self) {
        self.update(|f| f.sort_key = f.sort_key.next());
    }

    pub fn flip_sort_direction(&mut self) {
        self.update(|f| f.sort_direction = f.sort_direction.flip());
    }

    /// Back to defaults.  Sorting is kept.
    pub fn clear_filters(&mut self) {
        self.update(|f| {
            *f = FilterState {
                sort_key: f.sort_key,
                sort_direction: f.sort_direction,
                ..FilterState::default()
            }
        });
    }

    pub fn set_page(&mut self, page: usize) {
        self.page = page.max(1);
    }

    pub fn next_page(&mut self, total_pages: usize) {
        if self.page < total_pages {
            self.page += 1;
        }
    }

    pub fn previous_page(&mut self) {
        if self.page > 1 {
            self.page -= 1;
        }
    }

    /// Run the pipeline for the current page.
    pub fn view<'a>(
        &self,
        episodes: &'a [Episode],
        prefs: &Preferences,
        language: &str,
    ) -> Page<&'a Episode> {
        pipeline::run(episodes, &self.filters, prefs, self.page, language)
    }
}
