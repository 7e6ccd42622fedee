//! Filter → sort → paginate.
//!
//! Every function here is pure; the whole chain is recomputed from the full
//! episode list whenever an input changes.

use std::cmp::Ordering;

use crate::catalog::Episode;
use crate::collate;
use crate::filters::{FilterState, SortDirection, SortKey};
use crate::prefs::Preferences;

pub const PAGE_SIZE: usize = 24;

/// One window of a result list.
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    pub items: Vec<T>,
    /// 1-based page index as requested (never clamped).
    pub page: usize,
    pub page_size: usize,
    pub total_items: usize,
    pub total_pages: usize,
}

impl<T> Page<T> {
    pub fn has_previous(&self) -> bool {
        self.page > 1
    }

    pub fn has_next(&self) -> bool {
        self.page < self.total_pages
    }

    /// 1-based position of the first item on this page, 0 when empty.
    pub fn first_index(&self) -> usize {
        if self.items.is_empty() {
            0
        } else {
            (self.page - 1) * self.page_size + 1
        }
    }
}

fn matches_query(episode: &Episode, needle: &str) -> bool {
    episode.title.to_lowercase().contains(needle)
        || episode.description.to_lowercase().contains(needle)
        || episode.tags.iter().any(|t| t.to_lowercase().contains(needle))
        || episode
            .category
            .as_deref()
            .is_some_and(|c| c.to_lowercase().contains(needle))
}

/// True when `episode` passes every active predicate in `filters`.
pub fn matches(episode: &Episode, filters: &FilterState, prefs: &Preferences) -> bool {
    let needle = filters.query.to_lowercase();
    matches_with(episode, filters, prefs, &needle)
}

fn matches_with(episode: &Episode, filters: &FilterState, prefs: &Preferences, needle: &str) -> bool {
    if !needle.is_empty() && !matches_query(episode, needle) {
        return false;
    }
    if !filters.tags.iter().all(|t| episode.has_tag(t)) {
        return false;
    }
    if let Some(category) = &filters.category {
        if episode.category.as_deref() != Some(category.as_str()) {
            return false;
        }
    }
    if filters.available_only && !episode.available {
        return false;
    }
    if filters.date_from.is_some() || filters.date_to.is_some() {
        let Some(date) = episode.published_at().map(|d| d.date_naive()) else {
            return false;
        };
        if filters.date_from.is_some_and(|from| date < from) {
            return false;
        }
        if filters.date_to.is_some_and(|to| date > to) {
            return false;
        }
    }

    let favourite = prefs.is_favourite(&episode.id);
    let listened = prefs.is_listened(&episode.id);
    if filters.favourites_only && !favourite {
        return false;
    }
    if filters.listened_only && !listened {
        return false;
    }
    if filters.hide_favourites && favourite {
        return false;
    }
    if filters.hide_listened && listened {
        return false;
    }
    true
}

/// Keep the episodes that pass every predicate, in catalog order.
pub fn filter_episodes<'a>(
    episodes: &'a [Episode],
    filters: &FilterState,
    prefs: &Preferences,
) -> Vec<&'a Episode> {
    let needle = filters.query.to_lowercase();
    episodes
        .iter()
        .filter(|e| matches_with(e, filters, prefs, &needle))
        .collect()
}

fn compare_by(a: &Episode, b: &Episode, key: SortKey, language: &str) -> Ordering {
    match key {
        SortKey::Title => collate::compare(&a.title, &b.title, language),
        // Undated episodes count as the oldest.
        SortKey::Date => a.published_at().cmp(&b.published_at()),
        SortKey::Duration => a.duration_secs().cmp(&b.duration_secs()),
    }
}

/// Stable sort by `key` in `direction`.
///
/// Equal keys fall back to ascending id, so re-sorting by an earlier key
/// always reproduces the earlier order.
pub fn sort_episodes(items: &mut [&Episode], key: SortKey, direction: SortDirection, language: &str) {
    items.sort_by(|a, b| {
        let ord = compare_by(a, b, key, language);
        let ord = match direction {
            SortDirection::Ascending => ord,
            SortDirection::Descending => ord.reverse(),
        };
        ord.then_with(|| a.id.cmp(&b.id))
    });
}

/// Cut one 1-based page out of `items`.  Out-of-range pages come back empty.
pub fn paginate<T: Clone>(items: &[T], page: usize, page_size: usize) -> Page<T> {
    let total_items = items.len();
    let total_pages = if page_size == 0 {
        0
    } else {
        total_items.div_ceil(page_size)
    };
    let start = page.saturating_sub(1).saturating_mul(page_size);
    let window = if page == 0 || start >= total_items {
        Vec::new()
    } else {
        let end = (start + page_size).min(total_items);
        items[start..end].to_vec()
    };
    Page {
        items: window,
        page,
        page_size,
        total_items,
        total_pages,
    }
}

/// The full chain at the fixed page size.
pub fn run<'a>(
    episodes: &'a [Episode],
    filters: &FilterState,
    prefs: &Preferences,
    page: usize,
    language: &str,
) -> Page<&'a Episode> {
    let mut matching = filter_episodes(episodes, filters, prefs);
    sort_episodes(&mut matching, filters.sort_key, filters.sort_direction, language);
    paginate(&matching, page, PAGE_SIZE)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn ep(id: &str, title: &str, duration: &str, date: &str) -> Episode {
        Episode {
            id: id.to_string(),
            title: title.to_string(),
            duration: duration.to_string(),
            parsed_date: date.to_string(),
            available: true,
            ..Default::default()
        }
    }

    fn ids(items: &[&Episode]) -> Vec<String> {
        items.iter().map(|e| e.id.clone()).collect()
    }

    #[test]
    fn test_query_matches_title_description_tags_category() {
        let mut a = ep("a", "La Guerra de Successió", "", "");
        a.tags = vec!["Borbons".to_string()];
        let mut b = ep("b", "Jaume I", "", "");
        b.description = "El rei conqueridor".to_string();
        let mut c = ep("c", "Montserrat", "", "");
        c.category = Some("Edat Mitjana".to_string());
        let all = vec![a, b, c];
        let prefs = Preferences::default();

        let mut filters = FilterState {
            query: "guerra".to_string(),
            ..Default::default()
        };
        assert_eq!(ids(&filter_episodes(&all, &filters, &prefs)), vec!["a"]);

        filters.query = "CONQUERIDOR".to_string();
        assert_eq!(ids(&filter_episodes(&all, &filters, &prefs)), vec!["b"]);

        filters.query = "borbons".to_string();
        assert_eq!(ids(&filter_episodes(&all, &filters, &prefs)), vec!["a"]);

        filters.query = "mitjana".to_string();
        assert_eq!(ids(&filter_episodes(&all, &filters, &prefs)), vec!["c"]);

        // Whitespace is part of the term, not an empty query
        filters.query = "   ".to_string();
        assert!(filter_episodes(&all, &filters, &prefs).is_empty());
    }

    #[test]
    fn test_date_range_is_inclusive() {
        let all = vec![
            ep("a", "A", "", "2020-01-01"),
            ep("b", "B", "", "2020-06-15T10:00:00Z"),
            ep("c", "C", "", "2021-01-01"),
            ep("d", "D", "", ""),
        ];
        let filters = FilterState {
            date_from: NaiveDate::from_ymd_opt(2020, 1, 1),
            date_to: NaiveDate::from_ymd_opt(2020, 6, 15),
            ..Default::default()
        };
        let got = filter_episodes(&all, &filters, &Preferences::default());
        assert_eq!(ids(&got), vec!["a", "b"]);
    }

    #[test]
    fn test_available_and_category() {
        let mut a = ep("a", "A", "", "");
        a.available = false;
        a.category = Some("Modern".to_string());
        let mut b = ep("b", "B", "", "");
        b.category = Some("Modern".to_string());
        let c = ep("c", "C", "", "");
        let all = vec![a, b, c];

        let filters = FilterState {
            available_only: true,
            category: Some("Modern".to_string()),
            ..Default::default()
        };
        assert_eq!(
            ids(&filter_episodes(&all, &filters, &Preferences::default())),
            vec!["b"]
        );
    }

    #[test]
    fn test_sort_by_date_descending_default() {
        let all = vec![
            ep("old", "A", "", "2019-01-01"),
            ep("new", "B", "", "2022-01-01"),
            ep("none", "C", "", ""),
        ];
        let page = run(&all, &FilterState::default(), &Preferences::default(), 1, "ca");
        assert_eq!(ids(&page.items), vec!["new", "old", "none"]);
    }

    #[test]
    fn test_sort_by_duration_and_title() {
        let all = vec![
            ep("a", "Zona", "1:00:00", ""),
            ep("b", "Àvila", "45 min", ""),
            ep("c", "Barcelona", "50:00", ""),
        ];
        let mut items: Vec<&Episode> = all.iter().collect();
        sort_episodes(&mut items, SortKey::Duration, SortDirection::Ascending, "ca");
        assert_eq!(ids(&items), vec!["b", "c", "a"]);

        sort_episodes(&mut items, SortKey::Title, SortDirection::Ascending, "ca");
        assert_eq!(ids(&items), vec!["b", "c", "a"]);

        sort_episodes(&mut items, SortKey::Title, SortDirection::Descending, "ca");
        assert_eq!(ids(&items), vec!["a", "c", "b"]);
    }

    #[test]
    fn test_paginate_windows() {
        let items: Vec<u32> = (1..=50).collect();
        let p1 = paginate(&items, 1, PAGE_SIZE);
        assert_eq!(p1.items, (1..=24).collect::<Vec<_>>());
        assert_eq!(p1.total_pages, 3);
        assert!(!p1.has_previous());
        assert!(p1.has_next());

        let p3 = paginate(&items, 3, PAGE_SIZE);
        assert_eq!(p3.items, vec![49, 50]);
        assert_eq!(p3.first_index(), 49);
        assert!(!p3.has_next());

        let p9 = paginate(&items, 9, PAGE_SIZE);
        assert!(p9.items.is_empty());
        assert_eq!(p9.page, 9);
        assert_eq!(p9.total_pages, 3);

        let empty: Vec<u32> = Vec::new();
        let p = paginate(&empty, 1, PAGE_SIZE);
        assert_eq!(p.total_pages, 0);
        assert_eq!(p.first_index(), 0);
    }
}
