//! Filter state and its persisted subset.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::storage::{KeyValueStore, SEARCH_FILTERS_KEY};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortKey {
    Title,
    #[default]
    Date,
    Duration,
}

impl SortKey {
    pub fn next(self) -> Self {
        match self {
            Self::Date => Self::Title,
            Self::Title => Self::Duration,
            Self::Duration => Self::Date,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Title => "title",
            Self::Date => "date",
            Self::Duration => "duration",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SortDirection {
    #[serde(rename = "asc")]
    Ascending,
    #[default]
    #[serde(rename = "desc")]
    Descending,
}

impl SortDirection {
    pub fn flip(self) -> Self {
        match self {
            Self::Ascending => Self::Descending,
            Self::Descending => Self::Ascending,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Ascending => "asc",
            Self::Descending => "desc",
        }
    }
}

/// Everything that narrows or orders the displayed episodes.
///
/// The four mark toggles are independent predicates here; keeping "only" and
/// "hide" for the same mark mutually exclusive is the browser's job.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FilterState {
    pub query: String,
    /// Selected tags; an episode must carry every one of them.
    pub tags: Vec<String>,
    pub category: Option<String>,
    pub date_from: Option<NaiveDate>,
    pub date_to: Option<NaiveDate>,
    pub available_only: bool,
    pub favourites_only: bool,
    pub listened_only: bool,
    pub hide_favourites: bool,
    pub hide_listened: bool,
    pub sort_key: SortKey,
    pub sort_direction: SortDirection,
}

impl FilterState {
    /// True when any predicate (not sort) is active.
    pub fn is_filtering(&self) -> bool {
        !self.query.is_empty()
            || !self.tags.is_empty()
            || self.category.is_some()
            || self.date_from.is_some()
            || self.date_to.is_some()
            || self.available_only
            || self.favourites_only
            || self.listened_only
            || self.hide_favourites
            || self.hide_listened
    }
}

/// The part of the filter state that survives restarts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PersistedFilters {
    pub search_term: String,
    pub selected_tags: Vec<String>,
    pub sort_by: SortKey,
    pub sort_order: SortDirection,
}

impl Default for PersistedFilters {
    fn default() -> Self {
        Self {
            search_term: String::new(),
            selected_tags: Vec::new(),
            sort_by: SortKey::Date,
            sort_order: SortDirection::Descending,
        }
    }
}

impl PersistedFilters {
    pub fn load<S: KeyValueStore>(store: &S) -> Self {
        match store.get(SEARCH_FILTERS_KEY) {
            Ok(Some(raw)) => serde_json::from_str(&raw).unwrap_or_else(|e| {
                warn!("[filters] corrupt persisted filters, using defaults: {}", e);
                Self::default()
            }),
            Ok(None) => Self::default(),
            Err(e) => {
                warn!("[filters] failed to read persisted filters: {}", e);
                Self::default()
            }
        }
    }

    pub fn save<S: KeyValueStore>(&self, store: &mut S) {
        let result = serde_json::to_string(self)
            .map_err(crate::error::StorageError::from)
            .and_then(|json| store.set(SEARCH_FILTERS_KEY, &json));
        if let Err(e) = result {
            warn!("[filters] failed to save filters: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;

    #[test]
    fn test_defaults_sort_by_date_descending() {
        let state = FilterState::default();
        assert_eq!(state.sort_key, SortKey::Date);
        assert_eq!(state.sort_direction, SortDirection::Descending);
        assert!(!state.is_filtering());
    }

    #[test]
    fn test_persisted_filters_wire_format() {
        let filters = PersistedFilters {
            search_term: "jaume".to_string(),
            selected_tags: vec!["rei".to_string()],
            sort_by: SortKey::Title,
            sort_order: SortDirection::Ascending,
        };
        let json = serde_json::to_string(&filters).unwrap();
        assert_eq!(
            json,
            r#"{"searchTerm":"jaume","selectedTags":["rei"],"sortBy":"title","sortOrder":"asc"}"#
        );
    }

    #[test]
    fn test_persisted_filters_load_save() {
        let mut store = MemoryStore::new();
        assert_eq!(PersistedFilters::load(&store), PersistedFilters::default());

        let filters = PersistedFilters {
            search_term: "guerra".to_string(),
            ..Default::default()
        };
        filters.save(&mut store);
        assert_eq!(PersistedFilters::load(&store), filters);

        store.set(SEARCH_FILTERS_KEY, "[1,2]").unwrap();
        assert_eq!(PersistedFilters::load(&store), PersistedFilters::default());
    }

    #[test]
    fn test_sort_key_cycles() {
        let mut k = SortKey::Date;
        for _ in 0..3 {
            k = k.next();
        }
        assert_eq!(k, SortKey::Date);
    }
}
