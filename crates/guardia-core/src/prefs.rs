//! Favourite / listened marks, persisted in full on every mutation.

use std::collections::BTreeSet;

use tracing::{debug, info, warn};

use crate::storage::{KeyValueStore, FAVOURITES_KEY, INSTALL_HINT_KEY, LISTENED_KEY};

/// The two per-user mark dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mark {
    Favourite,
    Listened,
}

impl Mark {
    pub fn storage_key(self) -> &'static str {
        match self {
            Self::Favourite => FAVOURITES_KEY,
            Self::Listened => LISTENED_KEY,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Favourite => "favourites",
            Self::Listened => "listened",
        }
    }
}

/// Read-only view of both sets, consumed by the filter pipeline.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Preferences {
    pub favourites: BTreeSet<String>,
    pub listened: BTreeSet<String>,
}

impl Preferences {
    pub fn is_favourite(&self, id: &str) -> bool {
        self.favourites.contains(id)
    }

    pub fn is_listened(&self, id: &str) -> bool {
        self.listened.contains(id)
    }

    fn set(&self, mark: Mark) -> &BTreeSet<String> {
        match mark {
            Mark::Favourite => &self.favourites,
            Mark::Listened => &self.listened,
        }
    }

    fn set_mut(&mut self, mark: Mark) -> &mut BTreeSet<String> {
        match mark {
            Mark::Favourite => &mut self.favourites,
            Mark::Listened => &mut self.listened,
        }
    }
}

pub struct PreferenceStore<S: KeyValueStore> {
    prefs: Preferences,
    store: S,
}

impl<S: KeyValueStore> PreferenceStore<S> {
    /// Load both sets from `store`.  Missing or corrupt data yields empty sets.
    pub fn load(store: S) -> Self {
        let prefs = Preferences {
            favourites: load_set(&store, Mark::Favourite),
            listened: load_set(&store, Mark::Listened),
        };
        info!(
            "[prefs] loaded favourites={} listened={}",
            prefs.favourites.len(),
            prefs.listened.len()
        );
        Self { prefs, store }
    }

    pub fn preferences(&self) -> &Preferences {
        &self.prefs
    }

    pub fn favourites(&self) -> &BTreeSet<String> {
        &self.prefs.favourites
    }

    pub fn listened(&self) -> &BTreeSet<String> {
        &self.prefs.listened
    }

    pub fn is_favourite(&self, id: &str) -> bool {
        self.prefs.is_favourite(id)
    }

    pub fn is_listened(&self, id: &str) -> bool {
        self.prefs.is_listened(id)
    }

    pub fn toggle_favourite(&mut self, id: &str) -> bool {
        self.toggle(Mark::Favourite, id)
    }

    pub fn toggle_listened(&mut self, id: &str) -> bool {
        self.toggle(Mark::Listened, id)
    }

    /// Flip membership of `id` in `mark`'s set.  Returns the new membership.
    pub fn toggle(&mut self, mark: Mark, id: &str) -> bool {
        let set = self.prefs.set_mut(mark);
        let member = if set.remove(id) {
            debug!("[prefs] removed {} from {}", id, mark.label());
            false
        } else {
            set.insert(id.to_string());
            debug!("[prefs] added {} to {}", id, mark.label());
            true
        };
        self.persist(mark);
        member
    }

    pub fn clear_all_favourites(&mut self) {
        self.clear(Mark::Favourite);
    }

    pub fn clear_all_listened(&mut self) {
        self.clear(Mark::Listened);
    }

    pub fn clear(&mut self, mark: Mark) {
        self.prefs.set_mut(mark).clear();
        info!("[prefs] cleared all {}", mark.label());
        self.persist(mark);
    }

    pub fn storage(&self) -> &S {
        &self.store
    }

    pub fn storage_mut(&mut self) -> &mut S {
        &mut self.store
    }

    /// Write the whole set for `mark`.  Failures are logged; in-memory state
    /// is kept either way.
    fn persist(&mut self, mark: Mark) {
        let ids: Vec<&String> = self.prefs.set(mark).iter().collect();
        let json = match serde_json::to_string(&ids) {
            Ok(json) => json,
            Err(e) => {
                warn!("[prefs] failed to encode {}: {}", mark.label(), e);
                return;
            }
        };
        if let Err(e) = self.store.set(mark.storage_key(), &json) {
            warn!("[prefs] failed to save {}: {}", mark.label(), e);
        }
    }
}

fn load_set<S: KeyValueStore>(store: &S, mark: Mark) -> BTreeSet<String> {
    let raw = match store.get(mark.storage_key()) {
        Ok(Some(raw)) => raw,
        Ok(None) => return BTreeSet::new(),
        Err(e) => {
            warn!("[prefs] failed to read {}: {}", mark.label(), e);
            return BTreeSet::new();
        }
    };
    match serde_json::from_str::<Vec<String>>(&raw) {
        Ok(ids) => ids.into_iter().collect(),
        Err(e) => {
            warn!("[prefs] corrupt {} data, starting empty: {}", mark.label(), e);
            BTreeSet::new()
        }
    }
}

/// One-time dismissal flag for the first-run tip.
pub struct InstallHint;

impl InstallHint {
    pub fn is_dismissed<S: KeyValueStore>(store: &S) -> bool {
        matches!(store.get(INSTALL_HINT_KEY), Ok(Some(v)) if v == "true")
    }

    pub fn dismiss<S: KeyValueStore>(store: &mut S) {
        if let Err(e) = store.set(INSTALL_HINT_KEY, "true") {
            warn!("[prefs] failed to save hint dismissal: {}", e);
        }
    }
}
