//! AppState: read-only data handed to components while drawing and
//! handling keys.  Only the App event loop writes to it.

use guardia_core::browse::Browser;
use guardia_core::catalog::{CatalogStore, Episode};
use guardia_core::player::{PlaybackSession, Playlist};
use guardia_core::prefs::Preferences;

use crate::action::ComponentId;
use crate::widgets::status_bar::InputMode;

/// The current page of the episode list, detached from the catalog.
#[derive(Debug, Clone, Default)]
pub struct PageSnapshot {
    pub items: Vec<Episode>,
    pub page: usize,
    pub total_items: usize,
    pub total_pages: usize,
}

pub struct AppState {
    pub catalog: CatalogStore,
    pub prefs: Preferences,
    pub browser: Browser,
    pub page: PageSnapshot,
    pub tags: Vec<String>,

    pub session: PlaybackSession,
    pub playlist: Playlist,

    pub mode: InputMode,
    pub focus: ComponentId,
    /// Latest WARN/ERROR line from the log layer.
    pub last_log: Option<String>,
    pub tip: Option<&'static str>,
}

impl AppState {
    pub fn new(browser: Browser) -> Self {
        Self {
            catalog: CatalogStore::new(),
            prefs: Preferences::default(),
            browser,
            page: PageSnapshot::default(),
            tags: Vec::new(),
            session: PlaybackSession::default(),
            playlist: Playlist::default(),
            mode: InputMode::Normal,
            focus: ComponentId::Episodes,
            last_log: None,
            tip: None,
        }
    }

    /// Re-run the pipeline for the current browser state.
    pub fn refresh_page(&mut self) {
        let view = self.browser.view(
            self.catalog.episodes(),
            &self.prefs,
            &self.catalog.config().language,
        );
        self.page = PageSnapshot {
            items: view.items.into_iter().cloned().collect(),
            page: view.page,
            total_items: view.total_items,
            total_pages: view.total_pages,
        };
    }

    pub fn is_current(&self, id: &str) -> bool {
        self.session.current_id() == Some(id)
    }
}
