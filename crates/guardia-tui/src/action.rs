//! Action enum: every user intent the components can raise.

use guardia_core::prefs::Mark;

/// Focusable panes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ComponentId {
    Episodes,
    Tags,
    Playlist,
}

impl ComponentId {
    pub fn next(self) -> Self {
        match self {
            Self::Episodes => Self::Tags,
            Self::Tags => Self::Playlist,
            Self::Playlist => Self::Episodes,
        }
    }

    pub fn prev(self) -> Self {
        match self {
            Self::Episodes => Self::Playlist,
            Self::Tags => Self::Episodes,
            Self::Playlist => Self::Tags,
        }
    }
}

/// Components produce Actions; the App applies them to the stores and the
/// playback controller.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    // ── Playback ─────────────────────────────────────────────────────────────
    PlayEpisode(String),
    PlayIndex(usize),
    TogglePause,
    Stop,
    Next,
    Prev,
    Volume(f64),
    ToggleMute,
    Rate(f64),
    SeekRelative(f64),

    // ── Playlist ─────────────────────────────────────────────────────────────
    AddToPlaylist(String),
    RemoveFromPlaylist(String),
    ClearPlaylist,

    // ── Marks ────────────────────────────────────────────────────────────────
    ToggleMark(Mark, String),

    // ── Browsing ─────────────────────────────────────────────────────────────
    /// Raw search box text; applied after the debounce window.
    SearchInput(String),
    /// Apply the search text immediately.
    SearchSubmit(String),
    ToggleTag(String),
    ClearTags,
    ToggleOnly(Mark),
    ToggleHide(Mark),
    ToggleAvailableOnly,
    CycleSort,
    FlipSortDirection,
    ClearFilters,
    NextPage,
    PrevPage,

    // ── Focus / modes ────────────────────────────────────────────────────────
    OpenSearch,
    CloseSearch,
    FocusNext,
    FocusPrev,
    Focus(ComponentId),
    DismissTip,

    // ── System ───────────────────────────────────────────────────────────────
    ReloadCatalog,
    Quit,
}
