//! App: component-based event loop.
//!
//! - `App` owns the components, the preference store, the playback
//!   controller and `AppState` (read-only for components).
//! - A `tokio::mpsc` channel carries `AppMessage`s in from background tasks
//!   (terminal input, log lines, catalog loads).
//! - Media events and debounced search text arrive on their own channels.
//! - Components return `Vec<Action>`; `apply` performs each one.

use std::io;
use std::time::Duration;

use guardia_core::browse::Browser;
use guardia_core::catalog::{load_catalog, Catalog, CatalogSource};
use guardia_core::debounce::Debouncer;
use guardia_core::error::CatalogError;
use guardia_core::filters::PersistedFilters;
use guardia_core::media::{MediaEvent, MediaSession};
use guardia_core::player::PlaybackController;
use guardia_core::prefs::{InstallHint, Mark, PreferenceStore};
use guardia_core::storage::KeyValueStore;
use ratatui::crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout},
    Frame, Terminal,
};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::{
    action::{Action, ComponentId},
    app_state::AppState,
    component::Component,
    components::{
        episode_list::EpisodeList, now_playing, playlist_panel::PlaylistPanel,
        tag_panel::TagPanel,
    },
    widgets::status_bar::{self, InputMode},
};

const VOLUME_STEP: f64 = 0.05;
const RATE_STEP: f64 = 0.25;
const SEEK_STEP: f64 = 30.0;
const FIRST_RUN_TIP: &str =
    "/ searches, Enter plays, A queues, f/l mark favourite/listened. Esc hides this tip.";

// ── Internal event bus ────────────────────────────────────────────────────────

enum AppMessage {
    Event(Event),
    Log(String),
    CatalogLoaded(Result<Catalog, CatalogError>),
}

// ── App ───────────────────────────────────────────────────────────────────────

pub struct App<S: KeyValueStore, M: MediaSession> {
    pub state: AppState,

    prefs: PreferenceStore<S>,
    player: PlaybackController<M>,
    media_rx: mpsc::UnboundedReceiver<MediaEvent>,
    search: Debouncer<String>,
    search_rx: mpsc::UnboundedReceiver<String>,
    source: CatalogSource,
    saved_filters: PersistedFilters,
    last_player_error: Option<String>,

    episodes: EpisodeList,
    tags: TagPanel,
    playlist: PlaylistPanel,

    tx: Option<mpsc::Sender<AppMessage>>,
    should_quit: bool,
}

impl<S: KeyValueStore, M: MediaSession> App<S, M> {
    pub fn new(prefs: PreferenceStore<S>, media: M, source: CatalogSource, debounce: Duration) -> Self {
        let saved_filters = PersistedFilters::load(prefs.storage());
        let mut state = AppState::new(Browser::restore(saved_filters.clone()));
        state.prefs = prefs.preferences().clone();
        if !InstallHint::is_dismissed(prefs.storage()) {
            state.tip = Some(FIRST_RUN_TIP);
        }
        state.refresh_page();

        let (player, media_rx) = PlaybackController::new(media, state.catalog.config().clone());
        let (search_tx, search_rx) = mpsc::unbounded_channel();

        let mut app = Self {
            state,
            prefs,
            player,
            media_rx,
            search: Debouncer::new(debounce, search_tx),
            search_rx,
            source,
            saved_filters,
            last_player_error: None,
            episodes: EpisodeList::new(),
            tags: TagPanel::new(),
            playlist: PlaylistPanel::new(),
            tx: None,
            should_quit: false,
        };
        app.sync_player();
        app.sync_components();
        app
    }

    pub fn player_mut(&mut self) -> &mut PlaybackController<M> {
        &mut self.player
    }

    pub async fn run(mut self, mut log_rx: mpsc::UnboundedReceiver<String>) -> anyhow::Result<()> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen)?;
        let mut terminal = Terminal::new(CrosstermBackend::new(stdout))?;

        let (tx, rx) = mpsc::channel::<AppMessage>(1024);
        self.tx = Some(tx.clone());

        // ── Background task: keyboard events ──────────────────────────────────
        let event_tx = tx.clone();
        tokio::task::spawn_blocking(move || loop {
            match event::read() {
                Ok(ev) => {
                    if event_tx.blocking_send(AppMessage::Event(ev)).is_err() {
                        break;
                    }
                }
                Err(_) => break,
            }
        });

        // ── Background task: WARN/ERROR lines for the status bar ─────────────
        let log_tx = tx.clone();
        tokio::spawn(async move {
            while let Some(line) = log_rx.recv().await {
                if log_tx.send(AppMessage::Log(line)).await.is_err() {
                    break;
                }
            }
        });

        self.reload_catalog();

        let result = self.event_loop(&mut terminal, rx).await;

        // ── Teardown ──────────────────────────────────────────────────────────
        self.search.cancel();
        disable_raw_mode()?;
        execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
        terminal.show_cursor()?;
        result
    }

    async fn event_loop(
        &mut self,
        terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
        mut rx: mpsc::Receiver<AppMessage>,
    ) -> anyhow::Result<()> {
        // Redraw tick so the progress bar moves between time updates
        let mut ui_tick = tokio::time::interval(Duration::from_millis(250));
        ui_tick.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

        let mut needs_redraw = true;
        loop {
            if needs_redraw {
                terminal.draw(|f| self.draw(f))?;
            }
            needs_redraw = false;

            if self.should_quit {
                break;
            }

            tokio::select! {
                Some(msg) = rx.recv() => {
                    needs_redraw = self.handle_message(msg);
                }

                Some(event) = self.media_rx.recv() => {
                    self.player.handle_media_event(event);
                    self.player.drain_events(&mut self.media_rx);
                    self.sync_player();
                    needs_redraw = true;
                }

                Some(query) = self.search_rx.recv() => {
                    self.apply_search(query);
                    needs_redraw = true;
                }

                _ = ui_tick.tick() => {
                    needs_redraw = self.state.session.is_playing();
                }
            }
        }
        Ok(())
    }

    fn handle_message(&mut self, msg: AppMessage) -> bool {
        match msg {
            AppMessage::Event(Event::Key(key)) => {
                if key.kind == KeyEventKind::Release {
                    return false;
                }
                for action in self.handle_key(key) {
                    self.apply(action);
                }
                true
            }
            AppMessage::Event(Event::Resize(..)) => true,
            AppMessage::Event(_) => false,
            AppMessage::Log(line) => {
                self.state.last_log = Some(line);
                true
            }
            AppMessage::CatalogLoaded(result) => {
                self.on_catalog_loaded(result);
                true
            }
        }
    }

    // ── Keys ──────────────────────────────────────────────────────────────────

    fn handle_key(&mut self, key: KeyEvent) -> Vec<Action> {
        if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
            return vec![Action::Quit];
        }

        if self.state.mode == InputMode::Search {
            return match key.code {
                KeyCode::Tab => vec![Action::CloseSearch, Action::FocusNext],
                KeyCode::BackTab => vec![Action::CloseSearch, Action::FocusPrev],
                _ => self.episodes.handle_search_key(key),
            };
        }

        let global = match key.code {
            KeyCode::Char('q') => Some(Action::Quit),
            KeyCode::Tab => Some(Action::FocusNext),
            KeyCode::BackTab => Some(Action::FocusPrev),
            KeyCode::Char('1') => Some(Action::Focus(ComponentId::Episodes)),
            KeyCode::Char('2') | KeyCode::Char('t') => Some(Action::Focus(ComponentId::Tags)),
            KeyCode::Char('3') => Some(Action::Focus(ComponentId::Playlist)),
            KeyCode::Char('/') => Some(Action::OpenSearch),
            KeyCode::Esc if self.state.tip.is_some() => Some(Action::DismissTip),

            // Playback
            KeyCode::Char(' ') => Some(Action::TogglePause),
            KeyCode::Char('x') => Some(Action::Stop),
            KeyCode::Char('n') => Some(Action::Next),
            KeyCode::Char('p') => Some(Action::Prev),
            KeyCode::Char('+') | KeyCode::Char('=') => Some(Action::Volume(VOLUME_STEP)),
            KeyCode::Char('-') => Some(Action::Volume(-VOLUME_STEP)),
            KeyCode::Char('m') => Some(Action::ToggleMute),
            KeyCode::Char('<') => Some(Action::Rate(-RATE_STEP)),
            KeyCode::Char('>') => Some(Action::Rate(RATE_STEP)),
            KeyCode::Char(',') => Some(Action::SeekRelative(-SEEK_STEP)),
            KeyCode::Char('.') => Some(Action::SeekRelative(SEEK_STEP)),
            KeyCode::Char('C') => Some(Action::ClearPlaylist),

            // Filters
            KeyCode::Char('F') => Some(Action::ToggleOnly(Mark::Favourite)),
            KeyCode::Char('L') => Some(Action::ToggleOnly(Mark::Listened)),
            KeyCode::Char('h') => Some(Action::ToggleHide(Mark::Favourite)),
            KeyCode::Char('H') => Some(Action::ToggleHide(Mark::Listened)),
            KeyCode::Char('a') => Some(Action::ToggleAvailableOnly),
            KeyCode::Char('s') => Some(Action::CycleSort),
            KeyCode::Char('S') => Some(Action::FlipSortDirection),
            KeyCode::Char('c') => Some(Action::ClearFilters),
            KeyCode::Char('R') => Some(Action::ReloadCatalog),
            _ => None,
        };
        if let Some(action) = global {
            return vec![action];
        }

        let state = &self.state;
        match state.focus {
            ComponentId::Episodes => self.episodes.handle_key(key, state),
            ComponentId::Tags => self.tags.handle_key(key, state),
            ComponentId::Playlist => self.playlist.handle_key(key, state),
        }
    }

    // ── Actions ───────────────────────────────────────────────────────────────

    fn apply(&mut self, action: Action) {
        debug!("apply: {:?}", action);
        match action {
            // ── Playback ──────────────────────────────────────────────────────
            Action::PlayEpisode(id) => match self.state.catalog.episode_by_id(&id).cloned() {
                Some(episode) => self.player.play(Some(&episode)),
                None => warn!("[app] play requested for unknown episode {}", id),
            },
            Action::PlayIndex(index) => {
                self.player.play_index(index);
            }
            Action::TogglePause => self.player.toggle_pause(),
            Action::Stop => self.player.stop(),
            Action::Next => {
                if !self.player.play_next() {
                    debug!("[app] end of playlist");
                }
            }
            Action::Prev => {
                self.player.play_previous();
            }
            Action::Volume(delta) => {
                let volume = self.player.session().volume + delta;
                self.player.set_volume(volume);
            }
            Action::ToggleMute => self.player.toggle_mute(),
            Action::Rate(delta) => {
                let rate = (self.player.session().playback_rate + delta).clamp(0.25, 4.0);
                self.player.set_playback_rate(rate);
            }
            Action::SeekRelative(delta) => self.player.seek_relative(delta),

            // ── Playlist ──────────────────────────────────────────────────────
            Action::AddToPlaylist(id) => {
                if let Some(episode) = self.state.catalog.episode_by_id(&id).cloned() {
                    if !self.player.add_to_playlist(&episode) {
                        debug!("[app] {} already queued", id);
                    }
                }
            }
            Action::RemoveFromPlaylist(id) => self.player.remove_from_playlist(&id),
            Action::ClearPlaylist => self.player.clear_playlist(),

            // ── Marks ─────────────────────────────────────────────────────────
            Action::ToggleMark(mark, id) => {
                let now = self.prefs.toggle(mark, &id);
                debug!("[app] {} {} → {}", mark.label(), id, now);
                self.state.prefs = self.prefs.preferences().clone();
                self.state.refresh_page();
            }

            // ── Browsing ──────────────────────────────────────────────────────
            Action::SearchInput(text) => self.search.push(text),
            Action::SearchSubmit(text) => self.search.flush_now(text),
            Action::ToggleTag(tag) => self.browse(|b| b.toggle_tag(&tag)),
            Action::ClearTags => self.browse(Browser::clear_tags),
            Action::ToggleOnly(mark) => self.browse(|b| b.toggle_only(mark)),
            Action::ToggleHide(mark) => self.browse(|b| b.toggle_hide(mark)),
            Action::ToggleAvailableOnly => self.browse(Browser::toggle_available_only),
            Action::CycleSort => self.browse(Browser::cycle_sort_key),
            Action::FlipSortDirection => self.browse(Browser::flip_sort_direction),
            Action::ClearFilters => {
                self.search.cancel();
                self.browse(Browser::clear_filters);
            }
            Action::NextPage => {
                let total = self.state.page.total_pages;
                self.browse(|b| b.next_page(total));
            }
            Action::PrevPage => self.browse(Browser::previous_page),

            // ── Focus / modes ─────────────────────────────────────────────────
            Action::OpenSearch => {
                self.state.mode = InputMode::Search;
                self.state.focus = ComponentId::Episodes;
                let query = self.state.browser.filters().query.clone();
                self.episodes.open_search(&query);
            }
            Action::CloseSearch => {
                self.state.mode = InputMode::Normal;
                self.episodes.close_search();
            }
            Action::FocusNext => self.state.focus = self.state.focus.next(),
            Action::FocusPrev => self.state.focus = self.state.focus.prev(),
            Action::Focus(id) => self.state.focus = id,
            Action::DismissTip => {
                self.state.tip = None;
                InstallHint::dismiss(self.prefs.storage_mut());
            }

            // ── System ────────────────────────────────────────────────────────
            Action::ReloadCatalog => self.reload_catalog(),
            Action::Quit => self.should_quit = true,
        }
        self.player.drain_events(&mut self.media_rx);
        self.sync_player();
        self.sync_components();
    }

    /// Run a browser mutation, persist what changed and recompute the page.
    fn browse(&mut self, f: impl FnOnce(&mut Browser)) {
        f(&mut self.state.browser);
        let persisted = self.state.browser.persisted();
        if persisted != self.saved_filters {
            persisted.save(self.prefs.storage_mut());
            self.saved_filters = persisted;
        }
        self.state.refresh_page();
    }

    fn apply_search(&mut self, query: String) {
        if query == self.state.browser.filters().query {
            return;
        }
        self.browse(|b| b.set_query(query));
        self.sync_components();
    }

    fn reload_catalog(&mut self) {
        let Some(tx) = self.tx.clone() else {
            return;
        };
        self.state.catalog.begin_loading();
        let source = self.source.clone();
        tokio::spawn(async move {
            let result = load_catalog(&source).await;
            let _ = tx.send(AppMessage::CatalogLoaded(result)).await;
        });
    }

    fn on_catalog_loaded(&mut self, result: Result<Catalog, CatalogError>) {
        self.state.catalog.install(result);
        if let Some(err) = self.state.catalog.last_error() {
            self.state.last_log = Some(format!("[ERROR] {}", err));
        } else {
            info!("[app] catalog ready: {} episodes", self.state.catalog.episodes().len());
        }
        self.player.set_program_config(self.state.catalog.config().clone());
        self.state.tags = self.state.catalog.tag_vocabulary();
        self.state.refresh_page();
        self.sync_components();
    }

    // ── State mirroring ───────────────────────────────────────────────────────

    fn sync_player(&mut self) {
        let session = self.player.session();
        if session.error != self.last_player_error {
            if let Some(err) = &session.error {
                warn!("[player] {}", err);
            }
            self.last_player_error = session.error.clone();
        }
        self.state.session = session.clone();
        self.state.playlist = self.player.playlist().clone();
    }

    fn sync_components(&mut self) {
        let s = &self.state;
        self.episodes.sync(s);
        self.tags.sync(s);
        self.playlist.sync(s);
    }

    // ── Drawing ───────────────────────────────────────────────────────────────

    fn draw(&mut self, frame: &mut Frame) {
        let outer = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3),
                Constraint::Length(1),
                Constraint::Min(0),
                Constraint::Length(1),
                Constraint::Length(1),
            ])
            .split(frame.area());

        now_playing::draw(frame, outer[0], &self.state);
        status_bar::draw_separator(frame, outer[1]);

        let body = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Min(40), Constraint::Length(34)])
            .split(outer[2]);
        let side = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
            .split(body[1]);

        let focus = self.state.focus;
        let state = &self.state;
        self.episodes.draw(frame, body[0], focus == ComponentId::Episodes, state);
        self.tags.draw(frame, side[0], focus == ComponentId::Tags, state);
        self.playlist.draw(frame, side[1], focus == ComponentId::Playlist, state);

        status_bar::draw_log_bar(frame, outer[3], state.last_log.as_deref(), state.tip);
        status_bar::draw_keys_bar(frame, outer[4], state.mode, focus);
    }
}
