//! Playback controller: one media session plus a playlist.
//!
//! ```text
//!            play(ep)             Play event / play() ok
//!   Idle ───────────────▶ Loading ────────────────────▶ Playing
//!    ▲                       │                          │   ▲
//!    │ remove current /      │ load or play failure     │   │ play()
//!    │ clear playlist        ▼                   pause()│   │
//!    └──────────────────── Error                        ▼   │
//!                                                       Paused
//! ```
//!
//! Commands go to the `MediaSession`; what is displayed follows the
//! `MediaEvent`s it reports back through `handle_media_event`.  Failures
//! never propagate out of the controller: they end up in
//! `PlaybackSession::error` as a readable message.

use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::catalog::{Episode, ProgramConfig};
use crate::error::MediaError;
use crate::media::{resolve_media_url, MediaEvent, MediaSession};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlayerStatus {
    /// Nothing loaded.
    #[default]
    Idle,
    /// Source assigned, not yet confirmed playing.
    Loading,
    Playing,
    Paused,
    Error,
}

impl PlayerStatus {
    pub fn label(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Loading => "loading",
            Self::Playing => "playing",
            Self::Paused => "paused",
            Self::Error => "error",
        }
    }
}

/// Transport state as last reported by the media backend.
#[derive(Debug, Clone, PartialEq)]
pub struct PlaybackSession {
    pub current_episode: Option<Episode>,
    pub status: PlayerStatus,
    /// Seconds.
    pub position: f64,
    /// Seconds; 0 until known.
    pub duration: f64,
    /// 0.0 ..= 1.0
    pub volume: f64,
    pub muted: bool,
    pub playback_rate: f64,
    pub buffering: bool,
    pub error: Option<String>,
}

impl Default for PlaybackSession {
    fn default() -> Self {
        Self {
            current_episode: None,
            status: PlayerStatus::Idle,
            position: 0.0,
            duration: 0.0,
            volume: 1.0,
            muted: false,
            playback_rate: 1.0,
            buffering: false,
            error: None,
        }
    }
}

impl PlaybackSession {
    pub fn is_playing(&self) -> bool {
        self.status == PlayerStatus::Playing
    }

    pub fn current_id(&self) -> Option<&str> {
        self.current_episode.as_ref().map(|e| e.id.as_str())
    }

    /// Fraction of the episode played, for progress bars.
    pub fn progress(&self) -> f64 {
        if self.duration > 0.0 {
            (self.position / self.duration).clamp(0.0, 1.0)
        } else {
            0.0
        }
    }
}

/// Ordered queue with a cursor.  The cursor is a valid index whenever the
/// list is non-empty.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Playlist {
    items: Vec<Episode>,
    cursor: usize,
}

impl Playlist {
    pub fn items(&self) -> &[Episode] {
        &self.items
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn position_of(&self, id: &str) -> Option<usize> {
        self.items.iter().position(|e| e.id == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.position_of(id).is_some()
    }

    pub fn at_cursor(&self) -> Option<&Episode> {
        self.items.get(self.cursor)
    }

    fn clamp_cursor(&mut self) {
        if self.items.is_empty() {
            self.cursor = 0;
        } else if self.cursor >= self.items.len() {
            self.cursor = self.items.len() - 1;
        }
    }
}

pub struct PlaybackController<M: MediaSession> {
    media: M,
    config: ProgramConfig,
    session: PlaybackSession,
    playlist: Playlist,
}

impl<M: MediaSession> PlaybackController<M> {
    /// Wrap `media` and subscribe to its events.  The caller owns the
    /// receiver and feeds each event back through `handle_media_event`.
    pub fn new(mut media: M, config: ProgramConfig) -> (Self, mpsc::UnboundedReceiver<MediaEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        media.subscribe(tx);
        let controller = Self {
            media,
            config,
            session: PlaybackSession::default(),
            playlist: Playlist::default(),
        };
        (controller, rx)
    }

    pub fn session(&self) -> &PlaybackSession {
        &self.session
    }

    pub fn playlist(&self) -> &Playlist {
        &self.playlist
    }

    pub fn current_episode(&self) -> Option<&Episode> {
        self.session.current_episode.as_ref()
    }

    pub fn config(&self) -> &ProgramConfig {
        &self.config
    }

    /// Swap the program config, e.g. after a catalog reload.
    pub fn set_program_config(&mut self, config: ProgramConfig) {
        self.config = config;
    }

    pub fn media(&self) -> &M {
        &self.media
    }

    pub fn media_mut(&mut self) -> &mut M {
        &mut self.media
    }

    // ── transport ─────────────────────────────────────────────────────────────

    /// Play `episode`, or resume the current one when `None`.
    ///
    /// A different episode is loaded and placed in the playlist first.  A
    /// bare resume with nothing loaded does nothing.
    pub fn play(&mut self, episode: Option<&Episode>) {
        match episode {
            Some(ep) if self.session.current_id() != Some(ep.id.as_str()) => {
                if !self.load_episode(ep) {
                    return;
                }
            }
            Some(_) => {}
            None if self.session.current_episode.is_none() => {
                debug!("[player] resume ignored, nothing loaded");
                return;
            }
            None => {}
        }
        self.start_playback();
    }

    fn load_episode(&mut self, episode: &Episode) -> bool {
        if !episode.available {
            self.refuse(MediaError::EpisodeUnavailable.to_string());
            return false;
        }
        let Some(url) = resolve_media_url(episode, &self.config) else {
            self.refuse(MediaError::NoMediaUrl.to_string());
            return false;
        };

        info!("[player] loading '{}' from {}", episode.title, url);
        if let Err(e) = self.media.load(&url) {
            self.fail(format!("Failed to play audio: {}", e));
            return false;
        }

        self.session.current_episode = Some(episode.clone());
        self.session.position = 0.0;
        self.session.duration = episode.duration_secs() as f64;
        self.session.error = None;
        self.session.status = PlayerStatus::Loading;
        self.place_in_playlist(episode);
        true
    }

    fn start_playback(&mut self) {
        match self.media.play() {
            Ok(()) => {
                self.session.status = PlayerStatus::Playing;
            }
            Err(e) => self.fail(format!("Failed to play audio: {}", e)),
        }
    }

    /// An episode that never reached the backend.  Whatever is already
    /// loaded keeps its status; only the message is shown.
    fn refuse(&mut self, message: String) {
        if self.session.current_episode.is_some() {
            warn!("[player] {}", message);
            self.session.error = Some(message);
        } else {
            self.fail(message);
        }
    }

    fn fail(&mut self, message: String) {
        warn!("[player] {}", message);
        self.session.error = Some(message);
        self.session.status = PlayerStatus::Error;
        self.session.buffering = false;
    }

    fn place_in_playlist(&mut self, episode: &Episode) {
        match self.playlist.position_of(&episode.id) {
            Some(index) => self.playlist.cursor = index,
            None => {
                self.playlist.items.push(episode.clone());
                self.playlist.cursor = self.playlist.items.len() - 1;
            }
        }
    }

    /// Non-transport command failures are recorded but leave status alone.
    fn command(&mut self, what: &str, result: Result<(), MediaError>) -> bool {
        match result {
            Ok(()) => true,
            Err(e) => {
                warn!("[player] {} failed: {}", what, e);
                self.session.error = Some(e.to_string());
                false
            }
        }
    }

    pub fn pause(&mut self) {
        let result = self.media.pause();
        if self.command("pause", result) && self.session.status == PlayerStatus::Playing {
            self.session.status = PlayerStatus::Paused;
        }
    }

    pub fn toggle_pause(&mut self) {
        if self.session.is_playing() {
            self.pause();
        } else {
            self.play(None);
        }
    }

    /// Pause and rewind.  The episode stays loaded.
    pub fn stop(&mut self) {
        if self.session.current_episode.is_none() {
            return;
        }
        let paused = self.media.pause();
        self.command("stop", paused);
        let rewound = self.media.seek(0.0);
        self.command("stop", rewound);
        self.session.position = 0.0;
        if matches!(self.session.status, PlayerStatus::Playing | PlayerStatus::Loading) {
            self.session.status = PlayerStatus::Paused;
        }
    }

    /// Jump to `position` seconds, kept within the known duration.
    pub fn seek(&mut self, position: f64) {
        if self.session.current_episode.is_none() || !position.is_finite() {
            return;
        }
        let mut target = position.max(0.0);
        if self.session.duration > 0.0 {
            target = target.min(self.session.duration);
        }
        let result = self.media.seek(target);
        if self.command("seek", result) {
            self.session.position = target;
        }
    }

    pub fn seek_relative(&mut self, delta: f64) {
        self.seek(self.session.position + delta);
    }

    pub fn set_volume(&mut self, volume: f64) {
        if !volume.is_finite() {
            return;
        }
        let volume = volume.clamp(0.0, 1.0);
        let result = self.media.set_volume(volume);
        if self.command("volume", result) {
            self.session.volume = volume;
        }
    }

    /// Flip mute; the volume level itself is untouched.
    pub fn toggle_mute(&mut self) {
        let muted = !self.session.muted;
        let result = self.media.set_muted(muted);
        if self.command("mute", result) {
            self.session.muted = muted;
        }
    }

    pub fn set_playback_rate(&mut self, rate: f64) {
        if !rate.is_finite() || rate <= 0.0 {
            debug!("[player] ignoring playback rate {}", rate);
            return;
        }
        let result = self.media.set_playback_rate(rate);
        if self.command("rate", result) {
            self.session.playback_rate = rate;
        }
    }

    // ── playlist ──────────────────────────────────────────────────────────────

    /// Advance the cursor and play.  Returns false at the end of the list.
    pub fn play_next(&mut self) -> bool {
        if self.playlist.cursor + 1 >= self.playlist.items.len() {
            return false;
        }
        self.play_index(self.playlist.cursor + 1)
    }

    /// Step the cursor back and play.  Returns false at the start.
    pub fn play_previous(&mut self) -> bool {
        if self.playlist.cursor == 0 || self.playlist.items.is_empty() {
            return false;
        }
        self.play_index(self.playlist.cursor - 1)
    }

    /// Play the playlist entry at `index`.
    pub fn play_index(&mut self, index: usize) -> bool {
        let Some(episode) = self.playlist.items.get(index).cloned() else {
            return false;
        };
        self.play(Some(&episode));
        // The cursor follows the active episode, so a refused load leaves it put
        if self.session.current_id() == Some(episode.id.as_str()) {
            self.playlist.cursor = index;
        }
        true
    }

    /// Append unless already queued.
    pub fn add_to_playlist(&mut self, episode: &Episode) -> bool {
        if self.playlist.contains(&episode.id) {
            return false;
        }
        self.playlist.items.push(episode.clone());
        true
    }

    pub fn remove_from_playlist(&mut self, id: &str) {
        let Some(index) = self.playlist.position_of(id) else {
            return;
        };
        self.playlist.items.remove(index);

        if index < self.playlist.cursor {
            self.playlist.cursor -= 1;
        } else if index == self.playlist.cursor && self.session.current_id() == Some(id) {
            self.unload_current();
        }
        self.playlist.clamp_cursor();
    }

    pub fn clear_playlist(&mut self) {
        self.playlist.items.clear();
        self.playlist.cursor = 0;
        self.unload_current();
    }

    fn unload_current(&mut self) {
        let paused = self.media.pause();
        self.command("stop", paused);
        let unloaded = self.media.unload();
        self.command("unload", unloaded);
        let volume = self.session.volume;
        let muted = self.session.muted;
        let playback_rate = self.session.playback_rate;
        self.session = PlaybackSession {
            volume,
            muted,
            playback_rate,
            ..PlaybackSession::default()
        };
    }

    // ── media events ──────────────────────────────────────────────────────────

    pub fn handle_media_event(&mut self, event: MediaEvent) {
        if let MediaEvent::VolumeChange { volume, muted } = event {
            self.session.volume = volume.clamp(0.0, 1.0);
            self.session.muted = muted;
            return;
        }
        // Anything else is about a source; with none loaded it is stale.
        if self.session.current_episode.is_none() {
            return;
        }
        match event {
            MediaEvent::LoadStart => self.session.buffering = true,
            MediaEvent::CanPlay => {
                self.session.buffering = false;
                if self.session.status == PlayerStatus::Loading {
                    self.session.status = PlayerStatus::Paused;
                }
            }
            MediaEvent::LoadedMetadata { duration } => {
                if duration.is_finite() && duration > 0.0 {
                    self.session.duration = duration;
                }
            }
            MediaEvent::TimeUpdate { position } => {
                if position.is_finite() {
                    self.session.position = position.max(0.0);
                }
            }
            MediaEvent::Play => self.session.status = PlayerStatus::Playing,
            MediaEvent::Pause => {
                if self.session.status == PlayerStatus::Playing {
                    self.session.status = PlayerStatus::Paused;
                }
            }
            MediaEvent::Ended => {
                debug!("[player] episode ended");
                self.session.position = 0.0;
                self.session.status = PlayerStatus::Paused;
                self.play_next();
            }
            MediaEvent::Error { message } => self.fail(format!("Audio error: {}", message)),
            MediaEvent::VolumeChange { .. } => {}
        }
    }

    /// Handle every event already waiting on `rx`.
    pub fn drain_events(&mut self, rx: &mut mpsc::UnboundedReceiver<MediaEvent>) {
        while let Ok(event) = rx.try_recv() {
            self.handle_media_event(event);
        }
    }
}
