//! The media backend seen from the playback controller.
//!
//! A `MediaSession` takes commands and reports what actually happened as
//! `MediaEvent`s on a channel.  State the controller shows (playing, volume,
//! position) follows the events, not the commands, so changes made outside
//! the app (hardware keys, the backend's own UI) are reflected too.

use tokio::sync::mpsc;

use crate::catalog::{DeliveryMode, Episode, ProgramConfig};
use crate::error::MediaError;

/// Notifications from the media backend.
#[derive(Debug, Clone, PartialEq)]
pub enum MediaEvent {
    /// A new source started loading; buffering begins.
    LoadStart,
    /// Enough data is buffered to start.
    CanPlay,
    LoadedMetadata { duration: f64 },
    TimeUpdate { position: f64 },
    Play,
    Pause,
    /// Natural end of media.
    Ended,
    Error { message: String },
    VolumeChange { volume: f64, muted: bool },
}

pub trait MediaSession {
    /// Register the channel events are delivered on.  Replaces any earlier one.
    fn subscribe(&mut self, tx: mpsc::UnboundedSender<MediaEvent>);

    /// Replace the current source.  Does not start playback.
    fn load(&mut self, url: &str) -> Result<(), MediaError>;

    fn play(&mut self) -> Result<(), MediaError>;
    fn pause(&mut self) -> Result<(), MediaError>;
    fn seek(&mut self, position: f64) -> Result<(), MediaError>;
    fn set_volume(&mut self, volume: f64) -> Result<(), MediaError>;
    fn set_muted(&mut self, muted: bool) -> Result<(), MediaError>;
    fn set_playback_rate(&mut self, rate: f64) -> Result<(), MediaError>;

    /// Drop the current source entirely.
    fn unload(&mut self) -> Result<(), MediaError>;
}

impl<M: MediaSession + ?Sized> MediaSession for Box<M> {
    fn subscribe(&mut self, tx: mpsc::UnboundedSender<MediaEvent>) {
        (**self).subscribe(tx)
    }
    fn load(&mut self, url: &str) -> Result<(), MediaError> {
        (**self).load(url)
    }
    fn play(&mut self) -> Result<(), MediaError> {
        (**self).play()
    }
    fn pause(&mut self) -> Result<(), MediaError> {
        (**self).pause()
    }
    fn seek(&mut self, position: f64) -> Result<(), MediaError> {
        (**self).seek(position)
    }
    fn set_volume(&mut self, volume: f64) -> Result<(), MediaError> {
        (**self).set_volume(volume)
    }
    fn set_muted(&mut self, muted: bool) -> Result<(), MediaError> {
        (**self).set_muted(muted)
    }
    fn set_playback_rate(&mut self, rate: f64) -> Result<(), MediaError> {
        (**self).set_playback_rate(rate)
    }
    fn unload(&mut self) -> Result<(), MediaError> {
        (**self).unload()
    }
}

/// Pick the URL to hand the backend for `episode`.
///
/// Streaming wins when the program advertises it and the episode has a
/// remote URL.  Otherwise a local file under the media base path is used
/// when local delivery is supported.  Failing both, the remote URL is the
/// last resort.  `None` means there is nothing to play.
pub fn resolve_media_url(episode: &Episode, config: &ProgramConfig) -> Option<String> {
    if config.supports(DeliveryMode::Streaming) && !episode.audio_url.is_empty() {
        return Some(episode.audio_url.clone());
    }
    if config.supports(DeliveryMode::Local) && !episode.filename.is_empty() {
        let base = config.audio_base_url.trim_end_matches('/');
        let file = episode.filename.trim_start_matches('/');
        return Some(format!("{}/{}", base, file));
    }
    if episode.audio_url.is_empty() {
        None
    } else {
        Some(episode.audio_url.clone())
    }
}
