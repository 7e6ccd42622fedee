//! Shared fixtures for the integration tests.

#![allow(dead_code)]

use guardia_core::catalog::Episode;
use guardia_core::error::MediaError;
use guardia_core::media::{MediaEvent, MediaSession};
use tokio::sync::mpsc;

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Load(String),
    Play,
    Pause,
    Seek(f64),
    Volume(f64),
    Muted(bool),
    Rate(f64),
    Unload,
}

/// Media double that answers every command with the events a real player
/// would emit, synchronously, so tests can drain them right after.
#[derive(Default)]
pub struct ScriptedSession {
    tx: Option<mpsc::UnboundedSender<MediaEvent>>,
    pub commands: Vec<Command>,
    pub fail_next_play: Option<String>,
    /// Reported as the loaded duration.
    pub duration: f64,
    volume: f64,
    muted: bool,
}

impl ScriptedSession {
    pub fn new() -> Self {
        Self {
            duration: 600.0,
            volume: 1.0,
            ..Default::default()
        }
    }

    fn emit(&self, event: MediaEvent) {
        if let Some(tx) = &self.tx {
            let _ = tx.send(event);
        }
    }

    /// Simulate the media reaching its natural end.
    pub fn finish(&self) {
        self.emit(MediaEvent::Pause);
        self.emit(MediaEvent::Ended);
    }

    /// Simulate a decoding or network error from the media pipeline.
    pub fn break_with(&self, message: &str) {
        self.emit(MediaEvent::Error {
            message: message.to_string(),
        });
    }

    /// Simulate a hardware volume key.
    pub fn external_volume(&mut self, volume: f64) {
        self.volume = volume;
        self.emit(MediaEvent::VolumeChange {
            volume,
            muted: self.muted,
        });
    }

    pub fn loads(&self) -> Vec<String> {
        self.commands
            .iter()
            .filter_map(|c| match c {
                Command::Load(url) => Some(url.clone()),
                _ => None,
            })
            .collect()
    }
}

impl MediaSession for ScriptedSession {
    fn subscribe(&mut self, tx: mpsc::UnboundedSender<MediaEvent>) {
        self.tx = Some(tx);
    }

    fn load(&mut self, url: &str) -> Result<(), MediaError> {
        self.commands.push(Command::Load(url.to_string()));
        self.emit(MediaEvent::LoadStart);
        self.emit(MediaEvent::LoadedMetadata {
            duration: self.duration,
        });
        self.emit(MediaEvent::CanPlay);
        Ok(())
    }

    fn play(&mut self) -> Result<(), MediaError> {
        self.commands.push(Command::Play);
        if let Some(msg) = self.fail_next_play.take() {
            return Err(MediaError::Command(msg));
        }
        self.emit(MediaEvent::Play);
        Ok(())
    }

    fn pause(&mut self) -> Result<(), MediaError> {
        self.commands.push(Command::Pause);
        self.emit(MediaEvent::Pause);
        Ok(())
    }

    fn seek(&mut self, position: f64) -> Result<(), MediaError> {
        self.commands.push(Command::Seek(position));
        self.emit(MediaEvent::TimeUpdate { position });
        Ok(())
    }

    fn set_volume(&mut self, volume: f64) -> Result<(), MediaError> {
        self.commands.push(Command::Volume(volume));
        self.volume = volume;
        self.emit(MediaEvent::VolumeChange {
            volume,
            muted: self.muted,
        });
        Ok(())
    }

    fn set_muted(&mut self, muted: bool) -> Result<(), MediaError> {
        self.commands.push(Command::Muted(muted));
        self.muted = muted;
        self.emit(MediaEvent::VolumeChange {
            volume: self.volume,
            muted,
        });
        Ok(())
    }

    fn set_playback_rate(&mut self, rate: f64) -> Result<(), MediaError> {
        self.commands.push(Command::Rate(rate));
        Ok(())
    }

    fn unload(&mut self) -> Result<(), MediaError> {
        self.commands.push(Command::Unload);
        Ok(())
    }
}

pub fn episode(id: &str) -> Episode {
    Episode {
        id: id.to_string(),
        title: format!("Episode {}", id),
        duration: "10:00".to_string(),
        audio_url: format!("https://cdn.example/{}.mp3", id),
        available: true,
        ..Default::default()
    }
}

/// `n` episodes with ids `ep-000`, `ep-001`, ... dated one day apart.
pub fn catalog(n: usize) -> Vec<Episode> {
    (0..n)
        .map(|i| {
            let mut ep = episode(&format!("ep-{:03}", i));
            ep.parsed_date = format!("2020-01-{:02}", (i % 28) + 1);
            ep.duration = format!("{}:00", 20 + i % 40);
            ep
        })
        .collect()
}
