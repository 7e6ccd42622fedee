/// mpv IPC backend for the playback controller.
///
/// ```text
///   MpvDriver::spawn_and_connect()
///         │
///         ├── writer_task   ← PendingRequest via mpsc, serialised → socket
///         └── reader_task   ← JSON lines from socket
///                                ├── response (has request_id) → matched oneshot::Sender
///                                └── event / property-change   → MpvEvent channel
///
///   MpvSession (MediaSession)
///         ├── command_pump  ← JSON commands queued by the sync trait methods
///         └── event_pump    ← MpvEvent → MediaEvent via EventTranslator
/// ```
///
/// Platform notes:
/// - Unix:   Unix domain sockets
/// - Windows: Named pipes  \\.\pipe\<name>
use guardia_core::error::MediaError;
use guardia_core::media::{MediaEvent, MediaSession};
use guardia_core::platform;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::sync::{mpsc, oneshot, Mutex};
use tracing::{debug, info, warn};

#[cfg(unix)]
use tokio::net::UnixStream;

#[cfg(windows)]
use tokio::net::windows::named_pipe::ClientOptions;

// ── global request-id counter ─────────────────────────────────────────────────

static NEXT_REQ_ID: AtomicU64 = AtomicU64::new(1);

// ── observation property IDs ──────────────────────────────────────────────────

pub const OBS_PAUSE: u64 = 1;
pub const OBS_TIME_POS: u64 = 2;
pub const OBS_DURATION: u64 = 3;
pub const OBS_VOLUME: u64 = 4;
pub const OBS_MUTE: u64 = 5;
pub const OBS_CACHE_PAUSE: u64 = 6;

const OBSERVED: [(u64, &str); 6] = [
    (OBS_PAUSE, "pause"),
    (OBS_TIME_POS, "time-pos"),
    (OBS_DURATION, "duration"),
    (OBS_VOLUME, "volume"),
    (OBS_MUTE, "mute"),
    (OBS_CACHE_PAUSE, "paused-for-cache"),
];

type PendingMap = Arc<Mutex<HashMap<u64, oneshot::Sender<anyhow::Result<Value>>>>>;

// ── internal channel types ────────────────────────────────────────────────────

struct PendingRequest {
    req_id: u64,
    payload: String, // serialised JSON line (already has '\n')
    reply: oneshot::Sender<anyhow::Result<Value>>,
}

/// An mpv event / property-change that arrived unsolicited (no request_id).
#[derive(Debug, Clone)]
pub struct MpvEvent {
    pub raw: Value,
}

impl MpvEvent {
    /// Returns `Some((obs_id, data))` if this is a property-change event.
    pub fn as_property_change(&self) -> Option<(u64, &Value)> {
        if self.raw.get("event")?.as_str()? == "property-change" {
            let id = self.raw.get("id")?.as_u64()?;
            let data = self.raw.get("data").unwrap_or(&Value::Null);
            Some((id, data))
        } else {
            None
        }
    }

    /// Returns the event name, e.g. "end-file", "start-file", "file-loaded".
    pub fn event_name(&self) -> Option<&str> {
        self.raw.get("event")?.as_str()
    }
}

// ── public handle ─────────────────────────────────────────────────────────────

/// Cloneable handle to the mpv writer task.
#[derive(Clone)]
pub struct MpvHandle {
    tx: mpsc::Sender<PendingRequest>,
}

impl MpvHandle {
    pub async fn send(&self, command: Value) -> anyhow::Result<Value> {
        let req_id = NEXT_REQ_ID.fetch_add(1, Ordering::Relaxed);
        let msg = json!({ "command": command, "request_id": req_id });
        let mut raw = serde_json::to_string(&msg)?;
        raw.push('\n');

        let (reply_tx, reply_rx) = oneshot::channel();
        self.tx
            .send(PendingRequest {
                req_id,
                payload: raw,
                reply: reply_tx,
            })
            .await
            .map_err(|_| anyhow::anyhow!("mpv writer task gone"))?;

        tokio::time::timeout(tokio::time::Duration::from_secs(5), reply_rx)
            .await
            .map_err(|_| anyhow::anyhow!("mpv IPC timeout for req={}", req_id))?
            .map_err(|_| anyhow::anyhow!("mpv reply channel dropped req={}", req_id))?
    }

    /// Register observe_property for everything the translator understands.
    /// Must be called after every fresh connection.
    pub async fn observe_all_properties(&self) {
        for (id, name) in &OBSERVED {
            match self.send(json!(["observe_property", id, name])).await {
                Ok(_) => debug!("mpv: observe_property id={} name={}", id, name),
                Err(e) => warn!("mpv: observe_property {} failed: {}", name, e),
            }
        }
    }
}

// ── driver ────────────────────────────────────────────────────────────────────

/// Owns the mpv child process.
pub struct MpvDriver {
    pub socket_name: String,
    process: Option<tokio::process::Child>,
    /// Volume mpv starts with, 0.0..=1.0.
    pub initial_volume: f32,
}

impl MpvDriver {
    pub fn new(socket_name: Option<&str>, initial_volume: f32) -> Self {
        Self {
            socket_name: socket_name
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .unwrap_or_else(platform::mpv_socket_name),
            process: None,
            initial_volume,
        }
    }

    /// Kill the process if running.
    pub async fn kill(&mut self) {
        if let Some(mut p) = self.process.take() {
            let _ = p.kill().await;
        }
    }

    fn command(&self) -> anyhow::Result<tokio::process::Command> {
        let mpv_binary =
            platform::find_mpv_binary().ok_or_else(|| anyhow::anyhow!("mpv binary not found"))?;
        let vol_arg = format!(
            "--volume={}",
            (self.initial_volume * 100.0).clamp(0.0, 100.0).round() as i64
        );
        let mut cmd = tokio::process::Command::new(mpv_binary);
        cmd.arg("--no-video")
            .arg("--idle=yes")
            .arg(platform::mpv_socket_arg(&self.socket_name))
            .arg("--quiet")
            .arg(vol_arg)
            .stdout(std::process::Stdio::null())
            .kill_on_drop(true);
        Ok(cmd)
    }

    // ── spawn ─────────────────────────────────────────────────────────────────

    #[cfg(unix)]
    pub async fn spawn_and_connect(
        &mut self,
        event_tx: mpsc::Sender<MpvEvent>,
    ) -> anyhow::Result<MpvHandle> {
        self.kill().await;

        let socket_path = std::path::PathBuf::from(&self.socket_name);
        let _ = tokio::fs::remove_file(&socket_path).await;

        let stderr_path = platform::data_dir().join("mpv-stderr.log");
        let stderr_file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&stderr_path)?;
        info!("mpv: spawning, stderr to {:?}", stderr_path);

        let child = self.command()?.stderr(stderr_file).spawn()?;
        info!("mpv: spawned process with pid {:?}", child.id());
        self.process = Some(child);

        for _ in 0..50 {
            tokio::time::sleep(tokio::time::Duration::from_millis(100)).await;
            if socket_path.exists() {
                break;
            }
        }
        if !socket_path.exists() {
            anyhow::bail!("mpv IPC socket did not appear");
        }
        tokio::time::sleep(tokio::time::Duration::from_millis(200)).await;

        let stream = UnixStream::connect(&socket_path).await?;
        info!("mpv: connected to IPC socket");
        let (read_half, write_half) = stream.into_split();
        Ok(start_io_tasks(BufReader::new(read_half), write_half, event_tx))
    }

    #[cfg(windows)]
    pub async fn spawn_and_connect(
        &mut self,
        event_tx: mpsc::Sender<MpvEvent>,
    ) -> anyhow::Result<MpvHandle> {
        self.kill().await;

        info!("mpv: spawning");
        let child = self
            .command()?
            .stderr(std::process::Stdio::null())
            .spawn()?;
        self.process = Some(child);

        let pipe_path = format!(r"\\.\pipe\{}", self.socket_name);
        for _ in 0..50 {
            tokio::time::sleep(tokio::time::Duration::from_millis(100)).await;
            if let Ok(client) = ClientOptions::new().open(&pipe_path) {
                info!("mpv: connected to named pipe");
                let (read_half, write_half) = tokio::io::split(client);
                return Ok(start_io_tasks(BufReader::new(read_half), write_half, event_tx));
            }
        }
        anyhow::bail!("mpv named pipe did not appear")
    }
}

fn start_io_tasks<R, W>(
    reader: BufReader<R>,
    writer: W,
    event_tx: mpsc::Sender<MpvEvent>,
) -> MpvHandle
where
    R: tokio::io::AsyncRead + Unpin + Send + 'static,
    W: tokio::io::AsyncWrite + Unpin + Send + 'static,
{
    // req_id → reply channel.  Writer inserts, reader resolves.
    let pending: PendingMap = Arc::new(Mutex::new(HashMap::new()));
    let (cmd_tx, cmd_rx) = mpsc::channel::<PendingRequest>(64);

    tokio::spawn(writer_task(writer, cmd_rx, pending.clone()));
    tokio::spawn(reader_task(reader, pending, event_tx));

    MpvHandle { tx: cmd_tx }
}

// ── reader task ───────────────────────────────────────────────────────────────

async fn reader_task<R>(mut reader: BufReader<R>, pending: PendingMap, event_tx: mpsc::Sender<MpvEvent>)
where
    R: tokio::io::AsyncRead + Unpin,
{
    let mut line = String::new();
    loop {
        line.clear();
        match reader.read_line(&mut line).await {
            Ok(0) => {
                debug!("mpv reader: connection closed");
                let mut map = pending.lock().await;
                for (_, tx) in map.drain() {
                    let _ = tx.send(Err(anyhow::anyhow!("mpv IPC connection closed")));
                }
                break;
            }
            Ok(_) => {
                let trimmed = line.trim();
                if trimmed.is_empty() {
                    continue;
                }
                let val: Value = match serde_json::from_str(trimmed) {
                    Ok(v) => v,
                    Err(e) => {
                        debug!("mpv reader: invalid json '{}': {}", trimmed, e);
                        continue;
                    }
                };

                if let Some(req_id) = val.get("request_id").and_then(|v| v.as_u64()) {
                    let mut map = pending.lock().await;
                    if let Some(tx) = map.remove(&req_id) {
                        let result = if val["error"].as_str() == Some("success") {
                            Ok(val)
                        } else {
                            let err = val["error"].as_str().unwrap_or("unknown error").to_string();
                            debug!("mpv reader: response req={} err={}", req_id, err);
                            Err(anyhow::anyhow!("mpv error: {}", err))
                        };
                        let _ = tx.send(result);
                    }
                } else if event_tx.send(MpvEvent { raw: val }).await.is_err() {
                    break;
                }
            }
            Err(e) => {
                warn!("mpv reader: read error: {}", e);
                let mut map = pending.lock().await;
                for (_, tx) in map.drain() {
                    let _ = tx.send(Err(anyhow::anyhow!("mpv IPC read error: {}", e)));
                }
                break;
            }
        }
    }
}

// ── writer task ───────────────────────────────────────────────────────────────

async fn writer_task<W>(mut writer: W, mut rx: mpsc::Receiver<PendingRequest>, pending: PendingMap)
where
    W: tokio::io::AsyncWrite + Unpin,
{
    while let Some(req) = rx.recv().await {
        // Register before writing so the reader can match the reply
        pending.lock().await.insert(req.req_id, req.reply);
        debug!("mpv writer: send req={} payload={}", req.req_id, req.payload.trim());
        if let Err(e) = writer.write_all(req.payload.as_bytes()).await {
            warn!("mpv writer: write error: {}", e);
            if let Some(tx) = pending.lock().await.remove(&req.req_id) {
                let _ = tx.send(Err(anyhow::anyhow!("mpv write error: {}", e)));
            }
            break;
        }
    }
    debug!("mpv writer: task exiting");
}

// ── event translation ─────────────────────────────────────────────────────────

/// Turns raw mpv events into `MediaEvent`s.  Volume and mute arrive as
/// separate properties, so the last value of each is remembered.
#[derive(Debug, Clone)]
pub struct EventTranslator {
    volume: f64,
    muted: bool,
}

impl EventTranslator {
    pub fn new(volume: f64) -> Self {
        Self { volume, muted: false }
    }

    pub fn translate(&mut self, event: &MpvEvent) -> Option<MediaEvent> {
        if let Some((id, data)) = event.as_property_change() {
            return match id {
                OBS_PAUSE => data
                    .as_bool()
                    .map(|paused| if paused { MediaEvent::Pause } else { MediaEvent::Play }),
                OBS_TIME_POS => data.as_f64().map(|position| MediaEvent::TimeUpdate { position }),
                OBS_DURATION => data
                    .as_f64()
                    .filter(|d| *d > 0.0)
                    .map(|duration| MediaEvent::LoadedMetadata { duration }),
                OBS_VOLUME => {
                    self.volume = (data.as_f64()? / 100.0).clamp(0.0, 1.0);
                    Some(self.volume_change())
                }
                OBS_MUTE => {
                    self.muted = data.as_bool()?;
                    Some(self.volume_change())
                }
                OBS_CACHE_PAUSE => data
                    .as_bool()
                    .map(|waiting| if waiting { MediaEvent::LoadStart } else { MediaEvent::CanPlay }),
                _ => None,
            };
        }

        match event.event_name()? {
            "start-file" => Some(MediaEvent::LoadStart),
            "file-loaded" => Some(MediaEvent::CanPlay),
            "end-file" => match event.raw.get("reason").and_then(Value::as_str) {
                Some("eof") => Some(MediaEvent::Ended),
                Some("error") => Some(MediaEvent::Error {
                    message: event
                        .raw
                        .get("file_error")
                        .and_then(Value::as_str)
                        .unwrap_or("playback failed")
                        .to_string(),
                }),
                // stop / quit / redirect: a replacement or an unload we asked for
                _ => None,
            },
            _ => None,
        }
    }

    fn volume_change(&self) -> MediaEvent {
        MediaEvent::VolumeChange {
            volume: self.volume,
            muted: self.muted,
        }
    }
}

// ── MediaSession ──────────────────────────────────────────────────────────────

type Subscriber = Arc<std::sync::Mutex<Option<mpsc::UnboundedSender<MediaEvent>>>>;

/// `MediaSession` over mpv.  Commands are queued and sent in order by a
/// pump task; replies are only logged because mpv reports the outcome as
/// events anyway.
pub struct MpvSession {
    commands: Option<mpsc::UnboundedSender<Value>>,
    subscriber: Subscriber,
}

impl MpvSession {
    /// A session with no backend.  Every command fails with `Unavailable`.
    pub fn disconnected() -> Self {
        Self {
            commands: None,
            subscriber: Arc::new(std::sync::Mutex::new(None)),
        }
    }

    /// Spawn mpv through `driver` and wire up the pump tasks.
    pub async fn start(driver: &mut MpvDriver) -> anyhow::Result<Self> {
        let (event_tx, event_rx) = mpsc::channel::<MpvEvent>(256);
        let handle = driver.spawn_and_connect(event_tx).await?;
        handle.observe_all_properties().await;

        let (cmd_tx, cmd_rx) = mpsc::unbounded_channel();
        let subscriber: Subscriber = Arc::new(std::sync::Mutex::new(None));

        tokio::spawn(command_pump(handle, cmd_rx));
        tokio::spawn(event_pump(
            event_rx,
            EventTranslator::new(driver.initial_volume as f64),
            subscriber.clone(),
        ));

        Ok(Self {
            commands: Some(cmd_tx),
            subscriber,
        })
    }

    pub fn is_connected(&self) -> bool {
        self.commands.as_ref().is_some_and(|tx| !tx.is_closed())
    }

    fn send(&self, command: Value) -> Result<(), MediaError> {
        let tx = self
            .commands
            .as_ref()
            .ok_or_else(|| MediaError::Unavailable("mpv is not running".to_string()))?;
        tx.send(command)
            .map_err(|_| MediaError::Unavailable("mpv connection closed".to_string()))
    }

    fn set_property(&self, name: &str, value: Value) -> Result<(), MediaError> {
        self.send(json!(["set_property", name, value]))
    }
}

async fn command_pump(handle: MpvHandle, mut rx: mpsc::UnboundedReceiver<Value>) {
    while let Some(command) = rx.recv().await {
        if let Err(e) = handle.send(command.clone()).await {
            warn!("mpv: command {} failed: {}", command, e);
        }
    }
    debug!("mpv: command pump exiting");
}

async fn event_pump(
    mut rx: mpsc::Receiver<MpvEvent>,
    mut translator: EventTranslator,
    subscriber: Subscriber,
) {
    let forward = |event: MediaEvent| {
        if let Ok(guard) = subscriber.lock() {
            if let Some(tx) = guard.as_ref() {
                let _ = tx.send(event);
            }
        }
    };
    while let Some(raw) = rx.recv().await {
        if let Some(event) = translator.translate(&raw) {
            forward(event);
        }
    }
    warn!("mpv: event stream closed");
    forward(MediaEvent::Error {
        message: "mpv connection closed".to_string(),
    });
}

impl MediaSession for MpvSession {
    fn subscribe(&mut self, tx: mpsc::UnboundedSender<MediaEvent>) {
        if let Ok(mut guard) = self.subscriber.lock() {
            *guard = Some(tx);
        }
    }

    fn load(&mut self, url: &str) -> Result<(), MediaError> {
        debug!("mpv: load {}", url);
        // Stay paused after loading; play() starts it
        self.set_property("pause", json!(true))?;
        self.send(json!(["loadfile", url, "replace"]))
    }

    fn play(&mut self) -> Result<(), MediaError> {
        self.set_property("pause", json!(false))
    }

    fn pause(&mut self) -> Result<(), MediaError> {
        self.set_property("pause", json!(true))
    }

    fn seek(&mut self, position: f64) -> Result<(), MediaError> {
        self.set_property("time-pos", json!(position))
    }

    fn set_volume(&mut self, volume: f64) -> Result<(), MediaError> {
        self.set_property("volume", json!((volume * 100.0).clamp(0.0, 100.0)))
    }

    fn set_muted(&mut self, muted: bool) -> Result<(), MediaError> {
        self.set_property("mute", json!(muted))
    }

    fn set_playback_rate(&mut self, rate: f64) -> Result<(), MediaError> {
        self.set_property("speed", json!(rate))
    }

    fn unload(&mut self) -> Result<(), MediaError> {
        self.send(json!(["stop"]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ev(raw: Value) -> MpvEvent {
        MpvEvent { raw }
    }

    fn prop(id: u64, data: Value) -> MpvEvent {
        ev(json!({ "event": "property-change", "id": id, "name": "x", "data": data }))
    }

    #[test]
    fn test_property_changes_translate() {
        let mut t = EventTranslator::new(1.0);
        assert_eq!(t.translate(&prop(OBS_PAUSE, json!(false))), Some(MediaEvent::Play));
        assert_eq!(t.translate(&prop(OBS_PAUSE, json!(true))), Some(MediaEvent::Pause));
        assert_eq!(
            t.translate(&prop(OBS_TIME_POS, json!(12.5))),
            Some(MediaEvent::TimeUpdate { position: 12.5 })
        );
        assert_eq!(
            t.translate(&prop(OBS_DURATION, json!(3199.0))),
            Some(MediaEvent::LoadedMetadata { duration: 3199.0 })
        );
        // Unloaded properties come through as null
        assert_eq!(t.translate(&prop(OBS_TIME_POS, Value::Null)), None);
        assert_eq!(t.translate(&prop(OBS_DURATION, Value::Null)), None);
    }

    #[test]
    fn test_volume_and_mute_are_combined() {
        let mut t = EventTranslator::new(1.0);
        assert_eq!(
            t.translate(&prop(OBS_VOLUME, json!(40.0))),
            Some(MediaEvent::VolumeChange { volume: 0.4, muted: false })
        );
        assert_eq!(
            t.translate(&prop(OBS_MUTE, json!(true))),
            Some(MediaEvent::VolumeChange { volume: 0.4, muted: true })
        );
    }

    #[test]
    fn test_end_file_reasons() {
        let mut t = EventTranslator::new(1.0);
        assert_eq!(
            t.translate(&ev(json!({ "event": "end-file", "reason": "eof" }))),
            Some(MediaEvent::Ended)
        );
        assert_eq!(t.translate(&ev(json!({ "event": "end-file", "reason": "stop" }))), None);
        assert_eq!(
            t.translate(&ev(json!({
                "event": "end-file",
                "reason": "error",
                "file_error": "loading failed"
            }))),
            Some(MediaEvent::Error { message: "loading failed".to_string() })
        );
        assert_eq!(t.translate(&ev(json!({ "event": "start-file" }))), Some(MediaEvent::LoadStart));
        assert_eq!(t.translate(&ev(json!({ "event": "file-loaded" }))), Some(MediaEvent::CanPlay));
        assert_eq!(t.translate(&ev(json!({ "event": "idle" }))), None);
    }

    #[test]
    fn test_disconnected_session_refuses_commands() {
        let mut session = MpvSession::disconnected();
        assert!(!session.is_connected());
        assert!(matches!(session.load("x.mp3"), Err(MediaError::Unavailable(_))));
        assert!(matches!(session.play(), Err(MediaError::Unavailable(_))));
    }

    #[tokio::test]
    async fn test_commands_queue_in_order() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut session = MpvSession {
            commands: Some(tx),
            subscriber: Arc::new(std::sync::Mutex::new(None)),
        };
        session.load("https://cdn/ep.mp3").unwrap();
        session.play().unwrap();
        session.set_volume(0.25).unwrap();

        assert_eq!(rx.recv().await, Some(json!(["set_property", "pause", true])));
        assert_eq!(rx.recv().await, Some(json!(["loadfile", "https://cdn/ep.mp3", "replace"])));
        assert_eq!(rx.recv().await, Some(json!(["set_property", "pause", false])));
        assert_eq!(rx.recv().await, Some(json!(["set_property", "volume", 25.0])));
    }
}
