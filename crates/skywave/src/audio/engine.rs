//! Audio engine
//!
//! Runs audio output on a dedicated thread, accepting commands via crossbeam
//! channels and emitting events back. Connecting to a stream (HTTP + format
//! probe) blocks, so each play request runs on its own worker thread; results
//! whose token is no longer current are discarded.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crossbeam_channel::{bounded, unbounded, Receiver, Sender};
use rodio::{OutputStream, OutputStreamHandle, Sink};
use tracing::{debug, warn};

use crate::config::engine::{POLL_INTERVAL_MS, STREAM_STALL_TIMEOUT_SECS};
use crate::error::{PlaybackError, Result};

use super::stream::{open_stream, StreamReader};
use super::types::{AudioCommand, AudioEvent, PlayToken};

/// Seam between the orchestrator and the platform audio resource.
///
/// Exactly one implementation instance exists per application; everything
/// above it drives playback only through these operations and the event
/// stream, which lets the sequencing logic be tested without a network or
/// an audio device.
pub trait AudioBackend: Send {
    /// Stop current output, clear buffers, record a new stream address.
    /// Does not start playback.
    fn set_source(&mut self, url: &str);

    /// Request playback of the current source. The outcome arrives later as
    /// `AudioEvent::Playing(token)` or `AudioEvent::Failed(token, _)`.
    fn play(&mut self, token: PlayToken);

    /// Stop output immediately.
    fn pause(&mut self);

    /// Apply a volume level in `0.0..=1.0` immediately.
    fn set_volume(&mut self, volume: f32);

    /// Drain the next pending lifecycle event, if any.
    fn poll_event(&mut self) -> Option<AudioEvent>;

    /// Release the output resource. Called once at application teardown.
    fn shutdown(&mut self);
}

/// Production engine: rodio output driven by an `audio-engine` thread.
pub struct StreamEngine {
    cmd_tx: Sender<AudioCommand>,
    event_rx: Receiver<AudioEvent>,
    thread: Option<JoinHandle<()>>,
}

impl StreamEngine {
    /// Create a new engine, spawning the engine thread.
    ///
    /// Blocks until the audio output stream is initialized (or fails).
    pub fn new() -> Result<Self> {
        let (cmd_tx, cmd_rx) = bounded::<AudioCommand>(16);
        let (event_tx, event_rx) = bounded::<AudioEvent>(64);
        let (init_tx, init_rx) = bounded::<std::result::Result<(), String>>(1);

        let thread = thread::Builder::new()
            .name("audio-engine".to_string())
            .spawn(move || {
                EngineThread::run(cmd_rx, event_tx, init_tx);
            })
            .map_err(|e| PlaybackError::Output(format!("Failed to spawn audio thread: {e}")))?;

        let init_result = init_rx
            .recv()
            .map_err(|_| PlaybackError::Output("Audio thread terminated during init".to_string()))?;
        init_result.map_err(PlaybackError::Output)?;

        Ok(Self {
            cmd_tx,
            event_rx,
            thread: Some(thread),
        })
    }

    fn send(&self, cmd: AudioCommand) {
        let _ = self.cmd_tx.send(cmd);
    }
}

impl AudioBackend for StreamEngine {
    fn set_source(&mut self, url: &str) {
        self.send(AudioCommand::SetSource(url.to_string()));
    }

    fn play(&mut self, token: PlayToken) {
        self.send(AudioCommand::Play(token));
    }

    fn pause(&mut self) {
        self.send(AudioCommand::Pause);
    }

    fn set_volume(&mut self, volume: f32) {
        self.send(AudioCommand::SetVolume(volume));
    }

    fn poll_event(&mut self) -> Option<AudioEvent> {
        self.event_rx.try_recv().ok()
    }

    fn shutdown(&mut self) {
        self.send(AudioCommand::Shutdown);
        if let Some(thread) = self.thread.take() {
            let _ = thread.join();
        }
    }
}

impl Drop for StreamEngine {
    fn drop(&mut self) {
        if self.thread.is_some() {
            self.shutdown();
        }
    }
}

/// Result of a connect worker: the decoded source, ready to append.
struct ConnectResult {
    token: PlayToken,
    result: Result<rodio::Decoder<StreamReader>>,
}

/// State owned by the engine thread
struct EngineThread {
    event_tx: Sender<AudioEvent>,
    handle: OutputStreamHandle,
    sink: Option<Sink>,
    source_url: Option<String>,
    /// Token of the most recent play request; connect results for any other
    /// token are stale and dropped.
    active_token: Option<PlayToken>,
    /// A live source is loaded into the sink
    connected: bool,
    paused: bool,
    volume: f32,
    connect_tx: Sender<ConnectResult>,
    connect_rx: Receiver<ConnectResult>,
    /// Counter advanced by the stream reader of the current source
    bytes_received: Arc<AtomicU64>,
    last_bytes: u64,
    last_progress: Instant,
    stalled: bool,
}

impl EngineThread {
    fn run(
        cmd_rx: Receiver<AudioCommand>,
        event_tx: Sender<AudioEvent>,
        init_tx: Sender<std::result::Result<(), String>>,
    ) {
        // The OutputStream must stay alive for the handle to produce sound,
        // and it is not Send — it lives here, on the engine thread.
        let (_stream, handle) = match OutputStream::try_default() {
            Ok(pair) => pair,
            Err(e) => {
                let _ = init_tx.send(Err(format!("Failed to open audio output: {e}")));
                return;
            }
        };
        let _ = init_tx.send(Ok(()));

        let (connect_tx, connect_rx) = unbounded();
        let mut state = Self {
            event_tx,
            handle,
            sink: None,
            source_url: None,
            active_token: None,
            connected: false,
            paused: false,
            volume: 1.0,
            connect_tx,
            connect_rx,
            bytes_received: Arc::new(AtomicU64::new(0)),
            last_bytes: 0,
            last_progress: Instant::now(),
            stalled: false,
        };

        loop {
            match cmd_rx.recv_timeout(Duration::from_millis(POLL_INTERVAL_MS)) {
                Ok(cmd) => {
                    if state.handle_command(cmd) {
                        break;
                    }
                }
                Err(crossbeam_channel::RecvTimeoutError::Timeout) => {}
                Err(crossbeam_channel::RecvTimeoutError::Disconnected) => break,
            }

            while let Ok(result) = state.connect_rx.try_recv() {
                state.handle_connect(result);
            }

            state.monitor();
        }

        if let Some(sink) = state.sink.take() {
            sink.stop();
        }
    }

    fn emit(&self, event: AudioEvent) {
        let _ = self.event_tx.send(event);
    }

    /// Handle a single command. Returns true if the thread should exit.
    fn handle_command(&mut self, cmd: AudioCommand) -> bool {
        match cmd {
            AudioCommand::SetSource(url) => {
                if let Some(sink) = self.sink.take() {
                    sink.stop();
                }
                // A play still connecting for the old source will never
                // finish meaningfully; report it aborted. Its token is
                // stale by the time anyone sees this.
                if !self.connected {
                    if let Some(old) = self.active_token {
                        self.emit(AudioEvent::Failed(old, PlaybackError::Aborted));
                    }
                }
                self.source_url = Some(url);
                self.active_token = None;
                self.connected = false;
                self.paused = false;
                self.stalled = false;
            }
            AudioCommand::Play(token) => {
                self.active_token = Some(token);
                if self.connected {
                    // Resume of an already-loaded source is synchronous.
                    if let Some(sink) = &self.sink {
                        sink.play();
                    }
                    self.paused = false;
                    self.emit(AudioEvent::Playing(token));
                } else {
                    self.start_connect(token);
                }
            }
            AudioCommand::Pause => {
                if let Some(sink) = &self.sink {
                    sink.pause();
                }
                self.paused = true;
                self.stalled = false;
                self.emit(AudioEvent::Paused);
            }
            AudioCommand::SetVolume(volume) => {
                self.volume = volume.clamp(0.0, 1.0);
                if let Some(sink) = &self.sink {
                    sink.set_volume(self.volume);
                }
            }
            AudioCommand::Shutdown => return true,
        }
        false
    }

    /// Connect to the current source on a worker thread.
    fn start_connect(&mut self, token: PlayToken) {
        let url = match &self.source_url {
            Some(url) => url.clone(),
            None => {
                self.emit(AudioEvent::Failed(
                    token,
                    PlaybackError::Network("No stream source loaded".to_string()),
                ));
                return;
            }
        };

        // Fresh counter per attempt so progress from an old stream can't
        // mask a stall on the new one.
        let bytes_received = Arc::new(AtomicU64::new(0));
        self.bytes_received = bytes_received.clone();
        self.last_bytes = 0;

        let connect_tx = self.connect_tx.clone();
        let spawn_result = thread::Builder::new()
            .name("stream-connect".to_string())
            .spawn(move || {
                let result = open_stream(&url, bytes_received).and_then(|reader| {
                    rodio::Decoder::new(reader)
                        .map_err(|e| PlaybackError::UnsupportedFormat(e.to_string()))
                });
                let _ = connect_tx.send(ConnectResult { token, result });
            });

        if let Err(e) = spawn_result {
            self.emit(AudioEvent::Failed(
                token,
                PlaybackError::Output(format!("Failed to spawn connect thread: {e}")),
            ));
        }
    }

    /// Handle the connected stream — start playback (or report failure).
    ///
    /// Results with a stale token are silently discarded.
    fn handle_connect(&mut self, result: ConnectResult) {
        if Some(result.token) != self.active_token {
            debug!(token = result.token.0, "discarding stale connect result");
            return;
        }

        match result.result {
            Ok(source) => {
                if let Some(old) = self.sink.take() {
                    old.stop();
                }
                let sink = match Sink::try_new(&self.handle) {
                    Ok(sink) => sink,
                    Err(e) => {
                        self.connected = false;
                        self.emit(AudioEvent::Failed(
                            result.token,
                            PlaybackError::Output(e.to_string()),
                        ));
                        return;
                    }
                };
                sink.set_volume(self.volume);
                sink.append(source);
                sink.play();
                self.sink = Some(sink);
                self.connected = true;
                self.paused = false;
                self.stalled = false;
                self.last_progress = Instant::now();
                self.emit(AudioEvent::Playing(result.token));
            }
            Err(e) => {
                warn!(error = %e, "stream connect failed");
                self.connected = false;
                self.emit(AudioEvent::Failed(result.token, e));
            }
        }
    }

    /// Watch the live source for termination and network stalls.
    fn monitor(&mut self) {
        if !self.connected || self.paused {
            return;
        }

        if self.sink.as_ref().is_some_and(|s| s.empty()) {
            // Decoder ran out of data: the server closed the stream.
            self.connected = false;
            self.active_token = None;
            self.stalled = false;
            self.emit(AudioEvent::Ended);
            return;
        }

        let bytes = self.bytes_received.load(Ordering::Relaxed);
        if bytes != self.last_bytes {
            self.last_bytes = bytes;
            self.last_progress = Instant::now();
            if self.stalled {
                self.stalled = false;
                if let Some(token) = self.active_token {
                    self.emit(AudioEvent::Playing(token));
                }
            }
        } else if !self.stalled
            && self.last_progress.elapsed() >= Duration::from_secs(STREAM_STALL_TIMEOUT_SECS)
        {
            self.stalled = true;
            if let Some(token) = self.active_token {
                self.emit(AudioEvent::Buffering(token));
            }
        }
    }
}
