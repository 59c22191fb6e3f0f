//! Play/pause orchestrator
//!
//! Turns high-level intents ("play this station", "toggle") into correctly
//! sequenced engine calls, resilient to rapid repeated invocation. Owns the
//! engine exclusively and is the only writer of the shared player state.
//!
//! Every play request carries a monotonically increasing token. When an
//! engine event arrives for a token that is no longer the latest, the
//! result is stale — a newer request has superseded it — and is dropped
//! without touching state or notifying anyone. A success is additionally
//! applied only if playing is still the desired state, so a pause issued
//! while a play was in flight always wins.

use std::time::Duration;

use crossbeam_channel::Receiver;
use skywave::audio::{AudioBackend, AudioEvent, PlayToken};
use tracing::{debug, warn};

use crate::config::player::POLL_INTERVAL_MS;
use crate::data::types::Station;
use crate::notify::{NotificationKind, Notifier};

use super::store::{lock, PlayerCommand, SharedState, Subscribers};

/// What the user last asked for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Desired {
    Playing,
    Paused,
}

/// Sequences engine operations and owns the shared state
pub struct Orchestrator<B: AudioBackend> {
    engine: B,
    cmd_rx: Receiver<PlayerCommand>,
    state: SharedState,
    subscribers: Subscribers,
    notifier: Notifier,
    /// Monotonically increasing request counter
    next_token: u64,
    /// Token of the most recent play request; older outcomes are stale
    latest: Option<PlayToken>,
    /// Whether the latest play request was a resume rather than a fresh load
    latest_is_resume: bool,
    /// Engine holds a confirmed live source for the current station
    engine_live: bool,
    desired: Desired,
}

impl<B: AudioBackend> Orchestrator<B> {
    pub fn new(
        engine: B,
        cmd_rx: Receiver<PlayerCommand>,
        state: SharedState,
        subscribers: Subscribers,
        notifier: Notifier,
    ) -> Self {
        Self {
            engine,
            cmd_rx,
            state,
            subscribers,
            notifier,
            next_token: 0,
            latest: None,
            latest_is_resume: false,
            engine_live: false,
            desired: Desired::Paused,
        }
    }

    /// Run the controller loop (blocking, call from a dedicated thread)
    pub fn run(&mut self) {
        loop {
            match self.cmd_rx.recv_timeout(Duration::from_millis(POLL_INTERVAL_MS)) {
                Ok(cmd) => {
                    if self.handle_command(cmd) {
                        break;
                    }
                }
                Err(crossbeam_channel::RecvTimeoutError::Timeout) => {}
                Err(crossbeam_channel::RecvTimeoutError::Disconnected) => break,
            }

            self.poll_engine();
        }

        self.engine.shutdown();
    }

    /// Mutate the shared state and broadcast the new snapshot
    fn update(&mut self, mutate: impl FnOnce(&mut super::store::PlayerState)) {
        let snapshot = {
            let mut state = lock(&self.state);
            mutate(&mut state);
            state.clone()
        };
        self.subscribers.broadcast(&snapshot);
    }

    fn issue_token(&mut self) -> PlayToken {
        self.next_token += 1;
        let token = PlayToken(self.next_token);
        self.latest = Some(token);
        token
    }

    /// Load a station from scratch: stop whatever is playing, reset the
    /// source, and request playback — even if the station is already
    /// current, so a reselect always restarts the stream cleanly.
    fn begin_load(&mut self, station: Station) {
        let token = self.issue_token();
        self.latest_is_resume = false;
        self.desired = Desired::Playing;
        self.engine_live = false;

        debug!(station = %station.name, %token, "loading station");
        self.engine.pause();
        self.engine.set_source(&station.stream_url);
        self.engine.play(token);

        self.update(|s| {
            s.current_station = Some(station);
            s.is_loading = true;
            s.is_playing = false;
        });
    }

    /// Handle a single command. Returns true if the loop should exit.
    pub(crate) fn handle_command(&mut self, cmd: PlayerCommand) -> bool {
        match cmd {
            PlayerCommand::LoadStation(station) => {
                self.begin_load(station);
            }
            PlayerCommand::TogglePlayPause => {
                let (is_playing, current) = {
                    let state = lock(&self.state);
                    (state.is_playing, state.current_station.clone())
                };

                if is_playing {
                    // Pause is synchronous and takes effect immediately; a
                    // late success from any pending play must not undo it.
                    self.desired = Desired::Paused;
                    self.engine.pause();
                    self.update(|s| {
                        s.is_playing = false;
                        s.is_loading = false;
                    });
                } else if let Some(station) = current {
                    if self.engine_live {
                        let token = self.issue_token();
                        self.latest_is_resume = true;
                        self.desired = Desired::Playing;
                        debug!(%token, "resuming playback");
                        self.update(|s| s.is_loading = true);
                        self.engine.play(token);
                    } else {
                        // No live source (restored session, or the stream
                        // errored/ended) — resume means a fresh load.
                        self.begin_load(station);
                    }
                }
            }
            PlayerCommand::SetVolume(volume) => {
                let volume = volume.clamp(0.0, 1.0);
                self.engine.set_volume(volume);
                self.update(|s| s.volume = volume);
            }
            PlayerCommand::Restore(station) => {
                debug!(station = %station.name, "restoring session without playback");
                self.engine_live = false;
                self.desired = Desired::Paused;
                self.update(|s| {
                    s.current_station = Some(station);
                    s.is_playing = false;
                    s.is_loading = false;
                });
            }
            PlayerCommand::Shutdown => return true,
        }
        false
    }

    /// Drain pending engine events
    pub(crate) fn poll_engine(&mut self) {
        while let Some(event) = self.engine.poll_event() {
            self.handle_engine_event(event);
        }
    }

    fn handle_engine_event(&mut self, event: AudioEvent) {
        match event {
            AudioEvent::Playing(token) => {
                if Some(token) != self.latest {
                    debug!(%token, "dropping stale playback confirmation");
                    return;
                }
                self.engine_live = true;
                if self.desired != Desired::Playing {
                    // The user paused while this play was in flight; the
                    // pause dominates.
                    self.engine.pause();
                    self.update(|s| {
                        s.is_playing = false;
                        s.is_loading = false;
                    });
                    return;
                }
                self.update(|s| {
                    s.is_playing = true;
                    s.is_loading = false;
                });
            }
            AudioEvent::Failed(token, error) => {
                if Some(token) != self.latest {
                    // Superseded attempt — not an error at all.
                    debug!(%token, "dropping stale playback failure");
                    return;
                }
                warn!(%error, "playback failed");
                self.engine_live = false;
                self.desired = Desired::Paused;
                self.update(|s| {
                    s.is_playing = false;
                    s.is_loading = false;
                });
                let (kind, message) = if self.latest_is_resume {
                    (
                        NotificationKind::ResumeFailed,
                        "Could not play this station. Please try again.",
                    )
                } else {
                    (
                        NotificationKind::PlaybackFailed,
                        "Could not play this station. Please try another one.",
                    )
                };
                self.notifier.notify(kind, message);
            }
            AudioEvent::Buffering(token) => {
                // A stall report queued just before a pause landed must not
                // leave a spinner on a paused player.
                if Some(token) != self.latest || self.desired != Desired::Playing {
                    return;
                }
                // Mid-stream stall: show a spinner without tearing anything
                // down; the next Playing or Failed resolves it.
                self.update(|s| s.is_loading = true);
            }
            AudioEvent::Paused => {
                self.update(|s| s.is_playing = false);
            }
            AudioEvent::Ended => {
                // Server closed the stream: a pause, not an error. The
                // station stays current; resuming does a fresh load.
                debug!("stream ended");
                self.engine_live = false;
                self.desired = Desired::Paused;
                self.update(|s| {
                    s.is_playing = false;
                    s.is_loading = false;
                });
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notify::{self, Notification};
    use crate::player::store::{new_shared_state, PlayerState};
    use skywave::error::PlaybackError;
    use std::collections::VecDeque;
    use std::sync::{Arc, Mutex};

    /// Engine calls recorded by the mock
    #[derive(Debug, Clone, PartialEq)]
    enum MockCall {
        SetSource(String),
        Play(PlayToken),
        Pause,
        SetVolume(f32),
        Shutdown,
    }

    #[derive(Default)]
    struct MockInner {
        calls: Vec<MockCall>,
        events: VecDeque<AudioEvent>,
    }

    /// Scripted engine: records calls, replays queued events
    #[derive(Clone, Default)]
    struct MockBackend {
        inner: Arc<Mutex<MockInner>>,
    }

    impl MockBackend {
        fn push_event(&self, event: AudioEvent) {
            self.inner.lock().unwrap().events.push_back(event);
        }

        fn calls(&self) -> Vec<MockCall> {
            self.inner.lock().unwrap().calls.clone()
        }

        fn clear_calls(&self) {
            self.inner.lock().unwrap().calls.clear();
        }
    }

    impl AudioBackend for MockBackend {
        fn set_source(&mut self, url: &str) {
            self.inner
                .lock()
                .unwrap()
                .calls
                .push(MockCall::SetSource(url.to_string()));
        }
        fn play(&mut self, token: PlayToken) {
            self.inner.lock().unwrap().calls.push(MockCall::Play(token));
        }
        fn pause(&mut self) {
            self.inner.lock().unwrap().calls.push(MockCall::Pause);
        }
        fn set_volume(&mut self, volume: f32) {
            self.inner
                .lock()
                .unwrap()
                .calls
                .push(MockCall::SetVolume(volume));
        }
        fn poll_event(&mut self) -> Option<AudioEvent> {
            self.inner.lock().unwrap().events.pop_front()
        }
        fn shutdown(&mut self) {
            self.inner.lock().unwrap().calls.push(MockCall::Shutdown);
        }
    }

    struct Harness {
        orchestrator: Orchestrator<MockBackend>,
        engine: MockBackend,
        notifications: Receiver<Notification>,
    }

    impl Harness {
        fn new() -> Self {
            let engine = MockBackend::default();
            let (_cmd_tx, cmd_rx) = crossbeam_channel::unbounded();
            let (notifier, notifications) = notify::channel();
            let orchestrator = Orchestrator::new(
                engine.clone(),
                cmd_rx,
                new_shared_state(),
                Subscribers::default(),
                notifier,
            );
            Self {
                orchestrator,
                engine,
                notifications,
            }
        }

        fn state(&self) -> PlayerState {
            lock(&self.orchestrator.state).clone()
        }

        fn load(&mut self, station: Station) {
            self.orchestrator
                .handle_command(PlayerCommand::LoadStation(station));
        }

        fn toggle(&mut self) {
            self.orchestrator.handle_command(PlayerCommand::TogglePlayPause);
        }

        fn deliver(&mut self, event: AudioEvent) {
            self.engine.push_event(event);
            self.orchestrator.poll_engine();
        }

        fn assert_settled(&self) {
            let state = self.state();
            assert!(
                !(state.is_loading && state.is_playing),
                "loading and playing must never both hold at rest"
            );
        }
    }

    fn station(id: &str) -> Station {
        Station::new(id, format!("Station {id}"), format!("https://stream.example/{id}"))
    }

    #[test]
    fn test_load_sequences_pause_source_play() {
        let mut h = Harness::new();
        h.load(station("bbc"));

        assert_eq!(
            h.engine.calls(),
            vec![
                MockCall::Pause,
                MockCall::SetSource("https://stream.example/bbc".to_string()),
                MockCall::Play(PlayToken(1)),
            ]
        );

        let state = h.state();
        assert_eq!(state.current_station.as_ref().unwrap().id, "bbc");
        assert!(state.is_loading);
        assert!(!state.is_playing);
    }

    #[test]
    fn test_load_then_playing_confirmation() {
        let mut h = Harness::new();
        h.load(station("bbc"));
        h.deliver(AudioEvent::Playing(PlayToken(1)));

        let state = h.state();
        assert!(state.is_playing);
        assert!(!state.is_loading);
        h.assert_settled();
    }

    #[test]
    fn test_last_load_wins_over_late_first_result() {
        let mut h = Harness::new();
        h.load(station("a"));
        h.load(station("b"));

        // The first attempt resolves late — after the second superseded it.
        h.deliver(AudioEvent::Playing(PlayToken(1)));
        let state = h.state();
        assert_eq!(state.current_station.as_ref().unwrap().id, "b");
        assert!(!state.is_playing, "stale success must not mark playback");
        assert!(state.is_loading, "second load is still in flight");

        h.deliver(AudioEvent::Playing(PlayToken(2)));
        let state = h.state();
        assert_eq!(state.current_station.as_ref().unwrap().id, "b");
        assert!(state.is_playing);
        h.assert_settled();
    }

    #[test]
    fn test_pause_dominates_late_success() {
        let mut h = Harness::new();
        h.load(station("a"));
        h.deliver(AudioEvent::Playing(PlayToken(1)));
        assert!(h.state().is_playing);

        h.toggle(); // pause
        assert!(!h.state().is_playing);

        // A confirmation for the same token straggles in afterwards
        // (e.g. a stall-recovery edge queued before the pause landed).
        h.deliver(AudioEvent::Playing(PlayToken(1)));
        assert!(
            !h.state().is_playing,
            "pause issued after the station became current must win"
        );
        // The orchestrator re-asserted the pause on the engine.
        assert_eq!(h.engine.calls().last(), Some(&MockCall::Pause));
        h.assert_settled();
    }

    #[test]
    fn test_reselecting_current_station_restarts_stream() {
        let mut h = Harness::new();
        h.load(station("x"));
        h.deliver(AudioEvent::Playing(PlayToken(1)));
        h.engine.clear_calls();

        h.load(station("x"));
        assert_eq!(
            h.engine.calls(),
            vec![
                MockCall::Pause,
                MockCall::SetSource("https://stream.example/x".to_string()),
                MockCall::Play(PlayToken(2)),
            ]
        );
        assert!(h.state().is_loading);
    }

    #[test]
    fn test_failure_settles_state_and_notifies_once() {
        let mut h = Harness::new();
        h.load(station("bbc"));
        h.deliver(AudioEvent::Failed(
            PlayToken(1),
            PlaybackError::Network("connection refused".to_string()),
        ));

        let state = h.state();
        assert!(!state.is_playing);
        assert!(!state.is_loading);
        // Station stays current so the user can retry.
        assert_eq!(state.current_station.as_ref().unwrap().id, "bbc");

        let notes: Vec<_> = h.notifications.try_iter().collect();
        assert_eq!(notes.len(), 1);
        assert_eq!(notes[0].kind, NotificationKind::PlaybackFailed);
        h.assert_settled();
    }

    #[test]
    fn test_superseded_failure_is_silent() {
        let mut h = Harness::new();
        h.load(station("a"));
        h.load(station("b"));

        h.deliver(AudioEvent::Failed(
            PlayToken(1),
            PlaybackError::Network("too slow".to_string()),
        ));

        assert_eq!(h.notifications.try_iter().count(), 0);
        let state = h.state();
        assert_eq!(state.current_station.as_ref().unwrap().id, "b");
        assert!(state.is_loading);
    }

    #[test]
    fn test_volume_applies_in_any_state() {
        let mut h = Harness::new();
        h.orchestrator.handle_command(PlayerCommand::SetVolume(0.4));
        assert_eq!(h.state().volume, 0.4);

        h.load(station("a"));
        h.orchestrator.handle_command(PlayerCommand::SetVolume(0.9));
        assert_eq!(h.state().volume, 0.9);
        assert!(h.state().is_loading, "volume must not disturb loading");

        h.deliver(AudioEvent::Playing(PlayToken(1)));
        h.orchestrator.handle_command(PlayerCommand::SetVolume(0.1));
        assert_eq!(h.state().volume, 0.1);
        assert!(h.state().is_playing, "volume must not disturb playback");
    }

    #[test]
    fn test_volume_is_clamped() {
        let mut h = Harness::new();
        h.orchestrator.handle_command(PlayerCommand::SetVolume(1.7));
        assert_eq!(h.state().volume, 1.0);
        h.orchestrator.handle_command(PlayerCommand::SetVolume(-0.5));
        assert_eq!(h.state().volume, 0.0);
    }

    #[test]
    fn test_restore_does_not_start_playback() {
        let mut h = Harness::new();
        h.orchestrator
            .handle_command(PlayerCommand::Restore(station("saved")));

        let state = h.state();
        assert_eq!(state.current_station.as_ref().unwrap().id, "saved");
        assert!(!state.is_playing);
        assert!(!state.is_loading);
        assert!(
            h.engine.calls().is_empty(),
            "restore must not touch the engine"
        );
    }

    #[test]
    fn test_toggle_after_restore_loads_fresh() {
        let mut h = Harness::new();
        h.orchestrator
            .handle_command(PlayerCommand::Restore(station("saved")));
        h.toggle();

        // A restored station has no live source; toggling does a full load.
        assert!(h
            .engine
            .calls()
            .contains(&MockCall::SetSource("https://stream.example/saved".to_string())));
        assert!(h.state().is_loading);
    }

    #[test]
    fn test_pause_then_resume_reuses_source() {
        let mut h = Harness::new();
        h.load(station("a"));
        h.deliver(AudioEvent::Playing(PlayToken(1)));
        h.toggle(); // pause
        h.engine.clear_calls();

        h.toggle(); // resume
        assert_eq!(h.engine.calls(), vec![MockCall::Play(PlayToken(2))]);
        assert!(h.state().is_loading);

        h.deliver(AudioEvent::Playing(PlayToken(2)));
        assert!(h.state().is_playing);
        h.assert_settled();
    }

    #[test]
    fn test_resume_failure_uses_resume_notification() {
        let mut h = Harness::new();
        h.load(station("a"));
        h.deliver(AudioEvent::Playing(PlayToken(1)));
        h.toggle(); // pause
        h.toggle(); // resume
        h.deliver(AudioEvent::Failed(
            PlayToken(2),
            PlaybackError::Network("gone".to_string()),
        ));

        let notes: Vec<_> = h.notifications.try_iter().collect();
        assert_eq!(notes.len(), 1);
        assert_eq!(notes[0].kind, NotificationKind::ResumeFailed);
    }

    #[test]
    fn test_ended_is_a_pause_not_an_error() {
        let mut h = Harness::new();
        h.load(station("a"));
        h.deliver(AudioEvent::Playing(PlayToken(1)));
        h.deliver(AudioEvent::Ended);

        let state = h.state();
        assert!(!state.is_playing);
        assert!(!state.is_loading);
        assert_eq!(state.current_station.as_ref().unwrap().id, "a");
        assert_eq!(h.notifications.try_iter().count(), 0);

        // Resuming after the server closed the stream reconnects fresh.
        h.engine.clear_calls();
        h.toggle();
        assert!(h
            .engine
            .calls()
            .contains(&MockCall::SetSource("https://stream.example/a".to_string())));
    }

    #[test]
    fn test_buffering_shows_loading_without_teardown() {
        let mut h = Harness::new();
        h.load(station("a"));
        h.deliver(AudioEvent::Playing(PlayToken(1)));
        h.deliver(AudioEvent::Buffering(PlayToken(1)));

        let state = h.state();
        assert!(state.is_loading);
        assert!(state.is_playing, "a stall does not un-play the station");

        h.deliver(AudioEvent::Playing(PlayToken(1)));
        assert!(!h.state().is_loading);
        h.assert_settled();
    }

    #[test]
    fn test_stale_buffering_is_ignored() {
        let mut h = Harness::new();
        h.load(station("a"));
        h.load(station("b"));
        h.deliver(AudioEvent::Playing(PlayToken(2)));

        h.deliver(AudioEvent::Buffering(PlayToken(1)));
        assert!(!h.state().is_loading);
    }

    #[test]
    fn test_toggle_with_nothing_loaded_is_noop() {
        let mut h = Harness::new();
        h.toggle();
        assert!(h.engine.calls().is_empty());
        assert_eq!(h.state(), PlayerState::default());
    }

    #[test]
    fn test_failure_then_toggle_retries_fresh() {
        let mut h = Harness::new();
        h.load(station("a"));
        h.deliver(AudioEvent::Failed(
            PlayToken(1),
            PlaybackError::UnsupportedFormat("aac".to_string()),
        ));
        h.engine.clear_calls();

        h.toggle();
        assert!(h
            .engine
            .calls()
            .contains(&MockCall::SetSource("https://stream.example/a".to_string())));
        assert!(h.state().is_loading);
    }

    #[test]
    fn test_subscribers_see_state_changes() {
        let engine = MockBackend::default();
        let (_cmd_tx, cmd_rx) = crossbeam_channel::unbounded();
        let (notifier, _notifications) = notify::channel();
        let subscribers = Subscribers::default();
        let rx = subscribers.subscribe();
        let mut orchestrator = Orchestrator::new(
            engine.clone(),
            cmd_rx,
            new_shared_state(),
            subscribers,
            notifier,
        );

        orchestrator.handle_command(PlayerCommand::LoadStation(station("a")));
        engine.push_event(AudioEvent::Playing(PlayToken(1)));
        orchestrator.poll_engine();

        let snapshots: Vec<PlayerState> = rx.try_iter().collect();
        assert!(snapshots.len() >= 2);
        assert!(snapshots.first().unwrap().is_loading);
        assert!(snapshots.last().unwrap().is_playing);
    }
}
