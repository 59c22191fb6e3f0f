//! Playback state store
//!
//! The single source of truth for playback state. `PlayerState` lives
//! behind a shared mutex written only by the orchestrator; `PlayerHandle`
//! is the surface every consumer gets — readers see the snapshot, writers
//! go through commands, and subscribers receive a fresh snapshot on every
//! change. Dozens of concurrently rendered surfaces can each ask "is it
//! me?" via the station-id helpers without keeping private state.

use std::sync::{Arc, Mutex, MutexGuard};

use crossbeam_channel::{unbounded, Receiver, Sender};

use crate::config::player::DEFAULT_VOLUME;
use crate::data::types::Station;

/// Snapshot of playback state
#[derive(Debug, Clone, PartialEq)]
pub struct PlayerState {
    /// Station selected for playback; survives errors so retry stays possible
    pub current_station: Option<Station>,
    /// True only once the engine confirms audio is flowing
    pub is_playing: bool,
    /// True while a load or resume is in flight, or the stream is stalled
    pub is_loading: bool,
    /// Volume level in 0.0..=1.0; memory-only
    pub volume: f32,
}

impl Default for PlayerState {
    fn default() -> Self {
        Self {
            current_station: None,
            is_playing: false,
            is_loading: false,
            volume: DEFAULT_VOLUME,
        }
    }
}

impl PlayerState {
    /// Whether the station with this id is the one currently playing
    pub fn is_station_playing(&self, id: &str) -> bool {
        self.is_playing && self.current_station.as_ref().is_some_and(|s| s.id == id)
    }

    /// Whether the station with this id is the one currently loading
    pub fn is_station_loading(&self, id: &str) -> bool {
        self.is_loading && self.current_station.as_ref().is_some_and(|s| s.id == id)
    }
}

/// Shared state handle, written only by the orchestrator
pub type SharedState = Arc<Mutex<PlayerState>>;

/// Create a fresh shared state
pub fn new_shared_state() -> SharedState {
    Arc::new(Mutex::new(PlayerState::default()))
}

/// Lock the shared state, recovering from poisoning
pub(crate) fn lock(state: &SharedState) -> MutexGuard<'_, PlayerState> {
    state.lock().unwrap_or_else(|e| e.into_inner())
}

/// Commands accepted by the orchestrator
#[derive(Debug)]
pub enum PlayerCommand {
    /// Load a station and start playing it
    LoadStation(Station),
    /// Pause if playing, otherwise play/resume the current station
    TogglePlayPause,
    /// Set volume (0.0..=1.0)
    SetVolume(f32),
    /// Populate the current station without starting playback
    /// (session restore at startup)
    Restore(Station),
    /// Stop the controller loop and release the engine
    Shutdown,
}

/// Fan-out of state change notifications.
///
/// Each change broadcasts a full snapshot; receivers that have gone away
/// are pruned on the next broadcast.
#[derive(Clone, Default)]
pub struct Subscribers {
    senders: Arc<Mutex<Vec<Sender<PlayerState>>>>,
}

impl Subscribers {
    /// Register a new subscriber
    pub fn subscribe(&self) -> Receiver<PlayerState> {
        let (tx, rx) = unbounded();
        self.senders
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(tx);
        rx
    }

    /// Send a snapshot to every live subscriber
    pub fn broadcast(&self, state: &PlayerState) {
        self.senders
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .retain(|tx| tx.send(state.clone()).is_ok());
    }
}

/// Public player surface handed to every consumer
#[derive(Clone)]
pub struct PlayerHandle {
    cmd_tx: Sender<PlayerCommand>,
    state: SharedState,
    subscribers: Subscribers,
}

impl PlayerHandle {
    pub fn new(cmd_tx: Sender<PlayerCommand>, state: SharedState, subscribers: Subscribers) -> Self {
        Self {
            cmd_tx,
            state,
            subscribers,
        }
    }

    /// Load a station and start playing it.
    ///
    /// Safe to call on the already-current station (the stream restarts)
    /// and safe to call rapidly in succession (only the last call wins).
    pub fn load_station(&self, station: Station) {
        let _ = self.cmd_tx.send(PlayerCommand::LoadStation(station));
    }

    /// Pause if playing, otherwise play/resume the current station
    pub fn toggle_play_pause(&self) {
        let _ = self.cmd_tx.send(PlayerCommand::TogglePlayPause);
    }

    /// Set the volume. Never blocks and never fails.
    pub fn set_volume(&self, volume: f32) {
        let _ = self.cmd_tx.send(PlayerCommand::SetVolume(volume));
    }

    /// Populate the current station without starting playback
    pub fn restore(&self, station: Station) {
        let _ = self.cmd_tx.send(PlayerCommand::Restore(station));
    }

    /// Stop the player
    pub fn shutdown(&self) {
        let _ = self.cmd_tx.send(PlayerCommand::Shutdown);
    }

    /// Current state snapshot
    pub fn snapshot(&self) -> PlayerState {
        lock(&self.state).clone()
    }

    /// Whether the station with this id is currently playing
    pub fn is_station_playing(&self, id: &str) -> bool {
        lock(&self.state).is_station_playing(id)
    }

    /// Whether the station with this id is currently loading
    pub fn is_station_loading(&self, id: &str) -> bool {
        lock(&self.state).is_station_loading(id)
    }

    /// Receive a snapshot on every state change
    pub fn subscribe(&self) -> Receiver<PlayerState> {
        self.subscribers.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn station(id: &str) -> Station {
        Station::new(id, format!("Station {id}"), format!("http://s.example/{id}"))
    }

    #[test]
    fn test_default_state() {
        let state = PlayerState::default();
        assert_eq!(state.current_station, None);
        assert!(!state.is_playing);
        assert!(!state.is_loading);
        assert_eq!(state.volume, DEFAULT_VOLUME);
    }

    #[test]
    fn test_is_station_playing_matches_id() {
        let state = PlayerState {
            current_station: Some(station("bbc")),
            is_playing: true,
            ..PlayerState::default()
        };
        assert!(state.is_station_playing("bbc"));
        assert!(!state.is_station_playing("other"));
        assert!(!state.is_station_loading("bbc"));
    }

    #[test]
    fn test_is_station_playing_false_when_paused() {
        let state = PlayerState {
            current_station: Some(station("bbc")),
            is_playing: false,
            ..PlayerState::default()
        };
        assert!(!state.is_station_playing("bbc"));
    }

    #[test]
    fn test_is_station_loading() {
        let state = PlayerState {
            current_station: Some(station("bbc")),
            is_loading: true,
            ..PlayerState::default()
        };
        assert!(state.is_station_loading("bbc"));
        assert!(!state.is_station_loading("other"));
    }

    #[test]
    fn test_handle_enqueues_commands() {
        let (tx, rx) = unbounded();
        let handle = PlayerHandle::new(tx, new_shared_state(), Subscribers::default());

        handle.load_station(station("a"));
        handle.toggle_play_pause();
        handle.set_volume(0.5);

        assert!(matches!(rx.try_recv().unwrap(), PlayerCommand::LoadStation(_)));
        assert!(matches!(rx.try_recv().unwrap(), PlayerCommand::TogglePlayPause));
        assert!(matches!(rx.try_recv().unwrap(), PlayerCommand::SetVolume(_)));
    }

    #[test]
    fn test_handle_snapshot_reflects_shared_state() {
        let (tx, _rx) = unbounded();
        let state = new_shared_state();
        let handle = PlayerHandle::new(tx, state.clone(), Subscribers::default());

        lock(&state).current_station = Some(station("x"));
        lock(&state).is_playing = true;

        assert!(handle.is_station_playing("x"));
        assert_eq!(handle.snapshot().current_station.unwrap().id, "x");
    }

    #[test]
    fn test_broadcast_reaches_all_subscribers() {
        let subs = Subscribers::default();
        let rx1 = subs.subscribe();
        let rx2 = subs.subscribe();

        let state = PlayerState {
            volume: 0.3,
            ..PlayerState::default()
        };
        subs.broadcast(&state);

        assert_eq!(rx1.try_recv().unwrap().volume, 0.3);
        assert_eq!(rx2.try_recv().unwrap().volume, 0.3);
    }

    #[test]
    fn test_broadcast_prunes_dropped_subscribers() {
        let subs = Subscribers::default();
        let rx1 = subs.subscribe();
        let rx2 = subs.subscribe();
        drop(rx2);

        subs.broadcast(&PlayerState::default());
        subs.broadcast(&PlayerState::default());

        assert_eq!(rx1.try_iter().count(), 2);
        assert_eq!(subs.senders.lock().unwrap().len(), 1);
    }
}
