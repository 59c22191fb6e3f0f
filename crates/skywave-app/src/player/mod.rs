//! Playback state machine
//!
//! `store` holds the shared state and the public handle; `orchestrator`
//! owns the engine and runs the controller loop.

pub mod orchestrator;
pub mod store;

use std::thread::{self, JoinHandle};

use crossbeam_channel::unbounded;
use skywave::audio::AudioBackend;

use crate::notify::Notifier;

pub use orchestrator::Orchestrator;
pub use store::{PlayerCommand, PlayerHandle, PlayerState, Subscribers};

/// Wire up a player around an engine and start its controller thread.
///
/// Returns the public handle plus the controller's join handle; the loop
/// exits (and releases the engine) once `PlayerHandle::shutdown` is called
/// or every handle clone is dropped.
pub fn spawn_player<B: AudioBackend + 'static>(
    engine: B,
    notifier: Notifier,
) -> (PlayerHandle, JoinHandle<()>) {
    let (cmd_tx, cmd_rx) = unbounded();
    let state = store::new_shared_state();
    let subscribers = Subscribers::default();
    let handle = PlayerHandle::new(cmd_tx, state.clone(), subscribers.clone());

    let thread = thread::Builder::new()
        .name("player".to_string())
        .spawn(move || {
            Orchestrator::new(engine, cmd_rx, state, subscribers, notifier).run();
        })
        .expect("Failed to spawn player thread");

    (handle, thread)
}
