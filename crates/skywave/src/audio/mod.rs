//! Audio subsystem
//!
//! The engine thread, the buffered stream reader it decodes from, and the
//! command/event types shared with the layer above.

pub mod engine;
pub mod stream;
pub mod types;

pub use engine::{AudioBackend, StreamEngine};
pub use stream::StreamReader;
pub use types::{AudioCommand, AudioEvent, PlayToken};
