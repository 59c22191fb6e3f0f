//! Configuration constants for the skywave engine

/// Network-related configuration
pub mod network {
    /// User agent for HTTP requests
    pub const USER_AGENT: &str = concat!("Skywave/", env!("CARGO_PKG_VERSION"));

    /// Connection timeout in seconds
    pub const CONNECT_TIMEOUT_SECS: u64 = 10;

    /// Read timeout in seconds
    pub const READ_TIMEOUT_SECS: u64 = 30;
}

/// Engine loop configuration
pub mod engine {
    /// Command poll interval for the engine thread (milliseconds)
    pub const POLL_INTERVAL_MS: u64 = 50;

    /// Time without receiving stream data before reporting a stall (seconds)
    pub const STREAM_STALL_TIMEOUT_SECS: u64 = 5;
}

/// Stream buffer configuration
pub mod buffer {
    /// Compact the buffer once consumed data exceeds this threshold (bytes)
    pub const COMPACTION_THRESHOLD: usize = 2 * 1024 * 1024;

    /// Keep this many bytes before the read cursor on compaction
    /// (safety margin for decoder seek-back)
    pub const COMPACTION_SAFETY_MARGIN: usize = 64 * 1024;

    /// Chunk size for reads from the inner network reader (bytes)
    pub const FILL_CHUNK_SIZE: usize = 8 * 1024;
}
