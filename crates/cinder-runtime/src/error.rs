//! Error types for runtime operations

/// Result type for runtime operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while selecting devices, managing buffers,
/// building programs, or dispatching kernels
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// No device matched the requested filter
    #[error("no device found matching filter `{filter}`")]
    NoDeviceFound { filter: String },

    /// Kernel source file could not be read
    #[error("kernel source not found at `{path}`: {reason}")]
    SourceNotFound { path: String, reason: String },

    /// Program build rejected the kernel source
    #[error("kernel program build failed:\n{diagnostic}")]
    BuildFailure { diagnostic: String },

    /// Named entry point is not present in the compiled program
    #[error("entry point `{0}` not found in compiled program")]
    EntryPointNotFound(String),

    /// Device allocation could not be satisfied
    #[error("buffer allocation failed: {0}")]
    AllocationFailure(String),

    /// Kernel launch was rejected or aborted
    #[error("kernel dispatch failed: {0}")]
    DispatchFailure(String),

    /// Device-to-host copy could not complete
    #[error("device read-back failed: {0}")]
    ReadbackFailure(String),

    /// Host data length does not fit the buffer
    #[error("buffer size mismatch: expected {expected}, got {actual}")]
    BufferSizeMismatch { expected: usize, actual: usize },

    /// Invalid buffer handle
    #[error("invalid buffer handle: {0}")]
    InvalidBufferHandle(u64),

    /// Event timestamps queried before the queue was drained
    #[error("event timestamps are not available until the queue is drained")]
    EventNotReady,
}

impl Error {
    /// Create a no-device error from a filter description
    pub fn no_device(filter: impl std::fmt::Display) -> Self {
        Self::NoDeviceFound {
            filter: filter.to_string(),
        }
    }

    /// Create a dispatch failure from a message
    pub fn dispatch(msg: impl Into<String>) -> Self {
        Self::DispatchFailure(msg.into())
    }

    /// Create a build failure carrying the build log verbatim
    pub fn build(diagnostic: impl Into<String>) -> Self {
        Self::BuildFailure {
            diagnostic: diagnostic.into(),
        }
    }
}
