//! Error types for the JSON repair and completion modules.
//!
//! `LineBuffer` and `SseParser` have no fallible operations in this port:
//! growth is handled by `Vec`, whose allocation failure aborts the process
//! rather than producing a recoverable error (see DESIGN.md).

/// Error returned by [`crate::json::repair`] when the output buffer cannot
/// hold the repaired JSON.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum RepairError {
    /// The caller-provided output buffer is too small to hold the repaired
    /// JSON (including reserved closer/terminator space).
    #[error("output buffer too small: need at least {needed} bytes, have {available}")]
    BufferTooSmall {
        /// Minimum number of bytes the output buffer must provide.
        needed: usize,
        /// Bytes actually available in the caller's output buffer.
        available: usize,
    },
}

/// Error returned by [`crate::json::completer`] when the output buffer
/// cannot hold the completed JSON.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum CompleterError {
    /// The caller-provided output buffer is too small to hold
    /// `input[..end_offset] ++ suffix` plus the NUL terminator.
    #[error("output buffer too small: need at least {needed} bytes, have {available}")]
    BufferTooSmall {
        /// Minimum number of bytes the output buffer must provide.
        needed: usize,
        /// Bytes actually available in the caller's output buffer.
        available: usize,
    },
}
