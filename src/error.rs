//! Error handling for the pinout diagram crate.

/// A specialized `Result` type for pinout operations.
pub type Result<T> = std::result::Result<T, PinoutError>;

/// The main error type for pin state ingestion and diagram rendering.
#[derive(Debug, thiserror::Error)]
pub enum PinoutError {
    /// The pin query tool could not be found on this system
    #[error("Pin query tool not found: {0}")]
    ToolUnavailable(String),

    /// A line of query output did not match the expected grammar
    #[error("Unexpected value in pin query output: {line:?}")]
    MalformedLine { line: String },

    /// A line referenced a different GPIO than the one it reported
    #[error("GPIO index mismatch: expected GPIO{expected}, found GPIO{found}")]
    IndexMismatch { expected: usize, found: usize },

    /// The query tool returned the wrong number of lines
    #[error("Expected {expected} lines of pin query output, got {actual}")]
    LineCount { expected: usize, actual: usize },

    /// An interface label outside the fixed label set was requested
    #[error("Invalid interface \"{0}\"")]
    InvalidLabel(String),

    /// A highlight pattern compiled neither as a regex nor as a glob
    #[error("Invalid search pattern \"{pattern}\": {reason}")]
    InvalidPattern { pattern: String, reason: String },

    /// The query process could not be run
    #[error("Pin query failed: {0}")]
    Adapter(String),

    /// The GPIO device could not be read
    #[error("GPIO device error: {0}")]
    Device(String),

    /// I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON export failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl PinoutError {
    /// Create a new malformed line error
    pub fn malformed_line(line: impl Into<String>) -> Self {
        Self::MalformedLine { line: line.into() }
    }

    /// Create a new adapter error
    pub fn adapter_error(msg: impl Into<String>) -> Self {
        Self::Adapter(msg.into())
    }

    /// Create a new device error
    pub fn device_error(msg: impl Into<String>) -> Self {
        Self::Device(msg.into())
    }

    /// Errors that only invalidate the current refresh cycle.
    ///
    /// The previous pin table is kept and the next tick is an independent attempt.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            Self::MalformedLine { .. }
                | Self::IndexMismatch { .. }
                | Self::LineCount { .. }
                | Self::ToolUnavailable(_)
        )
    }

    /// Misconfiguration errors that must stop the process before rendering.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::InvalidLabel(_) | Self::InvalidPattern { .. } | Self::Adapter(_)
        )
    }
}
