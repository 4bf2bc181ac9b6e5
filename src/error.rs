//! Error types for framesim.
//!
//! All errors are strongly typed using thiserror. Parse and configuration
//! errors are meant for user-facing display by the host; state errors signal
//! host integration bugs and are returned, never silently swallowed.

use thiserror::Error;

use crate::runner::RunState;

/// Errors produced while parsing a reference string.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// The input contained no token that parses as a page number.
    #[error("reference string contains no usable page numbers ({skipped} tokens skipped)")]
    NoUsableTokens {
        /// Tokens that were present but failed to parse.
        skipped: usize,
    },
}

/// Errors produced while validating simulation configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("frame count {value} is out of range [1, 7]")]
    FrameCountOutOfRange {
        value: usize,
    },

    #[error("unknown replacement algorithm: '{name}'")]
    UnknownAlgorithm {
        name: String,
    },

    #[error("no reference string has been processed")]
    MissingReferenceString,

    #[error("no replacement algorithm has been selected")]
    NoAlgorithmSelected,
}

/// Errors produced by the runner state machine and driver plumbing.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StateError {
    /// The requested transition is not legal from the current state.
    #[error("cannot {action} while {state}")]
    InvalidTransition {
        /// The attempted operation (`"pause"`, `"resume"`, ...).
        action: &'static str,
        /// The state the runner was in.
        state: RunState,
    },

    /// A driver channel closed while a peer was still using it.
    #[error("simulation channel disconnected: {path}")]
    Disconnected {
        path: String,
    },

    /// A blocking receive on an event stream timed out.
    #[error("timed out after {duration_ms}ms waiting for a simulation event")]
    Timeout {
        duration_ms: u64,
    },
}

/// Top-level error type for framesim.
///
/// Encompasses every failure the engine can surface to a host.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SimulatorError {
    #[error("parse error: {0}")]
    Parse(#[from] ParseError),

    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("state error: {0}")]
    State(#[from] StateError),

    #[error("internal error: {message}")]
    Internal {
        message: String,
    },
}

impl SimulatorError {
    /// Creates an internal error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Returns true if this is a parse error.
    #[must_use]
    pub const fn is_parse(&self) -> bool {
        matches!(self, Self::Parse(_))
    }

    /// Returns true if this is a configuration error.
    #[must_use]
    pub const fn is_config(&self) -> bool {
        matches!(self, Self::Config(_))
    }

    /// Returns true if this is a state error.
    #[must_use]
    pub const fn is_state(&self) -> bool {
        matches!(self, Self::State(_))
    }

    /// Returns true if this is an internal error.
    #[must_use]
    pub const fn is_internal(&self) -> bool {
        matches!(self, Self::Internal { .. })
    }

    /// Returns true if this error indicates a host integration bug rather
    /// than bad user input.
    #[must_use]
    pub const fn is_programming_error(&self) -> bool {
        matches!(
            self,
            Self::State(StateError::InvalidTransition { .. }) | Self::Internal { .. }
        )
    }
}

/// Result type alias for framesim operations.
pub type SimResult<T> = Result<T, SimulatorError>;
