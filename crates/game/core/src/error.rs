//! Common error infrastructure for game-core.
//!
//! Every failure this crate can report while interpreting a server snapshot is
//! a [`ConfigurationError`]: the payload described a table the client cannot
//! lay out. Such errors are fatal for the current frame; callers are expected
//! to keep the previous table on screen rather than render a partial one.

use thiserror::Error;

use crate::ids::PlayerId;

/// Severity level of an error, used for categorization and logging.
///
/// - **Validation**: Invalid input that should be rejected without retry
/// - **Internal**: Unexpected state inconsistencies that require investigation
/// - **Fatal**: The table cannot be rendered from this input at all
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ErrorSeverity {
    /// Invalid input, should not retry without changes.
    Validation,

    /// Unexpected state inconsistency between collaborators.
    ///
    /// These indicate bugs and should be investigated.
    Internal,

    /// Unrecoverable for the current snapshot.
    Fatal,
}

impl ErrorSeverity {
    /// Returns a human-readable description of this severity level.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Validation => "validation",
            Self::Internal => "internal",
            Self::Fatal => "fatal",
        }
    }

    /// Returns true if this error indicates a bug or an unusable payload.
    pub const fn is_internal(&self) -> bool {
        matches!(self, Self::Internal | Self::Fatal)
    }
}

/// Common trait for all errors surfaced by the table synchronizer.
///
/// - Use `#[derive(thiserror::Error)]` for Display/Error impl
/// - Classify severity based on recoverability, not impact
pub trait GameError: core::fmt::Display + core::fmt::Debug {
    /// Returns the severity level of this error.
    fn severity(&self) -> ErrorSeverity;

    /// Returns a static string identifier for this error variant.
    ///
    /// Default implementation uses the error type name.
    fn error_code(&self) -> &'static str {
        core::any::type_name::<Self>()
    }
}

/// The snapshot describes a table the client cannot lay out.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ConfigurationError {
    #[error("player count {count} is outside the supported range 1..=4")]
    InvalidPlayerCount { count: usize },

    #[error("hand index {index} is outside the fixed 6-slot hand")]
    HandIndexOutOfRange { index: usize },

    #[error("player {player} has {len} hand slots, at most 6 are allowed")]
    HandOverflow { player: PlayerId, len: usize },

    #[error("invalid card code {code:?}")]
    InvalidCardCode { code: String },

    #[error("unknown action target {tag:?}")]
    UnknownTarget { tag: String },

    #[error("invalid player id key {key:?} in playable cards")]
    InvalidPlayerKey { key: String },
}

impl GameError for ConfigurationError {
    fn severity(&self) -> ErrorSeverity {
        ErrorSeverity::Fatal
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidPlayerCount { .. } => "INVALID_PLAYER_COUNT",
            Self::HandIndexOutOfRange { .. } => "HAND_INDEX_OUT_OF_RANGE",
            Self::HandOverflow { .. } => "HAND_OVERFLOW",
            Self::InvalidCardCode { .. } => "INVALID_CARD_CODE",
            Self::UnknownTarget { .. } => "UNKNOWN_TARGET",
            Self::InvalidPlayerKey { .. } => "INVALID_PLAYER_KEY",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn configuration_errors_are_fatal() {
        let err = ConfigurationError::InvalidPlayerCount { count: 5 };
        assert_eq!(err.severity(), ErrorSeverity::Fatal);
        assert!(err.severity().is_internal());
        assert_eq!(err.error_code(), "INVALID_PLAYER_COUNT");
    }

    #[test]
    fn display_names_the_offending_value() {
        let err = ConfigurationError::HandOverflow {
            player: PlayerId(7),
            len: 8,
        };
        assert_eq!(
            err.to_string(),
            "player #7 has 8 hand slots, at most 6 are allowed"
        );
    }
}
