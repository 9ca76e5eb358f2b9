//! Error types for FireTeam
//!
//! One error enum covers the whole subsystem. Collaborator failures
//! (network sensing, presentation, persistence) are modelled explicitly so the
//! runtime can log and swallow them without letting them reach the state
//! machines.

// ----------------------------------------------------------------------------
// Error Type
// ----------------------------------------------------------------------------

/// Errors produced by FireTeam components and their collaborators
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FireteamError {
    /// The platform could not report the current network state
    #[error("Network unavailable: {reason}")]
    NetworkUnavailable { reason: String },

    /// Sound, haptic or notification dispatch failed
    #[error("Presentation failure: {reason}")]
    Presentation { reason: String },

    /// Identity could not be loaded or saved
    #[error("Persistence failure: {reason}")]
    Persistence { reason: String },

    /// An alert was requested without a display name
    #[error("A display name is required before raising an alert")]
    IdentityRequired,

    /// Configuration values are inconsistent
    #[error("Invalid configuration: {reason}")]
    InvalidConfiguration { reason: String },

    /// Communication with the core logic task failed
    #[error("Channel error: {message}")]
    Channel { message: String },

    /// The runtime has not been started or was already stopped
    #[error("Runtime is not running")]
    NotRunning,

    /// `start()` was called on a running runtime
    #[error("Runtime is already running")]
    AlreadyRunning,
}

// ----------------------------------------------------------------------------
// Convenience Error Constructors
// ----------------------------------------------------------------------------

impl FireteamError {
    /// Create a network unavailable error with a reason
    pub fn network_unavailable<T: Into<String>>(reason: T) -> Self {
        FireteamError::NetworkUnavailable {
            reason: reason.into(),
        }
    }

    /// Create a presentation failure with a reason
    pub fn presentation<T: Into<String>>(reason: T) -> Self {
        FireteamError::Presentation {
            reason: reason.into(),
        }
    }

    /// Create a persistence failure with a reason
    pub fn persistence<T: Into<String>>(reason: T) -> Self {
        FireteamError::Persistence {
            reason: reason.into(),
        }
    }

    /// Create a configuration error with a reason
    pub fn config_error<T: Into<String>>(reason: T) -> Self {
        FireteamError::InvalidConfiguration {
            reason: reason.into(),
        }
    }

    /// Create a channel error with a message
    pub fn channel_error<T: Into<String>>(message: T) -> Self {
        FireteamError::Channel {
            message: message.into(),
        }
    }

    /// Whether the next scheduled attempt is expected to recover on its own
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            FireteamError::NetworkUnavailable { .. } | FireteamError::Presentation { .. }
        )
    }
}

// ----------------------------------------------------------------------------
// Type Aliases
// ----------------------------------------------------------------------------

pub type FireteamResult<T> = core::result::Result<T, FireteamError>;
