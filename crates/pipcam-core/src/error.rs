#![forbid(unsafe_code)]

//! Error types shared across the crate.

use thiserror::Error;

use crate::capture::CameraSide;

/// Failures reported by capture-session capabilities.
///
/// None of these are fatal. The mitigation ladder treats every variant as
/// "not applicable" and moves on to the next action.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CaptureError {
    /// The action could not improve anything given current device state.
    #[error("reduction not applicable")]
    NotApplicable,
    /// The device configuration lock could not be acquired.
    #[error("could not lock {side} camera for configuration: {reason}")]
    ConfigurationLockFailed { side: CameraSide, reason: String },
    /// The device refused to activate a format.
    #[error("{side} camera rejected format {width}x{height}")]
    FormatRejected {
        side: CameraSide,
        width: u32,
        height: u32,
    },
    /// The session refused a rebuilt input connection.
    #[error("could not add new connection to the session: {0}")]
    ConnectionRejected(String),
}

/// Failures loading or validating [`PipConfig`](crate::config::PipConfig).
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[cfg(feature = "policy-config")]
    #[error("failed to parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}
