#![forbid(unsafe_code)]

use std::path::PathBuf;

use pipcam_core::{ConfigError, ExceededCosts};
use thiserror::Error;

pub type Result<T> = std::result::Result<T, HarnessError>;

const EXIT_FAILURE: i32 = 1;
const EXIT_USAGE: i32 = 2;
const EXIT_INPUT: i32 = 3;
const EXIT_UNRESOLVED: i32 = 4;

#[derive(Debug, Error)]
pub enum HarnessError {
    #[error("invalid argument: {message}")]
    InvalidArgument { message: String },

    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    #[error("failed to read {path}: {source}")]
    ReadInput {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed scenario {path}: {source}")]
    Scenario {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("session cost still exceeded after mitigation: {remaining:?}")]
    Unresolved { remaining: ExceededCosts },

    #[error("failed to write report: {0}")]
    Output(#[from] std::io::Error),

    #[error("failed to encode report: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("failed to initialize logging: {0}")]
    Logging(String),
}

impl HarnessError {
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            message: message.into(),
        }
    }

    #[must_use]
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::InvalidArgument { .. } | Self::Config(_) => EXIT_USAGE,
            Self::ReadInput { .. } | Self::Scenario { .. } => EXIT_INPUT,
            Self::Unresolved { .. } => EXIT_UNRESOLVED,
            Self::Output(_) | Self::Encode(_) | Self::Logging(_) => EXIT_FAILURE,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exit_codes_group_by_cause() {
        assert_eq!(HarnessError::invalid_argument("x").exit_code(), EXIT_USAGE);
        assert_eq!(
            HarnessError::Config(ConfigError::Invalid("bad".into())).exit_code(),
            EXIT_USAGE
        );
        let missing = HarnessError::ReadInput {
            path: PathBuf::from("scenario.json"),
            source: std::io::Error::from(std::io::ErrorKind::NotFound),
        };
        assert_eq!(missing.exit_code(), EXIT_INPUT);
        assert_eq!(
            HarnessError::Unresolved {
                remaining: ExceededCosts::HARDWARE
            }
            .exit_code(),
            EXIT_UNRESOLVED
        );
    }

    #[test]
    fn read_error_names_the_path() {
        let err = HarnessError::ReadInput {
            path: PathBuf::from("drag.json"),
            source: std::io::Error::from(std::io::ErrorKind::NotFound),
        };
        assert!(err.to_string().starts_with("failed to read drag.json"));
    }
}
