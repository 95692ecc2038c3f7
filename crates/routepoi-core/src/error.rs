//! Error taxonomy shared by every routepoi crate.

use std::fmt;
use thiserror::Error;

/// Which half of a write-back failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteBackStage {
    /// Re-fetching the remote route before merging.
    Fetch,
    /// Submitting the merged POI list.
    Write,
}

impl fmt::Display for WriteBackStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WriteBackStage::Fetch => write!(f, "fetch"),
            WriteBackStage::Write => write!(f, "write"),
        }
    }
}

#[derive(Debug, Clone, Error)]
pub enum PoiError {
    /// Rejected before any external call was made.
    #[error("invalid input: {message}")]
    InvalidInput { message: String },

    /// Transport, HTTP status or top-level payload failure from one provider.
    #[error("{}", provider_message(.provider, .message, .status_code))]
    Provider {
        provider: String,
        message: String,
        status_code: Option<u16>,
    },

    /// The provider answered successfully with zero matches.
    #[error("no POIs found by provider '{provider}'")]
    NoResults { provider: String },

    /// Reconciliation aborted; nothing was written.
    #[error("{}", write_back_message(.stage, .message, .status_code))]
    WriteBack {
        stage: WriteBackStage,
        message: String,
        status_code: Option<u16>,
    },
}

fn provider_message(provider: &str, message: &str, status_code: &Option<u16>) -> String {
    match status_code {
        Some(code) => format!("provider '{}' failed (HTTP {}): {}", provider, code, message),
        None => format!("provider '{}' failed: {}", provider, message),
    }
}

fn write_back_message(stage: &WriteBackStage, message: &str, status_code: &Option<u16>) -> String {
    match status_code {
        Some(code) => format!("write-back {} failed (HTTP {}): {}", stage, code, message),
        None => format!("write-back {} failed: {}", stage, message),
    }
}

impl PoiError {
    pub fn invalid(message: impl Into<String>) -> Self {
        PoiError::InvalidInput {
            message: message.into(),
        }
    }

    pub fn provider(provider: impl Into<String>, message: impl Into<String>) -> Self {
        PoiError::Provider {
            provider: provider.into(),
            message: message.into(),
            status_code: None,
        }
    }

    pub fn provider_status(
        provider: impl Into<String>,
        status_code: u16,
        message: impl Into<String>,
    ) -> Self {
        PoiError::Provider {
            provider: provider.into(),
            message: message.into(),
            status_code: Some(status_code),
        }
    }

    pub fn no_results(provider: impl Into<String>) -> Self {
        PoiError::NoResults {
            provider: provider.into(),
        }
    }

    pub fn write_back(stage: WriteBackStage, message: impl Into<String>) -> Self {
        PoiError::WriteBack {
            stage,
            message: message.into(),
            status_code: None,
        }
    }

    pub fn write_back_status(
        stage: WriteBackStage,
        status_code: u16,
        message: impl Into<String>,
    ) -> Self {
        PoiError::WriteBack {
            stage,
            message: message.into(),
            status_code: Some(status_code),
        }
    }

    pub fn is_no_results(&self) -> bool {
        matches!(self, PoiError::NoResults { .. })
    }

    /// Stable snake_case name used in API error bodies.
    pub fn kind(&self) -> &'static str {
        match self {
            PoiError::InvalidInput { .. } => "invalid_input",
            PoiError::Provider { .. } => "provider",
            PoiError::NoResults { .. } => "no_results",
            PoiError::WriteBack { .. } => "write_back",
        }
    }
}

/// Result type alias for routepoi operations.
pub type Result<T> = std::result::Result<T, PoiError>;
