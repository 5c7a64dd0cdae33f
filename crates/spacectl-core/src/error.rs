use std::fmt;

use thiserror::Error;

use crate::model::{CollectionKind, ObservedState};
use crate::transport::TransportError;

/// Remote operation a failure is attributed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    CreateSpace,
    ReadSpace,
    RenameSpace,
    UpdateVisibility,
    ListEntries(CollectionKind),
    DeleteEntry(CollectionKind),
    AddEntry(CollectionKind),
    UpdateHardware,
    UpdateStorage,
    UpdateSleepTime,
    DeleteSpace,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CreateSpace => write!(f, "create space"),
            Self::ReadSpace => write!(f, "read space"),
            Self::RenameSpace => write!(f, "rename space"),
            Self::UpdateVisibility => write!(f, "update space visibility"),
            Self::ListEntries(kind) => write!(f, "list space {kind}"),
            Self::DeleteEntry(kind) => write!(f, "delete space {}", kind.singular()),
            Self::AddEntry(kind) => write!(f, "add space {}", kind.singular()),
            Self::UpdateHardware => write!(f, "update space hardware"),
            Self::UpdateStorage => write!(f, "update space storage"),
            Self::UpdateSleepTime => write!(f, "update space sleep time"),
            Self::DeleteSpace => write!(f, "delete space"),
        }
    }
}

/// Errors surfaced by lifecycle operations.
#[derive(Debug, Error)]
pub enum SpaceError {
    /// No response was obtained (connection, DNS, timeout).
    #[error("Unable to {operation}: {cause}")]
    Transport {
        operation: Operation,
        cause: TransportError,
    },

    /// The API answered with a non-success status.
    #[error("Unable to {operation}: HTTP {status}{}", format_body(.body))]
    Api {
        operation: Operation,
        status: u16,
        body: String,
    },

    /// The response body was not valid for the expected shape.
    #[error("Unable to decode {operation} response: {cause}")]
    Decode {
        operation: Operation,
        cause: serde_json::Error,
    },

    /// A request body could not be serialized.
    #[error("Unable to encode {operation} request: {cause}")]
    Encode {
        operation: Operation,
        cause: serde_json::Error,
    },

    /// The response decoded but a required field is missing.
    #[error("Invalid {operation} response: missing field '{field}'")]
    ResponseShape {
        operation: Operation,
        field: &'static str,
    },

    #[error("Invalid space id '{0}': expected <namespace>/<name>")]
    InvalidId(String),

    #[error("Configuration error: {0}")]
    Configuration(String),
}

fn format_body(body: &str) -> String {
    if body.is_empty() {
        String::new()
    } else {
        format!(", response body: {body}")
    }
}

impl SpaceError {
    pub fn transport(operation: Operation, cause: TransportError) -> Self {
        Self::Transport { operation, cause }
    }

    pub fn api(operation: Operation, status: u16, body: impl Into<String>) -> Self {
        Self::Api {
            operation,
            status,
            body: body.into(),
        }
    }

    pub fn decode(operation: Operation, cause: serde_json::Error) -> Self {
        Self::Decode { operation, cause }
    }

    pub fn encode(operation: Operation, cause: serde_json::Error) -> Self {
        Self::Encode { operation, cause }
    }

    pub fn response_shape(operation: Operation, field: &'static str) -> Self {
        Self::ResponseShape { operation, field }
    }

    pub fn invalid_id(id: impl Into<String>) -> Self {
        Self::InvalidId(id.into())
    }

    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration(message.into())
    }

    /// Operation the error is attributed to, if it came from a remote call.
    pub fn operation(&self) -> Option<Operation> {
        match self {
            Self::Transport { operation, .. }
            | Self::Api { operation, .. }
            | Self::Decode { operation, .. }
            | Self::Encode { operation, .. }
            | Self::ResponseShape { operation, .. } => Some(*operation),
            Self::InvalidId(_) | Self::Configuration(_) => None,
        }
    }

    /// HTTP status of an API error.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// True when the API reported the space as missing. Callers use this to
    /// drop a space from tracking after a read.
    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Transport { .. } => ErrorCategory::Transport,
            Self::Api { .. } => ErrorCategory::Api,
            Self::Decode { .. } | Self::Encode { .. } => ErrorCategory::Serialization,
            Self::ResponseShape { .. } => ErrorCategory::ResponseShape,
            Self::InvalidId(_) | Self::Configuration(_) => ErrorCategory::Configuration,
        }
    }
}

/// Error categories for logging and classification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Transport,
    Api,
    Serialization,
    ResponseShape,
    Configuration,
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Transport => write!(f, "transport"),
            Self::Api => write!(f, "api"),
            Self::Serialization => write!(f, "serialization"),
            Self::ResponseShape => write!(f, "response_shape"),
            Self::Configuration => write!(f, "configuration"),
        }
    }
}

/// A failed update together with the state reached before the failure.
///
/// Changes applied ahead of the failing step stay applied remotely, so
/// `state` is what the caller should persist.
#[derive(Debug, Error)]
#[error("{error}")]
pub struct UpdateError {
    pub state: ObservedState,
    pub error: SpaceError,
}

impl UpdateError {
    pub fn new(state: ObservedState, error: SpaceError) -> Self {
        Self { state, error }
    }
}

/// Convenience result type for lifecycle operations
pub type Result<T> = std::result::Result<T, SpaceError>;
