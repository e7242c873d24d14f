//! Error taxonomy shared by the dispatcher, transport and server.

use std::{io, path::PathBuf, time::Duration};

use thiserror::Error;

/// Caller-facing failure of a tool invocation.
#[derive(Debug, Error)]
pub enum ToolError {
    /// No operation with this name exists in the catalog.
    #[error("unknown tool: {0}")]
    NotFound(String),

    /// Arguments did not satisfy the operation's parameter contract.
    #[error("invalid arguments for {operation}: {source}")]
    Validation {
        operation: String,
        #[source]
        source: ParamError,
    },

    /// The script ran (or tried to) and failed, inside InDesign or on the way there.
    #[error("{operation} failed: {message}")]
    Internal { operation: String, message: String },
}

impl ToolError {
    /// Stable short name used in protocol error payloads.
    pub fn kind(&self) -> &'static str {
        match self {
            ToolError::NotFound(_) => "not_found",
            ToolError::Validation { .. } => "validation",
            ToolError::Internal { .. } => "internal",
        }
    }
}

/// A parameter failed validation, or a template asked for one that is absent.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParamError {
    #[error("arguments must be a JSON object")]
    NotAnObject,

    #[error("missing required parameter `{0}`")]
    Missing(String),

    #[error("unknown parameter `{0}`")]
    Unknown(String),

    #[error("parameter `{name}` must be {expected}")]
    WrongType { name: String, expected: &'static str },

    #[error("parameter `{name}` must not be empty")]
    Empty { name: String },

    #[error("parameter `{name}` is out of range: {value} (allowed {min}..={max})")]
    OutOfRange {
        name: String,
        value: f64,
        min: f64,
        max: f64,
    },

    #[error("parameter `{name}` must be one of [{allowed}], got `{value}`")]
    NotAChoice {
        name: String,
        value: String,
        allowed: String,
    },

    #[error("parameter `{name}` is invalid: {reason}")]
    Invalid { name: String, reason: String },
}

/// Failure of the outer host automation call or of its scratch file.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("cannot prepare script file in {}: {source}", .dir.display())]
    Scratch {
        dir: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to spawn {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: io::Error,
    },

    #[error("{program} exited with {status}: {diagnostic}")]
    Exit {
        program: String,
        status: String,
        diagnostic: String,
    },

    #[error("script execution timed out after {}s", .0.as_secs_f64())]
    Timeout(Duration),
}
