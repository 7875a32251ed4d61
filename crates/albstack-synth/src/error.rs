//! Synth-time error types.

use thiserror::Error;

/// Result type alias for synthesis.
pub type SynthResult<T> = Result<T, SynthError>;

/// A single rule the provider would reject the description for.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Violation {
    #[error("table name {name:?} must be 3-255 characters of [A-Za-z0-9_.-]")]
    TableName { name: String },

    #[error("role name {name:?} must be 1-64 characters of [A-Za-z0-9+=,.@_-]")]
    RoleName { name: String },

    #[error("container name {name:?} must be 1-255 characters of [A-Za-z0-9_-]")]
    ContainerName { name: String },

    #[error("log stream prefix {prefix:?} must not contain ':' or '*'")]
    LogStreamPrefix { prefix: String },

    #[error("container port must be in 1-65535, got {0}")]
    ContainerPort(u16),
}

/// Errors raised while turning a topology into a template.
#[derive(Debug, Error)]
pub enum SynthError {
    #[error("{} validation error(s): {}", .0.len(), join(.0))]
    Validation(Vec<Violation>),

    #[error("invalid name pattern: {0}")]
    Pattern(#[from] regex::Error),

    #[error("serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
}

fn join(violations: &[Violation]) -> String {
    violations
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}
