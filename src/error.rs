//! Error definitions for schema loading, providers, and reference chasing.

use thiserror::Error;

#[derive(Debug, Error)]
/// Top-level error type returned by public APIs.
///
/// Resolution outcomes such as a missing kind or field are not errors; they
/// are reported as [`crate::Explanation::Error`] values.
pub enum ExplainError {
    /// Schema document shape failure (for example a non-object definition).
    #[error("schema error: {0}")]
    SchemaError(String),
    /// Schema document was not valid JSON.
    #[error("json error: {0}")]
    JsonError(#[from] serde_json::Error),
    /// A `$ref` segment could not be found while chasing a type reference.
    #[error("unresolvable type path '{reference}': no entry for '{segment}'")]
    UnresolvableTypePath { reference: String, segment: String },
    /// A documentation provider failed to produce a schema or explain text.
    #[error("provider error: {0}")]
    ProviderError(String),
    /// Output serialization failure.
    #[error("serialization error: {0}")]
    SerializationError(String),
}
