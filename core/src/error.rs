//! # Error Handling
//!
//! Provides the unified `AppError` enum used across the workspace.
//!
//! Every malformed-input variant carries the qualified id of the definition
//! that was being processed, so a failed run points at the offending node.

use derive_more::{Display, From};

/// The Global Error Enum.
///
/// We use `derive_more` for boilerplate.
/// Note: String errors default to `General`.
#[derive(Debug, Display, From)]
pub enum AppError {
    /// Wrapper for standard IO errors.
    #[display("IO Error: {_0}")]
    Io(std::io::Error),

    /// JSON (de)serialization failure.
    #[display("JSON Error: {_0}")]
    Json(serde_json::Error),

    /// YAML (de)serialization failure.
    #[display("YAML Error: {_0}")]
    Yaml(serde_yaml::Error),

    /// A definition references something that does not exist or is inconsistent.
    #[from(ignore)]
    #[display("Malformed definition '{id}': {reason}")]
    MalformedDefinition {
        /// Qualified id of the definition holding the bad reference.
        id: String,
        /// What is wrong with it.
        reason: String,
    },

    /// A scalar type name that has no OpenAPI data type mapping.
    #[from(ignore)]
    #[display("Unknown scalar kind '{kind}' used by '{id}'")]
    UnknownScalar {
        /// Qualified id of the definition using the scalar.
        id: String,
        /// The unmapped scalar name.
        kind: String,
    },

    /// A type reference that resolves to no known type.
    #[from(ignore)]
    #[display("Unresolved type reference '{reference}' used by '{id}'")]
    UnresolvedType {
        /// Qualified id of the definition holding the reference.
        id: String,
        /// The reference as written.
        reference: String,
    },

    /// An include specification that cannot be parsed.
    #[from(ignore)]
    #[display("Invalid include specification '{spec}': {reason}")]
    InvalidInclude {
        /// The raw include specification.
        spec: String,
        /// Parser diagnostic.
        reason: String,
    },

    /// An include specification names a field the target type does not have.
    #[from(ignore)]
    #[display("Include names unknown field '{field}' on '{id}'")]
    UnknownIncludeField {
        /// Qualified id of the projected type.
        id: String,
        /// The unknown field name.
        field: String,
    },

    /// Projection recursion exceeded the configured bound.
    #[from(ignore)]
    #[display("Schema too deep at '{id}' (limit {limit})")]
    SchemaTooDeep {
        /// Qualified id of the type being expanded when the limit was hit.
        id: String,
        /// The configured maximum depth.
        limit: usize,
    },

    /// The server base URL is not an absolute URL.
    #[from(ignore)]
    #[display("Invalid base URL '{url}': {reason}")]
    InvalidBaseUrl {
        /// The rejected URL.
        url: String,
        /// Parser diagnostic.
        reason: String,
    },

    /// Generic errors.
    #[display("General Error: {_0}")]
    General(String),
}

/// Manual implementation of the standard Error trait.
impl std::error::Error for AppError {}

/// Helper type alias for Result using AppError.
pub type AppResult<T> = Result<T, AppError>;

impl AppError {
    /// Shorthand for [`AppError::MalformedDefinition`].
    pub fn malformed(id: impl Into<String>, reason: impl Into<String>) -> Self {
        AppError::MalformedDefinition {
            id: id.into(),
            reason: reason.into(),
        }
    }
}
