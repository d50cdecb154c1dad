//! Unified error types for gatt-gen using thiserror

use thiserror::Error;

/// Top-level error type for a generation run
#[derive(Error, Debug)]
pub enum GenError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("invalid service description: {0}")]
    Spec(#[from] SpecError),

    #[error("code generation error: {0}")]
    Codegen(#[from] CodegenError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors raised while loading the configuration document
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("invalid JSON document: {0}")]
    Json(#[from] serde_json::Error),

    #[error("document declares no services")]
    NoServices,

    #[error("characteristic {field}: length must be at least 1")]
    ZeroLength { field: String },

    #[error("failed to read {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// Errors in the service description itself
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SpecError {
    #[error("service {service}: base UUID {found:?} must have 5 hyphen-separated segments")]
    MalformedBaseUuid { service: String, found: String },

    #[error("service {service}: {name:?} and {previous:?} both derive {identifier:?}")]
    DuplicateName {
        service: String,
        name: String,
        previous: String,
        identifier: String,
    },

    #[error("service {service}: {name:?} is not a valid C identifier")]
    InvalidIdentifier { service: String, name: String },

    #[error("two services would both be written to {filename:?}")]
    DuplicateOutput { filename: String },
}

/// Code generation errors
#[derive(Error, Debug)]
pub enum CodegenError {
    #[error("formatting error: {0}")]
    Fmt(#[from] std::fmt::Error),
}
