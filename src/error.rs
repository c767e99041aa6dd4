//! Error taxonomy for loading documents and computing migrations.
//!
//! Every variant here is fatal for the whole invocation. Dialect limitations
//! that have a compensating behavior are modelled separately as
//! [`crate::render::Unsupported`] and only become a [`DiffError`] when the
//! configuration asks for strict dialect handling.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DiffError {
    #[error("{kind} not found: {name}")]
    NotFound { kind: &'static str, name: String },

    #[error(
        "ambiguous operation on {table}: column '{old}' changed case to '{new}' without an oldColumnName marker"
    )]
    AmbiguousRename {
        table: String,
        old: String,
        new: String,
    },

    #[error("rename conflict: {0}")]
    RenameConflict(String),

    #[error("unknown {kind}: '{value}'")]
    UnknownConstruct { kind: &'static str, value: String },

    #[error("invalid schema document {source_name}: {message}")]
    InvalidDocument {
        source_name: String,
        message: String,
    },

    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("dependency cycle detected: {0}")]
    DependencyCycle(String),

    #[error("{dialect} cannot express this change: {reason}")]
    Unsupported {
        dialect: &'static str,
        reason: String,
    },
}

impl DiffError {
    pub fn not_found(kind: &'static str, name: impl Into<String>) -> Self {
        DiffError::NotFound {
            kind,
            name: name.into(),
        }
    }

    pub fn unknown(kind: &'static str, value: impl Into<String>) -> Self {
        DiffError::UnknownConstruct {
            kind,
            value: value.into(),
        }
    }

    pub fn invalid(source_name: impl Into<String>, message: impl Into<String>) -> Self {
        DiffError::InvalidDocument {
            source_name: source_name.into(),
            message: message.into(),
        }
    }

    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        DiffError::Io {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, DiffError>;
