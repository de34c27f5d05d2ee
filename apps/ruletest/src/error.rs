//! Crate-wide error type.
//!
//! Only input problems surface here. Failures raised while a test case runs
//! are absorbed into the report (see `engine::EngineFailure`).

use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Expected one or more file arguments of lint plugins or rules.")]
    NoInputs,

    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {}: {message}", path.display())]
    Parse { path: PathBuf, message: String },

    #[error("bad glob pattern `{pattern}`: {source}")]
    Glob {
        pattern: String,
        #[source]
        source: glob::PatternError,
    },

    #[error("invalid rule `{rule}` in {}: {message}", path.display())]
    InvalidRule {
        path: PathBuf,
        rule: String,
        message: String,
    },

    #[error("Expected file \"{source_path}\" to be a lint plugin, rule, or configuration list.")]
    UnrecognizedArtifact { source_path: String },
}
