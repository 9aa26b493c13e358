//! Error types for handlercheck.
//!
//! Only conditions that abort a run are errors. A missing controller file
//! or a route pointing at a missing handler is recorded in the run summary
//! instead.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CheckError {
    #[error("cannot read routes file {}: {source}", path.display())]
    RoutesFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("cannot read config file {}: {source}", path.display())]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid JSON in config file {}: {source}", path.display())]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("invalid config: {0}")]
    InvalidConfig(String),
    #[error("failed to analyze {}: {message}", path.display())]
    Analysis { path: PathBuf, message: String },
}
