//! Error types for the bionic_reader crate.
//!
//! Every failure is fatal for the run: the pipeline never retries and never
//! recovers a partial result, so a single enum is enough to describe where a
//! run stopped.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::richtext::ParseError;

/// Result type alias for bionic_reader operations.
pub type Result<T> = std::result::Result<T, BionicError>;

/// Errors that abort a bionic reading run.
#[derive(Debug, Error)]
pub enum BionicError {
    /// The config file could not be read.
    #[error("Failed to read config file '{path}': {source}")]
    ConfigIo {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The config file is not valid JSON or its fields do not match exactly.
    #[error("Invalid config file '{path}': {source}")]
    ConfigFormat {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// The log directory or log file could not be prepared, or a logger was already installed.
    #[error("Failed to set up logging: {0}")]
    Logging(String),

    /// The source document could not be opened or parsed.
    #[error("Failed to open source document '{path}': {source}")]
    SourceOpen {
        path: PathBuf,
        #[source]
        source: lopdf::Error,
    },

    /// A page of the source document did not yield text.
    #[error("Failed to extract text from page {page} of '{path}': {detail}")]
    Extraction {
        path: PathBuf,
        page: usize,
        detail: String,
    },

    /// A font file referenced by the config could not be loaded.
    #[error("Failed to load {style} font from '{path}': {source}")]
    Font {
        style: &'static str,
        path: PathBuf,
        #[source]
        source: genpdf::error::Error,
    },

    /// The formatter produced markup the renderer cannot parse.
    #[error("Invalid paragraph markup in paragraph {paragraph}: {source}")]
    Markup {
        paragraph: usize,
        #[source]
        source: ParseError,
    },

    /// The output document could not be laid out or written.
    #[error("Failed to render '{path}': {source}")]
    Render {
        path: PathBuf,
        #[source]
        source: genpdf::error::Error,
    },

    /// The operating system's random source failed.
    #[error("Failed to draw a random file serial: {0}")]
    Randomness(#[from] getrandom::Error),

    /// The export directory could not be created, entered, or left.
    #[error("Working directory error for '{path}': {source}")]
    WorkingDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}
