/*!
 * Error types for the epubtr application.
 *
 * This module contains custom error types for the different stages of the
 * book rewrite pipeline, using the thiserror crate for ergonomic error definitions.
 */

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur when working with provider APIs
#[derive(Error, Debug)]
pub enum ProviderError {
    /// Error when making an API request fails
    #[error("API request failed: {0}")]
    RequestFailed(String),

    /// Error when parsing an API response fails
    #[error("Failed to parse API response: {0}")]
    ParseError(String),

    /// Error returned by the API itself
    #[error("API responded with error: {status_code} - {message}")]
    ApiError {
        /// HTTP status code
        status_code: u16,
        /// Error message from the API
        message: String,
    },

    /// Error establishing or maintaining a connection
    #[error("Connection error: {0}")]
    ConnectionError(String),

    /// Error with authentication
    #[error("Authentication error: {0}")]
    AuthenticationError(String),
}

/// Errors raised while unpacking or repacking a book archive
#[derive(Error, Debug)]
pub enum ArchiveError {
    /// Underlying file system failure
    #[error("Archive I/O error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The archive itself is unreadable or corrupt
    #[error("Invalid archive {path:?}: {source}")]
    Zip {
        path: PathBuf,
        #[source]
        source: zip::result::ZipError,
    },

    /// An entry name would resolve outside of the destination directory
    #[error("Archive entry escapes the workspace: {0}")]
    UnsafeEntry(String),

    /// Repack source is not a directory
    #[error("Not a directory: {0:?}")]
    NotADirectory(PathBuf),
}

impl ArchiveError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io { path: path.into(), source }
    }

    pub(crate) fn zip(path: impl Into<PathBuf>, source: zip::result::ZipError) -> Self {
        Self::Zip { path: path.into(), source }
    }
}

/// Errors raised while locating book metadata
#[derive(Error, Debug)]
pub enum MetadataError {
    /// No container descriptor, or no rootfile reference inside it
    #[error("Package document not found under {0:?}")]
    NotFound(PathBuf),
}

/// I/O failure on a single content document inside the workspace
#[derive(Error, Debug)]
pub enum WorkspaceError {
    /// The file could not be read or written
    #[error("Workspace I/O error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The file is not valid UTF-8 markup
    #[error("Document is not valid UTF-8: {0:?}")]
    NotUtf8(PathBuf),

    /// Re-extraction produced a different number of units than preparation did
    #[error("Document {path:?} changed since extraction: expected {expected} units, found {found}")]
    UnitCountMismatch {
        path: PathBuf,
        expected: usize,
        found: usize,
    },
}

/// Errors that can occur while translating a single text unit
#[derive(Error, Debug)]
pub enum TranslationError {
    /// Error from the provider API
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    /// Provider answered but without any usable text
    #[error("Provider returned an empty translation")]
    EmptyResponse,

    /// Any other translator failure
    #[error("Translation failed: {0}")]
    Other(String),
}

/// Errors surfaced by the translation session state machine
#[derive(Error, Debug)]
pub enum SessionError {
    /// Operation not allowed in the current state
    #[error("Cannot {action} while session is {state}")]
    InvalidTransition {
        action: &'static str,
        state: &'static str,
    },

    /// The language pair was not confirmed as supported
    #[error("Translation from '{source_language}' to '{target_language}' is not available")]
    LanguagePairUnavailable {
        source_language: String,
        target_language: String,
    },

    /// Failure while unpacking the source archive
    #[error("Archive error: {0}")]
    Archive(#[from] ArchiveError),

    /// Failure that ends the session in the failed state
    #[error("{0}")]
    Fatal(String),
}
