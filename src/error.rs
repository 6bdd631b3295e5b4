/// Error types
///
/// Collaborator failures are recoverable and only ever cost a single entry
/// (or a warning, for save/delete). Session errors are fatal.
use std::path::PathBuf;
use thiserror::Error;

/// Failure reported by an external collaborator (decoder, renderer, exporter)
#[derive(Debug, Error)]
pub enum CollaboratorError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("image error on {path}: {source}")]
    Image {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("file not found: {0}")]
    NotFound(PathBuf),

    /// Image decoded but no valid selection box fits inside it
    #[error("image {path} is too small for aspect {aspect}")]
    Degenerate { path: PathBuf, aspect: f64 },
}

/// Fatal conditions for a session
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("no files found")]
    NoFiles,

    #[error("none of the files in the directory could be loaded")]
    NothingValid,

    /// Every remaining entry was evicted during navigation
    #[error("every image in the ring failed validation")]
    Exhausted,

    #[error("entry {0} is not in the ring")]
    UnknownEntry(usize),

    #[error("unable to read directory {path}: {source}")]
    Scan {
        path: PathBuf,
        #[source]
        source: walkdir::Error,
    },

    #[error("invalid configuration: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, SessionError>;
