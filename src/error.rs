//! Error types for the mooowu library.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for mooowu operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur while reading, filtering or highlighting PDFs.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error when reading or writing files.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The source document does not exist.
    #[error("PDF file not found: {}", .0.display())]
    NotFound(PathBuf),

    /// The file format is not recognized as PDF.
    #[error("Unknown file format: not a valid PDF")]
    UnknownFormat,

    /// The PDF version is not supported.
    #[error("Unsupported PDF version: {0}")]
    UnsupportedVersion(String),

    /// Error parsing PDF structure or content streams.
    #[error("PDF parsing error: {0}")]
    PdfParse(String),

    /// The PDF document is encrypted.
    #[error("Document is encrypted")]
    Encrypted,

    /// Page number is out of range.
    #[error("Page {0} is out of range (document has {1} pages)")]
    PageOutOfRange(usize, usize),

    /// A highlight color is malformed or outside [0, 1].
    #[error("Invalid color: {0}")]
    InvalidColor(String),

    /// A page-range worker failed; the whole call fails with it.
    #[error("Worker for pages {start}..{end} failed: {message}")]
    Worker {
        /// First page index of the failed range
        start: usize,
        /// One past the last page index of the failed range
        end: usize,
        /// Underlying failure
        message: String,
    },

    /// Error serializing a response.
    #[error("Rendering error: {0}")]
    Render(String),

    /// Generic error with message.
    #[error("{0}")]
    Other(String),
}

impl From<lopdf::Error> for Error {
    fn from(err: lopdf::Error) -> Self {
        match err {
            lopdf::Error::IO(e) => Error::Io(e),
            lopdf::Error::Decryption(_) => Error::Encrypted,
            _ => Error::PdfParse(err.to_string()),
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Render(format!("JSON serialization error: {}", err))
    }
}
