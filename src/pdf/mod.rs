//! PDF document handling
//!
//! Thin layer over the `lopdf` object model. `document` wraps a loaded
//! document for reads, `assemble` rebuilds new documents from source pages,
//! `crypt` implements the standard security handler write path, and `ops`
//! exposes the transformation pipeline as pure byte-level operations.

use thiserror::Error;

pub mod assemble;
pub mod crypt;
pub mod document;
pub mod ops;

pub use document::PdfHandle;

/// Errors surfaced by the codec layer
#[derive(Debug, Error)]
pub enum PdfError {
    #[error("failed to parse PDF: {0}")]
    Parse(String),

    #[error("document is not encrypted")]
    NotEncrypted,

    #[error("incorrect password")]
    WrongPassword,

    #[error("decryption failed: {0}")]
    Decrypt(String),

    #[error("failed to rebuild document: {0}")]
    Assemble(String),

    #[error("failed to serialize document: {0}")]
    Write(String),
}

/// Result type alias for codec operations
pub type Result<T> = std::result::Result<T, PdfError>;
