//! Transformation pipeline
//!
//! The seven document operations as pure byte-level functions: inputs are
//! already-loaded document bytes, outputs are serialized document bytes or
//! inline results. Input resolution and artifact persistence belong to the
//! document store; artifact naming lives here so the scheme stays in one
//! place.
//!
//! Page numbering: operation inputs are 0-based (`extract_text`), artifact
//! names and result keys are 1-based.

use std::collections::BTreeMap;

use chrono::{DateTime, Local};
use lopdf::{Dictionary, Document, Object};
use serde::Serialize;

use super::assemble::{assemble, SourcePart};
use super::crypt;
use super::document::PdfHandle;
use super::{PdfError, Result};

/// Placeholder for absent metadata fields, kept uniform for client display.
pub const MISSING_FIELD: &str = "N/A";

/// Placeholder for pages whose text extraction yields nothing.
pub const NO_TEXT: &str = "[No text found]";

/// Metadata record returned by `read_metadata`
#[derive(Debug, Clone, Serialize)]
pub struct DocumentSummary {
    pub pages: usize,
    pub author: String,
    pub creator: String,
    pub producer: String,
    pub subject: String,
    pub title: String,
    pub encrypted: bool,
}

/// Read page count, Info fields and the encryption flag. No artifact.
pub fn read_metadata(bytes: &[u8]) -> Result<DocumentSummary> {
    let handle = PdfHandle::open(bytes)?;
    let field = |key: &[u8]| {
        handle
            .info_string(key)
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| MISSING_FIELD.to_string())
    };
    Ok(DocumentSummary {
        pages: handle.page_count(),
        author: field(b"Author"),
        creator: field(b"Creator"),
        producer: field(b"Producer"),
        subject: field(b"Subject"),
        title: field(b"Title"),
        encrypted: handle.is_encrypted(),
    })
}

/// Copy every page into a new document and install `metadata` as its
/// complete Info dictionary (full replace, not merge).
pub fn write_metadata(bytes: &[u8], metadata: &BTreeMap<String, String>) -> Result<Vec<u8>> {
    let handle = PdfHandle::open(bytes)?;
    let mut rebuilt = assemble(vec![SourcePart::all(handle.into_document())])?;

    let mut info = Dictionary::new();
    for (key, value) in metadata {
        // Clients send PyPDF-style "/Title" keys; names are stored bare.
        let key = key.strip_prefix('/').unwrap_or(key.as_str());
        info.set(key.as_bytes(), Object::string_literal(value.as_str()));
    }
    let info_id = rebuilt.add_object(Object::Dictionary(info));
    rebuilt.trailer.set("Info", Object::Reference(info_id));

    serialize(rebuilt)
}

/// Concatenate all pages of each input, in the given order.
pub fn merge(inputs: &[Vec<u8>]) -> Result<Vec<u8>> {
    let mut parts = Vec::with_capacity(inputs.len());
    for bytes in inputs {
        let handle = PdfHandle::open(bytes)?;
        parts.push(SourcePart::all(handle.into_document()));
    }
    serialize(assemble(parts)?)
}

/// Produce one single-page document per source page, in page order.
pub fn split(bytes: &[u8]) -> Result<Vec<Vec<u8>>> {
    let handle = PdfHandle::open(bytes)?;
    let page_numbers: Vec<u32> = handle.document().get_pages().keys().copied().collect();

    let mut outputs = Vec::with_capacity(page_numbers.len());
    for page_number in page_numbers {
        let part = SourcePart::single(handle.document().clone(), page_number);
        outputs.push(serialize(assemble(vec![part])?)?);
    }
    Ok(outputs)
}

/// Copy all pages into a new document encrypted under `password`.
pub fn encrypt(bytes: &[u8], password: &str, file_id: [u8; 16]) -> Result<Vec<u8>> {
    let handle = PdfHandle::open(bytes)?;
    let mut rebuilt = assemble(vec![SourcePart::all(handle.into_document())])?;
    crypt::encrypt_document(&mut rebuilt, password, file_id);
    serialize(rebuilt)
}

/// Authenticate against an encrypted source and copy all pages into a new
/// unencrypted document.
pub fn decrypt(bytes: &[u8], password: &str) -> Result<Vec<u8>> {
    let mut handle = PdfHandle::open(bytes)?;
    if !handle.is_encrypted() {
        return Err(PdfError::NotEncrypted);
    }
    handle.decrypt(password)?;
    let rebuilt = assemble(vec![SourcePart::all(handle.into_document())])?;
    serialize(rebuilt)
}

/// Extract text for the requested 0-based page indices (all pages when the
/// slice is empty). Keys of the returned map are 1-based page numbers;
/// out-of-range indices are skipped.
pub fn extract_text(bytes: &[u8], pages: &[i64]) -> Result<BTreeMap<u32, String>> {
    let handle = PdfHandle::open(bytes)?;
    let page_count = handle.page_count() as i64;

    let requested: Vec<i64> = if pages.is_empty() {
        (0..page_count).collect()
    } else {
        pages.to_vec()
    };

    let mut extracted = BTreeMap::new();
    for index in requested {
        if index < 0 || index >= page_count {
            continue;
        }
        let page_number = (index + 1) as u32;
        let text = handle
            .page_text(page_number)
            .unwrap_or_else(|| NO_TEXT.to_string());
        extracted.insert(page_number, text);
    }
    Ok(extracted)
}

// ---------------------------------------------------------------------------
// Artifact naming
// ---------------------------------------------------------------------------

pub fn metadata_artifact_name(source: &str) -> String {
    format!("metadata_{source}")
}

/// Second-resolution timestamp name; merges within the same second in the
/// same session overwrite each other, which is accepted behavior.
pub fn merged_artifact_name(now: DateTime<Local>) -> String {
    format!("merged_{}.pdf", now.format("%Y%m%d_%H%M%S"))
}

pub fn page_artifact_name(page_number: u32, source: &str) -> String {
    format!("page_{page_number}_{source}")
}

pub fn encrypted_artifact_name(source: &str) -> String {
    format!("encrypted_{source}")
}

pub fn decrypted_artifact_name(source: &str) -> String {
    format!("decrypted_{source}")
}

fn serialize(mut doc: Document) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    doc.save_to(&mut buf)
        .map_err(|e| PdfError::Write(e.to_string()))?;
    Ok(buf)
}

// ---------------------------------------------------------------------------
// Test fixtures
// ---------------------------------------------------------------------------
