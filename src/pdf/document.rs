//! Loaded-document wrapper
//!
//! A `PdfHandle` is the transient, in-memory view of a stored document used
//! by one operation: page count, Info-dictionary fields, encryption flag,
//! per-page text. It is never persisted.

use lopdf::{Document, Object};

use super::{PdfError, Result};

pub struct PdfHandle {
    doc: Document,
}

impl PdfHandle {
    /// Parse a document from raw bytes.
    pub fn open(bytes: &[u8]) -> Result<Self> {
        let doc = Document::load_mem(bytes)
            .map_err(|e| PdfError::Parse(format!("failed to parse PDF: {e}")))?;
        Ok(Self { doc })
    }

    pub fn page_count(&self) -> usize {
        self.doc.get_pages().len()
    }

    pub fn is_encrypted(&self) -> bool {
        self.doc.is_encrypted()
    }

    /// Decrypt the document in place with the given user password.
    pub fn decrypt(&mut self, password: &str) -> Result<()> {
        self.doc.decrypt(password).map_err(|e| {
            let msg = e.to_string();
            if msg.contains("password") || msg.contains("incorrect") {
                PdfError::WrongPassword
            } else {
                PdfError::Decrypt(msg)
            }
        })
    }

    /// Read a text field from the document's /Info dictionary.
    ///
    /// Returns `None` when the dictionary or the key is absent, or the value
    /// is not a textual object.
    pub fn info_string(&self, key: &[u8]) -> Option<String> {
        let info = match self.doc.trailer.get(b"Info").ok()? {
            Object::Reference(id) => self.doc.get_object(*id).ok()?.as_dict().ok()?,
            Object::Dictionary(dict) => dict,
            _ => return None,
        };
        let value = match info.get(key).ok()? {
            Object::Reference(id) => self.doc.get_object(*id).ok()?,
            other => other,
        };
        match value {
            Object::String(bytes, _) => Some(decode_text_string(bytes)),
            Object::Name(name) => Some(String::from_utf8_lossy(name).into_owned()),
            _ => None,
        }
    }

    /// Extract the text of one page (1-based page number).
    ///
    /// Returns `None` when extraction fails or yields only whitespace.
    pub fn page_text(&self, page_number: u32) -> Option<String> {
        let text = self.doc.extract_text(&[page_number]).ok()?;
        if text.trim().is_empty() {
            None
        } else {
            Some(text)
        }
    }

    pub fn document(&self) -> &Document {
        &self.doc
    }

    pub fn into_document(self) -> Document {
        self.doc
    }
}

/// Decode a PDF text string: UTF-16BE when BOM-prefixed, otherwise UTF-8
/// with a Latin-1 fallback.
fn decode_text_string(bytes: &[u8]) -> String {
    if bytes.len() >= 2 && bytes[0] == 0xFE && bytes[1] == 0xFF {
        let units: Vec<u16> = bytes[2..]
            .chunks(2)
            .filter_map(|c| {
                if c.len() == 2 {
                    Some(u16::from_be_bytes([c[0], c[1]]))
                } else {
                    None
                }
            })
            .collect();
        String::from_utf16_lossy(&units)
    } else {
        match std::str::from_utf8(bytes) {
            Ok(s) => s.to_string(),
            Err(_) => bytes.iter().map(|&b| b as char).collect(),
        }
    }
}
