//! Standard security handler, write path
//!
//! `lopdf` authenticates and decrypts encrypted documents but does not
//! expose an encryption writer, so the V1/R2 (RC4, 40-bit) handler is
//! implemented here over its object model: derive the /O and /U password
//! entries and the file key (ISO 32000 algorithms 2, 3 and 4), encrypt every
//! string and stream with its per-object key, and attach the /Encrypt
//! dictionary and /ID array to the trailer.

use lopdf::{dictionary, Document, Object, StringFormat};

/// Password padding defined by the PDF specification.
const PAD_BYTES: [u8; 32] = [
    0x28, 0xBF, 0x4E, 0x5E, 0x4E, 0x75, 0x8A, 0x41, 0x64, 0x00, 0x4E, 0x56, 0xFF, 0xFA, 0x01,
    0x08, 0x2E, 0x2E, 0x00, 0xB6, 0xD0, 0x68, 0x3E, 0x80, 0x2F, 0x0C, 0xA9, 0xFE, 0x64, 0x53,
    0x69, 0x7A,
];

/// All permission bits set (R=2 treats the value as a signed 32-bit mask).
const ALL_PERMISSIONS: i32 = -4;

fn rc4(key: &[u8], data: &[u8]) -> Vec<u8> {
    // KSA
    let mut s: Vec<u8> = (0..=255).collect();
    let mut j: usize = 0;
    for i in 0..256 {
        j = (j + s[i] as usize + key[i % key.len()] as usize) & 0xFF;
        s.swap(i, j);
    }
    // PRGA
    let mut out = Vec::with_capacity(data.len());
    let mut i: usize = 0;
    j = 0;
    for &byte in data {
        i = (i + 1) & 0xFF;
        j = (j + s[i] as usize) & 0xFF;
        s.swap(i, j);
        let k = s[(s[i] as usize + s[j] as usize) & 0xFF];
        out.push(byte ^ k);
    }
    out
}

fn pad_password(password: &str) -> Vec<u8> {
    let bytes = password.as_bytes();
    let take = bytes.len().min(32);
    let mut padded = Vec::with_capacity(32);
    padded.extend_from_slice(&bytes[..take]);
    padded.extend_from_slice(&PAD_BYTES[..32 - take]);
    padded
}

/// Encrypt `doc` in place with `password` as both user and owner password.
///
/// `file_id` becomes the document's /ID; the key derivation binds to it, so
/// each encryption run must supply a fresh value.
pub fn encrypt_document(doc: &mut Document, password: &str, file_id: [u8; 16]) {
    let padded = pad_password(password);

    // Algorithm 3: /O entry. Owner and user password are the same here.
    let o_digest = md5::compute(&padded);
    let o_value = rc4(&o_digest[..5], &padded);

    // Algorithm 2: file encryption key (40-bit).
    let mut key_input = Vec::with_capacity(32 + 32 + 4 + 16);
    key_input.extend_from_slice(&padded);
    key_input.extend_from_slice(&o_value);
    key_input.extend_from_slice(&(ALL_PERMISSIONS as u32).to_le_bytes());
    key_input.extend_from_slice(&file_id);
    let key_digest = md5::compute(&key_input);
    let file_key = key_digest[..5].to_vec();

    // Algorithm 4: /U entry for revision 2.
    let u_value = rc4(&file_key, &PAD_BYTES);

    // Encrypt every string and stream under its per-object key. The /Encrypt
    // dictionary itself is added afterwards and stays in the clear.
    for (&object_id, object) in doc.objects.iter_mut() {
        let mut object_key_input = Vec::with_capacity(file_key.len() + 5);
        object_key_input.extend_from_slice(&file_key);
        object_key_input.extend_from_slice(&object_id.0.to_le_bytes()[..3]);
        object_key_input.extend_from_slice(&object_id.1.to_le_bytes()[..2]);
        let object_key_digest = md5::compute(&object_key_input);
        let object_key_len = (file_key.len() + 5).min(16);
        let object_key = &object_key_digest[..object_key_len];

        match object {
            Object::Stream(stream) => {
                let encrypted = rc4(object_key, &stream.content);
                stream.set_content(encrypted);
            }
            Object::String(content, _) => {
                *content = rc4(object_key, content);
            }
            _ => {}
        }
    }

    let encrypt_id = doc.add_object(dictionary! {
        "Filter" => "Standard",
        "V" => 1_i64,
        "R" => 2_i64,
        "Length" => 40_i64,
        "O" => Object::String(o_value, StringFormat::Literal),
        "U" => Object::String(u_value, StringFormat::Literal),
        "P" => ALL_PERMISSIONS as i64,
    });
    doc.trailer.set("Encrypt", Object::Reference(encrypt_id));
    doc.trailer.set(
        "ID",
        Object::Array(vec![
            Object::String(file_id.to_vec(), StringFormat::Literal),
            Object::String(file_id.to_vec(), StringFormat::Literal),
        ]),
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rc4_is_symmetric() {
        let key = b"key";
        let data = b"some plaintext";
        let encrypted = rc4(key, data);
        assert_ne!(encrypted.as_slice(), data.as_slice());
        assert_eq!(rc4(key, &encrypted), data);
    }

    #[test]
    fn padding_is_always_32_bytes() {
        assert_eq!(pad_password("").len(), 32);
        assert_eq!(pad_password("short").len(), 32);
        let long = "x".repeat(64);
        assert_eq!(pad_password(&long).len(), 32);
        assert_eq!(pad_password(""), PAD_BYTES.to_vec());
    }
}
