//! Local save/load of an editing session.
//!
//! Two encodings are supported:
//! - JSON, the plain document layout, convenient for inspection and for
//!   exchanging with a browser front-end.
//! - A compact binary file: magic, version byte, CRC32 of the payload
//!   (little-endian), then the payload as MessagePack.
//!
//! History and selection are session-local and are not saved. There is no
//! migration between format versions.

use crate::error::{CanvasError, Result};
use crate::model::Books;
use crate::types::{BookId, PageId, UiState, UploadedImage};
use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::io::{Read, Write};
use std::path::Path;

/// Magic bytes for binary session files.
const SESSION_MAGIC: &[u8; 4] = b"SBK\0";

/// Current binary session format version.
const SESSION_VERSION: u8 = 1;

/// Magic + version + checksum.
const HEADER_LEN: usize = 4 + 1 + 4;

/// Everything needed to reopen a canvas where it was left.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Session {
    #[serde(default)]
    pub project_name: String,
    #[serde(default)]
    pub books: Books,
    #[serde(default)]
    pub active_book_id: Option<BookId>,
    #[serde(default)]
    pub active_page_id: Option<PageId>,
    #[serde(default)]
    pub ui: UiState,
    #[serde(default)]
    pub uploaded_images: Vec<UploadedImage>,
}

impl Session {
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Encode as a binary session (header + MessagePack payload).
    pub fn encode(&self) -> Result<Vec<u8>> {
        let payload = rmp_serde::to_vec_named(self)?;
        let checksum = crc32fast::hash(&payload);

        let mut out = Vec::with_capacity(HEADER_LEN + payload.len());
        out.extend_from_slice(SESSION_MAGIC);
        out.push(SESSION_VERSION);
        out.extend_from_slice(&checksum.to_le_bytes());
        out.extend_from_slice(&payload);
        Ok(out)
    }

    /// Decode a binary session, verifying magic, version and checksum.
    pub fn decode(bytes: &[u8]) -> Result<Self> {
        if bytes.len() < HEADER_LEN {
            return Err(CanvasError::InvalidFormat("Session file truncated".into()));
        }
        if &bytes[0..4] != SESSION_MAGIC {
            return Err(CanvasError::InvalidFormat("Invalid session magic".into()));
        }
        if bytes[4] != SESSION_VERSION {
            return Err(CanvasError::InvalidFormat(format!(
                "Unsupported session version: {}",
                bytes[4]
            )));
        }

        let expected = u32::from_le_bytes([bytes[5], bytes[6], bytes[7], bytes[8]]);
        let payload = &bytes[HEADER_LEN..];
        let got = crc32fast::hash(payload);
        if got != expected {
            return Err(CanvasError::ChecksumMismatch { expected, got });
        }

        Ok(rmp_serde::from_slice(payload)?)
    }
}

/// Write `session` as pretty JSON.
pub fn save_json(path: impl AsRef<Path>, session: &Session) -> Result<()> {
    write_atomic(path.as_ref(), session.to_json()?.as_bytes())
}

pub fn load_json(path: impl AsRef<Path>) -> Result<Session> {
    let json = fs::read_to_string(path)?;
    Session::from_json(&json)
}

/// Write `session` in the binary format.
pub fn save_binary(path: impl AsRef<Path>, session: &Session) -> Result<()> {
    write_atomic(path.as_ref(), &session.encode()?)
}

pub fn load_binary(path: impl AsRef<Path>) -> Result<Session> {
    let mut file = File::open(path)?;
    let mut bytes = Vec::new();
    file.read_to_end(&mut bytes)?;
    Session::decode(&bytes)
}

/// Write to a sibling temp file, then rename over the target so a crash never
/// leaves a half-written session behind. The temp file is removed on failure.
fn write_atomic(path: &Path, bytes: &[u8]) -> Result<()> {
    let tmp = path.with_extension("tmp");
    let written = write_synced(&tmp, bytes).and_then(|()| fs::rename(&tmp, path));
    if let Err(e) = written {
        let _ = fs::remove_file(&tmp);
        return Err(e.into());
    }

    tracing::debug!(path = %path.display(), bytes = bytes.len(), "Session written");
    Ok(())
}

fn write_synced(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    let mut file = File::create(path)?;
    file.write_all(bytes)?;
    file.sync_all()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Book, Element, Page};
    use std::sync::Arc;

    fn sample() -> Session {
        let page = Page::new("p").with_element(Element::text("hola"));
        let book = Book::notebook("b").with_page(page);
        Session {
            project_name: "Viaje".to_string(),
            active_book_id: Some(book.id),
            active_page_id: book.first_page_id(),
            books: vec![Arc::new(book)],
            ui: UiState::default(),
            uploaded_images: Vec::new(),
        }
    }

    #[test]
    fn test_binary_round_trip() {
        let session = sample();
        let decoded = Session::decode(&session.encode().unwrap()).unwrap();
        assert_eq!(decoded, session);
    }

    #[test]
    fn test_checksum_mismatch_detected() {
        let mut bytes = sample().encode().unwrap();
        let last = bytes.len() - 1;
        bytes[last] ^= 0xFF;

        assert!(matches!(
            Session::decode(&bytes),
            Err(CanvasError::ChecksumMismatch { .. })
        ));
    }

    #[test]
    fn test_bad_magic_and_truncation() {
        let mut bytes = sample().encode().unwrap();
        bytes[0] = b'X';
        assert!(matches!(
            Session::decode(&bytes),
            Err(CanvasError::InvalidFormat(_))
        ));
        assert!(matches!(
            Session::decode(&[0u8; 3]),
            Err(CanvasError::InvalidFormat(_))
        ));
    }

    #[test]
    fn test_failed_write_leaves_no_temp_file() {
        let dir = tempfile::TempDir::new().unwrap();
        // A directory at the target path makes the final rename fail.
        let target = dir.path().join("taken");
        fs::create_dir(&target).unwrap();

        let result = save_json(&target, &sample());

        assert!(matches!(result, Err(CanvasError::Io(_))));
        assert!(!dir.path().join("taken.tmp").exists());
    }

    #[test]
    fn test_json_defaults_missing_fields() {
        let session = Session::from_json("{}").unwrap();
        assert!(session.books.is_empty());
        assert_eq!(session.ui, UiState::default());
    }

    #[test]
    fn test_malformed_json_is_deserialization_error() {
        assert!(matches!(
            Session::from_json("{\"books\": 3}"),
            Err(CanvasError::Deserialization(_))
        ));
    }
}
