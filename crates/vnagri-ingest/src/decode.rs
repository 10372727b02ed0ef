//! Text decoding for the database export.

use std::path::Path;

use encoding_rs::UTF_16LE;

use crate::error::{IngestError, Result};

/// Decode an export file's bytes.
///
/// A byte order mark selects UTF-16LE, UTF-16BE or UTF-8; without one the
/// bytes are read as UTF-16LE, the layout the export tool writes.
pub fn decode_utf16(bytes: &[u8], path: &Path) -> Result<String> {
    let (text, encoding, had_errors) = UTF_16LE.decode(bytes);
    if had_errors {
        return Err(IngestError::Encoding {
            path: path.to_path_buf(),
            encoding: encoding.name(),
        });
    }
    tracing::debug!(
        path = %path.display(),
        encoding = encoding.name(),
        bytes = text.len(),
        "decoded source document"
    );
    Ok(text.into_owned())
}
