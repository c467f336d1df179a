//! Uploaded file parts and their single-pass consumption.
//!
//! A [`FilePart`] owns the request stream for one uploaded file. Reading it
//! consumes the part, so measuring the size and forwarding the content both
//! happen in the same pass:
//!
//! ```
//! use binding_core::{FilePart, SizeUnit};
//!
//! let part = FilePart::from_bytes("avatar.png", "image/png", vec![0u8; 2048]);
//!
//! let mut stored = Vec::new();
//! let uploaded = part.forward_to(&mut stored).unwrap();
//!
//! assert_eq!(stored.len(), 2048);
//! assert_eq!(uploaded.size_in(SizeUnit::Kibibytes), 2.00);
//! // `part` is gone; a second read does not compile.
//! ```

use std::fmt;
use std::io::{self, Cursor, Read, Write};

use serde::Serialize;
use serde_json::json;

use crate::config::SizeUnit;

/// One uploaded file: name, declared content type and an unread stream.
pub struct FilePart {
    filename: String,
    content_type: String,
    stream: Box<dyn Read + Send>,
}

impl FilePart {
    /// Wraps a readable stream supplied by the host server.
    pub fn new(
        filename: impl Into<String>,
        content_type: impl Into<String>,
        stream: impl Read + Send + 'static,
    ) -> Self {
        Self {
            filename: filename.into(),
            content_type: content_type.into(),
            stream: Box::new(stream),
        }
    }

    /// Wraps an in-memory buffer.
    pub fn from_bytes(
        filename: impl Into<String>,
        content_type: impl Into<String>,
        bytes: Vec<u8>,
    ) -> Self {
        Self::new(filename, content_type, Cursor::new(bytes))
    }

    /// Client-supplied file name.
    pub fn filename(&self) -> &str {
        &self.filename
    }

    /// Declared content type.
    pub fn content_type(&self) -> &str {
        &self.content_type
    }

    /// Drains the stream and reports its length.
    ///
    /// # Errors
    ///
    /// Returns `UploadError` if reading the stream fails.
    pub fn measure(self) -> Result<UploadedFile, UploadError> {
        self.forward_to(&mut io::sink())
    }

    /// Copies the stream into `writer`, counting bytes on the way.
    ///
    /// # Errors
    ///
    /// Returns `UploadError` if reading the stream or writing to `writer`
    /// fails.
    pub fn forward_to<W: Write + ?Sized>(self, writer: &mut W) -> Result<UploadedFile, UploadError> {
        let FilePart {
            filename,
            content_type,
            mut stream,
        } = self;

        match io::copy(&mut stream, writer) {
            Ok(size_bytes) => {
                tracing::trace!(filename = %filename, size_bytes, "consumed upload stream");
                Ok(UploadedFile {
                    filename,
                    content_type,
                    size_bytes,
                })
            }
            Err(source) => Err(UploadError { filename, source }),
        }
    }

    pub(crate) fn metadata_json(&self) -> serde_json::Value {
        json!({
            "filename": self.filename,
            "content_type": self.content_type,
        })
    }
}

impl fmt::Debug for FilePart {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FilePart")
            .field("filename", &self.filename)
            .field("content_type", &self.content_type)
            .finish_non_exhaustive()
    }
}

/// Measures every part in order.
///
/// # Errors
///
/// Stops at the first stream that cannot be read.
pub fn measure_all(parts: Vec<FilePart>) -> Result<Vec<UploadedFile>, UploadError> {
    parts.into_iter().map(FilePart::measure).collect()
}

/// A consumed file part: what the handler reports back.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UploadedFile {
    filename: String,
    content_type: String,
    size_bytes: u64,
}

impl UploadedFile {
    /// Client-supplied file name.
    pub fn filename(&self) -> &str {
        &self.filename
    }

    /// Declared content type.
    pub fn content_type(&self) -> &str {
        &self.content_type
    }

    /// Exact byte length of the stream.
    pub fn size_bytes(&self) -> u64 {
        self.size_bytes
    }

    /// Size in `unit`, rounded to two decimal places.
    pub fn size_in(&self, unit: SizeUnit) -> f64 {
        let raw = self.size_bytes as f64 / unit.bytes_per_unit() as f64;
        (raw * 100.0).round() / 100.0
    }

    /// Response descriptor: filename, content type, size and unit.
    ///
    /// The size is rendered as text with exactly two decimals (`"2.00"`).
    pub fn describe(&self, unit: SizeUnit) -> serde_json::Value {
        json!({
            "filename": self.filename,
            "content_type": self.content_type,
            "size": format!("{:.2}", self.size_in(unit)),
            "unit": unit.to_string(),
        })
    }
}

/// A file stream that failed while being consumed.
#[derive(Debug)]
pub struct UploadError {
    filename: String,
    source: io::Error,
}

impl UploadError {
    /// Name of the file whose stream failed.
    pub fn filename(&self) -> &str {
        &self.filename
    }
}

impl fmt::Display for UploadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "failed to read upload '{}': {}", self.filename, self.source)
    }
}

impl std::error::Error for UploadError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.source)
    }
}
