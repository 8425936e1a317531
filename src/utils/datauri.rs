//! Data-URI buffer adapter
//!
//! Turns an uploaded file held in memory into a `data:<mime>;base64,<body>`
//! payload that the object store accepts in a single upload call.

use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use bytes::Bytes;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DataUriError {
    #[error("file buffer is empty")]
    EmptyBuffer,

    #[error("cannot determine MIME type for '{0}'")]
    UnknownMimeType(String),

    #[error("payload is not a base64 data URI")]
    Malformed,

    #[error("base64 decoding failed: {0}")]
    Decode(#[from] base64::DecodeError),
}

/// A file received from a multipart form. The byte buffer is never empty.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    file_name: String,
    content_type: Option<String>,
    bytes: Bytes,
}

impl UploadedFile {
    /// Returns `None` when the buffer is empty, which is how browsers submit
    /// a file input with nothing selected.
    pub fn new(
        file_name: impl Into<String>,
        content_type: Option<String>,
        bytes: impl Into<Bytes>,
    ) -> Option<Self> {
        let bytes = bytes.into();
        if bytes.is_empty() {
            return None;
        }

        Some(Self {
            file_name: file_name.into(),
            content_type,
            bytes,
        })
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    pub fn content_type(&self) -> Option<&str> {
        self.content_type.as_deref()
    }

    pub fn bytes(&self) -> &Bytes {
        &self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn extension(&self) -> Option<&str> {
        Path::new(&self.file_name).extension().and_then(|e| e.to_str())
    }
}

/// Encoded upload payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataUri {
    mime: String,
    content: String,
}

impl DataUri {
    /// The MIME type comes from the file extension first, then from the
    /// declared multipart content type.
    pub fn from_file(file: &UploadedFile) -> Result<Self, DataUriError> {
        if file.is_empty() {
            return Err(DataUriError::EmptyBuffer);
        }

        let mime = Self::resolve_mime(file)
            .ok_or_else(|| DataUriError::UnknownMimeType(file.file_name().to_string()))?;

        let content = format!("data:{};base64,{}", mime, BASE64.encode(file.bytes()));

        Ok(Self { mime, content })
    }

    fn resolve_mime(file: &UploadedFile) -> Option<String> {
        if let Some(guessed) = file
            .extension()
            .and_then(|ext| mime_guess::from_ext(ext).first())
        {
            return Some(guessed.essence_str().to_string());
        }

        file.content_type()
            .and_then(|declared| declared.parse::<mime::Mime>().ok())
            .filter(|declared| *declared != mime::APPLICATION_OCTET_STREAM)
            .map(|declared| declared.essence_str().to_string())
    }

    pub fn mime(&self) -> &str {
        &self.mime
    }

    pub fn as_str(&self) -> &str {
        &self.content
    }

    /// Decodes the body back into raw bytes, for stores that take binary uploads.
    pub fn decode(&self) -> Result<Vec<u8>, DataUriError> {
        let (_, body) = self
            .content
            .split_once(";base64,")
            .ok_or(DataUriError::Malformed)?;
        Ok(BASE64.decode(body)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_file_is_absent() {
        assert!(UploadedFile::new("cover.png", None, Vec::new()).is_none());
    }

    #[test]
    fn test_mime_from_extension() {
        let file = UploadedFile::new("cover.png", None, vec![1u8, 2, 3]).unwrap();
        let uri = DataUri::from_file(&file).unwrap();
        assert_eq!(uri.mime(), "image/png");
        assert_eq!(uri.as_str(), "data:image/png;base64,AQID");
    }

    #[test]
    fn test_audio_extension() {
        let file = UploadedFile::new("track.mp3", None, b"ID3".to_vec()).unwrap();
        let uri = DataUri::from_file(&file).unwrap();
        assert_eq!(uri.mime(), "audio/mpeg");
        assert!(uri.as_str().starts_with("data:audio/mpeg;base64,"));
    }

    #[test]
    fn test_falls_back_to_declared_content_type() {
        let file = UploadedFile::new("blob", Some("image/webp".to_string()), vec![9u8]).unwrap();
        let uri = DataUri::from_file(&file).unwrap();
        assert_eq!(uri.mime(), "image/webp");
    }

    #[test]
    fn test_unknown_mime_type_fails() {
        let file = UploadedFile::new(
            "blob",
            Some("application/octet-stream".to_string()),
            vec![9u8],
        )
        .unwrap();
        let result = DataUri::from_file(&file);
        assert!(matches!(result, Err(DataUriError::UnknownMimeType(_))));
    }

    #[test]
    fn test_decode_recovers_bytes() {
        let bytes = b"not really a jpeg".to_vec();
        let file = UploadedFile::new("photo.jpg", None, bytes.clone()).unwrap();
        let uri = DataUri::from_file(&file).unwrap();
        assert_eq!(uri.decode().unwrap(), bytes);
    }
}
