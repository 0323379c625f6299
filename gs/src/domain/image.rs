//! Encoded image payloads
//!
//! Images travel as base64 with a MIME type, both on the wire (Gemini
//! `inlineData`) and in storage, where they are kept as data URLs.

use base64::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use thiserror::Error;

const DEFAULT_MIME_TYPE: &str = "image/png";

/// Errors parsing an image string
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ImageError {
    #[error("Image data is empty")]
    Empty,

    #[error("Unsupported data URL (expected data:<mime>;base64,<data>): {0}")]
    UnsupportedDataUrl(String),
}

/// A base64-encoded bitmap with its MIME type
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct EncodedImage {
    mime_type: String,
    data: String,
}

impl EncodedImage {
    /// Wrap an already-encoded payload
    pub fn new(mime_type: impl Into<String>, data: impl Into<String>) -> Self {
        let mime_type = mime_type.into();
        Self {
            mime_type: if mime_type.is_empty() {
                DEFAULT_MIME_TYPE.to_string()
            } else {
                mime_type
            },
            data: data.into(),
        }
    }

    /// Encode raw image bytes, detecting the MIME type from the signature
    pub fn from_bytes(bytes: &[u8]) -> Self {
        Self::new(sniff_mime_type(bytes), BASE64_STANDARD.encode(bytes))
    }

    /// Read and encode an image file
    pub fn from_path(path: impl AsRef<Path>) -> std::io::Result<Self> {
        let bytes = std::fs::read(path)?;
        Ok(Self::from_bytes(&bytes))
    }

    /// Parse a data URL, or a bare base64 payload (assumed PNG)
    pub fn parse(s: &str) -> Result<Self, ImageError> {
        let s = s.trim();
        if s.is_empty() {
            return Err(ImageError::Empty);
        }

        let Some(rest) = s.strip_prefix("data:") else {
            return Ok(Self::new(DEFAULT_MIME_TYPE, s));
        };

        let (header, data) = rest
            .split_once(',')
            .ok_or_else(|| ImageError::UnsupportedDataUrl(truncate(s)))?;
        let mime_type = header
            .strip_suffix(";base64")
            .ok_or_else(|| ImageError::UnsupportedDataUrl(truncate(s)))?;

        if data.is_empty() {
            return Err(ImageError::Empty);
        }
        Ok(Self::new(mime_type, data))
    }

    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }

    /// Base64 payload without any data URL prefix
    pub fn data(&self) -> &str {
        &self.data
    }

    /// `data:<mime>;base64,<data>`
    pub fn to_data_url(&self) -> String {
        format!("data:{};base64,{}", self.mime_type, self.data)
    }

    /// Decode the payload to raw bytes
    pub fn decode(&self) -> Result<Vec<u8>, base64::DecodeError> {
        BASE64_STANDARD.decode(&self.data)
    }

    /// File extension matching the MIME type
    pub fn extension(&self) -> &'static str {
        match self.mime_type.as_str() {
            "image/jpeg" | "image/jpg" => "jpg",
            "image/gif" => "gif",
            "image/webp" => "webp",
            _ => "png",
        }
    }

    /// Decode and write the image to `path`
    pub fn write_to(&self, path: impl AsRef<Path>) -> std::io::Result<()> {
        let bytes = self
            .decode()
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
        std::fs::write(path, bytes)
    }
}

impl fmt::Debug for EncodedImage {
    // Payloads run to megabytes; keep logs readable
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EncodedImage")
            .field("mime_type", &self.mime_type)
            .field("data_len", &self.data.len())
            .finish()
    }
}

impl TryFrom<String> for EncodedImage {
    type Error = ImageError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::parse(&s)
    }
}

impl From<EncodedImage> for String {
    fn from(image: EncodedImage) -> Self {
        image.to_data_url()
    }
}

/// Determine MIME type from the image signature
pub fn sniff_mime_type(bytes: &[u8]) -> &'static str {
    if bytes.starts_with(&[0xFF, 0xD8, 0xFF]) {
        "image/jpeg"
    } else if bytes.starts_with(&[0x89, 0x50, 0x4E, 0x47]) {
        "image/png"
    } else if bytes.starts_with(&[0x47, 0x49, 0x46]) {
        "image/gif"
    } else if bytes.len() >= 12 && bytes.starts_with(b"RIFF") && &bytes[8..12] == b"WEBP" {
        "image/webp"
    } else {
        DEFAULT_MIME_TYPE
    }
}

fn truncate(s: &str) -> String {
    s.chars().take(40).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const PNG_HEADER: [u8; 8] = [0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A];

    #[test]
    fn test_from_bytes_sniffs_mime() {
        assert_eq!(EncodedImage::from_bytes(&PNG_HEADER).mime_type(), "image/png");
        assert_eq!(EncodedImage::from_bytes(&[0xFF, 0xD8, 0xFF, 0xE0]).mime_type(), "image/jpeg");
        assert_eq!(EncodedImage::from_bytes(b"GIF89a").mime_type(), "image/gif");
        assert_eq!(EncodedImage::from_bytes(b"RIFF\0\0\0\0WEBPVP8 ").mime_type(), "image/webp");
        assert_eq!(EncodedImage::from_bytes(b"unknown").mime_type(), "image/png");
    }

    #[test]
    fn test_parse_data_url() {
        let image = EncodedImage::parse("data:image/jpeg;base64,QUJD").unwrap();
        assert_eq!(image.mime_type(), "image/jpeg");
        assert_eq!(image.data(), "QUJD");
        assert_eq!(image.decode().unwrap(), b"ABC");
        assert_eq!(image.extension(), "jpg");
    }

    #[test]
    fn test_parse_bare_base64_defaults_to_png() {
        let image = EncodedImage::parse("QUJD").unwrap();
        assert_eq!(image.mime_type(), "image/png");
        assert_eq!(image.to_data_url(), "data:image/png;base64,QUJD");
    }

    #[test]
    fn test_parse_rejects_bad_input() {
        assert_eq!(EncodedImage::parse("   "), Err(ImageError::Empty));
        assert_eq!(EncodedImage::parse("data:image/png;base64,"), Err(ImageError::Empty));
        assert!(matches!(
            EncodedImage::parse("data:text/plain,hello"),
            Err(ImageError::UnsupportedDataUrl(_))
        ));
    }

    #[test]
    fn test_serde_uses_data_url_string() {
        let image = EncodedImage::new("image/png", "QUJD");
        let json = serde_json::to_string(&image).unwrap();
        assert_eq!(json, "\"data:image/png;base64,QUJD\"");

        let back: EncodedImage = serde_json::from_str(&json).unwrap();
        assert_eq!(back, image);
    }

    #[test]
    fn test_debug_omits_payload() {
        let image = EncodedImage::new("image/png", "QUJD".repeat(100));
        let debug = format!("{:?}", image);
        assert!(debug.contains("data_len: 400"));
        assert!(!debug.contains("QUJDQUJD"));
    }

    #[test]
    fn test_write_to_decodes() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("out.png");
        EncodedImage::from_bytes(&PNG_HEADER).write_to(&path).unwrap();
        assert_eq!(std::fs::read(&path).unwrap(), PNG_HEADER);
    }
}
