use crate::{Error, Result};
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use bytes::Bytes;
use serde::Serialize;

const PNG_SIGNATURE: &[u8] = &[0x89, b'P', b'N', b'G', b'\r', b'\n', 0x1a, b'\n'];
const JPEG_SIGNATURE: &[u8] = &[0xff, 0xd8, 0xff];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageFormat {
    Jpeg,
    Png,
}

impl ImageFormat {
    pub fn sniff(bytes: &[u8]) -> Option<Self> {
        if bytes.starts_with(PNG_SIGNATURE) {
            Some(Self::Png)
        } else if bytes.starts_with(JPEG_SIGNATURE) {
            Some(Self::Jpeg)
        } else {
            None
        }
    }

    pub fn mime_type(self) -> &'static str {
        match self {
            Self::Jpeg => "image/jpeg",
            Self::Png => "image/png",
        }
    }
}

/// The currently uploaded image: raw bytes plus their base64 encoding,
/// computed once when the payload is created.
#[derive(Debug, Clone)]
pub struct ImagePayload {
    bytes: Bytes,
    base64: String,
    format: ImageFormat,
}

impl ImagePayload {
    pub fn new(bytes: impl Into<Bytes>) -> Result<Self> {
        let bytes = bytes.into();
        if bytes.is_empty() {
            return Err(Error::validation("Uploaded image is empty."));
        }

        let format = ImageFormat::sniff(&bytes).ok_or_else(|| {
            Error::validation("Unsupported image format. Please upload a JPEG or PNG image.")
        })?;

        let base64 = BASE64.encode(&bytes);

        Ok(Self {
            bytes,
            base64,
            format,
        })
    }

    pub fn base64(&self) -> &str {
        &self.base64
    }

    pub fn format(&self) -> ImageFormat {
        self.format
    }

    pub fn byte_len(&self) -> usize {
        self.bytes.len()
    }

    /// Inline reference embedded in the prompt. The upstream endpoint is
    /// always told `image/png`, whatever was uploaded.
    pub fn data_url(&self) -> String {
        format!("data:image/png;base64,{}", self.base64)
    }

    /// Decodes the cached base64 text back into bytes.
    pub fn decode_base64(&self) -> Result<Vec<u8>> {
        BASE64
            .decode(&self.base64)
            .map_err(|e| Error::internal(format!("Cached base64 image is corrupt: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn png_bytes() -> Vec<u8> {
        let mut bytes = PNG_SIGNATURE.to_vec();
        bytes.extend_from_slice(&[0, 0, 0, 13, b'I', b'H', b'D', b'R', 0xde, 0xad, 0xbe, 0xef]);
        bytes
    }

    #[test]
    fn test_base64_round_trip_preserves_bytes() {
        let original = png_bytes();
        let payload = ImagePayload::new(original.clone()).unwrap();

        assert_eq!(payload.decode_base64().unwrap(), original);
        assert_eq!(payload.byte_len(), original.len());
    }

    #[test]
    fn test_sniffs_jpeg_and_png() {
        let jpeg = ImagePayload::new(vec![0xffu8, 0xd8, 0xff, 0xe0, 0x00, 0x10]).unwrap();
        let png = ImagePayload::new(png_bytes()).unwrap();

        assert_eq!(jpeg.format(), ImageFormat::Jpeg);
        assert_eq!(png.format(), ImageFormat::Png);
        assert_eq!(jpeg.format().mime_type(), "image/jpeg");
    }

    #[test]
    fn test_data_url_always_uses_png_media_type() {
        let jpeg = ImagePayload::new(vec![0xffu8, 0xd8, 0xff, 0xdb]).unwrap();
        assert_eq!(jpeg.data_url(), format!("data:image/png;base64,{}", jpeg.base64()));
    }

    #[test]
    fn test_rejects_empty_and_unknown_formats() {
        assert!(ImagePayload::new(Vec::<u8>::new()).unwrap_err().is_validation());
        assert!(ImagePayload::new(b"GIF89a....".to_vec()).unwrap_err().is_validation());
    }
}
