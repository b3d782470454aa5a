//! Image assets and transport encoding
//!
//! An [`ImageAsset`] holds the raw bytes of a user-selected image together
//! with its MIME type. [`encode`] turns it into the base64 payload embedded
//! in the analysis request. Data-URL helpers cover front-ends that hand the
//! image over as a `data:<mime>;base64,<data>` string.

use base64::{engine::general_purpose, Engine as _};
use std::fmt;

use crate::error::{Error, Result};

/// Supported image MIME types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MimeType {
    Png,
    Jpeg,
    Webp,
}

impl MimeType {
    pub fn as_str(&self) -> &'static str {
        match self {
            MimeType::Png => "image/png",
            MimeType::Jpeg => "image/jpeg",
            MimeType::Webp => "image/webp",
        }
    }

    /// Parses a MIME type string, rejecting anything outside
    /// png / jpeg / webp.
    pub fn parse(s: &str) -> Result<Self> {
        match s {
            "image/png" => Ok(MimeType::Png),
            "image/jpeg" => Ok(MimeType::Jpeg),
            "image/webp" => Ok(MimeType::Webp),
            other => Err(Error::Encoding(format!("unsupported MIME type: {other}"))),
        }
    }
}

impl fmt::Display for MimeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Identity tag for a selected image
///
/// Assigned per selection, monotonically increasing. In-flight analysis
/// requests carry the id of the asset they were issued for so that a
/// response arriving after the asset changed can be dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AssetId(u64);

impl AssetId {
    pub(crate) fn new(raw: u64) -> Self {
        Self(raw)
    }
}

/// User-selected image, immutable once captured
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageAsset {
    bytes: Vec<u8>,
    mime_type: MimeType,
}

impl ImageAsset {
    pub fn new(bytes: Vec<u8>, mime_type: MimeType) -> Self {
        Self { bytes, mime_type }
    }

    /// Builds an asset from a `data:<mime>;base64,<data>` URL,
    /// decoding the payload back to raw bytes.
    pub fn from_data_url(data_url: &str) -> Result<Self> {
        let payload = EncodedPayload::from_data_url(data_url)?;
        let bytes = general_purpose::STANDARD
            .decode(payload.data.as_bytes())
            .map_err(|e| Error::Encoding(format!("invalid base64 in data URL: {e}")))?;
        Ok(Self::new(bytes, payload.mime_type))
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn mime_type(&self) -> MimeType {
        self.mime_type
    }
}

/// Base64 transport form of an image, regenerated per request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedPayload {
    pub data: String,
    pub mime_type: MimeType,
}

impl EncodedPayload {
    /// Splits a data URL into its MIME type and base64 body.
    pub fn from_data_url(data_url: &str) -> Result<Self> {
        let rest = data_url
            .strip_prefix("data:")
            .ok_or_else(|| Error::Encoding("not a data URL".to_string()))?;
        let (header, data) = rest
            .split_once(',')
            .ok_or_else(|| Error::Encoding("data URL has no payload".to_string()))?;
        let mime_type = MimeType::parse(header.split(';').next().unwrap_or_default())?;
        if data.is_empty() {
            return Err(Error::Encoding("data URL payload is empty".to_string()));
        }
        Ok(Self {
            data: data.to_string(),
            mime_type,
        })
    }

    pub fn to_data_url(&self) -> String {
        format!("data:{};base64,{}", self.mime_type, self.data)
    }
}

/// Encodes image bytes into the base64 transport form.
///
/// Deterministic and synchronous; the MIME type passes through unchanged.
/// Empty byte buffers fail with an encoding error so callers never issue a
/// network request for an unreadable image.
pub fn encode(asset: &ImageAsset) -> Result<EncodedPayload> {
    if asset.bytes().is_empty() {
        return Err(Error::Encoding("image contains no data".to_string()));
    }
    Ok(EncodedPayload {
        data: general_purpose::STANDARD.encode(asset.bytes()),
        mime_type: asset.mime_type(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    // =============================================
    // Encoder tests
    // =============================================

    #[test]
    fn test_encode_round_trip() {
        let bytes = vec![0x89, 0x50, 0x4e, 0x47, 0x0d, 0x0a, 0x1a, 0x0a];
        let asset = ImageAsset::new(bytes.clone(), MimeType::Png);
        let payload = encode(&asset).unwrap();

        assert_eq!(payload.mime_type, MimeType::Png);
        let decoded = general_purpose::STANDARD.decode(payload.data.as_bytes()).unwrap();
        assert_eq!(decoded, bytes);
    }

    #[test]
    fn test_encode_passes_mime_type_through() {
        for mime in [MimeType::Png, MimeType::Jpeg, MimeType::Webp] {
            let asset = ImageAsset::new(vec![1, 2, 3], mime);
            assert_eq!(encode(&asset).unwrap().mime_type, mime);
        }
    }

    #[test]
    fn test_encode_empty_bytes_fails() {
        let asset = ImageAsset::new(vec![], MimeType::Jpeg);
        let err = encode(&asset).unwrap_err();
        assert!(matches!(err, Error::Encoding(_)));
    }

    #[test]
    fn test_encode_is_deterministic() {
        let asset = ImageAsset::new(vec![0xff, 0xd8, 0xff], MimeType::Jpeg);
        assert_eq!(encode(&asset).unwrap(), encode(&asset).unwrap());
    }

    // =============================================
    // MIME type tests
    // =============================================

    #[test]
    fn test_mime_type_parse_supported() {
        assert_eq!(MimeType::parse("image/png").unwrap(), MimeType::Png);
        assert_eq!(MimeType::parse("image/jpeg").unwrap(), MimeType::Jpeg);
        assert_eq!(MimeType::parse("image/webp").unwrap(), MimeType::Webp);
    }

    #[test]
    fn test_mime_type_parse_unsupported() {
        assert!(MimeType::parse("image/gif").is_err());
        assert!(MimeType::parse("text/plain").is_err());
        assert!(MimeType::parse("").is_err());
    }

    // =============================================
    // Data URL tests
    // =============================================

    #[test]
    fn test_payload_from_data_url_jpeg() {
        let payload = EncodedPayload::from_data_url("data:image/jpeg;base64,/9j/4AAQSkZJRg==").unwrap();
        assert_eq!(payload.mime_type, MimeType::Jpeg);
        assert_eq!(payload.data, "/9j/4AAQSkZJRg==");
    }

    #[test]
    fn test_payload_from_data_url_invalid() {
        assert!(EncodedPayload::from_data_url("not a data url").is_err());
        assert!(EncodedPayload::from_data_url("data:image/png;base64").is_err());
        assert!(EncodedPayload::from_data_url("data:image/png;base64,").is_err());
        assert!(EncodedPayload::from_data_url("data:image/gif;base64,R0lGOD").is_err());
    }

    #[test]
    fn test_data_url_round_trip() {
        let asset = ImageAsset::new(vec![0x52, 0x49, 0x46, 0x46], MimeType::Webp);
        let url = encode(&asset).unwrap().to_data_url();
        assert!(url.starts_with("data:image/webp;base64,"));

        let restored = ImageAsset::from_data_url(&url).unwrap();
        assert_eq!(restored, asset);
    }
}
