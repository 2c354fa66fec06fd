//! Core data types shared across the transformation core.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::pipeline::OutputFormat;

/// Identifier of a stored image.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ImageId(pub String);

impl ImageId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ImageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Verified identity of the caller, as supplied by the auth gate.
///
/// The core never authenticates; it only uses the identity for rate limiting
/// and record ownership.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CallerId(pub String);

impl CallerId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CallerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A stored image. Records are created, read and deleted, never updated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageRecord {
    /// Record identifier
    pub id: ImageId,

    /// The single owner of this image
    pub owner: CallerId,

    /// Where the encoded bytes live (absolute URL or store-relative path)
    pub location: String,

    /// Identifier assigned by the storage provider
    pub provider_id: String,
}

/// Successful output of a transformation.
#[derive(Debug, Clone)]
pub struct TransformedImage {
    /// Encoded image bytes
    pub bytes: Vec<u8>,

    /// Resolved output container
    pub format: OutputFormat,

    /// MIME type matching `format`
    pub content_type: &'static str,

    /// Output width in pixels
    pub width: u32,

    /// Output height in pixels
    pub height: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_image_record_json_roundtrip_shape() {
        let json = r#"{
            "id": "img-1",
            "owner": "user-7",
            "location": "https://res.example.com/image-service/a.png",
            "provider_id": "image-service/a"
        }"#;
        let record: ImageRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.id.as_str(), "img-1");
        assert_eq!(record.owner, CallerId::new("user-7"));
        assert_eq!(record.provider_id, "image-service/a");
    }
}
