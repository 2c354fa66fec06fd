//! Transformation requests as callers send them, and the validated plan the
//! pipeline executes.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

use crate::error::TransformError;

/// Output container formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    Jpeg,
    Png,
    WebP,
    Tiff,
    Avif,
    Gif,
}

impl OutputFormat {
    /// Format used when a request does not name one.
    pub const DEFAULT: OutputFormat = OutputFormat::Jpeg;

    /// Every supported format.
    pub const ALL: [OutputFormat; 6] = [
        OutputFormat::Jpeg,
        OutputFormat::Png,
        OutputFormat::WebP,
        OutputFormat::Tiff,
        OutputFormat::Avif,
        OutputFormat::Gif,
    ];

    /// MIME type for responses.
    pub fn content_type(self) -> &'static str {
        match self {
            OutputFormat::Jpeg => "image/jpeg",
            OutputFormat::Png => "image/png",
            OutputFormat::WebP => "image/webp",
            OutputFormat::Tiff => "image/tiff",
            OutputFormat::Avif => "image/avif",
            OutputFormat::Gif => "image/gif",
        }
    }

    /// Whether the container can carry an alpha channel.
    pub fn supports_alpha(self) -> bool {
        !matches!(self, OutputFormat::Jpeg)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            OutputFormat::Jpeg => "jpeg",
            OutputFormat::Png => "png",
            OutputFormat::WebP => "webp",
            OutputFormat::Tiff => "tiff",
            OutputFormat::Avif => "avif",
            OutputFormat::Gif => "gif",
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OutputFormat {
    type Err = TransformError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "jpeg" | "jpg" => Ok(OutputFormat::Jpeg),
            "png" => Ok(OutputFormat::Png),
            "webp" => Ok(OutputFormat::WebP),
            "tiff" | "tif" => Ok(OutputFormat::Tiff),
            "avif" => Ok(OutputFormat::Avif),
            "gif" => Ok(OutputFormat::Gif),
            _ => Err(TransformError::UnsupportedFormat {
                format: s.to_string(),
            }),
        }
    }
}

/// Target size for the resize stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResizeOptions {
    pub width: u32,
    pub height: u32,
}

/// Rectangle for the crop stage, relative to the post-resize image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CropOptions {
    pub width: u32,
    pub height: u32,
    /// Left offset
    #[serde(alias = "left")]
    pub x: u32,
    /// Top offset
    #[serde(alias = "top")]
    pub y: u32,
}

/// Color filter toggles.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterOptions {
    pub grayscale: bool,
    pub sepia: bool,
}

/// A transformation request as submitted by a caller.
///
/// Every field is optional; an empty request re-encodes the source as JPEG.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TransformationRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resize: Option<ResizeOptions>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub crop: Option<CropOptions>,

    /// Degrees; positive is clockwise
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rotate: Option<f64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub filters: Option<FilterOptions>,

    /// Output container name, checked against [`OutputFormat`]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
}

impl TransformationRequest {
    /// Parse a JSON request, either bare or wrapped as
    /// `{"transformations": {...}}`.
    ///
    /// Shape and type errors are reported as validation errors that name the
    /// offending field.
    pub fn from_json(json: &str) -> Result<Self, TransformError> {
        let value: Value = serde_json::from_str(json).map_err(malformed)?;
        let body = match value {
            Value::Object(mut map) if map.len() == 1 => match map.remove("transformations") {
                Some(inner) => inner,
                None => Value::Object(map),
            },
            other => other,
        };
        serde_json::from_value(body).map_err(malformed)
    }
}

fn malformed(e: serde_json::Error) -> TransformError {
    TransformError::Validation(format!("malformed request: {e}"))
}

/// Rotation normalized to `0..360` clockwise degrees.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rotation(u16);

impl Rotation {
    /// Normalize an angle. Fails unless it is a finite whole number.
    pub fn from_degrees(degrees: f64) -> Result<Self, TransformError> {
        if !degrees.is_finite() || degrees.fract() != 0.0 {
            return Err(TransformError::InvalidRotationAngle { degrees });
        }
        let normalized = degrees.rem_euclid(360.0) as u16;
        Ok(Self(normalized))
    }

    pub fn degrees(self) -> u16 {
        self.0
    }

    pub fn is_identity(self) -> bool {
        self.0 == 0
    }
}

/// A validated request. The pipeline and encoder only see plans.
#[derive(Debug, Clone, PartialEq)]
pub struct TransformPlan {
    pub resize: Option<ResizeOptions>,
    pub crop: Option<CropOptions>,
    pub rotate: Option<Rotation>,
    pub grayscale: bool,
    pub sepia: bool,
    pub format: OutputFormat,
}

impl Default for TransformPlan {
    fn default() -> Self {
        Self {
            resize: None,
            crop: None,
            rotate: None,
            grayscale: false,
            sepia: false,
            format: OutputFormat::DEFAULT,
        }
    }
}
