//! Sub-configuration structs with their defaults.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Remote object store and image catalog settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Base URL that relative image locations are joined onto.
    /// Empty means only absolute locations can be fetched.
    pub endpoint: String,

    /// Per-request retrieval timeout in milliseconds
    pub timeout_ms: u64,

    /// Maximum accepted payload size in megabytes
    pub max_download_mb: u64,

    /// JSON file holding image records (supports `~`)
    pub catalog_path: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            endpoint: String::new(),
            timeout_ms: 30_000,
            max_download_mb: 25,
            catalog_path: "~/.pixmorph/images.json".to_string(),
        }
    }
}

impl StorageConfig {
    /// Maximum payload size in bytes.
    pub fn max_download_bytes(&self) -> u64 {
        self.max_download_mb.saturating_mul(1024 * 1024)
    }
}

/// Resource limits to protect against problematic inputs.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LimitsConfig {
    /// Maximum image dimension (width or height), for sources and resize targets
    pub max_image_dimension: u32,

    /// Timeout for decode + transform + encode, in milliseconds
    pub process_timeout_ms: u64,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_image_dimension: 10_000,
            process_timeout_ms: 30_000,
        }
    }
}

/// Whose requests share one rate-limit budget.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RateLimitScope {
    /// Each caller identity gets its own window
    PerCaller,
    /// All callers share a single window
    Global,
}

/// Rolling-window rate limit for transformation requests.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RateLimitConfig {
    /// Whether requests are rate limited at all
    pub enabled: bool,

    /// Length of the rolling window in seconds
    pub window_secs: u64,

    /// Requests admitted per window
    pub max_requests: u32,

    /// Budget scope
    pub scope: RateLimitScope,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            window_secs: 60,
            max_requests: 10,
            scope: RateLimitScope::PerCaller,
        }
    }
}

/// Encoder settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// JPEG quality (1-100)
    pub jpeg_quality: u8,

    /// AVIF quality (1-100)
    pub avif_quality: u8,

    /// AVIF encoder speed (1 = slowest/best, 10 = fastest)
    pub avif_speed: u8,

    /// Color that transparent pixels are flattened onto for formats
    /// without alpha, as `#rrggbb`
    pub background: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            jpeg_quality: 80,
            avif_quality: 50,
            avif_speed: 4,
            background: "#ffffff".to_string(),
        }
    }
}

impl OutputConfig {
    /// Parse `background` into RGB components.
    pub fn background_rgb(&self) -> Result<[u8; 3], ConfigError> {
        parse_hex_color(&self.background).ok_or_else(|| {
            ConfigError::ValidationError(format!(
                "output.background must be #rrggbb, got {:?}",
                self.background
            ))
        })
    }
}

/// Logging settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level: error, warn, info, debug, trace
    pub level: String,

    /// Log format: "pretty" or "json"
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}

/// Parse `#rrggbb` (leading `#` optional).
pub fn parse_hex_color(input: &str) -> Option<[u8; 3]> {
    let hex = input.trim().trim_start_matches('#');
    if hex.len() != 6 || !hex.is_ascii() {
        return None;
    }
    let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
    Some([channel(0)?, channel(2)?, channel(4)?])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_hex_color() {
        assert_eq!(parse_hex_color("#704214"), Some([0x70, 0x42, 0x14]));
        assert_eq!(parse_hex_color("FFFFFF"), Some([255, 255, 255]));
        assert_eq!(parse_hex_color("#fff"), None);
        assert_eq!(parse_hex_color("#gg0000"), None);
    }

    #[test]
    fn test_max_download_bytes() {
        let storage = StorageConfig::default();
        assert_eq!(storage.max_download_bytes(), 25 * 1024 * 1024);
    }

    #[test]
    fn test_scope_serializes_snake_case() {
        let toml = toml::to_string(&RateLimitConfig::default()).unwrap();
        assert!(toml.contains("scope = \"per_caller\""));
    }
}
