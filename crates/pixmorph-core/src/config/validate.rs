//! Configuration validation with range checks.

use crate::error::ConfigError;

use super::Config;

impl Config {
    /// Validate configuration values are within acceptable ranges.
    pub(crate) fn validate(&self) -> Result<(), ConfigError> {
        if self.storage.timeout_ms == 0 {
            return Err(ConfigError::ValidationError(
                "storage.timeout_ms must be > 0".into(),
            ));
        }
        if self.storage.max_download_mb == 0 {
            return Err(ConfigError::ValidationError(
                "storage.max_download_mb must be > 0".into(),
            ));
        }
        if !self.storage.endpoint.is_empty()
            && !(self.storage.endpoint.starts_with("http://")
                || self.storage.endpoint.starts_with("https://"))
        {
            return Err(ConfigError::ValidationError(
                "storage.endpoint must be an http(s) URL".into(),
            ));
        }
        if self.limits.max_image_dimension == 0 {
            return Err(ConfigError::ValidationError(
                "limits.max_image_dimension must be > 0".into(),
            ));
        }
        if self.limits.process_timeout_ms == 0 {
            return Err(ConfigError::ValidationError(
                "limits.process_timeout_ms must be > 0".into(),
            ));
        }
        if self.rate_limit.window_secs == 0 {
            return Err(ConfigError::ValidationError(
                "rate_limit.window_secs must be > 0".into(),
            ));
        }
        if self.rate_limit.max_requests == 0 {
            return Err(ConfigError::ValidationError(
                "rate_limit.max_requests must be > 0".into(),
            ));
        }
        if !(1..=100).contains(&self.output.jpeg_quality) {
            return Err(ConfigError::ValidationError(
                "output.jpeg_quality must be between 1 and 100".into(),
            ));
        }
        if !(1..=100).contains(&self.output.avif_quality) {
            return Err(ConfigError::ValidationError(
                "output.avif_quality must be between 1 and 100".into(),
            ));
        }
        if !(1..=10).contains(&self.output.avif_speed) {
            return Err(ConfigError::ValidationError(
                "output.avif_speed must be between 1 and 10".into(),
            ));
        }
        self.output.background_rgb()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_passes_validation() {
        let config = Config::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_zero_window() {
        let mut config = Config::default();
        config.rate_limit.window_secs = 0;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("window_secs"));
    }

    #[test]
    fn test_validate_rejects_zero_max_requests() {
        let mut config = Config::default();
        config.rate_limit.max_requests = 0;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("max_requests"));
    }

    #[test]
    fn test_validate_rejects_zero_timeout() {
        let mut config = Config::default();
        config.limits.process_timeout_ms = 0;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("process_timeout_ms"));
    }

    #[test]
    fn test_validate_rejects_out_of_range_quality() {
        let mut config = Config::default();
        config.output.jpeg_quality = 0;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("jpeg_quality"));

        config.output.jpeg_quality = 101;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_bad_background() {
        let mut config = Config::default();
        config.output.background = "white".to_string();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("output.background"));
    }

    #[test]
    fn test_validate_rejects_non_http_endpoint() {
        let mut config = Config::default();
        config.storage.endpoint = "ftp://files.example.com".to_string();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("storage.endpoint"));

        config.storage.endpoint = "https://res.example.com/media".to_string();
        assert!(config.validate().is_ok());
    }
}
