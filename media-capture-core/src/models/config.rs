use std::path::PathBuf;

/// Configuration for a capture modal session.
#[derive(Debug, Clone, PartialEq)]
pub struct CaptureConfig {
    /// Seconds counted down before a photo frame grab (default: 3).
    pub countdown_secs: u32,

    /// JPEG quality for photo artifacts, 1–100 (default: 92).
    pub jpeg_quality: u8,

    /// Application name used as the download filename prefix.
    pub app_name: String,

    /// Directory where downloaded artifacts are written.
    pub output_directory: PathBuf,
}

impl CaptureConfig {
    pub fn validate(&self) -> Result<(), String> {
        if self.countdown_secs == 0 || self.countdown_secs > 10 {
            return Err(format!(
                "countdown must be 1-10 seconds, got {}",
                self.countdown_secs
            ));
        }
        if self.jpeg_quality == 0 || self.jpeg_quality > 100 {
            return Err(format!("jpeg quality must be 1-100, got {}", self.jpeg_quality));
        }
        if self.app_name.trim().is_empty() {
            return Err("app name must not be empty".into());
        }
        Ok(())
    }
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            countdown_secs: 3,
            jpeg_quality: 92,
            app_name: "capture".into(),
            output_directory: PathBuf::from("."),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        assert!(CaptureConfig::default().validate().is_ok());
    }

    #[test]
    fn rejects_zero_countdown() {
        let config = CaptureConfig {
            countdown_secs: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn rejects_out_of_range_quality() {
        let config = CaptureConfig {
            jpeg_quality: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = CaptureConfig {
            jpeg_quality: 101,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn rejects_blank_app_name() {
        let config = CaptureConfig {
            app_name: "  ".into(),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }
}
