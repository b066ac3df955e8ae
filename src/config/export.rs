//! Document export configuration

use serde::Deserialize;
use std::time::Duration;

use super::error::ValidationError;

/// PDF snapshot settings. Word and slide export need no configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ExportConfig {
    /// Path to the wkhtmltopdf executable. If unset, PATH is searched.
    pub wkhtmltopdf_path: Option<String>,

    /// Page margin on every side, in millimetres
    #[serde(default = "default_margin_mm")]
    pub pdf_margin_mm: u32,

    /// Raster scale relative to 96 dpi
    #[serde(default = "default_scale")]
    pub pdf_scale: u32,

    /// JPEG quality for embedded images (1-100)
    #[serde(default = "default_image_quality")]
    pub pdf_image_quality: u8,

    /// Conversion timeout in seconds
    #[serde(default = "default_timeout")]
    pub pdf_timeout_secs: u64,
}

impl ExportConfig {
    pub fn pdf_timeout(&self) -> Duration {
        Duration::from_secs(self.pdf_timeout_secs)
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.pdf_scale == 0 || self.pdf_scale > 8 {
            return Err(ValidationError::InvalidPdfScale);
        }
        if self.pdf_image_quality == 0 || self.pdf_image_quality > 100 {
            return Err(ValidationError::InvalidImageQuality);
        }
        if self.pdf_timeout_secs == 0 {
            return Err(ValidationError::InvalidTimeout);
        }
        Ok(())
    }
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            wkhtmltopdf_path: None,
            pdf_margin_mm: default_margin_mm(),
            pdf_scale: default_scale(),
            pdf_image_quality: default_image_quality(),
            pdf_timeout_secs: default_timeout(),
        }
    }
}

fn default_margin_mm() -> u32 {
    10
}

fn default_scale() -> u32 {
    2
}

fn default_image_quality() -> u8 {
    98
}

fn default_timeout() -> u64 {
    60
}
