//! PDF export via wkhtmltopdf.
//!
//! The printable HTML document is piped to `wkhtmltopdf - -` and the PDF is
//! read back from stdout. The binary must be installed; when it cannot be
//! started the exporter reports `ServiceUnavailable`.

use std::io::ErrorKind;
use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::debug;

use crate::adapters::view::render_standalone_document;
use crate::config::ExportConfig;
use crate::domain::lesson_plan::LessonPlan;
use crate::ports::{ExportError, ExportFormat, ExportedDocument, PlanExporter};

/// Resolution wkhtmltopdf treats as 1x.
const BASE_DPI: u32 = 96;

/// A4 portrait PDF exporter.
#[derive(Debug, Clone)]
pub struct PdfExporter {
    /// Path to the wkhtmltopdf executable. If None, PATH is searched.
    binary: Option<String>,
    margin_mm: u32,
    scale: u32,
    image_quality: u8,
    timeout: Duration,
}

impl Default for PdfExporter {
    fn default() -> Self {
        Self::from_config(&ExportConfig::default())
    }
}

impl PdfExporter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_config(config: &ExportConfig) -> Self {
        Self {
            binary: config.wkhtmltopdf_path.clone(),
            margin_mm: config.pdf_margin_mm,
            scale: config.pdf_scale,
            image_quality: config.pdf_image_quality,
            timeout: config.pdf_timeout(),
        }
    }

    pub fn with_binary(mut self, path: impl Into<String>) -> Self {
        self.binary = Some(path.into());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    fn command(&self) -> &str {
        self.binary.as_deref().unwrap_or("wkhtmltopdf")
    }

    /// Command-line arguments; input and output are stdin and stdout.
    fn arguments(&self) -> Vec<String> {
        let margin = self.margin_mm.to_string();
        let mut args: Vec<String> = [
            "--quiet",
            "--page-size",
            "A4",
            "--orientation",
            "Portrait",
            "--encoding",
            "utf-8",
        ]
        .iter()
        .map(|s| s.to_string())
        .collect();

        for side in ["-T", "-B", "-L", "-R"] {
            args.push(side.to_string());
            args.push(format!("{}mm", margin));
        }
        args.push("--dpi".to_string());
        args.push((BASE_DPI * self.scale).to_string());
        args.push("--image-quality".to_string());
        args.push(self.image_quality.to_string());
        args.push("-".to_string());
        args.push("-".to_string());
        args
    }

    /// Whether the converter can be started at all.
    pub async fn is_available(&self) -> bool {
        let output = Command::new(self.command())
            .arg("--version")
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .output()
            .await;

        output.map(|o| o.status.success()).unwrap_or(false)
    }

    /// Converts a complete HTML document to PDF bytes.
    pub async fn convert(&self, html: &str) -> Result<Vec<u8>, ExportError> {
        let mut child = Command::new(self.command())
            .args(self.arguments())
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| match e.kind() {
                ErrorKind::NotFound | ErrorKind::PermissionDenied => {
                    ExportError::service_unavailable(format!(
                        "wkhtmltopdf could not be started ({}). PDF export requires wkhtmltopdf.",
                        e
                    ))
                }
                _ => ExportError::pdf_failed(format!("Failed to start wkhtmltopdf: {}", e)),
            })?;

        let input = html.as_bytes().to_vec();
        let stdin = child.stdin.take();
        let run = async move {
            if let Some(mut stdin) = stdin {
                stdin.write_all(&input).await.map_err(|e| {
                    ExportError::pdf_failed(format!("Failed to write to wkhtmltopdf: {}", e))
                })?;
            }
            child
                .wait_with_output()
                .await
                .map_err(|e| ExportError::pdf_failed(format!("wkhtmltopdf execution failed: {}", e)))
        };

        let output = tokio::time::timeout(self.timeout, run)
            .await
            .map_err(|_| ExportError::Timeout(self.timeout.as_secs()))??;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(ExportError::pdf_failed(format!(
                "wkhtmltopdf returned error: {}",
                stderr.trim()
            )));
        }
        if output.stdout.is_empty() {
            return Err(ExportError::pdf_failed("wkhtmltopdf produced no output"));
        }

        debug!(bytes = output.stdout.len(), "PDF rendered");
        Ok(output.stdout)
    }
}

#[async_trait]
impl PlanExporter for PdfExporter {
    fn format(&self) -> ExportFormat {
        ExportFormat::Pdf
    }

    async fn export(&self, plan: &LessonPlan) -> Result<ExportedDocument, ExportError> {
        let html = render_standalone_document(plan);
        let content = self.convert(&html).await?;
        Ok(ExportedDocument::new(content, ExportFormat::Pdf, &plan.title))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::lesson_plan::fixtures::orange_plan;

    #[test]
    fn arguments_follow_config() {
        let config = ExportConfig {
            pdf_margin_mm: 12,
            pdf_scale: 2,
            pdf_image_quality: 90,
            ..Default::default()
        };
        let args = PdfExporter::from_config(&config).arguments();
        let joined = args.join(" ");

        assert!(joined.contains("--page-size A4"));
        assert!(joined.contains("--orientation Portrait"));
        assert!(joined.contains("-T 12mm -B 12mm -L 12mm -R 12mm"));
        assert!(joined.contains("--dpi 192"));
        assert!(joined.contains("--image-quality 90"));
        assert!(joined.ends_with("- -"));
    }

    #[test]
    fn default_uses_path_lookup() {
        let exporter = PdfExporter::new();
        assert_eq!(exporter.command(), "wkhtmltopdf");
        assert_eq!(exporter.timeout, Duration::from_secs(60));

        let custom = exporter.with_binary("/opt/bin/wkhtmltopdf");
        assert_eq!(custom.command(), "/opt/bin/wkhtmltopdf");
    }

    #[tokio::test]
    async fn missing_binary_is_service_unavailable() {
        let exporter = PdfExporter::new().with_binary("/nonexistent/edugen/wkhtmltopdf");

        assert!(!exporter.is_available().await);
        let err = exporter.export(&orange_plan()).await.unwrap_err();
        assert!(matches!(err, ExportError::ServiceUnavailable(_)));
    }

    #[cfg(unix)]
    mod with_script {
        use super::*;
        use std::os::unix::fs::PermissionsExt;
        use tempfile::TempDir;

        fn script(body: &str) -> (TempDir, String) {
            let dir = TempDir::new().unwrap();
            let path = dir.path().join("wkhtmltopdf");
            std::fs::write(&path, format!("#!/bin/sh\n{}\n", body)).unwrap();
            std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
            let path = path.to_string_lossy().into_owned();
            (dir, path)
        }

        #[tokio::test]
        async fn pipes_html_through_converter() {
            // Echoes stdin back, prefixed with a fake PDF header.
            let (_dir, path) = script("printf '%%PDF-1.4\\n'; cat");
            let exporter = PdfExporter::new().with_binary(path);

            let doc = exporter.export(&orange_plan()).await.unwrap();

            assert_eq!(doc.filename, "Khám phá quả cam.pdf");
            let body = String::from_utf8(doc.content).unwrap();
            assert!(body.starts_with("%PDF-1.4"));
            assert!(body.contains("<title>Khám phá quả cam</title>"));
        }

        #[tokio::test]
        async fn non_zero_exit_is_conversion_failure() {
            let (_dir, path) = script("cat >/dev/null; echo 'bad page' >&2; exit 1");
            let exporter = PdfExporter::new().with_binary(path);

            let err = exporter.export(&orange_plan()).await.unwrap_err();

            match err {
                ExportError::PdfConversionFailed(message) => assert!(message.contains("bad page")),
                other => panic!("unexpected error: {other:?}"),
            }
        }

        #[tokio::test]
        async fn slow_converter_times_out() {
            let (_dir, path) = script("cat >/dev/null; sleep 5");
            let exporter = PdfExporter::new()
                .with_binary(path)
                .with_timeout(Duration::from_secs(1));

            let err = exporter.export(&orange_plan()).await.unwrap_err();

            assert!(matches!(err, ExportError::Timeout(1)));
        }
    }
}
