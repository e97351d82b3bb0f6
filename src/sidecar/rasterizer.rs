use std::path::Path;
use std::process::Stdio;

use async_trait::async_trait;
use tokio::process::Command;
use tracing::{debug, info};

use crate::core::config::RasterizerCommand;
use crate::core::errors::{AppError, AppResult};
use crate::sidecar::types::{RasterizedDocument, RasterizerReport};

#[async_trait]
pub trait PageRasterizer: Send + Sync {
    async fn rasterize(&self, pdf_path: &Path, output_dir: &Path) -> AppResult<RasterizedDocument>;
}

/// Runs `<program> <args...> <pdf_path> <output_dir>`, which prints one JSON
/// report on stdout.
#[derive(Debug, Clone)]
pub struct SidecarRasterizer {
    command: RasterizerCommand,
}

impl SidecarRasterizer {
    pub fn new(command: RasterizerCommand) -> Self {
        Self { command }
    }
}

#[async_trait]
impl PageRasterizer for SidecarRasterizer {
    async fn rasterize(&self, pdf_path: &Path, output_dir: &Path) -> AppResult<RasterizedDocument> {
        info!(
            program = %self.command.program,
            pdf = %pdf_path.display(),
            "running rasterizer"
        );
        let output = Command::new(&self.command.program)
            .args(&self.command.args)
            .arg(pdf_path)
            .arg(output_dir)
            .stdin(Stdio::null())
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|err| {
                AppError::Sidecar(format!("failed to run {}: {err}", self.command.program))
            })?;

        let stdout = String::from_utf8_lossy(&output.stdout);
        let stderr = String::from_utf8_lossy(&output.stderr);
        if !stderr.trim().is_empty() {
            debug!(stderr = %stderr.trim(), "rasterizer stderr");
        }

        if !output.status.success() {
            let detail = parse_report(&stdout)
                .ok()
                .and_then(|report| report.error)
                .unwrap_or_else(|| stderr.trim().to_string());
            return Err(AppError::Sidecar(format!(
                "rasterizer exited with {}: {detail}",
                output.status
            )));
        }

        let report = parse_report(&stdout)?;
        into_document(report)
    }
}

/// Parses the rasterizer's stdout, tolerating log lines before the JSON
/// object by falling back to the last non-empty line.
pub fn parse_report(stdout: &str) -> AppResult<RasterizerReport> {
    let trimmed = stdout.trim();
    serde_json::from_str::<RasterizerReport>(trimmed)
        .or_else(|first_err| {
            trimmed
                .lines()
                .rev()
                .map(str::trim)
                .find(|line| !line.is_empty())
                .ok_or(first_err)
                .and_then(serde_json::from_str::<RasterizerReport>)
        })
        .map_err(|err| AppError::Sidecar(format!("unparseable rasterizer output: {err}")))
}

pub fn into_document(report: RasterizerReport) -> AppResult<RasterizedDocument> {
    if !report.success {
        return Err(AppError::Sidecar(
            report
                .error
                .unwrap_or_else(|| "rasterizer reported failure".to_string()),
        ));
    }
    Ok(RasterizedDocument {
        pages: report.pages.max(report.image_paths.len()),
        image_paths: report.image_paths,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_success_report() {
        let report = parse_report(
            r#"{"success": true, "pages": 2, "image_paths": ["/tmp/x/page-1.png", "/tmp/x/page-2.png"]}"#,
        )
        .expect("report");
        let document = into_document(report).expect("document");
        assert_eq!(document.pages, 2);
        assert_eq!(document.image_paths[1], Path::new("/tmp/x/page-2.png"));
    }

    #[test]
    fn tolerates_leading_log_lines() {
        let report = parse_report("loading mupdf\n{\"success\": true, \"pages\": 0, \"image_paths\": []}\n")
            .expect("report");
        assert!(report.success);
    }

    #[test]
    fn failure_report_carries_error_text() {
        let report = parse_report(r#"{"success": false, "error": "PDF file not found: a.pdf"}"#)
            .expect("report");
        let err = into_document(report).expect_err("failure");
        assert!(matches!(err, AppError::Sidecar(message) if message.contains("not found")));
    }

    #[test]
    fn garbage_is_a_sidecar_error() {
        let err = parse_report("Traceback (most recent call last):").expect_err("garbage");
        assert_eq!(err.code(), "RASTERIZER_ERROR");
    }
}
