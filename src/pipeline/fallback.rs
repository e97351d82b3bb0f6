use std::fmt;
use std::future::Future;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use tracing::{info, warn};

use crate::core::config::AppConfig;
use crate::core::errors::{AppError, AppResult};
use crate::core::types::{DocumentResult, PageResult};
use crate::pipeline::scratch::ScratchSpace;
use crate::providers::DocumentAnalyzer;
use crate::reducer::{merge_pages, reduce_document, reduce_page};
use crate::sidecar::PageRasterizer;

#[derive(Debug, Clone)]
pub struct ExtractionLimits {
    pub direct_limit_bytes: u64,
    pub page_limit_bytes: u64,
    pub provider_timeout: Duration,
    pub document_timeout: Duration,
}

impl From<&AppConfig> for ExtractionLimits {
    fn from(config: &AppConfig) -> Self {
        Self {
            direct_limit_bytes: config.direct_limit_bytes,
            page_limit_bytes: config.page_limit_bytes,
            provider_timeout: config.provider_timeout,
            document_timeout: config.document_timeout,
        }
    }
}

impl Default for ExtractionLimits {
    fn default() -> Self {
        Self::from(&AppConfig::default())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageError {
    pub page: usize,
    pub message: String,
}

impl fmt::Display for PageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "page {}: {}", self.page, self.message)
    }
}

#[derive(Clone)]
pub struct FallbackOrchestrator {
    analyzer: Arc<dyn DocumentAnalyzer>,
    rasterizer: Arc<dyn PageRasterizer>,
    limits: ExtractionLimits,
    scratch_root: PathBuf,
}

impl FallbackOrchestrator {
    pub fn new(
        analyzer: Arc<dyn DocumentAnalyzer>,
        rasterizer: Arc<dyn PageRasterizer>,
        limits: ExtractionLimits,
        scratch_root: impl Into<PathBuf>,
    ) -> Self {
        Self {
            analyzer,
            rasterizer,
            limits,
            scratch_root: scratch_root.into(),
        }
    }

    /// Extracts a PDF, falling back to per-page rasterization when needed.
    ///
    /// Pages that fail during the fallback are omitted from the result
    /// without an error as long as at least one page succeeds.
    pub async fn process(&self, document: &[u8]) -> AppResult<DocumentResult> {
        let scratch = ScratchSpace::create(&self.scratch_root)?;
        let outcome =
            tokio::time::timeout(self.limits.document_timeout, self.run(&scratch, document)).await;
        drop(scratch);
        outcome?
    }

    /// Extracts a single image as a one-page document.
    pub async fn process_image(&self, image: &[u8]) -> AppResult<DocumentResult> {
        let size = image.len() as u64;
        if size > self.limits.page_limit_bytes {
            return Err(AppError::DocumentTooLarge {
                size,
                limit: self.limits.page_limit_bytes,
            });
        }
        let blocks = self.bounded(self.analyzer.analyze_image(image)).await?;
        if blocks.is_empty() {
            return Err(AppError::ExtractionFailed(
                PageError {
                    page: 1,
                    message: "provider returned no blocks".to_string(),
                }
                .to_string(),
            ));
        }
        Ok(merge_pages(vec![reduce_page(&blocks, 1)]))
    }

    async fn run(&self, scratch: &ScratchSpace, document: &[u8]) -> AppResult<DocumentResult> {
        let size = document.len() as u64;
        if size <= self.limits.direct_limit_bytes {
            match self.bounded(self.analyzer.analyze_direct(document)).await {
                Ok(blocks) => {
                    let count = blocks.len();
                    if let Some(result) = reduce_document(blocks) {
                        info!(provider = self.analyzer.name(), blocks = count, "direct analysis succeeded");
                        return Ok(result);
                    }
                    warn!(provider = self.analyzer.name(), "direct analysis returned no blocks, rasterizing")
                }
                Err(AppError::UnsupportedDocument(reason)) => {
                    warn!(provider = self.analyzer.name(), %reason, "direct analysis rejected document, rasterizing")
                }
                Err(err) => return Err(err),
            }
        } else {
            info!(
                size,
                limit = self.limits.direct_limit_bytes,
                "document exceeds direct limit, rasterizing"
            );
        }

        self.rasterize_and_extract(scratch, document).await
    }

    async fn rasterize_and_extract(
        &self,
        scratch: &ScratchSpace,
        document: &[u8],
    ) -> AppResult<DocumentResult> {
        let source = scratch.source_path();
        tokio::fs::write(&source, document).await?;
        let pages_dir = scratch.pages_dir();
        tokio::fs::create_dir_all(&pages_dir).await?;

        let rasterized = self.rasterizer.rasterize(&source, &pages_dir).await?;
        if rasterized.image_paths.is_empty() {
            return Err(AppError::ExtractionFailed(
                "rasterizer produced no page images".to_string(),
            ));
        }
        info!(pages = rasterized.image_paths.len(), "rasterized document");

        let mut pages: Vec<PageResult> = Vec::new();
        let mut errors: Vec<PageError> = Vec::new();
        for (position, image_path) in rasterized.image_paths.iter().enumerate() {
            let page_number = position + 1;
            match self.extract_page(image_path, page_number).await {
                Ok(page) => pages.push(page),
                Err(message) => {
                    warn!(page = page_number, error = %message, "page extraction failed");
                    errors.push(PageError {
                        page: page_number,
                        message,
                    });
                }
            }
        }

        if pages.is_empty() {
            return Err(AppError::ExtractionFailed(describe_failures(&errors)));
        }
        if !errors.is_empty() {
            warn!(
                merged = pages.len(),
                failed = errors.len(),
                "document merged with missing pages"
            );
        }
        Ok(merge_pages(pages))
    }

    async fn extract_page(&self, image_path: &Path, page_number: usize) -> Result<PageResult, String> {
        let metadata = tokio::fs::metadata(image_path)
            .await
            .map_err(|err| format!("cannot read page image {}: {err}", image_path.display()))?;
        if metadata.len() > self.limits.page_limit_bytes {
            return Err(format!(
                "page image is {} bytes, limit is {}",
                metadata.len(),
                self.limits.page_limit_bytes
            ));
        }

        let image = tokio::fs::read(image_path)
            .await
            .map_err(|err| format!("cannot read page image {}: {err}", image_path.display()))?;
        let blocks = self
            .bounded(self.analyzer.analyze_image(&image))
            .await
            .map_err(|err| err.to_string())?;
        if blocks.is_empty() {
            return Err("provider returned no blocks".to_string());
        }
        Ok(reduce_page(&blocks, page_number))
    }

    async fn bounded<T, F>(&self, call: F) -> AppResult<T>
    where
        F: Future<Output = AppResult<T>>,
    {
        tokio::time::timeout(self.limits.provider_timeout, call).await?
    }
}

fn describe_failures(errors: &[PageError]) -> String {
    let details = errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ");
    format!("all {} pages failed: {details}", errors.len())
}
