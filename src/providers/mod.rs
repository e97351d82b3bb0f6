pub mod anthropic;
pub mod mistral;
pub mod textract;

use async_trait::async_trait;

use crate::core::errors::AppResult;
use crate::reducer::Block;

/// A block-emitting document-analysis service.
#[async_trait]
pub trait DocumentAnalyzer: Send + Sync {
    fn name(&self) -> &str;

    /// Analyzes a whole document in one call. Fails with
    /// `AppError::UnsupportedDocument` when the provider cannot take the file
    /// as-is.
    async fn analyze_direct(&self, document: &[u8]) -> AppResult<Vec<Block>>;

    /// Analyzes one rasterized page image.
    async fn analyze_image(&self, image: &[u8]) -> AppResult<Vec<Block>>;
}
