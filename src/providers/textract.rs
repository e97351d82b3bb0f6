use async_trait::async_trait;
use aws_sdk_textract::{
    error::{DisplayErrorContext, SdkError},
    operation::analyze_document::AnalyzeDocumentError,
    primitives::Blob,
    types::{self as sdk, Document, FeatureType},
    Client,
};
use tracing::{debug, info};

use crate::core::config::AppConfig;
use crate::core::errors::{AppError, AppResult};
use crate::providers::DocumentAnalyzer;
use crate::reducer::{Block, BlockType, EntityType, RelationshipType};

#[derive(Debug, Clone)]
pub struct TextractClient {
    client: Client,
}

impl TextractClient {
    pub async fn from_config(config: &AppConfig) -> Self {
        let mut loader = aws_config::defaults(aws_config::BehaviorVersion::latest());
        if let Some(region) = &config.aws_region {
            loader = loader.region(aws_config::Region::new(region.clone()));
        }
        let sdk_config = loader.load().await;
        Self {
            client: Client::new(&sdk_config),
        }
    }

    pub fn from_client(client: Client) -> Self {
        Self { client }
    }

    async fn analyze(&self, bytes: &[u8]) -> AppResult<Vec<Block>> {
        info!(bytes = bytes.len(), "calling textract analyze_document");
        let output = self
            .client
            .analyze_document()
            .document(Document::builder().bytes(Blob::new(bytes.to_vec())).build())
            .feature_types(FeatureType::Tables)
            .feature_types(FeatureType::Forms)
            .send()
            .await
            .map_err(map_sdk_error)?;

        let blocks: Vec<Block> = output.blocks().iter().filter_map(convert_block).collect();
        debug!(blocks = blocks.len(), "textract returned blocks");
        Ok(blocks)
    }
}

#[async_trait]
impl DocumentAnalyzer for TextractClient {
    fn name(&self) -> &str {
        "textract"
    }

    async fn analyze_direct(&self, document: &[u8]) -> AppResult<Vec<Block>> {
        self.analyze(document).await
    }

    async fn analyze_image(&self, image: &[u8]) -> AppResult<Vec<Block>> {
        self.analyze(image).await
    }
}

fn map_sdk_error(err: SdkError<AnalyzeDocumentError>) -> AppError {
    match err {
        SdkError::TimeoutError(_) => AppError::ProviderTimeout,
        SdkError::DispatchFailure(failure) => AppError::Network(format!("{failure:?}")),
        SdkError::ServiceError(service) => map_service_error(service.into_err()),
        other => AppError::Provider(DisplayErrorContext(&other).to_string()),
    }
}

fn map_service_error(err: AnalyzeDocumentError) -> AppError {
    let message = DisplayErrorContext(&err).to_string();
    if err.is_unsupported_document_exception() || err.is_bad_document_exception() {
        AppError::UnsupportedDocument(message)
    } else if err.is_throttling_exception() || err.is_provisioned_throughput_exceeded_exception() {
        AppError::ProviderRateLimited
    } else if err.is_access_denied_exception() {
        AppError::ProviderAuth
    } else {
        AppError::Provider(message)
    }
}

fn convert_block(block: &sdk::Block) -> Option<Block> {
    let id = block.id()?;
    let kind = block
        .block_type()
        .map(|kind| BlockType::from(kind.as_str()))
        .unwrap_or(BlockType::Other);

    Some(Block {
        id: id.to_string(),
        kind,
        text: block.text().map(ToString::to_string),
        confidence: block.confidence().map(f64::from),
        entity_types: block
            .entity_types()
            .iter()
            .map(|entity| EntityType::from(entity.as_str()))
            .collect(),
        relationships: block
            .relationships()
            .iter()
            .map(|edge| crate::reducer::blocks::Relationship {
                kind: edge
                    .r#type()
                    .map(|kind| RelationshipType::from(kind.as_str()))
                    .unwrap_or(RelationshipType::Other),
                ids: edge.ids().to_vec(),
            })
            .collect(),
        row_index: block.row_index().and_then(|row| u32::try_from(row).ok()),
        column_index: block.column_index().and_then(|col| u32::try_from(col).ok()),
        page: block.page().and_then(|page| u32::try_from(page).ok()),
    })
}
