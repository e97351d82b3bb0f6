pub mod commands;
pub mod core;
pub mod pipeline;
pub mod providers;
pub mod qa;
pub mod reducer;
pub mod security;
pub mod sidecar;

use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use crate::core::config::AppConfig;
use crate::core::errors::AppResult;
use pipeline::{ExtractionLimits, FallbackOrchestrator};
use providers::{
    anthropic::ClaudeClient, mistral::MistralClient, textract::TextractClient, DocumentAnalyzer,
};
use sidecar::{PageRasterizer, SidecarRasterizer};

fn log_level_from_env() -> &'static str {
    match std::env::var("DOCQA_LOG")
        .unwrap_or_else(|_| "info".to_string())
        .to_ascii_lowercase()
        .as_str()
    {
        "trace" => "trace",
        "debug" => "debug",
        "warn" => "warn",
        "error" => "error",
        _ => "info",
    }
}

/// Installs the global subscriber. `RUST_LOG` directives win over `DOCQA_LOG`.
pub fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!("warn,docqa_lib={0},docqa={0}", log_level_from_env()))
    });
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

#[derive(Clone)]
pub struct AppState {
    pub config: AppConfig,
    pub analyzer: Arc<dyn DocumentAnalyzer>,
    pub rasterizer: Arc<dyn PageRasterizer>,
    pub mistral: MistralClient,
    pub claude: ClaudeClient,
}

impl AppState {
    /// Wires the production providers: Textract from the AWS default chain and
    /// the configured out-of-process rasterizer.
    pub async fn from_config(config: AppConfig) -> AppResult<Self> {
        let textract = TextractClient::from_config(&config).await;
        let rasterizer = SidecarRasterizer::new(config.rasterizer.clone());
        Self::new(config, Arc::new(textract), Arc::new(rasterizer))
    }

    pub fn new(
        config: AppConfig,
        analyzer: Arc<dyn DocumentAnalyzer>,
        rasterizer: Arc<dyn PageRasterizer>,
    ) -> AppResult<Self> {
        let mistral = MistralClient::new(
            config.mistral_ocr_model.clone(),
            config.mistral_qa_model.clone(),
            config.provider_timeout,
        )?;
        let claude = ClaudeClient::new(config.claude_model.clone(), config.provider_timeout)?;
        Ok(Self {
            config,
            analyzer,
            rasterizer,
            mistral,
            claude,
        })
    }

    pub fn orchestrator(&self) -> FallbackOrchestrator {
        FallbackOrchestrator::new(
            Arc::clone(&self.analyzer),
            Arc::clone(&self.rasterizer),
            ExtractionLimits::from(&self.config),
            self.config.scratch_root.clone(),
        )
    }
}
