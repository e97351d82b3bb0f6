use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// The single JSON object a rasterizer prints on stdout.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RasterizerReport {
    pub success: bool,
    #[serde(default)]
    pub pages: usize,
    #[serde(default)]
    pub image_paths: Vec<PathBuf>,
    #[serde(default)]
    pub error: Option<String>,
}

/// Page images in page order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RasterizedDocument {
    pub pages: usize,
    pub image_paths: Vec<PathBuf>,
}
