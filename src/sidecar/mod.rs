pub mod rasterizer;
pub mod types;

pub use rasterizer::{PageRasterizer, SidecarRasterizer};
