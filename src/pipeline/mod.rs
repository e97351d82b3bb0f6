pub mod fallback;
pub mod scratch;

pub use fallback::{ExtractionLimits, FallbackOrchestrator, PageError};
pub use scratch::ScratchSpace;
