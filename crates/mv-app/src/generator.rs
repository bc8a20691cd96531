use async_trait::async_trait;
use mv_core::AssetRef;

use crate::error::GenerationError;

pub mod backend;

pub use backend::HttpGenerator;

/// Opaque external service producing one asset per prompt.
///
/// Each call is a single attempt; any timeout or retry policy belongs to the
/// implementation.
#[async_trait]
pub trait ArtifactGenerator: Send + Sync {
    async fn generate(
        &self,
        prompt: &str,
        reference_urls: &[String],
    ) -> Result<AssetRef, GenerationError>;
}
