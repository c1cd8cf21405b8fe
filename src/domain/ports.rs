use crate::utils::error::Result;
use async_trait::async_trait;

/// Remote text-completion service.
///
/// Implementations carry their own credential, so the pipeline never touches
/// shared client state and tests can substitute a stub.
#[async_trait]
pub trait Completion: Send + Sync {
    async fn complete(&self, prompt: &str) -> Result<String>;
}
