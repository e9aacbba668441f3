use async_trait::async_trait;
use thiserror::Error;

/// Failure taxonomy for the completion call. None of these ever reach the
/// engine's caller; each one routes to the fallback heuristic instead.
#[derive(Error, Debug, Clone)]
pub enum CompletionError {
    #[error("transport error: {0}")]
    Transport(String),

    #[error("completion service returned HTTP {0}")]
    Status(u16),

    #[error("completion service returned no content")]
    Empty,

    #[error("malformed completion response: {0}")]
    Malformed(String),
}

/// Port for the external text-completion collaborator: prompt in, raw
/// generated text out.
#[async_trait]
pub trait CompletionPort: Send + Sync {
    async fn complete(&self, prompt: &str) -> Result<String, CompletionError>;
}
