use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// One logical request to the hosted model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelRequest {
    /// Name of the template the prompt was rendered from
    pub template: String,
    /// Fully rendered prompt text
    pub prompt: String,
    /// Description of the JSON the model must answer with
    pub output_format: String,
    pub temperature: Option<f64>,
}

/// The provider call itself failed (transport, auth, provider-side error).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct InvocationError {
    pub message: String,
}

impl InvocationError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Boundary to the language model provider.
///
/// Implementations own transport, authentication and model selection; they
/// return the raw completion text and leave schema parsing to the invoker.
#[async_trait]
pub trait ModelClient: Send + Sync {
    async fn invoke(&self, request: ModelRequest) -> Result<String, InvocationError>;
}
