//! [`ModelClient`] backed by OpenRouter through rig.

use async_trait::async_trait;
use rig::client::CompletionClient;
use rig::completion::Prompt;
use rig::providers::openrouter;
use tracing::info;

use crate::model::{InvocationError, ModelClient, ModelRequest};

const PREAMBLE: &str = "You are an expert academic assistant working on research papers.";

pub struct OpenRouterModel {
    client: openrouter::Client,
    model: String,
}

impl OpenRouterModel {
    pub fn new(api_key: &str, model: impl Into<String>) -> Self {
        Self {
            client: openrouter::Client::new(api_key),
            model: model.into(),
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

#[async_trait]
impl ModelClient for OpenRouterModel {
    async fn invoke(&self, request: ModelRequest) -> Result<String, InvocationError> {
        let preamble = format!(
            "{PREAMBLE}\nRespond **only** with JSON of the form {}",
            request.output_format
        );

        let mut builder = self.client.agent(&self.model).preamble(&preamble);
        if let Some(temperature) = request.temperature {
            builder = builder.temperature(temperature);
        }
        let agent = builder.build();

        info!(template = %request.template, model = %self.model, "Sending prompt to OpenRouter");

        agent
            .prompt(request.prompt.as_str())
            .await
            .map_err(|e| InvocationError::new(format!("LLM prompt failed: {e}")))
    }
}
