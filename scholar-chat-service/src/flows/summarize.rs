use prompt_flow::{FlowError, PromptDefinition, PromptInvoker};
use thiserror::Error;
use tracing::{error, info};

use crate::models::{SummarizeRequest, SummarizeResult};

pub const SUMMARIZE_PROMPT: &str = "summarizeResearchPaperPrompt";

const SUMMARIZE_TEMPLATE: &str = r#"You are an expert research paper summarizer.

Summarize the following research paper in {{language}} language.
The summary should be of {{complexity}} complexity.

Research Paper Text: {{paper_text}}"#;

const SUMMARIZE_OUTPUT: &str = r#"{ "summary": "<the summary of the research paper>" }"#;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Summarization failed: {source}")]
pub struct SummarizationFailed {
    #[from]
    pub source: FlowError,
}

/// One model call producing a summary; every failure is surfaced.
pub struct SummarizeFlow {
    invoker: PromptInvoker,
    prompt: PromptDefinition<SummarizeRequest, SummarizeResult>,
}

impl SummarizeFlow {
    pub fn new(invoker: PromptInvoker) -> Self {
        Self {
            invoker,
            prompt: PromptDefinition::new(SUMMARIZE_PROMPT, SUMMARIZE_TEMPLATE, SUMMARIZE_OUTPUT),
        }
    }

    pub async fn run(
        &self,
        request: &SummarizeRequest,
    ) -> Result<SummarizeResult, SummarizationFailed> {
        info!(
            complexity = %request.complexity,
            language = %request.language,
            "Starting paper summarization"
        );

        match self.invoker.invoke(&self.prompt, request).await {
            Ok(result) => Ok(result),
            Err(e) => {
                error!(error = %e, "Failed to summarize paper");
                Err(SummarizationFailed::from(e))
            }
        }
    }
}
