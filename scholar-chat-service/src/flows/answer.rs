use prompt_flow::{FlowError, PromptDefinition, PromptInvoker};
use thiserror::Error;
use tracing::{error, info};

use crate::models::{AnswerRequest, AnswerResult};

pub const ANSWER_PROMPT: &str = "answerQuestionsPrompt";

/// Appended to the transcript in place of an answer when the flow fails.
pub const FALLBACK_ANSWER: &str =
    "Sorry, I encountered an error trying to answer your question. Please try again.";

const ANSWER_TEMPLATE: &str = r#"You are an expert academic assistant. A user has provided a research paper and has a question about it.
Answer the question based SOLELY on the content of the research paper provided. Do not use external knowledge.
If the information to answer the question is not in the paper, state that clearly.

Research Paper Text:
{{paper_text}}

User's Question: "{{question}}"
{{#if eli5}}
Explain your answer in very simple terms, as if you were explaining it to a 5-year-old.
{{/if}}"#;

const ANSWER_OUTPUT: &str = r#"{ "answer": "<the answer to the question>" }"#;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Answering failed: {source}")]
pub struct AnswerFailed {
    #[from]
    pub source: FlowError,
}

pub struct AnswerFlow {
    invoker: PromptInvoker,
    prompt: PromptDefinition<AnswerRequest, AnswerResult>,
}

impl AnswerFlow {
    pub fn new(invoker: PromptInvoker) -> Self {
        Self {
            invoker,
            prompt: PromptDefinition::new(ANSWER_PROMPT, ANSWER_TEMPLATE, ANSWER_OUTPUT),
        }
    }

    pub async fn run(&self, request: &AnswerRequest) -> Result<AnswerResult, AnswerFailed> {
        info!(eli5 = request.eli5, "Answering question about paper");

        self.invoker
            .invoke(&self.prompt, request)
            .await
            .map_err(|e| {
                error!(error = %e, "Failed to answer question");
                AnswerFailed::from(e)
            })
    }

    /// Text to append to the chat transcript for this outcome.
    pub fn transcript_text(outcome: &Result<AnswerResult, AnswerFailed>) -> &str {
        match outcome {
            Ok(result) => &result.answer,
            Err(_) => FALLBACK_ANSWER,
        }
    }
}
