pub mod answer;
pub mod keywords;
pub mod summarize;

pub use answer::{AnswerFailed, AnswerFlow, FALLBACK_ANSWER};
pub use keywords::{KeywordExtraction, KeywordFlow};
pub use summarize::{SummarizationFailed, SummarizeFlow};

use prompt_flow::{ModelClient, PromptInvoker};
use std::sync::Arc;

/// The three paper flows sharing one invoker.
pub struct PaperFlows {
    pub summarize: SummarizeFlow,
    pub keywords: KeywordFlow,
    pub answer: AnswerFlow,
}

impl PaperFlows {
    pub fn new(model: Arc<dyn ModelClient>) -> Self {
        let invoker = PromptInvoker::new(model);
        Self {
            summarize: SummarizeFlow::new(invoker.clone()),
            keywords: KeywordFlow::new(invoker.clone()),
            answer: AnswerFlow::new(invoker),
        }
    }
}
