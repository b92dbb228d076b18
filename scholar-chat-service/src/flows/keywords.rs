use prompt_flow::{FlowError, PromptDefinition, PromptInvoker};
use tracing::{info, warn};

use crate::models::{KeywordRequest, KeywordResult};

pub const KEYWORDS_PROMPT: &str = "extractKeywordsPrompt";

const KEYWORDS_TEMPLATE: &str = r#"You are an expert in identifying key concepts in scientific texts.
Extract the top 7-10 most important and relevant keywords or short key phrases from the following research paper text.
Prioritize terms that are central to the paper's main topic, methodology, and findings.
Return them as a JSON array of strings under the "keywords" key.

Research Paper Text:
{{paper_text}}
"#;

const KEYWORDS_OUTPUT: &str =
    r#"{ "keywords": ["<keyword or key phrase>", "..."] } with between 5 and 10 entries"#;

const KEYWORDS_TEMPERATURE: f64 = 0.2;

/// Keyword extraction outcome. `result` is always a concrete list; `degraded`
/// holds the failure that was absorbed into an empty list, if any.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeywordExtraction {
    pub result: KeywordResult,
    pub degraded: Option<FlowError>,
}

impl KeywordExtraction {
    pub fn is_degraded(&self) -> bool {
        self.degraded.is_some()
    }
}

/// Non-fatal flow: failures and malformed output become an empty list.
pub struct KeywordFlow {
    invoker: PromptInvoker,
    prompt: PromptDefinition<KeywordRequest, KeywordResult>,
}

impl KeywordFlow {
    pub fn new(invoker: PromptInvoker) -> Self {
        Self {
            invoker,
            prompt: PromptDefinition::new(KEYWORDS_PROMPT, KEYWORDS_TEMPLATE, KEYWORDS_OUTPUT)
                .with_temperature(KEYWORDS_TEMPERATURE),
        }
    }

    pub async fn run(&self, request: &KeywordRequest) -> KeywordExtraction {
        info!("Starting keyword extraction");

        match self.invoker.invoke(&self.prompt, request).await {
            Ok(result) => {
                // the 5-10 target is only a hint; counts are taken as returned
                info!(count = result.keywords.len(), "Keywords extracted");
                KeywordExtraction {
                    result,
                    degraded: None,
                }
            }
            Err(e) => {
                warn!(error = %e, "Keyword extraction degraded to an empty list");
                KeywordExtraction {
                    result: KeywordResult::default(),
                    degraded: Some(e),
                }
            }
        }
    }
}
