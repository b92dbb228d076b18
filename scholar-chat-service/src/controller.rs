//! Sequences user actions into flow calls against one session.
//!
//! Actions are split in two: a synchronous `begin_*` step that validates
//! input, updates the session and tags the work with the current generation,
//! and a `run` step that performs the model call(s) and commits the result.
//! The session lock is never held across a model call.

use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::{
    config::FlowCapabilities,
    flows::PaperFlows,
    models::{
        AnswerRequest, Complexity, DEFAULT_LANGUAGE, KeywordRequest, Notice, PaperText,
        SummarizeRequest,
    },
    notices,
    session::{Generation, SessionSnapshot, SessionState},
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaperSubmission {
    pub text: String,
    pub complexity: Complexity,
    pub language: String,
}

impl PaperSubmission {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            complexity: Complexity::default(),
            language: DEFAULT_LANGUAGE.to_string(),
        }
    }

    pub fn with_complexity(mut self, complexity: Complexity) -> Self {
        self.complexity = complexity;
        self
    }

    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = language.into();
        self
    }
}

#[derive(Clone)]
pub struct OrchestrationController {
    id: String,
    flows: Arc<PaperFlows>,
    capabilities: FlowCapabilities,
    state: Arc<Mutex<SessionState>>,
}

impl OrchestrationController {
    pub fn new(flows: Arc<PaperFlows>, capabilities: FlowCapabilities) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            flows,
            capabilities,
            state: Arc::new(Mutex::new(SessionState::new())),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn capabilities(&self) -> FlowCapabilities {
        self.capabilities
    }

    /// Accept the paper, invalidate the previous one and tag the pending
    /// summary/keyword work. Empty text is rejected without any model call.
    pub async fn begin_submission(
        &self,
        submission: PaperSubmission,
    ) -> Result<PendingSubmission, Notice> {
        let mut state = self.state.lock().await;

        let Some(paper) = PaperText::new(submission.text) else {
            warn!(session_id = %self.id, "Rejected empty paper submission");
            return Err(state.reject(notices::empty_paper()));
        };

        let generation = state.load_paper(paper.clone(), self.capabilities.keywords);
        info!(
            session_id = %self.id,
            generation = ?generation,
            paper_len = paper.as_str().len(),
            "Paper accepted"
        );

        let language = if submission.language.trim().is_empty() {
            DEFAULT_LANGUAGE.to_string()
        } else {
            submission.language
        };

        Ok(PendingSubmission {
            controller: self.clone(),
            generation,
            summarize: SummarizeRequest {
                paper_text: paper.as_str().to_string(),
                complexity: submission.complexity,
                language,
            },
            keywords: self.capabilities.keywords.then(|| KeywordRequest {
                paper_text: paper.as_str().to_string(),
            }),
        })
    }

    pub async fn submit_paper(&self, submission: PaperSubmission) -> Result<Generation, Notice> {
        let pending = self.begin_submission(submission).await?;
        let generation = pending.generation();
        pending.run().await;
        Ok(generation)
    }

    /// Append the user's question right away and tag the pending answer.
    pub async fn begin_message(&self, question: &str, eli5: bool) -> Result<PendingAnswer, Notice> {
        let mut state = self.state.lock().await;

        let (generation, paper) = state.begin_question(question).inspect_err(|notice| {
            warn!(session_id = %self.id, reason = %notice.title, "Question rejected");
        })?;

        Ok(PendingAnswer {
            controller: self.clone(),
            generation,
            request: AnswerRequest {
                paper_text: paper.as_str().to_string(),
                question: question.to_string(),
                eli5: eli5 && self.capabilities.eli5,
            },
        })
    }

    pub async fn send_message(&self, question: &str, eli5: bool) -> Result<(), Notice> {
        self.begin_message(question, eli5).await?.run().await;
        Ok(())
    }

    /// Reset to an empty session. Work still in flight is dropped on arrival.
    pub async fn clear_all(&self) -> Generation {
        let generation = self.state.lock().await.clear();
        info!(session_id = %self.id, generation = ?generation, "Session cleared");
        generation
    }

    /// Record a notice for an action rejected before reaching the session,
    /// e.g. an unreadable upload.
    pub async fn reject(&self, notice: Notice) -> Notice {
        self.state.lock().await.reject(notice)
    }

    pub async fn snapshot(&self) -> SessionSnapshot {
        self.state.lock().await.snapshot()
    }

    pub async fn drain_notices(&self) -> Vec<Notice> {
        self.state.lock().await.drain_notices()
    }

    async fn commit(&self, slice: &str, apply: impl FnOnce(&mut SessionState) -> bool) {
        let mut state = self.state.lock().await;
        if apply(&mut state) {
            debug!(session_id = %self.id, slice, "Result committed");
        } else {
            info!(session_id = %self.id, slice, "Result arrived for a superseded session, discarded");
        }
    }
}

/// Summary and keyword work for one accepted paper.
pub struct PendingSubmission {
    controller: OrchestrationController,
    generation: Generation,
    summarize: SummarizeRequest,
    keywords: Option<KeywordRequest>,
}

impl PendingSubmission {
    pub fn generation(&self) -> Generation {
        self.generation
    }

    pub fn summarize_request(&self) -> &SummarizeRequest {
        &self.summarize
    }

    /// Run both flows concurrently; each commits its own slice on completion.
    pub async fn run(self) {
        let flows = &self.controller.flows;

        let summary = async {
            let outcome = flows.summarize.run(&self.summarize).await;
            self.controller
                .commit("summary", |state| state.apply_summary(self.generation, outcome))
                .await;
        };

        let keywords = async {
            if let Some(request) = &self.keywords {
                let extraction = flows.keywords.run(request).await;
                self.controller
                    .commit("keywords", |state| {
                        state.apply_keywords(self.generation, extraction)
                    })
                    .await;
            }
        };

        tokio::join!(summary, keywords);
    }
}

/// One question waiting for its answer.
pub struct PendingAnswer {
    controller: OrchestrationController,
    generation: Generation,
    request: AnswerRequest,
}

impl PendingAnswer {
    pub fn generation(&self) -> Generation {
        self.generation
    }

    pub async fn run(self) {
        let outcome = self.controller.flows.answer.run(&self.request).await;
        self.controller
            .commit("answer", |state| state.apply_answer(self.generation, outcome))
            .await;
    }
}
