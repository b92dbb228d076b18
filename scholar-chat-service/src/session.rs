//! Session state for one paper at a time.
//!
//! Every paper load and every clear bumps the session [`Generation`]. Work
//! started against a generation carries it along and is only committed while
//! that generation is still current; anything older is dropped on arrival.

use std::collections::VecDeque;

use serde::Serialize;
use tracing::debug;

use crate::{
    flows::{AnswerFailed, AnswerFlow, KeywordExtraction, SummarizationFailed},
    models::{AnswerResult, ChatMessage, Notice, PaperText, SummarizeResult},
    notices,
};

pub const SUMMARY_FAILED_MESSAGE: &str = "Failed to generate summary.";

/// Undrained notices beyond this are dropped oldest first.
pub const NOTICE_CAPACITY: usize = 32;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub struct Generation(u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionPhase {
    Empty,
    /// Pending summary or keywords are sub-states of a loaded paper.
    PaperLoaded,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SummaryState {
    #[default]
    Idle,
    Pending,
    Ready {
        summary: String,
    },
    Failed {
        message: String,
    },
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum KeywordsState {
    #[default]
    Idle,
    Pending,
    Ready {
        keywords: Vec<String>,
    },
    Empty,
    Failed,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BusyFlags {
    pub summarizing: bool,
    pub extracting_keywords: bool,
    pub chatting: bool,
}

/// Serializable view of the session for rendering.
#[derive(Debug, Clone, Serialize)]
pub struct SessionSnapshot {
    pub phase: SessionPhase,
    pub generation: Generation,
    pub paper_text: Option<PaperText>,
    pub summary: SummaryState,
    pub keywords: KeywordsState,
    pub chat_history: Vec<ChatMessage>,
    pub busy: BusyFlags,
}

#[derive(Debug, Default)]
pub struct SessionState {
    generation: u64,
    paper: Option<PaperText>,
    summary: SummaryState,
    keywords: KeywordsState,
    chat: Vec<ChatMessage>,
    answers_in_flight: usize,
    notices: VecDeque<Notice>,
}

impl SessionState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn generation(&self) -> Generation {
        Generation(self.generation)
    }

    pub fn is_current(&self, generation: Generation) -> bool {
        generation.0 == self.generation
    }

    pub fn paper(&self) -> Option<&PaperText> {
        self.paper.as_ref()
    }

    pub fn summary_state(&self) -> &SummaryState {
        &self.summary
    }

    pub fn keywords_state(&self) -> &KeywordsState {
        &self.keywords
    }

    pub fn summary(&self) -> Option<&str> {
        match &self.summary {
            SummaryState::Ready { summary } => Some(summary),
            _ => None,
        }
    }

    /// `None` until extraction has finished; an empty slice means no keywords.
    pub fn keywords(&self) -> Option<&[String]> {
        match &self.keywords {
            KeywordsState::Ready { keywords } => Some(keywords),
            KeywordsState::Empty | KeywordsState::Failed => Some(&[]),
            KeywordsState::Idle | KeywordsState::Pending => None,
        }
    }

    pub fn chat_history(&self) -> &[ChatMessage] {
        &self.chat
    }

    pub fn busy(&self) -> BusyFlags {
        BusyFlags {
            summarizing: self.summary == SummaryState::Pending,
            extracting_keywords: self.keywords == KeywordsState::Pending,
            chatting: self.answers_in_flight > 0,
        }
    }

    pub fn phase(&self) -> SessionPhase {
        if self.paper.is_none() {
            SessionPhase::Empty
        } else {
            SessionPhase::PaperLoaded
        }
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            phase: self.phase(),
            generation: self.generation(),
            paper_text: self.paper.clone(),
            summary: self.summary.clone(),
            keywords: self.keywords.clone(),
            chat_history: self.chat.clone(),
            busy: self.busy(),
        }
    }

    pub fn push_notice(&mut self, notice: Notice) {
        if self.notices.len() == NOTICE_CAPACITY {
            self.notices.pop_front();
        }
        self.notices.push_back(notice);
    }

    pub fn drain_notices(&mut self) -> Vec<Notice> {
        self.notices.drain(..).collect()
    }

    /// Accept a new paper and invalidate everything derived from the old one.
    ///
    /// The summary is always marked pending; keywords only when extraction is
    /// going to run.
    pub fn load_paper(&mut self, paper: PaperText, extract_keywords: bool) -> Generation {
        self.reset();
        self.paper = Some(paper);
        self.summary = SummaryState::Pending;
        if extract_keywords {
            self.keywords = KeywordsState::Pending;
        }
        self.generation()
    }

    pub fn clear(&mut self) -> Generation {
        self.reset();
        self.push_notice(notices::cleared());
        self.generation()
    }

    fn reset(&mut self) {
        self.generation += 1;
        self.paper = None;
        self.summary = SummaryState::Idle;
        self.keywords = KeywordsState::Idle;
        self.chat.clear();
        self.answers_in_flight = 0;
    }

    /// Returns false when the result belongs to an older generation.
    pub fn apply_summary(
        &mut self,
        generation: Generation,
        outcome: Result<SummarizeResult, SummarizationFailed>,
    ) -> bool {
        if !self.accepts(generation, "summary") {
            return false;
        }
        match outcome {
            Ok(result) => {
                self.summary = SummaryState::Ready {
                    summary: result.summary,
                };
                self.push_notice(notices::summary_generated());
            }
            Err(_) => {
                self.summary = SummaryState::Failed {
                    message: SUMMARY_FAILED_MESSAGE.to_string(),
                };
                self.push_notice(notices::summarization_failed());
            }
        }
        true
    }

    pub fn apply_keywords(&mut self, generation: Generation, extraction: KeywordExtraction) -> bool {
        if !self.accepts(generation, "keywords") {
            return false;
        }
        if extraction.is_degraded() {
            self.keywords = KeywordsState::Failed;
            self.push_notice(notices::keyword_extraction_failed());
        } else if extraction.result.keywords.is_empty() {
            self.keywords = KeywordsState::Empty;
            self.push_notice(notices::no_keywords_found());
        } else {
            self.keywords = KeywordsState::Ready {
                keywords: extraction.result.keywords,
            };
            self.push_notice(notices::keywords_extracted());
        }
        true
    }

    /// Append the user's question ahead of its answer. Fails with a notice when
    /// there is no paper or nothing to ask.
    pub fn begin_question(&mut self, question: &str) -> Result<(Generation, PaperText), Notice> {
        let Some(paper) = self.paper.clone() else {
            return Err(self.reject(notices::no_paper_loaded()));
        };
        if question.trim().is_empty() {
            return Err(self.reject(notices::empty_question()));
        }
        self.chat.push(ChatMessage::user(question));
        self.answers_in_flight += 1;
        Ok((self.generation(), paper))
    }

    pub fn apply_answer(
        &mut self,
        generation: Generation,
        outcome: Result<AnswerResult, AnswerFailed>,
    ) -> bool {
        if !self.accepts(generation, "answer") {
            return false;
        }
        self.chat.push(ChatMessage::ai(AnswerFlow::transcript_text(&outcome)));
        self.answers_in_flight = self.answers_in_flight.saturating_sub(1);
        if outcome.is_err() {
            self.push_notice(notices::chat_error());
        }
        true
    }

    /// Record a locally rejected action and hand its notice back.
    pub fn reject(&mut self, notice: Notice) -> Notice {
        self.push_notice(notice.clone());
        notice
    }

    fn accepts(&self, generation: Generation, slice: &str) -> bool {
        if self.is_current(generation) {
            true
        } else {
            debug!(
                slice,
                stale = generation.0,
                current = self.generation,
                "Discarding stale result"
            );
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{KeywordResult, Sender};
    use prompt_flow::FlowError;

    fn paper(text: &str) -> PaperText {
        PaperText::new(text).unwrap()
    }

    fn keywords(words: &[&str]) -> KeywordExtraction {
        KeywordExtraction {
            result: KeywordResult {
                keywords: words.iter().map(|w| w.to_string()).collect(),
            },
            degraded: None,
        }
    }

    fn invocation_error() -> FlowError {
        FlowError::Invocation {
            template: "t".to_string(),
            message: "down".to_string(),
        }
    }

    #[test]
    fn loading_a_paper_invalidates_previous_results() {
        let mut state = SessionState::new();
        let first = state.load_paper(paper("first"), true);
        state.apply_summary(first, Ok(SummarizeResult { summary: "s1".into() }));
        state.apply_keywords(first, keywords(&["a"]));
        state.begin_question("q?").unwrap();

        let second = state.load_paper(paper("second"), true);

        assert!(second > first);
        assert_eq!(state.summary(), None);
        assert_eq!(state.keywords(), None);
        assert!(state.chat_history().is_empty());
        assert_eq!(state.phase(), SessionPhase::PaperLoaded);
        assert_eq!(state.summary_state(), &SummaryState::Pending);
        assert!(state.busy().summarizing && state.busy().extracting_keywords);
        assert_eq!(state.paper().unwrap().as_str(), "second");
    }

    #[test]
    fn stale_generation_is_discarded() {
        let mut state = SessionState::new();
        let old = state.load_paper(paper("old"), true);
        let current = state.load_paper(paper("new"), true);

        assert!(!state.apply_summary(old, Ok(SummarizeResult { summary: "stale".into() })));
        assert_eq!(state.summary_state(), &SummaryState::Pending);

        assert!(state.apply_summary(current, Ok(SummarizeResult { summary: "fresh".into() })));
        assert_eq!(state.summary(), Some("fresh"));
    }

    #[test]
    fn summary_and_keywords_complete_independently() {
        let mut state = SessionState::new();
        let generation = state.load_paper(paper("text"), true);

        state.apply_summary(generation, Err(SummarizationFailed::from(invocation_error())));
        assert!(state.busy().extracting_keywords);
        assert!(!state.busy().summarizing);
        assert_eq!(
            state.summary_state(),
            &SummaryState::Failed {
                message: SUMMARY_FAILED_MESSAGE.to_string()
            }
        );

        state.apply_keywords(generation, keywords(&["graph", "flow"]));
        assert_eq!(state.keywords().unwrap(), ["graph", "flow"]);
        assert_eq!(state.phase(), SessionPhase::PaperLoaded);
    }

    #[test]
    fn empty_and_failed_keywords_are_present_but_empty() {
        let mut state = SessionState::new();
        let generation = state.load_paper(paper("text"), true);
        state.apply_keywords(generation, keywords(&[]));
        assert_eq!(state.keywords_state(), &KeywordsState::Empty);
        assert_eq!(state.keywords(), Some(&[][..]));

        let generation = state.load_paper(paper("text"), true);
        state.apply_keywords(
            generation,
            KeywordExtraction {
                result: KeywordResult::default(),
                degraded: Some(invocation_error()),
            },
        );
        assert_eq!(state.keywords_state(), &KeywordsState::Failed);
        assert_eq!(state.keywords(), Some(&[][..]));
        assert!(state.drain_notices().last().unwrap().is_destructive());
    }

    #[test]
    fn keywords_stay_idle_when_not_requested() {
        let mut state = SessionState::new();
        state.load_paper(paper("text"), false);
        assert_eq!(state.keywords_state(), &KeywordsState::Idle);
        assert!(!state.busy().extracting_keywords);
    }

    #[test]
    fn question_without_paper_is_rejected_with_notice() {
        let mut state = SessionState::new();
        let notice = state.begin_question("anything?").unwrap_err();
        assert_eq!(notice.title, "No Paper Loaded");
        assert!(state.chat_history().is_empty());
        assert_eq!(state.drain_notices(), vec![notice]);
    }

    #[test]
    fn chatting_flag_tracks_answers_in_flight() {
        let mut state = SessionState::new();
        state.load_paper(paper("text"), false);
        let (generation, _) = state.begin_question("one?").unwrap();
        state.begin_question("two?").unwrap();
        assert!(state.busy().chatting);

        state.apply_answer(generation, Ok(AnswerResult { answer: "a".into() }));
        assert!(state.busy().chatting);
        state.apply_answer(generation, Err(AnswerFailed::from(invocation_error())));
        assert!(!state.busy().chatting);

        let senders: Vec<Sender> = state.chat_history().iter().map(|m| m.sender).collect();
        assert_eq!(senders, vec![Sender::User, Sender::User, Sender::Ai, Sender::Ai]);
        assert_eq!(state.chat_history()[3].text, crate::flows::FALLBACK_ANSWER);
    }

    #[test]
    fn clear_resets_everything_and_notifies() {
        let mut state = SessionState::new();
        let generation = state.load_paper(paper("text"), true);
        state.begin_question("q?").unwrap();
        state.drain_notices();

        state.clear();

        assert_eq!(state.phase(), SessionPhase::Empty);
        assert_eq!(state.busy(), BusyFlags::default());
        assert!(!state.apply_answer(generation, Ok(AnswerResult { answer: "late".into() })));
        assert!(state.chat_history().is_empty());
        assert_eq!(state.drain_notices(), vec![notices::cleared()]);
    }

    #[test]
    fn undrained_notices_keep_only_the_most_recent() {
        let mut state = SessionState::new();
        for round in 0..50 {
            let generation = state.load_paper(paper(&format!("paper {round}")), false);
            state.apply_summary(generation, Ok(SummarizeResult { summary: "s".into() }));
            state.begin_question("").unwrap_err();
        }

        let notices = state.drain_notices();
        assert_eq!(notices.len(), NOTICE_CAPACITY);
        assert_eq!(notices.last(), Some(&notices::empty_question()));
        assert!(state.drain_notices().is_empty());
    }
}
