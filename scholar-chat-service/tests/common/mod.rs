#![allow(dead_code)]

use async_trait::async_trait;
use prompt_flow::{InvocationError, ModelClient, ModelRequest};
use scholar_chat_service::{FlowCapabilities, OrchestrationController, PaperFlows};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tokio::sync::{mpsc, oneshot};

pub use scholar_chat_service::flows::answer::ANSWER_PROMPT;
pub use scholar_chat_service::flows::keywords::KEYWORDS_PROMPT;
pub use scholar_chat_service::flows::summarize::SUMMARIZE_PROMPT;

/// Answers every call for a template with the same scripted reply and
/// records each request.
#[derive(Default)]
pub struct ScriptedModel {
    replies: HashMap<String, Result<String, String>>,
    calls: Mutex<Vec<ModelRequest>>,
}

impl ScriptedModel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reply(mut self, template: &str, raw: &str) -> Self {
        self.replies.insert(template.to_string(), Ok(raw.to_string()));
        self
    }

    pub fn fail(mut self, template: &str, message: &str) -> Self {
        self.replies
            .insert(template.to_string(), Err(message.to_string()));
        self
    }

    pub fn calls(&self) -> Vec<ModelRequest> {
        self.calls.lock().unwrap().clone()
    }

    pub fn calls_for(&self, template: &str) -> Vec<ModelRequest> {
        self.calls()
            .into_iter()
            .filter(|call| call.template == template)
            .collect()
    }
}

#[async_trait]
impl ModelClient for ScriptedModel {
    async fn invoke(&self, request: ModelRequest) -> Result<String, InvocationError> {
        let reply = self.replies.get(&request.template).cloned();
        self.calls.lock().unwrap().push(request.clone());
        match reply {
            Some(Ok(raw)) => Ok(raw),
            Some(Err(message)) => Err(InvocationError::new(message)),
            None => Err(InvocationError::new(format!(
                "no reply scripted for {}",
                request.template
            ))),
        }
    }
}

/// A model call parked until the test decides how it resolves.
pub struct GatedCall {
    pub request: ModelRequest,
    reply: oneshot::Sender<Result<String, InvocationError>>,
}

impl GatedCall {
    pub fn respond(self, raw: &str) {
        let _ = self.reply.send(Ok(raw.to_string()));
    }

    pub fn fail(self, message: &str) {
        let _ = self.reply.send(Err(InvocationError::new(message)));
    }
}

/// Every invocation blocks until released through [`GatedModel::next_call`].
pub struct GatedModel {
    calls_tx: mpsc::UnboundedSender<GatedCall>,
    calls_rx: tokio::sync::Mutex<mpsc::UnboundedReceiver<GatedCall>>,
}

impl GatedModel {
    pub fn new() -> Self {
        let (calls_tx, calls_rx) = mpsc::unbounded_channel();
        Self {
            calls_tx,
            calls_rx: tokio::sync::Mutex::new(calls_rx),
        }
    }

    pub async fn next_call(&self) -> GatedCall {
        self.calls_rx
            .lock()
            .await
            .recv()
            .await
            .expect("model channel closed")
    }

    /// Wait for `count` calls and return them in arrival order.
    pub async fn take_calls(&self, count: usize) -> Vec<GatedCall> {
        let mut calls = Vec::with_capacity(count);
        for _ in 0..count {
            calls.push(self.next_call().await);
        }
        calls
    }
}

#[async_trait]
impl ModelClient for GatedModel {
    async fn invoke(&self, request: ModelRequest) -> Result<String, InvocationError> {
        let (reply, wait) = oneshot::channel();
        self.calls_tx
            .send(GatedCall { request, reply })
            .map_err(|_| InvocationError::new("test dropped the gate"))?;
        wait.await
            .unwrap_or_else(|_| Err(InvocationError::new("call abandoned")))
    }
}

/// Pull the call for `template` out of a batch.
pub fn take_for(calls: &mut Vec<GatedCall>, template: &str) -> GatedCall {
    let index = calls
        .iter()
        .position(|call| call.request.template == template)
        .unwrap_or_else(|| panic!("no call for {template}"));
    calls.remove(index)
}

/// Pull the call whose prompt mentions `needle` out of a batch.
pub fn take_mentioning(calls: &mut Vec<GatedCall>, needle: &str) -> GatedCall {
    let index = calls
        .iter()
        .position(|call| call.request.prompt.contains(needle))
        .unwrap_or_else(|| panic!("no call mentioning {needle:?}"));
    calls.remove(index)
}

pub fn controller(model: Arc<dyn ModelClient>) -> OrchestrationController {
    controller_with(model, FlowCapabilities::default())
}

pub fn controller_with(
    model: Arc<dyn ModelClient>,
    capabilities: FlowCapabilities,
) -> OrchestrationController {
    OrchestrationController::new(Arc::new(PaperFlows::new(model)), capabilities)
}

pub const PAPER: &str = "Paper about X. Methods ... Results ...";

pub fn summary_json(summary: &str) -> String {
    serde_json::json!({ "summary": summary }).to_string()
}

pub fn keywords_json(keywords: &[&str]) -> String {
    serde_json::json!({ "keywords": keywords }).to_string()
}

pub fn answer_json(answer: &str) -> String {
    serde_json::json!({ "answer": answer }).to_string()
}

/// A model that answers all three templates successfully.
pub fn happy_model() -> ScriptedModel {
    ScriptedModel::new()
        .reply(SUMMARIZE_PROMPT, &summary_json("A short summary."))
        .reply(KEYWORDS_PROMPT, &keywords_json(&["x", "methods", "results"]))
        .reply(ANSWER_PROMPT, &answer_json("It is about X."))
}
