use std::marker::PhantomData;
use std::sync::Arc;

use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, error, info};

use crate::{
    error::{FlowError, Result},
    model::{ModelClient, ModelRequest},
    output::parse_output,
    template::PromptTemplate,
    validate::Validate,
};

/// A named prompt bound to an input schema `I` and an output schema `O`.
pub struct PromptDefinition<I, O> {
    template: PromptTemplate,
    output_format: String,
    temperature: Option<f64>,
    _schema: PhantomData<fn(&I) -> O>,
}

impl<I, O> PromptDefinition<I, O> {
    pub fn new(
        name: impl Into<String>,
        template: impl Into<String>,
        output_format: impl Into<String>,
    ) -> Self {
        Self {
            template: PromptTemplate::new(name, template),
            output_format: output_format.into(),
            temperature: None,
            _schema: PhantomData,
        }
    }

    pub fn with_temperature(mut self, temperature: f64) -> Self {
        self.temperature = Some(temperature);
        self
    }

    pub fn name(&self) -> &str {
        self.template.name()
    }

    pub fn template(&self) -> &PromptTemplate {
        &self.template
    }

    pub fn output_format(&self) -> &str {
        &self.output_format
    }

    pub fn temperature(&self) -> Option<f64> {
        self.temperature
    }
}

impl<I: Serialize, O> PromptDefinition<I, O> {
    pub fn render(&self, input: &I) -> Result<String> {
        self.template.render(input)
    }
}

/// Validate → render → invoke → parse, shared by every flow.
#[derive(Clone)]
pub struct PromptInvoker {
    model: Arc<dyn ModelClient>,
}

impl PromptInvoker {
    pub fn new(model: Arc<dyn ModelClient>) -> Self {
        Self { model }
    }

    pub async fn invoke<I, O>(&self, definition: &PromptDefinition<I, O>, input: &I) -> Result<O>
    where
        I: Serialize + Validate + Sync,
        O: DeserializeOwned,
    {
        let template = definition.name().to_string();

        input.validate()?;
        let prompt = definition.render(input)?;

        debug!(template = %template, prompt_len = prompt.len(), "Invoking model");

        let raw = self
            .model
            .invoke(ModelRequest {
                template: template.clone(),
                prompt,
                output_format: definition.output_format().to_string(),
                temperature: definition.temperature(),
            })
            .await
            .map_err(|e| {
                error!(template = %template, error = %e, "Model invocation failed");
                FlowError::Invocation {
                    template: template.clone(),
                    message: e.message,
                }
            })?;

        let output = parse_output::<O>(&raw).map_err(|reason| FlowError::OutputParse {
            template: template.clone(),
            reason,
            raw: raw.clone(),
        })?;

        info!(template = %template, "Model output parsed");
        Ok(output)
    }
}
