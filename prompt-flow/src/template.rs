//! Prompt templates with literal field interpolation.
//!
//! Two constructs are supported:
//! * `{{field}}` is replaced by the value of `field` in the serialized input.
//! * `{{#if flag}} ... {{/if}}` keeps its body only when `flag` is truthy.
//!
//! Substituted values are never re-scanned, so paper text containing braces is
//! inserted verbatim.

use std::sync::LazyLock;

use regex::{Captures, Regex};
use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::{FlowError, Result};

static CONDITIONAL_BLOCK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)\{\{#if\s+([A-Za-z_][A-Za-z0-9_]*)\s*\}\}(.*?)\{\{/if\}\}")
        .expect("Invalid regex")
});

static PLACEHOLDER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\{\{\s*([A-Za-z_][A-Za-z0-9_]*)\s*\}\}").expect("Invalid regex")
});

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptTemplate {
    name: String,
    text: String,
}

impl PromptTemplate {
    pub fn new(name: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            text: text.into(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Render against any input that serializes to a JSON object.
    pub fn render<T: Serialize>(&self, input: &T) -> Result<String> {
        match serde_json::to_value(input) {
            Ok(Value::Object(fields)) => self.render_fields(&fields),
            _ => Err(FlowError::Template {
                template: self.name.clone(),
                field: "<input>".to_string(),
            }),
        }
    }

    pub fn render_fields(&self, fields: &Map<String, Value>) -> Result<String> {
        let expanded = self.expand_conditionals(fields)?;
        self.interpolate(&expanded, fields)
    }

    fn expand_conditionals(&self, fields: &Map<String, Value>) -> Result<String> {
        let mut out = String::with_capacity(self.text.len());
        let mut last = 0;

        for caps in CONDITIONAL_BLOCK.captures_iter(&self.text) {
            let Some(whole) = caps.get(0) else { continue };
            out.push_str(&self.text[last..whole.start()]);

            let flag = self.lookup(fields, &caps)?;
            if is_truthy(flag) {
                out.push_str(&caps[2]);
            }
            last = whole.end();
        }

        out.push_str(&self.text[last..]);
        Ok(out)
    }

    fn interpolate(&self, text: &str, fields: &Map<String, Value>) -> Result<String> {
        let mut out = String::with_capacity(text.len());
        let mut last = 0;

        for caps in PLACEHOLDER.captures_iter(text) {
            let Some(whole) = caps.get(0) else { continue };
            out.push_str(&text[last..whole.start()]);
            out.push_str(&display_value(self.lookup(fields, &caps)?));
            last = whole.end();
        }

        out.push_str(&text[last..]);
        Ok(out)
    }

    fn lookup<'a>(&self, fields: &'a Map<String, Value>, caps: &Captures<'_>) -> Result<&'a Value> {
        let field = &caps[1];
        fields.get(field).ok_or_else(|| FlowError::Template {
            template: self.name.clone(),
            field: field.to_string(),
        })
    }
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|n| n != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(items) => !items.is_empty(),
        Value::Object(map) => !map.is_empty(),
    }
}

fn display_value(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Array(items) => items
            .iter()
            .map(display_value)
            .collect::<Vec<_>>()
            .join(", "),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Serialize;

    #[derive(Serialize)]
    struct Question {
        paper_text: String,
        question: String,
        eli5: bool,
    }

    fn question(eli5: bool) -> Question {
        Question {
            paper_text: "We measure X.".to_string(),
            question: "What is measured?".to_string(),
            eli5,
        }
    }

    const TEMPLATE: &str = "Paper: {{paper_text}}\nQ: \"{{ question }}\"\n{{#if eli5}}Explain simply.\n{{/if}}End";

    #[test]
    fn interpolates_fields_literally() {
        let template = PromptTemplate::new("qa", TEMPLATE);
        let rendered = template.render(&question(false)).unwrap();
        assert_eq!(rendered, "Paper: We measure X.\nQ: \"What is measured?\"\nEnd");
    }

    #[test]
    fn includes_guarded_block_only_when_flag_is_true() {
        let template = PromptTemplate::new("qa", TEMPLATE);
        let rendered = template.render(&question(true)).unwrap();
        assert!(rendered.contains("Explain simply."));
        assert!(rendered.ends_with("Explain simply.\nEnd"));
    }

    #[test]
    fn substituted_values_are_not_rescanned() {
        let template = PromptTemplate::new("qa", "{{paper_text}}");
        let input = Question {
            paper_text: "set {{question}} aside".to_string(),
            question: "ignored".to_string(),
            eli5: false,
        };
        assert_eq!(template.render(&input).unwrap(), "set {{question}} aside");
    }

    #[test]
    fn unknown_field_is_a_template_error() {
        let template = PromptTemplate::new("qa", "Hello {{language}}");
        let err = template.render(&question(false)).unwrap_err();
        assert_eq!(
            err,
            FlowError::Template {
                template: "qa".to_string(),
                field: "language".to_string(),
            }
        );
    }

    #[test]
    fn arrays_render_as_comma_separated_list() {
        let mut fields = Map::new();
        fields.insert("tags".to_string(), serde_json::json!(["a", "b"]));
        let template = PromptTemplate::new("tags", "[{{tags}}]");
        assert_eq!(template.render_fields(&fields).unwrap(), "[a, b]");
    }
}
