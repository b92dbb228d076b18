use serde::Serialize;
use thiserror::Error;

pub const DEFAULT_MODEL: &str = "openai/gpt-4o-mini";
pub const DEFAULT_PORT: u16 = 3000;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} environment variable is required")]
    Missing(String),

    #[error("{var} has invalid value {value:?}, expected {expected}")]
    Invalid {
        var: String,
        value: String,
        expected: String,
    },
}

/// Optional parts of the core. Both are on unless switched off.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FlowCapabilities {
    pub keywords: bool,
    pub eli5: bool,
}

impl Default for FlowCapabilities {
    fn default() -> Self {
        Self {
            keywords: true,
            eli5: true,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    #[default]
    Json,
    Pretty,
}

#[derive(Debug, Clone)]
pub struct ServiceConfig {
    pub port: u16,
    pub openrouter_api_key: Option<String>,
    pub model: String,
    pub log_format: LogFormat,
    pub capabilities: FlowCapabilities,
}

impl ServiceConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let port = match lookup("PORT") {
            Some(value) => value.parse::<u16>().map_err(|_| ConfigError::Invalid {
                var: "PORT".to_string(),
                value,
                expected: "a port number".to_string(),
            })?,
            None => DEFAULT_PORT,
        };

        let log_format = match lookup("LOG_FORMAT").as_deref() {
            Some("pretty") => LogFormat::Pretty,
            _ => LogFormat::Json,
        };

        let capabilities = FlowCapabilities {
            keywords: flag(&lookup, "SCHOLAR_ENABLE_KEYWORDS")?.unwrap_or(true),
            eli5: flag(&lookup, "SCHOLAR_ENABLE_ELI5")?.unwrap_or(true),
        };

        Ok(Self {
            port,
            openrouter_api_key: lookup("OPENROUTER_API_KEY").filter(|key| !key.trim().is_empty()),
            model: lookup("SCHOLAR_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            log_format,
            capabilities,
        })
    }

    pub fn api_key(&self) -> Result<&str, ConfigError> {
        self.openrouter_api_key
            .as_deref()
            .ok_or_else(|| ConfigError::Missing("OPENROUTER_API_KEY".to_string()))
    }
}

fn flag(lookup: &impl Fn(&str) -> Option<String>, var: &str) -> Result<Option<bool>, ConfigError> {
    let Some(value) = lookup(var) else {
        return Ok(None);
    };
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(Some(true)),
        "0" | "false" | "no" | "off" => Ok(Some(false)),
        _ => Err(ConfigError::Invalid {
            var: var.to_string(),
            value,
            expected: "true or false".to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(vars: &[(&str, &str)]) -> Result<ServiceConfig, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        ServiceConfig::from_lookup(|var| vars.get(var).cloned())
    }

    #[test]
    fn defaults_when_nothing_is_set() {
        let config = config(&[]).unwrap();
        assert_eq!(config.port, DEFAULT_PORT);
        assert_eq!(config.model, DEFAULT_MODEL);
        assert_eq!(config.log_format, LogFormat::Json);
        assert_eq!(config.capabilities, FlowCapabilities::default());
        assert_eq!(
            config.api_key(),
            Err(ConfigError::Missing("OPENROUTER_API_KEY".to_string()))
        );
    }

    #[test]
    fn capability_flags_can_be_switched_off() {
        let config = config(&[
            ("SCHOLAR_ENABLE_KEYWORDS", "false"),
            ("SCHOLAR_ENABLE_ELI5", "0"),
            ("LOG_FORMAT", "pretty"),
            ("OPENROUTER_API_KEY", "sk-test"),
        ])
        .unwrap();
        assert!(!config.capabilities.keywords);
        assert!(!config.capabilities.eli5);
        assert_eq!(config.log_format, LogFormat::Pretty);
        assert_eq!(config.api_key(), Ok("sk-test"));
    }

    #[test]
    fn invalid_values_are_reported() {
        assert!(matches!(
            config(&[("PORT", "eighty")]),
            Err(ConfigError::Invalid { ref var, .. }) if var == "PORT"
        ));
        assert!(matches!(
            config(&[("SCHOLAR_ENABLE_ELI5", "maybe")]),
            Err(ConfigError::Invalid { ref var, .. }) if var == "SCHOLAR_ENABLE_ELI5"
        ));
    }
}
