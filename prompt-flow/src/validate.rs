use crate::error::{FieldViolation, ValidationError};

/// Input schema check run by the invoker before rendering.
pub trait Validate {
    fn validate(&self) -> Result<(), ValidationError>;
}

/// Collects field violations so that one error can report all of them.
#[derive(Debug, Default)]
pub struct FieldChecks {
    violations: Vec<FieldViolation>,
}

impl FieldChecks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Required string: must contain something other than whitespace.
    pub fn non_empty(self, field: &str, value: &str) -> Self {
        self.check(field, !value.trim().is_empty(), "must not be empty")
    }

    pub fn check(mut self, field: &str, ok: bool, reason: &str) -> Self {
        if !ok {
            self.violations.push(FieldViolation {
                field: field.to_string(),
                reason: reason.to_string(),
            });
        }
        self
    }

    pub fn finish(self) -> Result<(), ValidationError> {
        if self.violations.is_empty() {
            Ok(())
        } else {
            Err(ValidationError {
                violations: self.violations,
            })
        }
    }
}
