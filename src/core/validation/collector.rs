//! Violation collector
//!
//! ```rust,ignore
//! let mut validator = Validator::new();
//! validator.field("email", &input.email).rule(not_empty()).rule(email());
//! validator.field("password", &input.password).rule(not_empty()).rule(min_length(5));
//! validator.finish()?; // one ValidationError with every violation
//! ```

use crate::core::error::{ValidationError, Violation};

/// Accumulates violations across fields
#[derive(Debug, Default)]
pub struct Validator {
    violations: Vec<Violation>,
}

impl Validator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start applying rules to one field
    pub fn field<'a>(&'a mut self, name: &'a str, value: &'a str) -> FieldRules<'a> {
        FieldRules {
            validator: self,
            name,
            value,
        }
    }

    pub fn violations(&self) -> &[Violation] {
        &self.violations
    }

    /// Fail with every collected violation, or succeed if there are none
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

/// Rules for a single field; every rule runs even after a failure
pub struct FieldRules<'a> {
    validator: &'a mut Validator,
    name: &'a str,
    value: &'a str,
}

impl FieldRules<'_> {
    pub fn rule<R>(self, rule: R) -> Self
    where
        R: Fn(&str, &str) -> Result<(), String>,
    {
        if let Err(message) = rule(self.name, self.value) {
            self.validator
                .violations
                .push(Violation::new(self.name, message));
        }
        self
    }
}
