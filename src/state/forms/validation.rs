//! Validator contract

use super::value::{Externals, FieldValues, ScalarValue};

/// Outcome reported by a validator that did not pass silently
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ValidationResult {
    pub error: Option<String>,
    pub closest_valid_value: Option<ScalarValue>,
}

impl ValidationResult {
    /// A failure with a message
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            error: Some(message.into()),
            closest_valid_value: None,
        }
    }

    /// Attach a suggested correction
    pub fn with_closest(mut self, value: impl Into<ScalarValue>) -> Self {
        self.closest_valid_value = Some(value.into());
        self
    }
}

/// Read-only view of the form lent to a validator
#[derive(Debug, Clone, Copy)]
pub struct ValidationContext<'a> {
    pub values: &'a FieldValues,
    pub externals: &'a Externals,
}

impl<'a> ValidationContext<'a> {
    pub fn new(values: &'a FieldValues, externals: &'a Externals) -> Self {
        Self { values, externals }
    }

    /// Current value of another field
    pub fn value(&self, name: &str) -> Option<&'a ScalarValue> {
        self.values.get(name)
    }

    pub fn external(&self, key: &str) -> Option<&'a serde_json::Value> {
        self.externals.get(key)
    }
}

/// Inspects a field value and optionally reports an error or a correction.
///
/// Returning `None` means the value passed. Implementations are expected to
/// be free of side effects. A panic inside a validator is not caught.
pub trait Validator: Send + Sync {
    fn validate(&self, value: &ScalarValue, ctx: &ValidationContext<'_>)
        -> Option<ValidationResult>;
}

impl<F> Validator for F
where
    F: Fn(&ScalarValue, &ValidationContext<'_>) -> Option<ValidationResult> + Send + Sync,
{
    fn validate(
        &self,
        value: &ScalarValue,
        ctx: &ValidationContext<'_>,
    ) -> Option<ValidationResult> {
        self(value, ctx)
    }
}
