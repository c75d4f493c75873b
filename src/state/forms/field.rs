//! Per-field state: value, dirtiness, error and suggested correction

use super::descriptor::FieldDescriptor;
use super::validation::{ValidationContext, Validator};
use super::value::{Formatter, Parser, ScalarValue, ValueKind};
use std::fmt;

/// State of a single field, owned by a [`FormStore`](super::FormStore)
pub struct FieldStore {
    name: String,
    value: ScalarValue,
    kind: ValueKind,
    is_dirty: bool,
    error: Option<String>,
    closest_valid_value: Option<ScalarValue>,
    validators: Vec<Box<dyn Validator>>,
    parsers: Vec<Parser>,
    formatters: Vec<Formatter>,
}

impl FieldStore {
    /// Create a field from its descriptor.
    ///
    /// Without explicit parsers the field gets one coercion parser matching
    /// the kind of its initial value.
    pub fn new(name: impl Into<String>, descriptor: FieldDescriptor) -> Self {
        let FieldDescriptor {
            value,
            validators,
            parsers,
            formatters,
        } = descriptor;
        let kind = value.kind();

        Self {
            name: name.into(),
            value,
            kind,
            is_dirty: false,
            error: None,
            closest_valid_value: None,
            validators,
            parsers: parsers.unwrap_or_else(|| vec![kind.default_parser()]),
            formatters,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn value(&self) -> &ScalarValue {
        &self.value
    }

    /// Kind of the initial value
    pub fn kind(&self) -> ValueKind {
        self.kind
    }

    pub fn is_dirty(&self) -> bool {
        self.is_dirty
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn closest_valid_value(&self) -> Option<&ScalarValue> {
        self.closest_valid_value.as_ref()
    }

    pub fn is_valid(&self) -> bool {
        self.error.is_none()
    }

    pub fn validator_count(&self) -> usize {
        self.validators.len()
    }

    pub fn set_dirty(&mut self, is_dirty: bool) {
        self.is_dirty = is_dirty;
    }

    /// Value passed through the formatter chain, left to right
    pub fn formatted_value(&self) -> ScalarValue {
        self.formatters
            .iter()
            .fold(self.value.clone(), |value, format| format(value))
    }

    /// Run the parser chain right-to-left over raw input and store the result
    pub fn parse(&mut self, raw: ScalarValue) {
        self.value = self
            .parsers
            .iter()
            .rev()
            .fold(raw, |value, parse| parse(value));
    }

    /// Whether `validate(force)` would run the validators
    pub fn should_validate(&self, force: bool) -> bool {
        self.is_dirty || force
    }

    /// Run every validator in order unless the field is clean and not forced.
    ///
    /// The last validator's outcome is what remains: an earlier error is
    /// overwritten by a later pass. Returns whether validators ran.
    pub fn validate(&mut self, force: bool, ctx: &ValidationContext<'_>) -> bool {
        if !self.should_validate(force) {
            return false;
        }

        for validator in &self.validators {
            let outcome = validator.validate(&self.value, ctx);
            let (error, closest) = match outcome {
                Some(result) => (result.error, result.closest_valid_value),
                None => (None, None),
            };
            self.error = error;
            self.closest_valid_value = closest;
        }

        if let Some(error) = &self.error {
            tracing::debug!("Field {} invalid: {}", self.name, error);
        }
        true
    }
}

impl fmt::Debug for FieldStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldStore")
            .field("name", &self.name)
            .field("value", &self.value)
            .field("is_dirty", &self.is_dirty)
            .field("error", &self.error)
            .field("closest_valid_value", &self.closest_valid_value)
            .field("validators", &self.validators.len())
            .field("parsers", &self.parsers.len())
            .field("formatters", &self.formatters.len())
            .finish()
    }
}
