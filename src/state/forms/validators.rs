//! Built-in validators and their declarative form

use super::validation::{ValidationContext, ValidationResult, Validator};
use super::value::ScalarValue;
use serde::{Deserialize, Serialize};

/// Fails on an empty string value. Whitespace counts as content.
#[derive(Debug, Clone)]
pub struct Required {
    pub message: String,
}

/// Fails when the string form is shorter than `min` characters
#[derive(Debug, Clone)]
pub struct MinLength {
    pub min: usize,
    pub message: String,
}

/// Fails when the string form is longer than `max` characters and suggests
/// the truncated string
#[derive(Debug, Clone)]
pub struct MaxLength {
    pub max: usize,
    pub message: String,
}

/// Numeric bounds, inclusive. Suggests the clamped value.
#[derive(Debug, Clone)]
pub struct Range {
    pub min: f64,
    pub max: f64,
    pub message: String,
}

/// Cross-field equality against another field of the same form
#[derive(Debug, Clone)]
pub struct MatchesField {
    pub field: String,
    pub message: String,
}

/// Membership in a string list stored in the form externals under `key`
#[derive(Debug, Clone)]
pub struct OneOfExternal {
    pub key: String,
    pub message: String,
}

pub fn required() -> Required {
    Required {
        message: "This field is required".to_string(),
    }
}

pub fn min_length(min: usize) -> MinLength {
    MinLength {
        min,
        message: format!("Please enter at least {min} symbols"),
    }
}

pub fn max_length(max: usize) -> MaxLength {
    MaxLength {
        max,
        message: format!("Please enter at most {max} symbols"),
    }
}

pub fn range(min: f64, max: f64) -> Range {
    Range {
        min,
        max,
        message: format!("Value must be between {min} and {max}"),
    }
}

pub fn matches_field(field: impl Into<String>) -> MatchesField {
    let field = field.into();
    MatchesField {
        message: format!("Must match {field}"),
        field,
    }
}

pub fn one_of_external(key: impl Into<String>) -> OneOfExternal {
    OneOfExternal {
        key: key.into(),
        message: "Unknown value".to_string(),
    }
}

impl Validator for Required {
    fn validate(
        &self,
        value: &ScalarValue,
        _ctx: &ValidationContext<'_>,
    ) -> Option<ValidationResult> {
        match value {
            ScalarValue::Str(s) if s.is_empty() => {
                Some(ValidationResult::error(self.message.clone()))
            }
            _ => None,
        }
    }
}

impl Validator for MinLength {
    fn validate(
        &self,
        value: &ScalarValue,
        _ctx: &ValidationContext<'_>,
    ) -> Option<ValidationResult> {
        if value.coerce_string().chars().count() < self.min {
            Some(ValidationResult::error(self.message.clone()))
        } else {
            None
        }
    }
}

impl Validator for MaxLength {
    fn validate(
        &self,
        value: &ScalarValue,
        _ctx: &ValidationContext<'_>,
    ) -> Option<ValidationResult> {
        let text = value.coerce_string();
        if text.chars().count() > self.max {
            let truncated: String = text.chars().take(self.max).collect();
            Some(ValidationResult::error(self.message.clone()).with_closest(truncated))
        } else {
            None
        }
    }
}

impl Validator for Range {
    fn validate(
        &self,
        value: &ScalarValue,
        _ctx: &ValidationContext<'_>,
    ) -> Option<ValidationResult> {
        let n = value.coerce_number();
        if n.is_nan() {
            Some(ValidationResult::error("Please enter a number"))
        } else if n < self.min {
            Some(ValidationResult::error(self.message.clone()).with_closest(self.min))
        } else if n > self.max {
            Some(ValidationResult::error(self.message.clone()).with_closest(self.max))
        } else {
            None
        }
    }
}

impl Validator for MatchesField {
    fn validate(
        &self,
        value: &ScalarValue,
        ctx: &ValidationContext<'_>,
    ) -> Option<ValidationResult> {
        match ctx.value(&self.field) {
            Some(other) if other == value => None,
            Some(other) => {
                Some(ValidationResult::error(self.message.clone()).with_closest(other.clone()))
            }
            None => Some(ValidationResult::error(self.message.clone())),
        }
    }
}

impl Validator for OneOfExternal {
    fn validate(
        &self,
        value: &ScalarValue,
        ctx: &ValidationContext<'_>,
    ) -> Option<ValidationResult> {
        let Some(options) = ctx.external(&self.key).and_then(|v| v.as_array()) else {
            tracing::debug!("No external list under {:?}, skipping check", self.key);
            return None;
        };

        let text = value.coerce_string();
        let options: Vec<&str> = options.iter().filter_map(|o| o.as_str()).collect();
        if options.iter().any(|o| *o == text) {
            return None;
        }

        let needle = text.to_lowercase();
        let closest = options
            .iter()
            .find(|o| o.to_lowercase() == needle)
            .or_else(|| {
                options
                    .iter()
                    .find(|o| !needle.is_empty() && o.to_lowercase().starts_with(&needle))
            });

        let result = ValidationResult::error(self.message.clone());
        Some(match closest {
            Some(option) => result.with_closest(*option),
            None => result,
        })
    }
}

/// Serializable description of a built-in validator, used by JSON descriptors
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum ValidatorSpec {
    Required {
        message: Option<String>,
    },
    MinLength {
        min: usize,
        message: Option<String>,
    },
    MaxLength {
        max: usize,
        message: Option<String>,
    },
    Range {
        min: f64,
        max: f64,
        message: Option<String>,
    },
    MatchesField {
        field: String,
        message: Option<String>,
    },
    OneOfExternal {
        key: String,
        message: Option<String>,
    },
}

impl ValidatorSpec {
    pub fn into_validator(self) -> Box<dyn Validator> {
        match self {
            Self::Required { message } => {
                let mut v = required();
                if let Some(message) = message {
                    v.message = message;
                }
                Box::new(v)
            }
            Self::MinLength { min, message } => {
                let mut v = min_length(min);
                if let Some(message) = message {
                    v.message = message;
                }
                Box::new(v)
            }
            Self::MaxLength { max, message } => {
                let mut v = max_length(max);
                if let Some(message) = message {
                    v.message = message;
                }
                Box::new(v)
            }
            Self::Range { min, max, message } => {
                let mut v = range(min, max);
                if let Some(message) = message {
                    v.message = message;
                }
                Box::new(v)
            }
            Self::MatchesField { field, message } => {
                let mut v = matches_field(field);
                if let Some(message) = message {
                    v.message = message;
                }
                Box::new(v)
            }
            Self::OneOfExternal { key, message } => {
                let mut v = one_of_external(key);
                if let Some(message) = message {
                    v.message = message;
                }
                Box::new(v)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::forms::value::{Externals, FieldValues};
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn check(validator: &dyn Validator, value: impl Into<ScalarValue>) -> Option<ValidationResult> {
        let values = FieldValues::new();
        let externals = Externals::new();
        validator.validate(&value.into(), &ValidationContext::new(&values, &externals))
    }

    #[test]
    fn test_required() {
        assert!(check(&required(), "x").is_none());
        assert!(check(&required(), "  ").is_none());
        assert_eq!(
            check(&required(), "").and_then(|r| r.error),
            Some("This field is required".to_string())
        );
        // Only strings can be empty
        assert!(check(&required(), 0).is_none());
    }

    #[test]
    fn test_min_length_counts_chars() {
        assert!(check(&min_length(3), "abc").is_none());
        assert!(check(&min_length(3), "äöü").is_none());
        assert_eq!(
            check(&min_length(3), "ab").and_then(|r| r.error),
            Some("Please enter at least 3 symbols".to_string())
        );
    }

    #[test]
    fn test_max_length_suggests_truncation() {
        let result = check(&max_length(3), "abcdef").unwrap();
        assert_eq!(result.closest_valid_value, Some(ScalarValue::from("abc")));
        assert!(check(&max_length(3), "abc").is_none());
    }

    #[test]
    fn test_range_clamps() {
        let v = range(1.0, 10.0);
        assert!(check(&v, 5).is_none());
        assert_eq!(
            check(&v, 42).unwrap().closest_valid_value,
            Some(ScalarValue::Num(10.0))
        );
        assert_eq!(
            check(&v, -3).unwrap().closest_valid_value,
            Some(ScalarValue::Num(1.0))
        );
        let nan = check(&v, f64::NAN).unwrap();
        assert_eq!(nan.error.as_deref(), Some("Please enter a number"));
        assert!(nan.closest_valid_value.is_none());
    }

    #[test]
    fn test_matches_field_reads_snapshot() {
        let values: FieldValues = vec![("password".to_string(), ScalarValue::from("secret"))]
            .into_iter()
            .collect();
        let externals = Externals::new();
        let ctx = ValidationContext::new(&values, &externals);
        let v = matches_field("password");

        assert!(v.validate(&ScalarValue::from("secret"), &ctx).is_none());
        let result = v.validate(&ScalarValue::from("secrex"), &ctx).unwrap();
        assert_eq!(result.error.as_deref(), Some("Must match password"));
        assert_eq!(result.closest_valid_value, Some(ScalarValue::from("secret")));
    }

    #[test]
    fn test_one_of_external() {
        let values = FieldValues::new();
        let mut externals = Externals::new();
        externals.insert("offices".to_string(), json!(["Berlin Mitte", "Hamburg"]));
        let ctx = ValidationContext::new(&values, &externals);
        let v = one_of_external("offices");

        assert!(v.validate(&ScalarValue::from("Hamburg"), &ctx).is_none());

        let result = v.validate(&ScalarValue::from("berlin"), &ctx).unwrap();
        assert_eq!(result.error.as_deref(), Some("Unknown value"));
        assert_eq!(
            result.closest_valid_value,
            Some(ScalarValue::from("Berlin Mitte"))
        );

        let result = v.validate(&ScalarValue::from("Paris"), &ctx).unwrap();
        assert!(result.closest_valid_value.is_none());
    }

    #[test]
    fn test_one_of_external_without_list_passes() {
        assert!(check(&one_of_external("offices"), "anything").is_none());
    }

    #[test]
    fn test_validator_spec_deserializes_with_kind_tag() {
        let spec: ValidatorSpec =
            serde_json::from_value(json!({"kind": "minLength", "min": 3})).unwrap();
        assert_eq!(
            spec,
            ValidatorSpec::MinLength {
                min: 3,
                message: None
            }
        );

        let spec: ValidatorSpec = serde_json::from_value(
            json!({"kind": "oneOfExternal", "key": "offices", "message": "No such office"}),
        )
        .unwrap();
        let validator = spec.into_validator();
        let result = check(validator.as_ref(), "x");
        assert!(result.is_none(), "no externals means the check is skipped");
    }

    #[test]
    fn test_validator_spec_custom_message() {
        let spec = ValidatorSpec::Required {
            message: Some("Address must not be empty".to_string()),
        };
        let validator = spec.into_validator();
        assert_eq!(
            check(validator.as_ref(), "").and_then(|r| r.error),
            Some("Address must not be empty".to_string())
        );
    }
}
