//! Declarative field descriptions
//!
//! A form is described as a tree of [`FieldNode`]s. Groups are flattened into
//! dot-separated field names when a [`FormStore`](super::FormStore) is built.

use super::error::{FormError, Result};
use super::validation::{ValidationContext, ValidationResult, Validator};
use super::validators::ValidatorSpec;
use super::value::{json_type_name, Formatter, Parser, ScalarValue};
use serde_json::Value;
use std::collections::HashSet;
use std::fmt;

/// Description of a single leaf field
pub struct FieldDescriptor {
    pub(crate) value: ScalarValue,
    pub(crate) validators: Vec<Box<dyn Validator>>,
    pub(crate) parsers: Option<Vec<Parser>>,
    pub(crate) formatters: Vec<Formatter>,
}

impl FieldDescriptor {
    pub fn new(value: impl Into<ScalarValue>) -> Self {
        Self {
            value: value.into(),
            validators: Vec::new(),
            parsers: None,
            formatters: Vec::new(),
        }
    }

    /// Append a validator
    pub fn validator(mut self, validator: impl Validator + 'static) -> Self {
        self.validators.push(Box::new(validator));
        self
    }

    /// Append a closure validator
    pub fn validate_with<F>(self, f: F) -> Self
    where
        F: Fn(&ScalarValue, &ValidationContext<'_>) -> Option<ValidationResult>
            + Send
            + Sync
            + 'static,
    {
        self.validator(f)
    }

    /// Append a parser. Supplying any parser replaces the default coercion.
    pub fn parser<F>(mut self, f: F) -> Self
    where
        F: Fn(ScalarValue) -> ScalarValue + Send + Sync + 'static,
    {
        self.parsers.get_or_insert_with(Vec::new).push(Box::new(f));
        self
    }

    pub fn formatter<F>(mut self, f: F) -> Self
    where
        F: Fn(ScalarValue) -> ScalarValue + Send + Sync + 'static,
    {
        self.formatters.push(Box::new(f));
        self
    }

    pub fn initial_value(&self) -> &ScalarValue {
        &self.value
    }
}

impl fmt::Debug for FieldDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldDescriptor")
            .field("value", &self.value)
            .field("validators", &self.validators.len())
            .field("parsers", &self.parsers.as_ref().map(Vec::len))
            .field("formatters", &self.formatters.len())
            .finish()
    }
}

/// A node of the descriptor tree
#[derive(Debug)]
pub enum FieldNode {
    Leaf(FieldDescriptor),
    Group(FieldGroup),
}

/// Ordered collection of named fields and nested groups
#[derive(Debug, Default)]
pub struct FieldGroup {
    children: Vec<(String, FieldNode)>,
}

impl FieldGroup {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn field(mut self, name: impl Into<String>, descriptor: FieldDescriptor) -> Self {
        self.children.push((name.into(), FieldNode::Leaf(descriptor)));
        self
    }

    pub fn group(mut self, name: impl Into<String>, group: FieldGroup) -> Self {
        self.children.push((name.into(), FieldNode::Group(group)));
        self
    }

    pub fn len(&self) -> usize {
        self.children.len()
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    /// Build a group from JSON.
    ///
    /// An object with a `value` key is a leaf; its optional `validators`
    /// array holds [`ValidatorSpec`]s. Any other object is a nested group.
    pub fn from_json(value: &Value) -> Result<Self> {
        Self::from_json_at(value, "")
    }

    fn from_json_at(value: &Value, prefix: &str) -> Result<Self> {
        let Value::Object(map) = value else {
            return Err(FormError::InvalidDescriptor {
                path: display_path(prefix),
                reason: format!("expected an object, found {}", json_type_name(value)),
            });
        };

        let mut group = FieldGroup::new();
        for (name, child) in map {
            let path = join_path(prefix, name);
            let Value::Object(entry) = child else {
                return Err(FormError::InvalidDescriptor {
                    path,
                    reason: format!("expected an object, found {}", json_type_name(child)),
                });
            };

            let node = match entry.get("value") {
                Some(initial) => {
                    FieldNode::Leaf(leaf_from_json(&path, initial, entry.get("validators"))?)
                }
                None => FieldNode::Group(Self::from_json_at(child, &path)?),
            };
            group.children.push((name.clone(), node));
        }
        Ok(group)
    }

    /// Flatten into `(dotted name, descriptor)` pairs in declaration order
    pub fn flatten(self) -> Result<Vec<(String, FieldDescriptor)>> {
        let mut out = Vec::new();
        let mut seen = HashSet::new();
        self.flatten_into("", &mut out, &mut seen)?;
        Ok(out)
    }

    fn flatten_into(
        self,
        prefix: &str,
        out: &mut Vec<(String, FieldDescriptor)>,
        seen: &mut HashSet<String>,
    ) -> Result<()> {
        for (name, node) in self.children {
            let path = join_path(prefix, &name);
            match node {
                FieldNode::Group(group) => group.flatten_into(&path, out, seen)?,
                FieldNode::Leaf(descriptor) => {
                    if !seen.insert(path.clone()) {
                        return Err(FormError::DuplicateField(path));
                    }
                    out.push((path, descriptor));
                }
            }
        }
        Ok(())
    }
}

fn leaf_from_json(
    path: &str,
    initial: &Value,
    validators: Option<&Value>,
) -> Result<FieldDescriptor> {
    let value = ScalarValue::try_from(initial).map_err(|found| FormError::UnsupportedFieldType {
        name: path.to_string(),
        found: found.to_string(),
    })?;

    let mut descriptor = FieldDescriptor::new(value);
    let specs = match validators {
        None | Some(Value::Null) => Vec::new(),
        Some(Value::Array(items)) => items.clone(),
        Some(other) => {
            return Err(FormError::InvalidDescriptor {
                path: path.to_string(),
                reason: format!("validators must be an array, found {}", json_type_name(other)),
            })
        }
    };

    for spec in specs {
        let spec: ValidatorSpec =
            serde_json::from_value(spec).map_err(|e| FormError::InvalidDescriptor {
                path: path.to_string(),
                reason: e.to_string(),
            })?;
        descriptor.validators.push(spec.into_validator());
    }
    Ok(descriptor)
}

fn join_path(prefix: &str, name: &str) -> String {
    if prefix.is_empty() {
        name.to_string()
    } else {
        format!("{prefix}.{name}")
    }
}

fn display_path(prefix: &str) -> String {
    if prefix.is_empty() {
        "<root>".to_string()
    } else {
        prefix.to_string()
    }
}
