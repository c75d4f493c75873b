//! Form domain layer
//!
//! Field and form stores, the validator contract and descriptor trees.

mod descriptor;
mod error;
mod field;
mod form_state;
mod validation;
pub mod validators;
mod value;

pub use descriptor::{FieldDescriptor, FieldGroup, FieldNode};
pub use error::{FormError, Result};
pub use field::FieldStore;
pub use form_state::{
    FieldHandle, FormEvent, FormOptions, FormStore, SubmitHandler, SubmitOutcome, SubscriptionId,
};
pub use validation::{ValidationContext, ValidationResult, Validator};
pub use validators::ValidatorSpec;
pub use value::{Externals, FieldValues, Formatter, Parser, ScalarValue, ValueKind};
