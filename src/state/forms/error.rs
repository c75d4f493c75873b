//! Form construction and lookup errors

/// Errors raised by the form engine.
///
/// Validation failures are not errors: they live on each field as data.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum FormError {
    #[error("Unsupported field type for {name}: found {found}. Expected one of: string, number, boolean")]
    UnsupportedFieldType { name: String, found: String },

    #[error("Invalid field descriptor at {path}: {reason}")]
    InvalidDescriptor { path: String, reason: String },

    #[error("Duplicate field name: {0}")]
    DuplicateField(String),

    #[error("Unknown field: {0}")]
    UnknownField(String),
}

pub type Result<T> = std::result::Result<T, FormError>;
