//! Programmer-facing errors raised while declaring or assembling a form.
//!
//! Invalid *input* never produces one of these: submitted values that fail
//! validation are recorded on the field and surfaced as form error messages.

/// Errors from building fields and assembling forms.
#[derive(Debug, thiserror::Error)]
pub enum FormError {
    #[error("unknown field type: {0}")]
    UnknownType(String),
    #[error("field type {kind} is handled outside the validation engine")]
    Unsupported { kind: &'static str },
    #[error("invalid pattern for field {field}: {source}")]
    InvalidPattern {
        field: String,
        #[source]
        source: regex::Error,
    },
    #[error("pattern field {field} has no pattern")]
    MissingPattern { field: String },
    #[error("field {field} needs a choice table")]
    MissingChoices { field: String },
    #[error("time menu {field} needs start, end and a positive interval")]
    BadTimeRange { field: String },
    #[error("duplicate field id: {0}")]
    DuplicateField(String),
    #[error("unknown field: {0}")]
    UnknownField(String),
}
