//! Errors from request handling and persistence.

use formwork_core::FormError;

/// Errors raised while handling a form request.
///
/// Invalid user input is not an error here either: it leaves the form
/// incomplete and the request ends in [`crate::handler::Outcome::Redisplay`].
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error(transparent)]
    Form(#[from] FormError),
    #[error("{operation} needs a record id")]
    MissingRecordId { operation: &'static str },
    #[error("form for table {table} has no id column")]
    NotEditable { table: String },
    #[error("record store failed: {0:#}")]
    Store(anyhow::Error),
}
