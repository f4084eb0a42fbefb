//! Handling of errors that cannot be returned to a caller.

use tracing::error;

use crate::core::DecoError;

/// An error handler that can be used to handle an error type.
///
/// Errors raised while the `DecorationManager` is processing events
/// have nowhere to go, so they are passed here instead. Typically this
/// would be a standard logging function that writes to a file or
/// stdout, but it can be anything.
pub trait ErrorHandler {
    /// Calls the error handler.
    fn call(&self, err: DecoError);
}

impl<F> ErrorHandler for F
where
    F: Fn(DecoError),
{
    fn call(&self, err: DecoError) {
        self(err)
    }
}

/// Logs the error and carries on.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultErrorHandler;

impl ErrorHandler for DefaultErrorHandler {
    fn call(&self, err: DecoError) {
        error!("{}", err)
    }
}
