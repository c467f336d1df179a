use std::fmt;

/// Request-scoped logging interface.
///
/// `RequestLog` is obtained from [`HandlerContext::log`](crate::HandlerContext::log)
/// and borrows the context, so it cannot outlive the request it belongs to.
///
/// Secret values are redacted when logged because their `Debug` and
/// `Display` implementations never print the inner value.
///
/// All log messages automatically include the request ID.
#[derive(Debug, Clone, Copy)]
pub struct RequestLog<'a> {
    request_id: &'a str,
}

impl<'a> RequestLog<'a> {
    /// Creates a logger stamped with `request_id`.
    pub(crate) fn new(request_id: &'a str) -> Self {
        Self { request_id }
    }

    /// Returns the request ID associated with this logger.
    pub fn request_id(&self) -> &str {
        self.request_id
    }

    /// Logs an info-level message with request ID.
    ///
    /// Use with `format_args!` for efficient formatting:
    /// ```no_run
    /// # use binding_core::{RequestLog, Secret};
    /// # fn example(log: &RequestLog) {
    /// let password = Secret::new("hunter2");
    /// log.info(format_args!("logging in with {:?}", password));
    /// # }
    /// ```
    pub fn info(&self, args: fmt::Arguments<'_>) {
        tracing::info!(request_id = %self.request_id, "{}", args);
    }

    /// Logs a warning-level message with request ID.
    pub fn warn(&self, args: fmt::Arguments<'_>) {
        tracing::warn!(request_id = %self.request_id, "{}", args);
    }

    /// Logs an error-level message with request ID.
    pub fn error(&self, args: fmt::Arguments<'_>) {
        tracing::error!(request_id = %self.request_id, "{}", args);
    }

    /// Logs a debug-level message with request ID.
    pub fn debug(&self, args: fmt::Arguments<'_>) {
        tracing::debug!(request_id = %self.request_id, "{}", args);
    }

    /// Logs a trace-level message with request ID.
    pub fn trace(&self, args: fmt::Arguments<'_>) {
        tracing::trace!(request_id = %self.request_id, "{}", args);
    }
}
