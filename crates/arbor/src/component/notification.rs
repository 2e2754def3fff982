//! User-facing notifications attached to components.

use std::error::Error;
use std::fmt;
use std::sync::Arc;

/// How serious a notification is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Severity {
    /// Informational message.
    Info,
    /// Something the user should look at.
    Warn,
    /// Input was rejected.
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Info => f.write_str("info"),
            Self::Warn => f.write_str("warning"),
            Self::Error => f.write_str("error"),
        }
    }
}

/// A message attached to a component for display to the user.
///
/// Two notifications are equal if their severity and message are equal; the
/// cause is not compared.
#[derive(Clone)]
pub struct Notification {
    severity: Severity,
    message: String,
    cause: Option<Arc<dyn Error + Send + Sync>>,
}

impl Notification {
    /// Create a notification.
    pub fn new(severity: Severity, message: impl Into<String>) -> Self {
        Self {
            severity,
            message: message.into(),
            cause: None,
        }
    }

    /// Create an informational notification.
    pub fn info(message: impl Into<String>) -> Self {
        Self::new(Severity::Info, message)
    }

    /// Create a warning notification.
    pub fn warn(message: impl Into<String>) -> Self {
        Self::new(Severity::Warn, message)
    }

    /// Create an error notification.
    pub fn error(message: impl Into<String>) -> Self {
        Self::new(Severity::Error, message)
    }

    /// Create an error notification describing `cause`.
    pub fn from_error<E>(cause: E) -> Self
    where
        E: Error + Send + Sync + 'static,
    {
        Self {
            severity: Severity::Error,
            message: cause.to_string(),
            cause: Some(Arc::new(cause)),
        }
    }

    /// The severity.
    pub fn severity(&self) -> Severity {
        self.severity
    }

    /// The message.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// The error that produced this notification, if any.
    pub fn cause(&self) -> Option<&(dyn Error + Send + Sync + 'static)> {
        self.cause.as_deref()
    }

    /// Whether this is an error notification.
    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

impl PartialEq for Notification {
    fn eq(&self, other: &Self) -> bool {
        self.severity == other.severity && self.message == other.message
    }
}

impl Eq for Notification {}

impl fmt::Debug for Notification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Notification")
            .field("severity", &self.severity)
            .field("message", &self.message)
            .field("has_cause", &self.cause.is_some())
            .finish()
    }
}

impl fmt::Display for Notification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.severity, self.message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ValidationError;

    #[test]
    fn test_from_error_keeps_cause() {
        let notification = Notification::from_error(ValidationError::new("a value is required"));
        assert!(notification.is_error());
        assert_eq!(notification.message(), "a value is required");
        assert!(notification.cause().is_some());
        assert_eq!(notification.to_string(), "error: a value is required");
    }

    #[test]
    fn test_equality_ignores_cause() {
        let with_cause = Notification::from_error(ValidationError::new("bad"));
        assert_eq!(with_cause, Notification::error("bad"));
        assert_ne!(with_cause, Notification::warn("bad"));
    }

    #[test]
    fn test_severity_order() {
        assert!(Severity::Info < Severity::Warn);
        assert!(Severity::Warn < Severity::Error);
    }
}
