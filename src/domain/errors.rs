//! Domain errors. Used by ports and use cases.
//!
//! Adapters map infrastructure errors into these.

use crate::domain::Route;
use std::fmt;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DomainError {
    /// Listen address unavailable (e.g. port in use). Listener stays stopped.
    #[error("Bind failed on {addr}: {reason}")]
    Bind { addr: String, reason: String },

    #[error("Listener error: {0}")]
    Listener(String),

    #[error("Notification failed: {0}")]
    Notification(String),

    #[error("Clipboard write failed: {0}")]
    Clipboard(String),

    #[error("Paste injection failed: {0}")]
    Paste(String),

    #[error("Autorun error: {0}")]
    Autorun(String),

    #[error("Log viewer error: {0}")]
    LogViewer(String),

    #[error("Control surface error: {0}")]
    Control(String),
}

impl DomainError {
    /// Name of the capability that produced this error, for diagnostics.
    pub fn capability(&self) -> &'static str {
        match self {
            DomainError::Bind { .. } | DomainError::Listener(_) => "listener",
            DomainError::Notification(_) => "notification",
            DomainError::Clipboard(_) => "clipboard",
            DomainError::Paste(_) => "paste",
            DomainError::Autorun(_) => "autorun",
            DomainError::LogViewer(_) => "log_viewer",
            DomainError::Control(_) => "control",
        }
    }
}

/// One failed side effect inside a dispatch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollaboratorFailure {
    pub capability: &'static str,
    pub message: String,
}

impl fmt::Display for CollaboratorFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.capability, self.message)
    }
}

/// Dispatch finished but at least one best-effort side effect failed.
/// Never surfaced to the HTTP caller.
#[derive(Error, Debug)]
#[error("dispatch on {route} had {} failed side effect(s): {}", .failures.len(), join_failures(.failures))]
pub struct DispatchError {
    pub route: Route,
    pub failures: Vec<CollaboratorFailure>,
}

impl DispatchError {
    pub fn failed(&self, capability: &str) -> bool {
        self.failures.iter().any(|f| f.capability == capability)
    }
}

fn join_failures(failures: &[CollaboratorFailure]) -> String {
    failures
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capability_names() {
        assert_eq!(DomainError::Clipboard("x".into()).capability(), "clipboard");
        assert_eq!(
            DomainError::Bind {
                addr: "0.0.0.0:9002".into(),
                reason: "in use".into()
            }
            .capability(),
            "listener"
        );
    }

    #[test]
    fn test_dispatch_error_display() {
        let err = DispatchError {
            route: Route::Copy,
            failures: vec![
                CollaboratorFailure {
                    capability: "notification",
                    message: "no daemon".into(),
                },
                CollaboratorFailure {
                    capability: "paste",
                    message: "no display".into(),
                },
            ],
        };
        let text = err.to_string();
        assert!(text.contains("/copy"));
        assert!(text.contains("2 failed"));
        assert!(text.contains("paste: no display"));
        assert!(err.failed("notification"));
        assert!(!err.failed("clipboard"));
    }
}
