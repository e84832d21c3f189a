//! Outbound ports. Application calls into the operating system.
//!
//! Implemented by adapters: one real implementation per platform plus
//! in-memory fakes for tests.

use crate::domain::DomainError;
use std::net::SocketAddr;
use std::path::Path;

/// Desktop notification capability.
#[async_trait::async_trait]
pub trait NotifierPort: Send + Sync {
    /// Raise a notification. The adapter supplies app id and icon.
    async fn notify(&self, title: &str, body: &str) -> Result<(), DomainError>;
}

/// System clipboard (text only).
#[async_trait::async_trait]
pub trait ClipboardPort: Send + Sync {
    async fn write_text(&self, value: &str) -> Result<(), DomainError>;
}

/// Keyboard injection: paste into the focused window.
#[async_trait::async_trait]
pub trait PastePort: Send + Sync {
    /// Press and release the paste chord with short settling delays.
    async fn simulate_paste(&self) -> Result<(), DomainError>;
}

/// Launch-at-login preference, stored by the OS.
#[async_trait::async_trait]
pub trait AutorunPort: Send + Sync {
    async fn is_enabled(&self) -> bool;

    /// Register (`enabled = true`) or remove the login entry for `exe_path`.
    async fn set_enabled(&self, enabled: bool, exe_path: &Path) -> Result<(), DomainError>;
}

/// Opens the log file in an external viewer.
#[async_trait::async_trait]
pub trait LogViewerPort: Send + Sync {
    async fn open(&self, path: &Path) -> Result<(), DomainError>;
}

/// Binds the ingestion endpoint. Used by the listener controller.
#[async_trait::async_trait]
pub trait EndpointPort: Send + Sync {
    /// Bind `addr` and start serving on a background task.
    ///
    /// # Errors
    /// `DomainError::Bind` when the address is unavailable; nothing keeps running.
    async fn bind(&self, addr: SocketAddr) -> Result<Box<dyn BoundListener>, DomainError>;
}

/// Ownership token for a bound, serving endpoint. Released exactly once via `shutdown`.
#[async_trait::async_trait]
pub trait BoundListener: Send + Sync {
    fn local_addr(&self) -> SocketAddr;

    /// Stop accepting, release the port, let in-flight requests finish.
    async fn shutdown(self: Box<Self>) -> Result<(), DomainError>;
}
