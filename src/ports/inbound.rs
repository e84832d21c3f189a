//! Inbound port. The operator's control surface drives the application.

use crate::domain::{ControlCommand, ControlView, DomainError};

/// Control surface (terminal menu, signal handler): emits operator commands.
#[async_trait::async_trait]
pub trait ControlPort: Send + Sync {
    /// Wait for the next command. `view` reflects current state for menu enablement.
    async fn next_command(&self, view: &ControlView) -> Result<ControlCommand, DomainError>;
}
