//! Implements ControlPort without a terminal menu: start once, quit on Ctrl-C.

use crate::domain::{ControlCommand, ControlView, DomainError};
use crate::ports::ControlPort;
use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{info, warn};

/// Headless control surface for service-style runs.
#[derive(Default)]
pub struct SignalControl {
    started: AtomicBool,
}

impl SignalControl {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ControlPort for SignalControl {
    async fn next_command(&self, view: &ControlView) -> Result<ControlCommand, DomainError> {
        if !self.started.swap(true, Ordering::SeqCst) {
            return Ok(ControlCommand::StartListener);
        }
        if !view.listener.is_running() {
            warn!("listener is not running; nothing to wait for");
            return Ok(ControlCommand::Quit);
        }
        tokio::signal::ctrl_c()
            .await
            .map_err(|e| DomainError::Control(format!("wait for Ctrl-C: {}", e)))?;
        info!("interrupt received");
        Ok(ControlCommand::Quit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ListenerStatus;

    #[tokio::test]
    async fn test_starts_then_quits_when_start_failed() {
        let control = SignalControl::new();
        let stopped = ControlView {
            listener: ListenerStatus::Stopped,
            autorun_enabled: false,
        };
        assert_eq!(
            control.next_command(&stopped).await.unwrap(),
            ControlCommand::StartListener
        );
        assert_eq!(
            control.next_command(&stopped).await.unwrap(),
            ControlCommand::Quit
        );
    }
}
