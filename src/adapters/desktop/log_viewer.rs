//! Implements LogViewerPort: open the log in the platform's default viewer.

use crate::domain::DomainError;
use crate::ports::LogViewerPort;
use std::path::Path;
use tokio::process::Command;
use tracing::info;

pub struct SystemLogViewer;

impl SystemLogViewer {
    pub fn new() -> Self {
        Self
    }
}

impl Default for SystemLogViewer {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl LogViewerPort for SystemLogViewer {
    async fn open(&self, path: &Path) -> Result<(), DomainError> {
        let mut cmd = if cfg!(target_os = "windows") {
            Command::new("notepad.exe")
        } else if cfg!(target_os = "macos") {
            let mut c = Command::new("open");
            c.arg("-t");
            c
        } else {
            Command::new("xdg-open")
        };
        // Detached: the viewer outlives this call.
        cmd.arg(path)
            .spawn()
            .map_err(|e| DomainError::LogViewer(format!("open {}: {}", path.display(), e)))?;
        info!(path = %path.display(), "log viewer opened");
        Ok(())
    }
}
