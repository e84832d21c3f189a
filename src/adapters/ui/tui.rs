//! Implements ControlPort. Inquire-based operator menu.
//!
//! The menu is rebuilt from the current view on every prompt, so only the
//! transitions valid in the current state are offered.

use crate::domain::{ControlCommand, ControlView, DomainError, ListenerStatus};
use crate::ports::ControlPort;
use async_trait::async_trait;
use inquire::ui::{Color, RenderConfig, Styled};
use inquire::{InquireError, Select};
use std::fmt;

/// Applies the relay's prompt theme for all subsequent inquire prompts.
pub fn apply_theme() {
    let config = RenderConfig::default()
        .with_prompt_prefix(Styled::new("›").with_fg(Color::LightGreen))
        .with_highlighted_option_prefix(Styled::new("➤").with_fg(Color::LightCyan));
    inquire::set_global_render_config(config);
}

/// One menu entry. Display carries the autorun checkbox state.
struct MenuItem {
    command: ControlCommand,
    autorun_enabled: bool,
}

impl fmt::Display for MenuItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.command {
            ControlCommand::ToggleAutorun => {
                let mark = if self.autorun_enabled { "x" } else { " " };
                write!(f, "[{}] Launch at login", mark)
            }
            other => f.write_str(other.label()),
        }
    }
}

fn status_line(view: &ControlView) -> String {
    match view.listener {
        ListenerStatus::Running { addr } => format!("Listener running on {}", addr),
        ListenerStatus::Stopped => "Listener stopped".to_string(),
    }
}

/// TUI adapter. Blocking prompts run on the blocking pool.
pub struct TuiControl;

impl TuiControl {
    pub fn new() -> Self {
        Self
    }
}

impl Default for TuiControl {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ControlPort for TuiControl {
    async fn next_command(&self, view: &ControlView) -> Result<ControlCommand, DomainError> {
        let view = *view;
        tokio::task::spawn_blocking(move || prompt(&view))
            .await
            .map_err(|e| DomainError::Control(format!("prompt task failed: {}", e)))?
    }
}

fn prompt(view: &ControlView) -> Result<ControlCommand, DomainError> {
    let options: Vec<MenuItem> = view
        .available_commands()
        .into_iter()
        .map(|command| MenuItem {
            command,
            autorun_enabled: view.autorun_enabled,
        })
        .collect();
    match Select::new(&status_line(view), options).prompt() {
        Ok(item) => Ok(item.command),
        // Esc / Ctrl-C on the menu means quit.
        Err(InquireError::OperationCanceled | InquireError::OperationInterrupted) => {
            Ok(ControlCommand::Quit)
        }
        Err(e) => Err(DomainError::Control(e.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_autorun_item_shows_checkbox() {
        let on = MenuItem {
            command: ControlCommand::ToggleAutorun,
            autorun_enabled: true,
        };
        let off = MenuItem {
            command: ControlCommand::ToggleAutorun,
            autorun_enabled: false,
        };
        assert_eq!(on.to_string(), "[x] Launch at login");
        assert_eq!(off.to_string(), "[ ] Launch at login");
    }

    #[test]
    fn test_status_line() {
        let view = ControlView {
            listener: ListenerStatus::Running {
                addr: "0.0.0.0:9002".parse().unwrap(),
            },
            autorun_enabled: false,
        };
        assert_eq!(status_line(&view), "Listener running on 0.0.0.0:9002");
    }
}
