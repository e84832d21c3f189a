//! Domain entities. Pure data structures for the relay.
//!
//! No HTTP/OS types here; adapters map into these.

use std::fmt;
use std::net::SocketAddr;

/// Ingestion route. Selects how a message is dispatched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Route {
    /// Code-bearing route: extract, copy and paste.
    Copy,
    /// Notify-only route.
    Plain,
}

impl Route {
    pub fn path(self) -> &'static str {
        match self {
            Route::Copy => "/copy",
            Route::Plain => "/msg",
        }
    }

    /// Desktop notification title for messages arriving on this route.
    pub fn notification_title(self) -> &'static str {
        match self {
            Route::Copy => "手机短信",
            Route::Plain => "手机消息",
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

/// A message received on one of the ingestion routes. Lives for one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IncomingMessage {
    pub route: Route,
    pub content: String,
}

impl IncomingMessage {
    pub fn new(route: Route, content: impl Into<String>) -> Self {
        Self {
            route,
            content: content.into(),
        }
    }

    /// Only the empty string is empty; whitespace is still content.
    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }
}

/// Result of running the extraction rule over a message body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedCode {
    pub raw: String,
    pub value: Option<String>,
}

impl ExtractedCode {
    pub fn is_found(&self) -> bool {
        self.value.is_some()
    }
}

/// Read-only view of the listener state for the control surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListenerStatus {
    Stopped,
    Running { addr: SocketAddr },
}

impl ListenerStatus {
    pub fn is_running(&self) -> bool {
        matches!(self, ListenerStatus::Running { .. })
    }
}

/// Outcome of a start request. A no-op start is not an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartOutcome {
    Started(SocketAddr),
    AlreadyRunning,
}

/// Outcome of a stop request. A no-op stop is not an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopOutcome {
    Stopped,
    AlreadyStopped,
}

/// Discrete commands emitted by the operator-facing control surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlCommand {
    StartListener,
    StopListener,
    ToggleAutorun,
    OpenLog,
    Quit,
}

impl ControlCommand {
    pub fn label(self) -> &'static str {
        match self {
            ControlCommand::StartListener => "Start listener",
            ControlCommand::StopListener => "Stop listener",
            ControlCommand::ToggleAutorun => "Toggle launch at login",
            ControlCommand::OpenLog => "Open log",
            ControlCommand::Quit => "Quit",
        }
    }
}

/// Snapshot handed to the control surface before each prompt (menu enablement).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ControlView {
    pub listener: ListenerStatus,
    pub autorun_enabled: bool,
}

impl ControlView {
    /// Commands that make sense in this state, in menu order.
    pub fn available_commands(&self) -> Vec<ControlCommand> {
        let toggle = if self.listener.is_running() {
            ControlCommand::StopListener
        } else {
            ControlCommand::StartListener
        };
        vec![
            toggle,
            ControlCommand::ToggleAutorun,
            ControlCommand::OpenLog,
            ControlCommand::Quit,
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_route_paths() {
        assert_eq!(Route::Copy.path(), "/copy");
        assert_eq!(Route::Plain.path(), "/msg");
        assert_eq!(Route::Copy.to_string(), "/copy");
    }

    #[test]
    fn test_whitespace_is_content() {
        assert!(IncomingMessage::new(Route::Plain, "").is_empty());
        assert!(!IncomingMessage::new(Route::Plain, " ").is_empty());
    }

    #[test]
    fn test_menu_offers_start_only_when_stopped() {
        let stopped = ControlView {
            listener: ListenerStatus::Stopped,
            autorun_enabled: false,
        };
        let cmds = stopped.available_commands();
        assert!(cmds.contains(&ControlCommand::StartListener));
        assert!(!cmds.contains(&ControlCommand::StopListener));

        let running = ControlView {
            listener: ListenerStatus::Running {
                addr: "127.0.0.1:9002".parse().unwrap(),
            },
            autorun_enabled: true,
        };
        let cmds = running.available_commands();
        assert!(cmds.contains(&ControlCommand::StopListener));
        assert!(!cmds.contains(&ControlCommand::StartListener));
        assert_eq!(cmds.last(), Some(&ControlCommand::Quit));
    }
}
