//! Operator command loop: reads control-surface commands and drives the
//! listener, autorun toggle and log viewer until Quit.

use crate::domain::{ControlCommand, ControlView, StartOutcome, StopOutcome};
use crate::ports::{AutorunPort, ControlPort, LogViewerPort, NotifierPort};
use crate::usecases::ListenerController;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{error, info, warn};

/// Title for operator-facing notifications (bind failures and the like).
pub const SERVICE_TITLE: &str = "短信服务";

/// Application shell around the listener controller.
pub struct RelayApp {
    listener: Arc<ListenerController>,
    autorun: Arc<dyn AutorunPort>,
    log_viewer: Arc<dyn LogViewerPort>,
    notifier: Arc<dyn NotifierPort>,
    log_path: PathBuf,
    exe_path: PathBuf,
}

impl RelayApp {
    pub fn new(
        listener: Arc<ListenerController>,
        autorun: Arc<dyn AutorunPort>,
        log_viewer: Arc<dyn LogViewerPort>,
        notifier: Arc<dyn NotifierPort>,
        log_path: PathBuf,
        exe_path: PathBuf,
    ) -> Self {
        Self {
            listener,
            autorun,
            log_viewer,
            notifier,
            log_path,
            exe_path,
        }
    }

    pub async fn view(&self) -> ControlView {
        ControlView {
            listener: self.listener.status(),
            autorun_enabled: self.autorun.is_enabled().await,
        }
    }

    /// Run until the control surface says Quit (or fails). The listener is
    /// stopped exactly once on the way out.
    pub async fn run(&self, control: &dyn ControlPort) {
        info!("control loop started");
        loop {
            let view = self.view().await;
            let command = match control.next_command(&view).await {
                Ok(c) => c,
                Err(e) => {
                    warn!(error = %e, "control surface failed; quitting");
                    ControlCommand::Quit
                }
            };
            if command == ControlCommand::Quit {
                break;
            }
            self.handle(command).await;
        }
        self.listener.shutdown().await;
        info!("control loop finished");
    }

    /// Apply a single non-Quit command.
    pub async fn handle(&self, command: ControlCommand) {
        match command {
            ControlCommand::StartListener => self.start_listener().await,
            ControlCommand::StopListener => match self.listener.stop().await {
                Ok(StopOutcome::Stopped) => info!("HTTP listener stopped"),
                Ok(StopOutcome::AlreadyStopped) => {}
                Err(e) => error!(error = %e, "HTTP listener stop failed"),
            },
            ControlCommand::ToggleAutorun => self.toggle_autorun().await,
            ControlCommand::OpenLog => {
                if let Err(e) = self.log_viewer.open(&self.log_path).await {
                    warn!(path = %self.log_path.display(), error = %e, "could not open log");
                }
            }
            ControlCommand::Quit => self.listener.shutdown().await,
        }
    }

    /// Start the listener, telling the operator if the port is unavailable.
    pub async fn start_listener(&self) {
        match self.listener.start().await {
            Ok(StartOutcome::Started(addr)) => info!(addr = %addr, "HTTP listener started"),
            Ok(StartOutcome::AlreadyRunning) => {}
            Err(e) => {
                let body = format!("HTTP 服务启动失败: {}", e);
                if let Err(ne) = self.notifier.notify(SERVICE_TITLE, &body).await {
                    warn!(capability = ne.capability(), error = %ne, "bind failure notification failed");
                }
            }
        }
    }

    async fn toggle_autorun(&self) {
        let enable = !self.autorun.is_enabled().await;
        match self.autorun.set_enabled(enable, &self.exe_path).await {
            Ok(()) if enable => info!(exe = %self.exe_path.display(), "launch at login enabled"),
            Ok(()) => info!("launch at login disabled"),
            Err(e) => warn!(enable, error = %e, "autorun update failed"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::{
        MemoryAutorun, MemoryEndpoint, RecordingLogViewer, RecordingNotifier, ScriptedControl,
    };
    use crate::domain::ListenerStatus;
    use std::net::SocketAddr;

    struct Fixture {
        endpoint: MemoryEndpoint,
        autorun: Arc<MemoryAutorun>,
        viewer: Arc<RecordingLogViewer>,
        notifier: Arc<RecordingNotifier>,
        app: RelayApp,
    }

    fn addr() -> SocketAddr {
        "127.0.0.1:9002".parse().unwrap()
    }

    fn fixture() -> Fixture {
        let endpoint = MemoryEndpoint::new();
        let autorun = Arc::new(MemoryAutorun::new(false));
        let viewer = Arc::new(RecordingLogViewer::new());
        let notifier = Arc::new(RecordingNotifier::new());
        let listener = Arc::new(ListenerController::new(Arc::new(endpoint.clone()), addr()));
        let app = RelayApp::new(
            listener,
            Arc::clone(&autorun) as Arc<dyn AutorunPort>,
            Arc::clone(&viewer) as Arc<dyn LogViewerPort>,
            Arc::clone(&notifier) as Arc<dyn NotifierPort>,
            PathBuf::from("sms-relay.log"),
            PathBuf::from("/opt/sms-relay/sms-relay"),
        );
        Fixture {
            endpoint,
            autorun,
            viewer,
            notifier,
            app,
        }
    }

    #[tokio::test]
    async fn test_run_applies_commands_and_stops_on_quit() {
        let f = fixture();
        let control = ScriptedControl::new([
            ControlCommand::StartListener,
            ControlCommand::StartListener,
            ControlCommand::OpenLog,
            ControlCommand::Quit,
            ControlCommand::StopListener,
        ]);

        f.app.run(&control).await;

        assert_eq!(f.endpoint.total_binds(), 1);
        assert_eq!(f.endpoint.bound_count(), 0);
        assert_eq!(f.viewer.opened(), vec![PathBuf::from("sms-relay.log")]);

        let views = control.views();
        assert_eq!(views.len(), 4);
        assert_eq!(views[0].listener, ListenerStatus::Stopped);
        assert_eq!(views[1].listener, ListenerStatus::Running { addr: addr() });
    }

    #[tokio::test]
    async fn test_toggle_autorun_round_trip() {
        let f = fixture();
        f.app.handle(ControlCommand::ToggleAutorun).await;
        assert!(f.autorun.is_enabled().await);
        assert_eq!(
            f.autorun.exe_path(),
            Some(PathBuf::from("/opt/sms-relay/sms-relay"))
        );
        assert!(f.app.view().await.autorun_enabled);

        f.app.handle(ControlCommand::ToggleAutorun).await;
        assert!(!f.autorun.is_enabled().await);
        assert_eq!(f.autorun.exe_path(), None);
    }

    #[tokio::test]
    async fn test_bind_failure_notifies_operator() {
        let f = fixture();
        f.endpoint.occupy(addr());
        f.app.handle(ControlCommand::StartListener).await;

        assert_eq!(f.app.view().await.listener, ListenerStatus::Stopped);
        let sent = f.notifier.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].title, SERVICE_TITLE);
        assert!(sent[0].body.contains("127.0.0.1:9002"));
    }

    #[tokio::test]
    async fn test_quit_without_start_is_clean() {
        let f = fixture();
        f.app.run(&ScriptedControl::new([])).await;
        assert_eq!(f.endpoint.total_binds(), 0);
    }
}
