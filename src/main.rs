//! Wiring & DI. Entry point: open the log sink, bootstrap adapters, inject into services, run the control loop.
//! No business logic here; lifecycle is delegated to ListenerController / RelayApp.

use anyhow::Context;
use sms_relay::adapters::desktop::{
    DesktopNotifier, KeyboardPaste, SystemAutorun, SystemClipboard, SystemLogViewer,
};
use sms_relay::adapters::http::AxumEndpoint;
use sms_relay::adapters::logging::{FileLogSink, init_tracing};
use sms_relay::adapters::memory::{MemoryAutorun, MemoryDesktop, RecordingNotifier};
use sms_relay::adapters::ui::{SignalControl, TuiControl};
use sms_relay::domain::CodeExtractor;
use sms_relay::ports::{
    AutorunPort, ClipboardPort, EndpointPort, LogViewerPort, NotifierPort, PastePort,
};
use sms_relay::shared::config::AppConfig;
use sms_relay::usecases::{DispatchService, ListenerController, RelayApp};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};

/// OS capabilities the services are built from.
struct Desktop {
    notifier: Arc<dyn NotifierPort>,
    clipboard: Arc<dyn ClipboardPort>,
    paste: Arc<dyn PastePort>,
    autorun: Arc<dyn AutorunPort>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let (cfg, cfg_error) = match AppConfig::load() {
        Ok(cfg) => (cfg, None),
        Err(e) => (AppConfig::default(), Some(e)),
    };

    // --- Log sink: the only fatal startup failure; nothing is shown before it opens ---
    let log_path = cfg.log_path_or_default();
    let sink = FileLogSink::open(&log_path)
        .with_context(|| format!("cannot open log file {}", log_path.display()))?;
    let log_guard = sink.guard();
    init_tracing(&sink, cfg.is_headless());

    info!(path = %log_path.display(), version = env!("CARGO_PKG_VERSION"), "relay starting");
    if let Some(e) = cfg_error {
        warn!(error = %e, "configuration not loaded; using defaults");
    }

    let listen_addr = cfg
        .listen_addr()
        .with_context(|| format!("invalid listen address {:?}", cfg.listen_addr))?;
    let app_name = cfg.app_name_or_default().to_string();

    let desktop = build_desktop(&cfg, &app_name);

    // --- Dispatch + HTTP endpoint + lifecycle ---
    let marker = cfg.code_marker_or_default();
    let extractor = CodeExtractor::new(marker).with_context(|| {
        format!("code marker not usable ({} chars)", marker.chars().count())
    })?;
    info!(marker = extractor.marker(), "code extraction marker");
    let dispatcher = Arc::new(DispatchService::new(
        Arc::clone(&desktop.notifier),
        desktop.clipboard,
        desktop.paste,
        extractor,
    ));
    let endpoint: Arc<dyn EndpointPort> =
        Arc::new(AxumEndpoint::new(dispatcher, cfg.shutdown_timeout()));
    let listener = Arc::new(ListenerController::new(endpoint, listen_addr));

    let exe_path = std::env::current_exe().unwrap_or_else(|_| PathBuf::from(&app_name));
    let log_viewer: Arc<dyn LogViewerPort> = Arc::new(SystemLogViewer::new());
    let app = RelayApp::new(
        listener,
        desktop.autorun,
        log_viewer,
        desktop.notifier,
        sink.path().to_path_buf(),
        exe_path,
    );

    if cfg.is_auto_start() {
        app.start_listener().await;
    }

    // --- Run (control surface -> commands -> Quit) ---
    if cfg.is_headless() {
        info!(addr = %listen_addr, "headless mode; Ctrl-C to quit");
        app.run(&SignalControl::new()).await;
    } else {
        sms_relay::adapters::ui::init_ui(&listen_addr.to_string());
        app.run(&TuiControl::new()).await;
    }

    info!("relay exiting");
    log_guard.close().context("flush log file")?;
    Ok(())
}

/// Real desktop adapters, or in-memory recorders in dry-run mode.
fn build_desktop(cfg: &AppConfig, app_name: &str) -> Desktop {
    if cfg.is_dry_run() {
        warn!("dry run: notifications, clipboard, paste and autorun are recorded in memory only");
        let memory = MemoryDesktop::new();
        return Desktop {
            notifier: Arc::new(RecordingNotifier::new()),
            clipboard: Arc::new(memory.clipboard()),
            paste: Arc::new(memory.paste()),
            autorun: Arc::new(MemoryAutorun::new(false)),
        };
    }

    let autorun: Arc<dyn AutorunPort> = match SystemAutorun::for_current_platform(app_name) {
        Ok(a) => Arc::new(a),
        Err(e) => {
            warn!(error = %e, "autorun unavailable; toggle will not persist");
            Arc::new(MemoryAutorun::new(false))
        }
    };
    Desktop {
        notifier: Arc::new(DesktopNotifier::new(app_name, cfg.icon_path())),
        clipboard: Arc::new(SystemClipboard::new()),
        paste: Arc::new(KeyboardPaste::new(cfg.paste_settle())),
        autorun,
    }
}
