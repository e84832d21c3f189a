//! In-memory adapters for testing and dry runs.
//!
//! Record every call instead of touching the OS. Each fake can be switched
//! into a failing mode to exercise the log-and-continue paths.

use crate::domain::{ControlCommand, ControlView, DomainError};
use crate::ports::{
    AutorunPort, BoundListener, ClipboardPort, ControlPort, EndpointPort, LogViewerPort,
    NotifierPort, PastePort,
};
use std::collections::{HashSet, VecDeque};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tracing::info;

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// A notification as raised by the dispatcher.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentNotification {
    pub title: String,
    pub body: String,
}

/// Notifier that records instead of showing anything.
#[derive(Default)]
pub struct RecordingNotifier {
    sent: Mutex<Vec<SentNotification>>,
    fail: AtomicBool,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every call fails (after nothing is recorded).
    pub fn failing() -> Self {
        let n = Self::default();
        n.fail.store(true, Ordering::SeqCst);
        n
    }

    pub fn sent(&self) -> Vec<SentNotification> {
        lock(&self.sent).clone()
    }

    pub fn count_with_body(&self, body: &str) -> usize {
        lock(&self.sent).iter().filter(|n| n.body == body).count()
    }
}

#[async_trait::async_trait]
impl NotifierPort for RecordingNotifier {
    async fn notify(&self, title: &str, body: &str) -> Result<(), DomainError> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(DomainError::Notification("notifier unavailable".into()));
        }
        info!(title, body, "[MEMORY] notification");
        lock(&self.sent).push(SentNotification {
            title: title.to_string(),
            body: body.to_string(),
        });
        Ok(())
    }
}

/// Clipboard and keyboard events in the order they happened.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DesktopEvent {
    ClipboardWrite(String),
    /// Paste performed; carries the clipboard value at that moment.
    Paste(Option<String>),
}

#[derive(Default)]
struct DesktopState {
    clipboard: Option<String>,
    events: Vec<DesktopEvent>,
}

/// Shared clipboard + keyboard. Hand out `clipboard()` and `paste()` ports.
#[derive(Clone, Default)]
pub struct MemoryDesktop {
    state: Arc<Mutex<DesktopState>>,
    paste_delay: Duration,
    clipboard_fails: Arc<AtomicBool>,
    paste_fails: Arc<AtomicBool>,
}

impl MemoryDesktop {
    pub fn new() -> Self {
        Self::default()
    }

    /// Paste sleeps this long between reading the clipboard and reporting done,
    /// which leaves room for other tasks to run mid-sequence.
    pub fn with_paste_delay(mut self, delay: Duration) -> Self {
        self.paste_delay = delay;
        self
    }

    pub fn fail_clipboard(&self, fail: bool) {
        self.clipboard_fails.store(fail, Ordering::SeqCst);
    }

    pub fn fail_paste(&self, fail: bool) {
        self.paste_fails.store(fail, Ordering::SeqCst);
    }

    pub fn clipboard(&self) -> MemoryClipboard {
        MemoryClipboard {
            desktop: self.clone(),
        }
    }

    pub fn paste(&self) -> MemoryPaste {
        MemoryPaste {
            desktop: self.clone(),
        }
    }

    pub fn clipboard_value(&self) -> Option<String> {
        lock(&self.state).clipboard.clone()
    }

    pub fn events(&self) -> Vec<DesktopEvent> {
        lock(&self.state).events.clone()
    }

    pub fn paste_count(&self) -> usize {
        lock(&self.state)
            .events
            .iter()
            .filter(|e| matches!(e, DesktopEvent::Paste(_)))
            .count()
    }
}

pub struct MemoryClipboard {
    desktop: MemoryDesktop,
}

#[async_trait::async_trait]
impl ClipboardPort for MemoryClipboard {
    async fn write_text(&self, value: &str) -> Result<(), DomainError> {
        if self.desktop.clipboard_fails.load(Ordering::SeqCst) {
            return Err(DomainError::Clipboard("clipboard locked".into()));
        }
        // Let another task observe the write before the paste follows.
        tokio::task::yield_now().await;
        let mut state = lock(&self.desktop.state);
        state.clipboard = Some(value.to_string());
        state
            .events
            .push(DesktopEvent::ClipboardWrite(value.to_string()));
        Ok(())
    }
}

pub struct MemoryPaste {
    desktop: MemoryDesktop,
}

#[async_trait::async_trait]
impl PastePort for MemoryPaste {
    async fn simulate_paste(&self) -> Result<(), DomainError> {
        if self.desktop.paste_fails.load(Ordering::SeqCst) {
            return Err(DomainError::Paste("input injection denied".into()));
        }
        tokio::time::sleep(self.desktop.paste_delay).await;
        let mut state = lock(&self.desktop.state);
        let pasted = state.clipboard.clone();
        state.events.push(DesktopEvent::Paste(pasted));
        Ok(())
    }
}

/// Launch-at-login flag held in memory.
#[derive(Default)]
pub struct MemoryAutorun {
    enabled: AtomicBool,
    exe_path: Mutex<Option<PathBuf>>,
}

impl MemoryAutorun {
    pub fn new(enabled: bool) -> Self {
        Self {
            enabled: AtomicBool::new(enabled),
            exe_path: Mutex::new(None),
        }
    }

    pub fn exe_path(&self) -> Option<PathBuf> {
        lock(&self.exe_path).clone()
    }
}

#[async_trait::async_trait]
impl AutorunPort for MemoryAutorun {
    async fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::SeqCst)
    }

    async fn set_enabled(&self, enabled: bool, exe_path: &Path) -> Result<(), DomainError> {
        self.enabled.store(enabled, Ordering::SeqCst);
        *lock(&self.exe_path) = enabled.then(|| exe_path.to_path_buf());
        Ok(())
    }
}

/// Log viewer that only records which files it was asked to open.
#[derive(Default)]
pub struct RecordingLogViewer {
    opened: Mutex<Vec<PathBuf>>,
}

impl RecordingLogViewer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn opened(&self) -> Vec<PathBuf> {
        lock(&self.opened).clone()
    }
}

#[async_trait::async_trait]
impl LogViewerPort for RecordingLogViewer {
    async fn open(&self, path: &Path) -> Result<(), DomainError> {
        lock(&self.opened).push(path.to_path_buf());
        Ok(())
    }
}

/// Control surface that replays a fixed script, then quits.
#[derive(Default)]
pub struct ScriptedControl {
    commands: Mutex<VecDeque<ControlCommand>>,
    views: Mutex<Vec<ControlView>>,
}

impl ScriptedControl {
    pub fn new(commands: impl IntoIterator<Item = ControlCommand>) -> Self {
        Self {
            commands: Mutex::new(commands.into_iter().collect()),
            views: Mutex::new(Vec::new()),
        }
    }

    /// The views seen before each command, in order.
    pub fn views(&self) -> Vec<ControlView> {
        lock(&self.views).clone()
    }
}

#[async_trait::async_trait]
impl ControlPort for ScriptedControl {
    async fn next_command(&self, view: &ControlView) -> Result<ControlCommand, DomainError> {
        lock(&self.views).push(*view);
        Ok(lock(&self.commands)
            .pop_front()
            .unwrap_or(ControlCommand::Quit))
    }
}

/// Endpoint that "binds" addresses in a shared set. A second bind of the same
/// address fails, as an exclusive port would.
#[derive(Clone, Default)]
pub struct MemoryEndpoint {
    bound: Arc<Mutex<HashSet<SocketAddr>>>,
    binds: Arc<AtomicUsize>,
    shutdown_delay: Duration,
}

impl MemoryEndpoint {
    pub fn new() -> Self {
        Self::default()
    }

    /// Listeners take this long to shut down, like a server draining requests.
    pub fn with_shutdown_delay(mut self, delay: Duration) -> Self {
        self.shutdown_delay = delay;
        self
    }

    /// Mark `addr` as taken by someone else.
    pub fn occupy(&self, addr: SocketAddr) {
        lock(&self.bound).insert(addr);
    }

    pub fn bound_count(&self) -> usize {
        lock(&self.bound).len()
    }

    /// Successful binds over the endpoint's lifetime.
    pub fn total_binds(&self) -> usize {
        self.binds.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl EndpointPort for MemoryEndpoint {
    async fn bind(&self, addr: SocketAddr) -> Result<Box<dyn BoundListener>, DomainError> {
        if !lock(&self.bound).insert(addr) {
            return Err(DomainError::Bind {
                addr: addr.to_string(),
                reason: "address already in use".into(),
            });
        }
        self.binds.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(MemoryListener {
            addr,
            bound: Arc::clone(&self.bound),
            shutdown_delay: self.shutdown_delay,
        }))
    }
}

struct MemoryListener {
    addr: SocketAddr,
    bound: Arc<Mutex<HashSet<SocketAddr>>>,
    shutdown_delay: Duration,
}

#[async_trait::async_trait]
impl BoundListener for MemoryListener {
    fn local_addr(&self) -> SocketAddr {
        self.addr
    }

    async fn shutdown(self: Box<Self>) -> Result<(), DomainError> {
        if !self.shutdown_delay.is_zero() {
            tokio::time::sleep(self.shutdown_delay).await;
        }
        lock(&self.bound).remove(&self.addr);
        Ok(())
    }
}
