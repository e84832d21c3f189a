//! Implements ClipboardPort with arboard.
//!
//! The clipboard handle is created and kept on one dedicated thread for the
//! life of the process: on X11/Wayland the owner serves the contents, so
//! dropping the handle after each write would empty the clipboard before the
//! paste lands. Writes are sent to that thread over a channel.

use crate::domain::DomainError;
use crate::ports::ClipboardPort;
use arboard::Clipboard;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, warn};

struct WriteRequest {
    text: String,
    reply: oneshot::Sender<Result<(), DomainError>>,
}

/// System clipboard (text).
pub struct SystemClipboard {
    tx: mpsc::UnboundedSender<WriteRequest>,
}

impl SystemClipboard {
    /// Spawn the clipboard owner thread. The handle itself is opened lazily.
    pub fn new() -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        let spawned = std::thread::Builder::new()
            .name("clipboard".into())
            .spawn(move || owner_loop(rx));
        if let Err(e) = spawned {
            // Writes will fail with "clipboard thread gone".
            warn!(error = %e, "could not start clipboard thread");
        }
        Self { tx }
    }
}

impl Default for SystemClipboard {
    fn default() -> Self {
        Self::new()
    }
}

fn owner_loop(mut rx: mpsc::UnboundedReceiver<WriteRequest>) {
    let mut clipboard: Option<Clipboard> = None;
    while let Some(request) = rx.blocking_recv() {
        let result = write_with(&mut clipboard, request.text);
        let _ = request.reply.send(result);
    }
}

fn write_with(slot: &mut Option<Clipboard>, text: String) -> Result<(), DomainError> {
    if slot.is_none() {
        *slot = Some(Clipboard::new().map_err(|e| DomainError::Clipboard(e.to_string()))?);
    }
    let Some(clipboard) = slot.as_mut() else {
        return Err(DomainError::Clipboard("clipboard unavailable".into()));
    };
    if let Err(e) = clipboard.set_text(text) {
        // Handle may be stale (display reconnect); reopen on the next write.
        *slot = None;
        return Err(DomainError::Clipboard(e.to_string()));
    }
    debug!("clipboard written");
    Ok(())
}

#[async_trait::async_trait]
impl ClipboardPort for SystemClipboard {
    async fn write_text(&self, value: &str) -> Result<(), DomainError> {
        let (reply, rx) = oneshot::channel();
        self.tx
            .send(WriteRequest {
                text: value.to_string(),
                reply,
            })
            .map_err(|_| DomainError::Clipboard("clipboard thread gone".into()))?;
        rx.await
            .map_err(|_| DomainError::Clipboard("clipboard thread dropped the request".into()))?
    }
}
