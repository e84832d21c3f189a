//! Action dispatch: turn an incoming message into desktop side effects.
//!
//! - Copy route: notify with the body, extract the code, copy it, paste it
//! - Plain route: notify with the body (non-empty only)
//! - Every side effect is best-effort; failures are logged and collected,
//!   never returned to the HTTP caller

use crate::domain::{
    CodeExtractor, CollaboratorFailure, DispatchError, DomainError, IncomingMessage, Route,
};
use crate::ports::{ClipboardPort, NotifierPort, PastePort};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{info, warn};

/// Body of the follow-up notification when a copy message carries no code.
pub const CODE_NOT_FOUND: &str = "未找到验证码";

/// Max characters of message content echoed into failure logs.
const PREVIEW_CHARS: usize = 40;

/// Dispatcher. Shared by every request handler.
pub struct DispatchService {
    notifier: Arc<dyn NotifierPort>,
    clipboard: Arc<dyn ClipboardPort>,
    paste: Arc<dyn PastePort>,
    extractor: CodeExtractor,
    /// Held across clipboard write + paste so two dispatches never interleave.
    paste_lock: Mutex<()>,
}

impl DispatchService {
    pub fn new(
        notifier: Arc<dyn NotifierPort>,
        clipboard: Arc<dyn ClipboardPort>,
        paste: Arc<dyn PastePort>,
        extractor: CodeExtractor,
    ) -> Self {
        Self {
            notifier,
            clipboard,
            paste,
            extractor,
            paste_lock: Mutex::new(()),
        }
    }

    /// Dispatch one message. `Err` only lists side effects that failed.
    pub async fn dispatch(&self, message: &IncomingMessage) -> Result<(), DispatchError> {
        let mut failures = Vec::new();
        match message.route {
            Route::Copy => self.dispatch_copy(message, &mut failures).await,
            Route::Plain => self.dispatch_plain(message, &mut failures).await,
        }
        if failures.is_empty() {
            Ok(())
        } else {
            Err(DispatchError {
                route: message.route,
                failures,
            })
        }
    }

    async fn dispatch_copy(
        &self,
        message: &IncomingMessage,
        failures: &mut Vec<CollaboratorFailure>,
    ) {
        let route = message.route;
        info!(route = %route, content = %message.content, "message received");

        let result = self
            .notifier
            .notify(route.notification_title(), &message.content)
            .await;
        record(result, message, failures);

        let extracted = self.extractor.extract(&message.content);
        let Some(code) = extracted.value else {
            info!(route = %route, "no verification code found");
            let result = self
                .notifier
                .notify(route.notification_title(), CODE_NOT_FOUND)
                .await;
            record(result, message, failures);
            return;
        };
        info!(route = %route, code = %code, "verification code extracted");

        let _guard = self.paste_lock.lock().await;
        let written = self.clipboard.write_text(&code).await;
        if written.is_err() {
            // Pasting now would paste whatever was there before.
            record(written, message, failures);
            return;
        }
        match self.paste.simulate_paste().await {
            Ok(()) => info!(route = %route, "paste injected"),
            Err(e) => record(Err(e), message, failures),
        }
    }

    async fn dispatch_plain(
        &self,
        message: &IncomingMessage,
        failures: &mut Vec<CollaboratorFailure>,
    ) {
        if message.is_empty() {
            return;
        }
        info!(route = %message.route, content = %message.content, "message received");
        let result = self
            .notifier
            .notify(message.route.notification_title(), &message.content)
            .await;
        record(result, message, failures);
    }
}

/// Log-and-continue: log a failed side effect with route, content preview and
/// capability, then keep it for the dispatch result.
fn record(
    result: Result<(), DomainError>,
    message: &IncomingMessage,
    failures: &mut Vec<CollaboratorFailure>,
) {
    if let Err(e) = result {
        let capability = e.capability();
        warn!(
            route = %message.route,
            capability,
            content = %preview(&message.content),
            error = %e,
            "side effect failed"
        );
        failures.push(CollaboratorFailure {
            capability,
            message: e.to_string(),
        });
    }
}

/// Single-line preview capped at `PREVIEW_CHARS` characters.
fn preview(text: &str) -> String {
    let mut out: String = text
        .chars()
        .take(PREVIEW_CHARS)
        .map(|c| if c.is_control() { ' ' } else { c })
        .collect();
    if text.chars().count() > PREVIEW_CHARS {
        out.push('…');
    }
    out
}
