//! Real OS capabilities: clipboard, key injection, notifications, autorun, log viewer.

pub mod autorun;
pub mod clipboard;
pub mod log_viewer;
pub mod notifier;
pub mod paste;

pub use autorun::SystemAutorun;
pub use clipboard::SystemClipboard;
pub use log_viewer::SystemLogViewer;
pub use notifier::DesktopNotifier;
pub use paste::KeyboardPaste;
