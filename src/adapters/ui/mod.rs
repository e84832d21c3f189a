pub mod banner;
pub mod headless;
pub mod tui;

pub use headless::SignalControl;
pub use tui::TuiControl;

/// Prints the welcome banner and applies the theme for all subsequent inquire prompts.
/// Call once at startup, before the first prompt.
pub fn init_ui(listen_addr: &str) {
    banner::print_welcome(listen_addr);
    tui::apply_theme();
}
