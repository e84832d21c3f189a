//! Implements PastePort with enigo key events.
//!
//! Sequence: modifier down, settle, `v` down, settle, `v` up, modifier up.
//! Input injection is synchronous, so it runs on the blocking pool.

use crate::domain::DomainError;
use crate::ports::PastePort;
use enigo::{Direction, Enigo, Key, Keyboard, Settings};
use std::time::Duration;
use tracing::debug;

#[cfg(target_os = "macos")]
const PASTE_MODIFIER: Key = Key::Meta;
#[cfg(not(target_os = "macos"))]
const PASTE_MODIFIER: Key = Key::Control;

/// Simulated Ctrl+V (Cmd+V on macOS) into the focused window.
pub struct KeyboardPaste {
    settle: Duration,
}

impl KeyboardPaste {
    pub fn new(settle: Duration) -> Self {
        Self { settle }
    }
}

#[async_trait::async_trait]
impl PastePort for KeyboardPaste {
    async fn simulate_paste(&self) -> Result<(), DomainError> {
        let settle = self.settle;
        tokio::task::spawn_blocking(move || press_paste_chord(settle))
            .await
            .map_err(|e| DomainError::Paste(format!("paste task failed: {}", e)))?
    }
}

fn press_paste_chord(settle: Duration) -> Result<(), DomainError> {
    let mut enigo = Enigo::new(&Settings::default())
        .map_err(|e| DomainError::Paste(format!("enigo init: {:?}", e)))?;
    let send = |enigo: &mut Enigo, key: Key, direction: Direction| {
        enigo
            .key(key, direction)
            .map_err(|e| DomainError::Paste(format!("{:?} {:?}: {:?}", key, direction, e)))
    };

    send(&mut enigo, PASTE_MODIFIER, Direction::Press)?;
    std::thread::sleep(settle);
    let chord = send(&mut enigo, Key::Unicode('v'), Direction::Press).and_then(|()| {
        std::thread::sleep(settle);
        send(&mut enigo, Key::Unicode('v'), Direction::Release)
    });
    // Always let go of the modifier, even if the letter key failed.
    let released = send(&mut enigo, PASTE_MODIFIER, Direction::Release);
    chord.and(released)?;
    debug!("paste chord sent");
    Ok(())
}
