//! Wraps the system clipboard. A collaborator of the TUI, not of the core
//! library — the core never links against a clipboard crate.

use tracing::warn;

pub fn copy(text: &str) {
    match arboard::Clipboard::new() {
        Ok(mut clipboard) => {
            if let Err(err) = clipboard.set_text(text) {
                warn!(%err, "failed to set clipboard contents");
            }
        }
        Err(err) => warn!(%err, "failed to open system clipboard"),
    }
}
