//! System clipboard.

use arboard::Clipboard;
use tracing::debug;

/// Put `text` on the clipboard.
///
/// Fails when no clipboard is reachable (no display server, SSH session).
/// On X11 the contents outlive the process only if a clipboard manager
/// takes them over.
pub fn copy(text: &str) -> Result<(), arboard::Error> {
    let mut clipboard = Clipboard::new()?;
    clipboard.set_text(text)?;
    debug!(chars = text.chars().count(), "copied value to clipboard");
    Ok(())
}
