//! Terminal output.
//!
//! Requested values and listings go to stdout, or to the clipboard when
//! asked. Everything else (status, warnings, not-found messages) goes to
//! stderr.

use std::io::{self, Write};

use console::style;
use pwvault_core::env::{self, vars};

use crate::clipboard;

/// Disable colours when `NO_COLOR` is set.
pub fn init() {
    if env::get_var(vars::NO_COLOR).is_some() {
        console::set_colors_enabled(false);
        console::set_colors_enabled_stderr(false);
    }
}

/// Write a secret value to stdout, optionally without the trailing newline.
pub fn value(value: &str, newline: bool) -> io::Result<()> {
    let mut out = io::stdout().lock();
    out.write_all(value.as_bytes())?;
    if newline {
        out.write_all(b"\n")?;
    }
    out.flush()
}

/// Copy a secret to the clipboard. Returns `false` after a notice when no
/// clipboard is available, so the caller can print it instead.
pub fn copy(value: &str) -> bool {
    match clipboard::copy(value) {
        Ok(()) => {
            success("Copied to clipboard");
            true
        }
        Err(e) => {
            notice(&format!("Clipboard unavailable: {e}"));
            false
        }
    }
}

/// One line of a listing on stdout.
pub fn item(text: &str) {
    println!("{text}");
}

/// A `name: value` pair on stdout.
pub fn attribute(name: &str, value: &str) {
    println!("{}: {}", style(name).bold(), value);
}

pub fn success(message: &str) {
    eprintln!("{} {}", style("*").green(), message);
}

pub fn notice(message: &str) {
    eprintln!("{} {}", style("!").yellow(), message);
}

pub fn not_found(message: &str) {
    eprintln!("{} {}", style("?").yellow().bold(), message);
}

pub fn hint(message: &str) {
    eprintln!("  {}", style(message).dim());
}
