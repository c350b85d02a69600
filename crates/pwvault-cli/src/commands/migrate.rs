//! `pw migrate`: encrypt plaintext values left by older tools.

use crate::context::Context;
use crate::render;

/// Run the migrate command.
pub fn run(ctx: &Context) -> anyhow::Result<()> {
    let mut repo = ctx.repository()?;
    let cipher = ctx.cipher()?;

    match repo.seal_plaintext(&cipher)? {
        0 => render::notice("No plaintext values found; nothing to do."),
        count => render::success(&format!("Encrypted {count} plaintext value(s)")),
    }
    Ok(())
}
