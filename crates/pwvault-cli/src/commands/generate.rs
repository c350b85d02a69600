//! `pw gen`: print a random password.

use clap::Args;

use crate::context::Context;
use crate::render;

/// Gen command arguments.
#[derive(Args, Debug)]
pub struct GenArgs {
    /// Number of characters (defaults to generator.length)
    #[arg(short, long)]
    pub length: Option<usize>,

    /// Letters and digits only
    #[arg(long)]
    pub no_special: bool,

    /// Do not print a trailing newline
    #[arg(short = 'n', long)]
    pub no_newline: bool,

    /// Copy the password to the clipboard instead of printing it
    #[arg(short = 'C', long)]
    pub copy: bool,
}

/// Run the gen command.
pub fn run(ctx: &Context, args: GenArgs) -> anyhow::Result<()> {
    let mut policy = ctx.password_policy();
    if let Some(length) = args.length {
        policy = policy.with_length(length);
    }
    if args.no_special {
        policy = policy.without_special_characters();
    }

    let password = policy.generate()?;
    if !(ctx.copy(args.copy) && render::copy(password.expose_secret())) {
        render::value(password.expose_secret(), !args.no_newline)?;
    }
    Ok(())
}
