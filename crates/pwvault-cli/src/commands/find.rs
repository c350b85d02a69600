//! `pw find`: search entity names across sections.

use clap::Args;

use crate::context::Context;
use crate::render;

/// Find command arguments.
#[derive(Args, Debug)]
pub struct FindArgs {
    /// Case-insensitive substring of the entity name
    pub term: String,
}

/// Run the find command.
pub fn run(ctx: &Context, args: FindArgs) -> anyhow::Result<()> {
    let repo = ctx.repository()?;

    let mut found = 0usize;
    for hit in repo.find_entities(&args.term) {
        render::item(&format!("\"{}\" in section \"{}\"", hit.entity, hit.section));
        found += 1;
    }

    if found == 0 {
        render::not_found(&format!("No entity matches \"{}\"", args.term));
    }
    Ok(())
}
