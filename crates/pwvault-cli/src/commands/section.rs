//! Section management and listings.

use clap::Args;

use crate::context::Context;
use crate::render;

/// Section command arguments.
#[derive(Args, Debug)]
pub struct SectionArgs {
    #[command(subcommand)]
    pub command: SectionCommand,
}

#[derive(clap::Subcommand, Debug)]
pub enum SectionCommand {
    /// Create an empty section
    Create {
        /// Section name
        name: String,
    },

    /// Remove a section and every entity in it
    Rm {
        /// Section name
        name: String,
    },
}

/// Run the section command.
pub fn run(ctx: &Context, args: SectionArgs) -> anyhow::Result<()> {
    let mut repo = ctx.repository()?;

    match args.command {
        SectionCommand::Create { name } => {
            if repo.create_section(&name)? {
                render::success(&format!("Created section \"{name}\""));
            } else {
                render::notice(&format!("Section \"{name}\" already exists"));
            }
        }

        SectionCommand::Rm { name } => {
            repo.remove_section(&name)?;
            render::success(&format!("Removed section \"{name}\""));
        }
    }

    Ok(())
}

/// `pw sections`
pub fn list_sections(ctx: &Context) -> anyhow::Result<()> {
    let repo = ctx.repository()?;
    let sections = repo.list_sections();
    if sections.is_empty() {
        render::notice("No sections yet.");
    }
    for name in sections {
        render::item(name);
    }
    Ok(())
}

/// `pw list [section]`
pub fn list_entities(ctx: &Context, section: Option<&str>) -> anyhow::Result<()> {
    let repo = ctx.repository()?;
    let section = ctx.section(section);
    for name in repo.list_entities(section)? {
        render::item(name);
    }
    Ok(())
}
