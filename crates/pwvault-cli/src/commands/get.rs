//! `pw get`: read one entity.

use clap::Args;

use crate::context::Context;
use crate::render;

/// Attribute that `--show` masks unless `--reveal` is given.
const MASKED_ATTRIBUTE: &str = "password";

/// Get command arguments.
#[derive(Args, Debug)]
pub struct GetArgs {
    /// Entity name (a search term with --find)
    pub entity: String,

    /// Section to look in
    #[arg(short, long, conflicts_with = "find")]
    pub section: Option<String>,

    /// Attribute to print (defaults to the configured attribute)
    #[arg(short, long, conflicts_with_all = ["keys", "show"])]
    pub key: Option<String>,

    /// List the entity's attribute names
    #[arg(long, conflicts_with = "show")]
    pub keys: bool,

    /// Print every attribute, with the password masked
    #[arg(long)]
    pub show: bool,

    /// Unmask the password in --show output
    #[arg(long, requires = "show")]
    pub reveal: bool,

    /// Treat the entity name as a search term and use the first match
    #[arg(long)]
    pub find: bool,

    /// Do not print a trailing newline after the value
    #[arg(short = 'n', long)]
    pub no_newline: bool,

    /// Copy the value to the clipboard instead of printing it
    #[arg(short = 'C', long, conflicts_with_all = ["keys", "show"])]
    pub copy: bool,
}

/// What `pw get` does, resolved from its flags.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GetAction {
    /// Print attribute names.
    Keys,
    /// Print every attribute.
    Show { reveal: bool },
    /// Print one decrypted attribute.
    Attribute(String),
}

impl GetAction {
    pub fn resolve(args: &GetArgs, default_attribute: &str) -> Self {
        match (args.keys, args.show, &args.key) {
            (true, _, _) => Self::Keys,
            (false, true, _) => Self::Show {
                reveal: args.reveal,
            },
            (false, false, Some(key)) => Self::Attribute(key.clone()),
            (false, false, None) => Self::Attribute(default_attribute.to_string()),
        }
    }
}

/// Run the get command.
pub fn run(ctx: &Context, args: GetArgs) -> anyhow::Result<()> {
    let repo = ctx.repository()?;

    let (section, entity_name) = if args.find {
        match repo.find_entities(&args.entity).next() {
            Some(found) => (found.section, found.entity),
            None => {
                render::not_found(&format!("No entity matches \"{}\"", args.entity));
                return Ok(());
            }
        }
    } else {
        (ctx.section(args.section.as_deref()), args.entity.as_str())
    };

    let entity = repo.get_entity(section, entity_name)?;

    match GetAction::resolve(&args, ctx.default_attribute()) {
        GetAction::Keys => {
            for name in entity.names() {
                render::item(name);
            }
        }
        GetAction::Show { reveal } => {
            // Decrypt everything before printing anything.
            let cipher = ctx.cipher()?;
            let mut lines = Vec::with_capacity(entity.len());
            for (name, value) in entity.iter() {
                let shown = if name == MASKED_ATTRIBUTE && !reveal {
                    None
                } else {
                    Some(cipher.reveal(value)?)
                };
                lines.push((name, shown));
            }

            for (name, shown) in &lines {
                match shown {
                    Some(plaintext) => render::attribute(name, plaintext.expose_secret()),
                    None => render::attribute(name, "sensitive"),
                }
            }
        }
        GetAction::Attribute(attribute) => {
            let value = repo.get_attribute(section, entity_name, &attribute)?;
            let plaintext = ctx.cipher()?.reveal(value)?;
            if !(ctx.copy(args.copy) && render::copy(plaintext.expose_secret())) {
                render::value(plaintext.expose_secret(), !args.no_newline)?;
            }
        }
    }

    Ok(())
}
