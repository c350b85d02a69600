//! `pw add`, `pw update` and `pw rm`: write entities.

use clap::Args;
use pwvault_core::SecretString;
use pwvault_store::model::PASSWORD_ATTRIBUTE;
use pwvault_store::{Entity, PasswordPolicy, Upsert};

use crate::context::Context;
use crate::render;

/// Add command arguments.
#[derive(Args, Debug)]
pub struct AddArgs {
    /// Entity name
    pub entity: String,

    /// Section to add to (created if missing)
    #[arg(short, long)]
    pub section: Option<String>,

    /// Password to store (visible in shell history; prefer --prompt)
    #[arg(long, conflicts_with = "prompt")]
    pub password: Option<String>,

    /// Read the password from the terminal
    #[arg(long)]
    pub prompt: bool,

    /// Username attribute
    #[arg(short, long)]
    pub username: Option<String>,

    /// Website attribute
    #[arg(short, long)]
    pub website: Option<String>,

    /// Extra attribute as key=value (repeatable)
    #[arg(short, long = "attr", value_parser = parse_key_val)]
    pub attrs: Vec<(String, String)>,

    /// Length of the generated password
    #[arg(short, long, conflicts_with_all = ["password", "prompt"])]
    pub length: Option<usize>,

    /// Generate the password without punctuation
    #[arg(long, conflicts_with_all = ["password", "prompt"])]
    pub no_special: bool,

    /// Replace the entity if it already exists
    #[arg(long)]
    pub overwrite: bool,

    /// Copy the password to the clipboard instead of printing it
    #[arg(short = 'C', long)]
    pub copy: bool,
}

/// Update command arguments.
#[derive(Args, Debug)]
pub struct UpdateArgs {
    /// Entity name
    pub entity: String,

    /// Attribute to set, as key=value
    #[arg(value_parser = parse_key_val)]
    pub assignment: (String, String),

    /// Section holding the entity
    #[arg(short, long)]
    pub section: Option<String>,
}

/// Remove command arguments.
#[derive(Args, Debug)]
pub struct RmArgs {
    /// Entity name
    pub entity: String,

    /// Section holding the entity
    #[arg(short, long)]
    pub section: Option<String>,
}

/// Attributes `pw add` sets through their own flags.
const FLAGGED_ATTRIBUTES: [&str; 3] = [PASSWORD_ATTRIBUTE, "username", "website"];

/// Reject `--attr` names that have their own flag or are given twice.
pub fn check_extra_attributes(attrs: &[(String, String)]) -> anyhow::Result<()> {
    for (i, (key, _)) in attrs.iter().enumerate() {
        if FLAGGED_ATTRIBUTES.contains(&key.as_str()) {
            anyhow::bail!("\"{key}\" has its own flag, use --{key} instead of --attr");
        }
        if attrs[..i].iter().any(|(earlier, _)| earlier == key) {
            anyhow::bail!("Attribute \"{key}\" given more than once");
        }
    }
    Ok(())
}

/// Parse a `key=value` argument. The value may contain `=`.
pub fn parse_key_val(s: &str) -> Result<(String, String), String> {
    let (key, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected key=value, got `{s}`"))?;
    if key.trim().is_empty() {
        return Err("attribute name must not be empty".to_string());
    }
    Ok((key.to_string(), value.to_string()))
}

/// Where the password for a new entity comes from.
#[derive(Debug, PartialEq, Eq)]
pub enum PasswordSource {
    /// Given on the command line.
    Given(SecretString),
    /// Read from the terminal without echo.
    Prompt,
    /// Generated under the policy and printed once.
    Generate(PasswordPolicy),
}

impl PasswordSource {
    pub fn resolve(args: &AddArgs, policy: PasswordPolicy) -> Self {
        match (&args.password, args.prompt) {
            (Some(password), _) => Self::Given(SecretString::new(password.as_str())),
            (None, true) => Self::Prompt,
            (None, false) => {
                let mut policy = policy;
                if let Some(length) = args.length {
                    policy = policy.with_length(length);
                }
                if args.no_special {
                    policy = policy.without_special_characters();
                }
                Self::Generate(policy)
            }
        }
    }

    /// The password, and whether it was generated.
    pub fn obtain(self) -> anyhow::Result<(SecretString, bool)> {
        match self {
            Self::Given(password) => Ok((password, false)),
            Self::Prompt => Ok((prompt_password()?, false)),
            Self::Generate(policy) => Ok((policy.generate()?, true)),
        }
    }
}

fn prompt_password() -> anyhow::Result<SecretString> {
    let password = SecretString::new(
        rpassword::prompt_password("Password: ")
            .map_err(|e| anyhow::anyhow!("Failed to read password: {}", e))?,
    );
    if password.is_empty() {
        anyhow::bail!("Password must not be empty");
    }

    let confirm = SecretString::new(
        rpassword::prompt_password("Confirm password: ")
            .map_err(|e| anyhow::anyhow!("Failed to read password: {}", e))?,
    );
    if password != confirm {
        anyhow::bail!("Passwords do not match");
    }
    Ok(password)
}

/// Run the add command.
pub fn run_add(ctx: &Context, args: AddArgs) -> anyhow::Result<()> {
    check_extra_attributes(&args.attrs)?;
    let mut repo = ctx.repository()?;
    let cipher = ctx.cipher()?;
    let section = ctx.section(args.section.as_deref());

    // Skip the prompt when the upsert would be refused anyway.
    if !args.overwrite && repo.vault().contains_entity(section, &args.entity) {
        report_conflict(section, &args.entity);
        return Ok(());
    }

    let (password, generated) =
        PasswordSource::resolve(&args, ctx.password_policy()).obtain()?;

    let mut entity = Entity::new();
    entity.insert(PASSWORD_ATTRIBUTE, cipher.seal(password.expose_secret())?);
    if let Some(username) = &args.username {
        entity.insert("username", cipher.seal(username)?);
    }
    if let Some(website) = &args.website {
        entity.insert("website", cipher.seal(website)?);
    }
    for (key, value) in &args.attrs {
        entity.insert(key.as_str(), cipher.seal(value)?);
    }

    match repo.upsert_entity(section, &args.entity, entity, args.overwrite)? {
        Upsert::Conflict => report_conflict(section, &args.entity),
        outcome => {
            let verb = if outcome == Upsert::Replaced { "Replaced" } else { "Added" };
            render::success(&format!("{verb} \"{}\" in section \"{section}\"", args.entity));
            let copied = ctx.copy(args.copy) && render::copy(password.expose_secret());
            if generated && !copied {
                render::value(password.expose_secret(), true)?;
            }
        }
    }

    Ok(())
}

fn report_conflict(section: &str, entity: &str) {
    render::notice(&format!("\"{entity}\" already exists in section \"{section}\""));
    render::hint("Use --overwrite to replace it.");
}

/// Run the update command.
pub fn run_update(ctx: &Context, args: UpdateArgs) -> anyhow::Result<()> {
    let mut repo = ctx.repository()?;
    let section = ctx.section(args.section.as_deref());
    let (key, value) = &args.assignment;

    // Report a missing entity before asking for the key.
    repo.get_entity(section, &args.entity)?;
    let sealed = ctx.cipher()?.seal(value)?;
    repo.update_attribute(section, &args.entity, key, sealed)?;

    render::success(&format!("Updated \"{key}\" of \"{}\"", args.entity));
    Ok(())
}

/// Run the remove command.
pub fn run_rm(ctx: &Context, args: RmArgs) -> anyhow::Result<()> {
    let mut repo = ctx.repository()?;
    let section = ctx.section(args.section.as_deref());
    repo.remove_entity(section, &args.entity)?;

    render::success(&format!("Removed \"{}\" from section \"{section}\"", args.entity));
    Ok(())
}
