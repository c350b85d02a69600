//! pwvault command-line interface.

pub mod clipboard;
pub mod commands;
pub mod context;
pub mod logging;
pub mod render;

use clap::{Parser, Subcommand};
use pwvault_core::Config;
use pwvault_store::VaultError;

use crate::context::Context;

/// pw - local secrets vault
#[derive(Parser)]
#[command(name = "pw")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Increase logging verbosity
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Path to config file
    #[arg(short, long, env = pwvault_core::env::vars::PWVAULT_CONFIG)]
    pub config: Option<std::path::PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand)]
pub enum Commands {
    /// Print a decrypted attribute of an entity
    Get(commands::get::GetArgs),

    /// List sections
    Sections,

    /// List the entities in a section
    List {
        /// Section name (defaults to the configured section)
        section: Option<String>,
    },

    /// Create or remove sections
    Section(commands::section::SectionArgs),

    /// Add an entity
    Add(commands::entry::AddArgs),

    /// Set one attribute of an entity
    Update(commands::entry::UpdateArgs),

    /// Remove an entity
    Rm(commands::entry::RmArgs),

    /// Search entity names in every section
    Find(commands::find::FindArgs),

    /// Print a random password
    Gen(commands::generate::GenArgs),

    /// Generate an encryption key
    Keygen(commands::keygen::KeygenArgs),

    /// Encrypt plaintext values left by older tools
    Migrate,

    /// Configuration management
    Config(commands::config::ConfigArgs),
}

/// Run the CLI with the given arguments and loaded configuration.
///
/// A missing section, entity or attribute is reported on stderr and is not
/// a failure.
pub fn run(cli: Cli, config: Config) -> anyhow::Result<()> {
    let ctx = Context::new(config, cli.config);

    let result = match cli.command {
        Commands::Get(args) => commands::get::run(&ctx, args),
        Commands::Sections => commands::section::list_sections(&ctx),
        Commands::List { section } => commands::section::list_entities(&ctx, section.as_deref()),
        Commands::Section(args) => commands::section::run(&ctx, args),
        Commands::Add(args) => commands::entry::run_add(&ctx, args),
        Commands::Update(args) => commands::entry::run_update(&ctx, args),
        Commands::Rm(args) => commands::entry::run_rm(&ctx, args),
        Commands::Find(args) => commands::find::run(&ctx, args),
        Commands::Gen(args) => commands::generate::run(&ctx, args),
        Commands::Keygen(args) => commands::keygen::run(args),
        Commands::Migrate => commands::migrate::run(&ctx),
        Commands::Config(args) => commands::config::run(&ctx, args),
    };

    match result {
        Err(e) if is_not_found(&e) => {
            render::not_found(&e.to_string());
            Ok(())
        }
        other => other,
    }
}

fn is_not_found(error: &anyhow::Error) -> bool {
    error
        .downcast_ref::<VaultError>()
        .map_or(false, VaultError::is_not_found)
}
