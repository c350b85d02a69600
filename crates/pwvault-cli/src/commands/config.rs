//! Configuration management commands.

use clap::Args;
use pwvault_core::config::Config;

use crate::context::Context;
use crate::render;

/// Config command arguments.
#[derive(Args, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(clap::Subcommand, Debug)]
pub enum ConfigCommand {
    /// Show the effective configuration
    Show,

    /// Get a configuration value
    Get {
        /// Configuration key (dot-separated path)
        key: String,
    },

    /// Write a default configuration file
    Init {
        /// Force overwrite existing config
        #[arg(short, long)]
        force: bool,
    },

    /// Show configuration file path
    Path,

    /// Validate the configuration file
    Validate,
}

/// Look up a dot-separated key in the serialized configuration.
fn lookup<'a>(json: &'a serde_json::Value, key: &str) -> Option<&'a serde_json::Value> {
    key.split('.').try_fold(json, |value, part| value.get(part))
}

/// Run the config command.
pub fn run(ctx: &Context, args: ConfigArgs) -> anyhow::Result<()> {
    match args.command {
        ConfigCommand::Show => {
            println!("{}", ctx.config().to_json5()?);
        }

        ConfigCommand::Get { key } => {
            let json = serde_json::to_value(ctx.config())?;
            match lookup(&json, &key) {
                Some(value) => println!("{}", serde_json::to_string_pretty(value)?),
                None => anyhow::bail!("Key not found: {}", key),
            }
        }

        ConfigCommand::Init { force } => {
            let path = ctx.config_path()?;

            if path.exists() && !force {
                anyhow::bail!(
                    "Config file already exists: {}. Use --force to overwrite.",
                    path.display()
                );
            }

            Config::default().save(&path)?;
            render::success(&format!("Created config file: {}", path.display()));
        }

        ConfigCommand::Path => {
            println!("{}", ctx.config_path()?.display());
        }

        ConfigCommand::Validate => {
            let path = ctx.config_path()?;
            let config = Config::load(&path)
                .map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))?;
            config
                .validate()
                .map_err(|e| anyhow::anyhow!("Configuration error: {}", e))?;
            render::success("Configuration is valid");
        }
    }

    Ok(())
}
