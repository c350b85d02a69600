//! `pw keygen`: create a master key.

use std::path::PathBuf;

use clap::Args;
use pwvault_core::paths;
use pwvault_store::{crypto, keysource};

use crate::render;

/// Keygen command arguments.
#[derive(Args, Debug)]
pub struct KeygenArgs {
    /// Write the key to this file (mode 0600) instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Replace an existing key file
    #[arg(short, long, requires = "output")]
    pub force: bool,
}

/// Run the keygen command.
pub fn run(args: KeygenArgs) -> anyhow::Result<()> {
    let key = crypto::generate_key();

    match args.output {
        Some(path) => {
            let path = paths::expand_path(&path);
            if path.exists() && !args.force {
                anyhow::bail!(
                    "Key file already exists: {}. Use --force to overwrite.",
                    path.display()
                );
            }
            keysource::write_key_file(&path, &key, args.force)?;
            render::success(&format!("Wrote key to {}", path.display()));
            render::hint(&format!(
                "Point encryption.key_file at it in {}, or export PWVAULT_KEY.",
                paths::config_file()?.display()
            ));
        }
        None => {
            render::value(key.to_hex().expose_secret(), true)?;
        }
    }

    Ok(())
}
