//! `passvote init`: Write a default configuration file.

use clap::Args;
use std::path::Path;

use crate::config::ClientConfig;

#[derive(Args, Debug)]
pub struct InitArgs {
    /// Overwrite an existing configuration file.
    #[arg(long)]
    pub force: bool,
}

pub fn run(args: &InitArgs, config_path: &Path) -> anyhow::Result<()> {
    if config_path.exists() && !args.force {
        anyhow::bail!(
            "configuration file already exists at {} (use --force to overwrite)",
            config_path.display()
        );
    }

    ClientConfig::default().save(config_path)?;
    println!("Wrote default configuration to {}", config_path.display());
    println!("Run 'passvote keygen' to create a signing key.");
    Ok(())
}
