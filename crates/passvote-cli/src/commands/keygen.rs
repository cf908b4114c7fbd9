//! `passvote keygen`: Generate a signing key.

use clap::Args;
use std::path::PathBuf;

use passvote_crypto::SigningIdentity;

use crate::config::ClientConfig;

#[derive(Args, Debug)]
pub struct KeygenArgs {
    /// Where to write the key (defaults to `identity.key_path`).
    #[arg(short, long)]
    pub out: Option<PathBuf>,

    /// Overwrite an existing key file.
    #[arg(long)]
    pub force: bool,
}

pub fn run(args: &KeygenArgs, config: &ClientConfig) -> anyhow::Result<()> {
    let path = args.out.as_ref().unwrap_or(&config.identity.key_path);
    if path.exists() && !args.force {
        anyhow::bail!(
            "key file already exists at {} (use --force to overwrite)",
            path.display()
        );
    }

    let identity = SigningIdentity::generate();
    let key = identity.private_key_hex();
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, key.as_bytes())?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600))?;
    }

    tracing::info!(path = %path.display(), address = %identity.address(), "generated signing key");
    println!("Signing key written to {}", path.display());
    println!("  Address: {}", identity.address());
    Ok(())
}
