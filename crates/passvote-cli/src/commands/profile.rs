//! `passvote profile`: Fetch a user profile.

use clap::Args;

use super::{print_json, session};
use crate::config::ClientConfig;

#[derive(Args, Debug)]
pub struct ProfileArgs {
    /// Address to look up (defaults to your own).
    #[arg(short, long)]
    pub address: Option<String>,
}

pub async fn run(args: &ProfileArgs, config: &ClientConfig) -> anyhow::Result<()> {
    let session = session(config)?;
    let address = match &args.address {
        Some(address) => address.clone(),
        None => session
            .address()
            .map(|a| a.to_string())
            .ok_or_else(|| anyhow::anyhow!("no signing identity"))?,
    };

    let response = session.get_profile(&address).await?;
    print_json(&response)
}
