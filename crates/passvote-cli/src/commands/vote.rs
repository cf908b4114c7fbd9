//! `passvote vote`: Prove eligibility and vote on a proposal.

use clap::Args;
use std::path::PathBuf;

use super::{load_passport, print_json, session};
use crate::config::ClientConfig;

#[derive(Args, Debug)]
pub struct VoteArgs {
    /// Post (proposal) to vote on.
    #[arg(long)]
    pub post_id: String,

    /// Vote option.
    #[arg(short, long)]
    pub option: String,

    /// Passport JSON file (nested or flat reader output).
    #[arg(short, long)]
    pub passport: PathBuf,
}

pub async fn run(args: &VoteArgs, config: &ClientConfig) -> anyhow::Result<()> {
    let passport = load_passport(&args.passport)?;
    let session = session(config)?;

    match session.vote(&args.post_id, &args.option, &passport).await {
        Ok(response) => {
            println!("Vote submitted for {}", args.post_id);
            print_json(&response)
        }
        Err(e) => {
            tracing::debug!(category = ?e.category(), "vote failed");
            anyhow::bail!("vote failed: {}", e)
        }
    }
}
