//! `passvote feed`: Fetch the authenticated feed.

use clap::Args;

use super::{print_json, session};
use crate::config::ClientConfig;

#[derive(Args, Debug)]
pub struct FeedArgs {
    #[arg(long, default_value_t = 1)]
    pub page: u64,

    #[arg(long, default_value_t = 20)]
    pub limit: u64,

    /// Sort order understood by the server (sent unsigned).
    #[arg(long)]
    pub sort: Option<String>,
}

pub async fn run(args: &FeedArgs, config: &ClientConfig) -> anyhow::Result<()> {
    let response = session(config)?
        .get_feed(args.page, args.limit, args.sort.as_deref())
        .await?;
    print_json(&response)
}
