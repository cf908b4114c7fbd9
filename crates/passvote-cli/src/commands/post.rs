//! `passvote post`: Publish a post.

use clap::Args;

use super::{print_json, session};
use crate::config::ClientConfig;

#[derive(Args, Debug)]
pub struct PostArgs {
    /// Post content.
    #[arg(short, long)]
    pub content: String,
}

pub async fn run(args: &PostArgs, config: &ClientConfig) -> anyhow::Result<()> {
    let response = session(config)?.create_post(&args.content).await?;
    print_json(&response)
}
