//! `passvote prove`: Generate a signed verification proof.

use clap::Args;
use std::path::PathBuf;

use passvote_proof::Nonce;

use super::{load_passport, print_json, session, RestrictionArgs};
use crate::config::ClientConfig;

#[derive(Args, Debug)]
pub struct ProveArgs {
    /// Passport JSON file (nested or flat reader output).
    #[arg(short, long)]
    pub passport: PathBuf,

    #[command(flatten)]
    pub restriction: RestrictionArgs,

    /// Post (proposal) the proof is bound to.
    #[arg(long)]
    pub post_id: String,

    /// Vote option the proof is bound to.
    #[arg(long)]
    pub vote_option: String,

    /// Use this server-issued nonce instead of fetching one.
    #[arg(long)]
    pub nonce: Option<String>,
}

pub async fn run(args: &ProveArgs, config: &ClientConfig) -> anyhow::Result<()> {
    let restriction = args.restriction.restriction()?;
    let passport = load_passport(&args.passport)?;
    let session = session(config)?;

    let nonce = match &args.nonce {
        Some(n) => Nonce::ServerIssued(n.clone()),
        None => session.acquire_nonce().await?,
    };
    if !nonce.is_server_issued() {
        eprintln!("warning: using a locally generated nonce; the server will not accept it");
    }

    let proof = session.verifier().generate_verification_proof(
        Some(&passport),
        &restriction,
        session.identity(),
        &nonce,
        &args.post_id,
        &args.vote_option,
    )?;
    print_json(&proof)
}
