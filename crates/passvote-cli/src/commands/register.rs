//! `passvote register`: Register a nickname bound to a passport.

use clap::Args;
use std::path::PathBuf;

use passvote_crypto::to_hex;

use super::{load_passport, print_json, session};
use crate::config::ClientConfig;

#[derive(Args, Debug)]
pub struct RegisterArgs {
    /// Display nickname.
    #[arg(short, long)]
    pub nickname: String,

    /// Passport JSON file; its commitment hash is registered.
    #[arg(short, long)]
    pub passport: Option<PathBuf>,
}

pub async fn run(args: &RegisterArgs, config: &ClientConfig) -> anyhow::Result<()> {
    let passport_hash = match &args.passport {
        Some(path) => to_hex(load_passport(path)?.passport_hash()?.as_slice()),
        None => String::new(),
    };

    let response = session(config)?
        .register(&args.nickname, &passport_hash)
        .await?;
    println!("Registered {}", args.nickname);
    print_json(&response)
}
