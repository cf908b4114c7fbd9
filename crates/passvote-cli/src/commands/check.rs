//! `passvote check`: Check a passport against a restriction, locally.

use clap::Args;
use std::path::PathBuf;

use passvote_proof::PassportVerifier;

use super::{load_passport, print_json, RestrictionArgs};
use crate::config::ClientConfig;

#[derive(Args, Debug)]
pub struct CheckArgs {
    /// Passport JSON file (nested or flat reader output).
    #[arg(short, long)]
    pub passport: PathBuf,

    #[command(flatten)]
    pub restriction: RestrictionArgs,

    /// Print the result as JSON.
    #[arg(long)]
    pub json: bool,
}

pub fn run(args: &CheckArgs, config: &ClientConfig) -> anyhow::Result<()> {
    let restriction = args.restriction.restriction()?;
    let passport = load_passport(&args.passport)?;
    let verifier = PassportVerifier::new(config.protocol.clone());
    let result = verifier.check_eligibility(Some(&passport), &restriction);

    if args.json {
        return print_json(&result);
    }

    println!("Restriction: {}", restriction.summary());
    if result.eligible {
        println!("Eligible");
    } else {
        println!("Not eligible: {}", result.reason.as_deref().unwrap_or("unknown"));
        if let Some(details) = &result.details {
            println!("  {}", details);
        }
    }
    Ok(())
}
