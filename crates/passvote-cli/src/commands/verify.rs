//! `passvote verify`: Audit a verification proof.

use alloy_primitives::Address;
use chrono::Utc;
use clap::Args;

use passvote_proof::{PassportVerifier, VerificationProof};

use super::{read_json_arg, RestrictionArgs};
use crate::config::ClientConfig;

#[derive(Args, Debug)]
pub struct VerifyArgs {
    /// Proof JSON (as string or path to file). A full vote body is accepted too.
    #[arg(short, long)]
    pub proof: String,

    #[command(flatten)]
    pub restriction: RestrictionArgs,

    /// Address the proof must be signed by.
    #[arg(long)]
    pub signer: Address,

    /// Audit as of this unix time instead of now.
    #[arg(long)]
    pub at: Option<u64>,
}

pub fn run(args: &VerifyArgs, config: &ClientConfig) -> anyhow::Result<()> {
    let mut value = read_json_arg(&args.proof)?;
    if let Some(inner) = value.get_mut("verification").map(serde_json::Value::take) {
        value = inner;
    }
    let proof: VerificationProof = serde_json::from_value(value)
        .map_err(|e| anyhow::anyhow!("invalid verification proof: {}", e))?;

    let restriction = args.restriction.restriction()?;
    let now = args
        .at
        .unwrap_or_else(|| Utc::now().timestamp().max(0) as u64);

    let verifier = PassportVerifier::new(config.protocol.clone());
    let audit = verifier.audit_verification_proof(&proof, &restriction, args.signer, now)?;

    if audit.valid {
        println!("Proof is VALID");
    } else {
        println!("Proof is INVALID");
    }
    println!();
    for check in &audit.checks {
        let icon = if check.passed { "PASS" } else { "FAIL" };
        print!("  [{}] {}", icon, check.name);
        if let Some(ref detail) = check.detail {
            print!(": {}", detail);
        }
        println!();
    }
    if let Some(signer) = audit.signer {
        println!();
        println!("Signer: {}", signer);
    }

    Ok(())
}
