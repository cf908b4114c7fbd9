//! `passvote bucket`: Show the age bucket for a date of birth.

use clap::Args;
use std::path::PathBuf;

use passvote_proof::classify_birth_date;

use super::load_passport;

#[derive(Args, Debug)]
pub struct BucketArgs {
    /// Date of birth as MRZ YYMMDD.
    #[arg(short, long, conflicts_with = "passport")]
    pub dob: Option<String>,

    /// Passport JSON file to read the date of birth from.
    #[arg(short, long)]
    pub passport: Option<PathBuf>,
}

pub fn run(args: &BucketArgs) -> anyhow::Result<()> {
    let dob = match (&args.dob, &args.passport) {
        (Some(dob), _) => dob.clone(),
        (None, Some(path)) => load_passport(path)?.date_of_birth,
        (None, None) => anyhow::bail!("either --dob or --passport is required"),
    };

    let bucket = classify_birth_date(&dob)?;
    println!("Age bucket: {} ({})", bucket, bucket.description());
    Ok(())
}
