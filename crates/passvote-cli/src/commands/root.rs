//! `passvote root`: Compute the eligibility root of a restriction.

use clap::Args;

use passvote_crypto::to_hex;
use passvote_proof::EligibilityTree;

use super::RestrictionArgs;

#[derive(Args, Debug)]
pub struct RootArgs {
    #[command(flatten)]
    pub restriction: RestrictionArgs,

    /// Also list every eligible combination.
    #[arg(long)]
    pub show_combinations: bool,
}

pub fn run(args: &RootArgs) -> anyhow::Result<()> {
    let restriction = args.restriction.restriction()?;
    let tree = EligibilityTree::build(&restriction);

    println!("Restriction:  {}", restriction.summary());
    println!("Root:         {}", to_hex(tree.root().as_slice()));
    println!("Combinations: {}", tree.combinations().len());
    if args.show_combinations {
        for combination in tree.combinations() {
            println!("  {}", combination);
        }
    }

    if let Some(advertised) = restriction.eligibility_root() {
        if advertised == tree.root() {
            println!("Advertised root matches.");
        } else {
            anyhow::bail!("advertised root {} does not match", advertised);
        }
    }
    Ok(())
}
