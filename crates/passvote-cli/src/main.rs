//! Passvote CLI: anonymous eligibility proofs and signed voting.
//!
//! Subcommands: init, keygen, bucket, root, check, prove, verify, vote,
//! register, post, feed, profile.

mod commands;
mod config;

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use config::{ClientConfig, DEFAULT_CONFIG_FILE};

/// Passvote: passport-gated anonymous voting client.
#[derive(Parser, Debug)]
#[command(name = "passvote", version, about, long_about = None)]
struct Cli {
    /// Path to the configuration file (TOML).
    #[arg(short, long, global = true, default_value = DEFAULT_CONFIG_FILE)]
    config: PathBuf,

    /// Override the log level (trace, debug, info, warn, error).
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Write a default configuration file.
    Init(commands::init::InitArgs),
    /// Generate a signing key.
    Keygen(commands::keygen::KeygenArgs),
    /// Show the age bucket for a date of birth.
    Bucket(commands::bucket::BucketArgs),
    /// Compute the eligibility root of a restriction.
    Root(commands::root::RootArgs),
    /// Check a passport against a restriction, locally.
    Check(commands::check::CheckArgs),
    /// Generate a signed verification proof.
    Prove(commands::prove::ProveArgs),
    /// Audit a verification proof.
    Verify(commands::verify::VerifyArgs),
    /// Prove eligibility and vote on a proposal.
    Vote(commands::vote::VoteArgs),
    /// Register a nickname bound to a passport.
    Register(commands::register::RegisterArgs),
    /// Publish a post.
    Post(commands::post::PostArgs),
    /// Fetch the authenticated feed.
    Feed(commands::feed::FeedArgs),
    /// Fetch a user profile.
    Profile(commands::profile::ProfileArgs),
}

fn init_tracing(level: &str, format: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);

    if format == "json" {
        builder.json().init();
    } else {
        builder.with_target(true).init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = ClientConfig::load(&cli.config)?;

    let level = cli.log_level.as_deref().unwrap_or(&config.logging.level);
    init_tracing(level, &config.logging.format);

    match &cli.command {
        Commands::Init(args) => commands::init::run(args, &cli.config),
        Commands::Keygen(args) => commands::keygen::run(args, &config),
        Commands::Bucket(args) => commands::bucket::run(args),
        Commands::Root(args) => commands::root::run(args),
        Commands::Check(args) => commands::check::run(args, &config),
        Commands::Prove(args) => commands::prove::run(args, &config).await,
        Commands::Verify(args) => commands::verify::run(args, &config),
        Commands::Vote(args) => commands::vote::run(args, &config).await,
        Commands::Register(args) => commands::register::run(args, &config).await,
        Commands::Post(args) => commands::post::run(args, &config).await,
        Commands::Feed(args) => commands::feed::run(args, &config).await,
        Commands::Profile(args) => commands::profile::run(args, &config).await,
    }
}
