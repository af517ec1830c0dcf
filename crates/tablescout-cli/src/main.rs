mod profile;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use crate::profile::ProfileArgs;

#[derive(Debug, Parser)]
#[command(name = "tablescout")]
#[command(about = "Public profile aggregator for restaurants and local businesses")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Profile one business across its map listing, socials, and website
    Profile(ProfileArgs),
    /// Profile every request in a YAML file, one after another
    Batch {
        /// Path to the requests file
        file: PathBuf,

        /// Write one `<slug>.json` per request here instead of printing
        #[arg(long)]
        out_dir: Option<PathBuf>,
    },
    /// Print the URL-safe slug for a business name
    Slug { name: String },
    /// Parse an abbreviated count such as `12.3K` or `1,204`
    Count { text: String },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = tablescout_core::load_app_config_from_env()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.command {
        Some(Commands::Profile(args)) => profile::run_profile(&config, &args).await?,
        Some(Commands::Batch { file, out_dir }) => {
            profile::run_batch(&config, &file, out_dir.as_deref(), &mut std::io::stdout()).await?;
        }
        Some(Commands::Slug { name }) => println!("{}", tablescout_core::to_slug(&name)),
        Some(Commands::Count { text }) => {
            println!("{}", tablescout_core::parse_compact_count(&text));
        }
        None => println!("tablescout: pass a subcommand, or --help for usage"),
    }

    Ok(())
}
