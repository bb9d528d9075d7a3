mod output;
mod reviews;

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "revdash-cli")]
#[command(about = "Collect and analyse Google Play and App Store reviews")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Collect normalized reviews from both stores
    Collect {
        #[command(flatten)]
        target: TargetArgs,
        /// Output format
        #[arg(long, value_enum, default_value_t = OutputFormat::Json)]
        format: OutputFormat,
        /// Write to this file instead of stdout
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Collect reviews and print an analysis report as JSON
    Analyze {
        #[command(flatten)]
        target: TargetArgs,
        /// Also send reviews to `DeepSeek` (needs `DEEPSEEK_API_KEY`)
        #[arg(long)]
        ai: bool,
        /// Write to this file instead of stdout
        #[arg(long)]
        output: Option<PathBuf>,
    },
}

/// Which apps to collect and over which dates.
#[derive(Debug, Args)]
struct TargetArgs {
    /// Google Play listing URL or package name
    #[arg(long)]
    play: Option<String>,
    /// App Store listing URL or numeric id
    #[arg(long = "app-store")]
    app_store: Option<String>,
    /// First day to include (YYYY-MM-DD, UTC)
    #[arg(long)]
    from: NaiveDate,
    /// Last day to include (YYYY-MM-DD, UTC)
    #[arg(long)]
    to: NaiveDate,
    /// Record every retrieval attempt in the output
    #[arg(long)]
    debug: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Json,
    Csv,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    let config = revdash_core::load_app_config_from_env()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Some(Commands::Collect {
            target,
            format,
            output,
        }) => reviews::run_collect(&config, &target, format, output.as_deref()).await?,
        Some(Commands::Analyze { target, ai, output }) => {
            reviews::run_analyze(&config, &target, ai, output.as_deref()).await?;
        }
        None => println!("revdash-cli: run `revdash-cli --help` for commands"),
    }

    Ok(())
}
