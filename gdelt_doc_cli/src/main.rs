mod commands;
mod output;

use anyhow::Result;
use clap::{Parser, Subcommand};
use gdelt_doc_api::Client;

use crate::output::OutputFormat;

#[derive(Parser)]
#[command(name = "gdeltdoc")]
#[command(about = "Search worldwide news coverage with the GDELT DOC 2.0 API")]
struct Cli {
    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Table, global = true)]
    output: OutputFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List articles matching the filters
    Articles(commands::articles::ArticlesArgs),
    /// Show a timeline of coverage matching the filters
    Timeline(commands::timeline::TimelineArgs),
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("gdeltdoc=info".parse()?)
                .add_directive("gdelt_doc_api=warn".parse()?),
        )
        .with_target(false)
        .init();

    let cli = Cli::parse();

    let client = match std::env::var("GDELT_DOC_API_URL").ok() {
        Some(url) => {
            tracing::debug!("Using endpoint {}", url);
            Client::with_base_url(&url)?
        }
        None => Client::new()?,
    };

    match &cli.command {
        Commands::Articles(args) => commands::articles::run(args, &client, &cli.output).await?,
        Commands::Timeline(args) => commands::timeline::run(args, &client, &cli.output).await?,
    }

    Ok(())
}
