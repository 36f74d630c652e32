use anyhow::Result;
use clap::Parser;
use gstats::cli::Cli;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    cli.execute().await
}
