use crate::error::GstatsError;
use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "gstats")]
#[command(about = "GitHub profile statistics tool for streaks, languages, and stat cards")]
#[command(version)]
pub struct Cli {
    #[clap(flatten)]
    pub common: CommonArgs,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Args, Clone)]
pub struct CommonArgs {
    #[arg(long, help = "GitHub username")]
    pub user: Option<String>,

    #[arg(long, help = "API token (defaults to the GITHUB_TOKEN env var)")]
    pub token: Option<String>,

    #[arg(long, help = "Author email for commit attribution (repeatable)")]
    pub email: Vec<String>,

    #[arg(long, help = "Idle weekends do not break the streak", default_value_t = false)]
    pub skip_weekends: bool,

    #[arg(long, help = "Path to cache directory")]
    pub cache: Option<PathBuf>,

    #[arg(long, help = "Serve from the local cache, never hit the API", default_value_t = false)]
    pub offline: bool,
}

impl CommonArgs {
    pub fn username(&self) -> crate::error::Result<&str> {
        self.user
            .as_deref()
            .ok_or_else(|| GstatsError::Config("--user is required".into()))
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Contribution totals and streaks
    Stats {
        #[arg(long, help = "Output as JSON")]
        json: bool,
    },
    /// Write the SVG stats card
    Card {
        #[arg(long, help = "Output path", default_value = "stats_board.svg")]
        output: PathBuf,

        #[arg(long, help = "Patch placeholders in an existing SVG template")]
        template: Option<PathBuf>,

        #[arg(long, help = "Render from a previously exported JSON stats file")]
        stats_file: Option<PathBuf>,
    },
    /// Total authored commit count across all repositories
    Commits {
        #[arg(long, help = "Output as JSON")]
        json: bool,
    },
    /// Top languages by bytes across all repositories
    Languages {
        #[arg(long, help = "Output as JSON")]
        json: bool,

        #[arg(long, help = "How many languages to show", default_value_t = 5)]
        top: usize,

        #[arg(
            long,
            help = "Exclude languages at or above this percentage of all bytes",
            default_value_t = 90.0
        )]
        threshold: f64,
    },
}

impl Cli {
    pub fn parse() -> Self {
        <Self as Parser>::parse()
    }

    pub async fn execute(self) -> Result<()> {
        match self.command {
            Commands::Stats { json } => crate::stats::exec(self.common, json).await,
            Commands::Card {
                output,
                template,
                stats_file,
            } => crate::card::exec(self.common, output, template, stats_file).await,
            Commands::Commits { json } => crate::commits::exec(self.common, json).await,
            Commands::Languages {
                json,
                top,
                threshold,
            } => crate::languages::exec(self.common, json, top, threshold).await,
        }
    }
}
