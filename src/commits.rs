use crate::cli::CommonArgs;
use crate::error::GstatsError;
use crate::github::{self, GitHubClient};
use crate::model::{CommitsOutput, SCHEMA_VERSION};
use anyhow::Context;
use chrono::Utc;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};

pub async fn exec(common: CommonArgs, json: bool) -> anyhow::Result<()> {
    if common.offline {
        return Err(GstatsError::Config(
            "commit counting requires network access; drop --offline".into(),
        )
        .into());
    }

    let user = common.username()?.to_string();
    let client = GitHubClient::new(common.token.as_deref())?;

    let repos = github::list_repos(&client, &user)
        .await
        .context("Failed to list repositories")?;

    let pb = ProgressBar::new(repos.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{bar:40.cyan/blue} {pos}/{len} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar()),
    );

    let mut total_commits = 0u64;
    for repo in &repos {
        pb.set_message(repo.name.clone());
        total_commits += github::count_authored_commits(&client, &user, &repo.name, &common.email)
            .await
            .with_context(|| format!("Failed to count commits in {}", repo.name))?;
        pb.inc(1);
    }
    pb.finish_and_clear();

    if json {
        let output = CommitsOutput {
            version: SCHEMA_VERSION,
            generated_at: Utc::now(),
            username: user,
            repos_scanned: repos.len(),
            total_commits,
        };
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        println!("{}", style("Commit Count").bold());
        println!("{}", "─".repeat(50));
        println!("Repositories scanned: {}", style(repos.len()).cyan());
        println!("Total commits: {}", style(total_commits).green());
        if common.email.is_empty() {
            println!("\nNo --email given; every commit was counted.");
        }
    }

    Ok(())
}
