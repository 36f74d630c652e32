use crate::cache::Cache;
use crate::cli::CommonArgs;
use crate::error::GstatsError;
use crate::github::{self, GitHubClient};
use crate::languages::{self, LanguageFilter};
use crate::model::{StatsOutput, SCHEMA_VERSION};
use crate::streak::{self, NoExemptions, StreakPolicy, WeekendsExempt};
use anyhow::Context;
use chrono::Utc;
use console::style;

pub async fn exec(common: CommonArgs, json: bool) -> anyhow::Result<()> {
    let stats = collect_stats(&common, false).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&stats)?);
    } else {
        output_summary(&stats);
    }

    Ok(())
}

/// Fetch (or load from cache) everything needed for output: the validated
/// contribution history with streaks computed over it, and optionally the
/// top-language shares.
pub async fn collect_stats(
    common: &CommonArgs,
    with_languages: bool,
) -> anyhow::Result<StatsOutput> {
    let user = common.username()?.to_string();
    let mut cache = Cache::new(common.cache.as_deref()).context("Failed to initialize cache")?;

    let (total_contributions, history, language_bytes) = if common.offline {
        let (total, history) = cache.get_calendar(&user)?.ok_or_else(|| {
            GstatsError::Cache(format!("no cached calendar for {user}; run online first"))
        })?;
        let bytes = if with_languages {
            cache.get_languages(&user)?
        } else {
            None
        };
        (total, history, bytes)
    } else {
        let client = GitHubClient::new(common.token.as_deref())?;
        let (total, history) = github::fetch_calendar(&client, &user)
            .await
            .context("Failed to fetch contribution calendar")?;
        streak::validate_history(&history).context("GitHub returned a malformed calendar")?;
        cache.store_calendar(&user, total, &history)?;

        let bytes = if with_languages {
            let bytes = languages::fetch_language_bytes(&client, &user, true)
                .await
                .context("Failed to fetch repository languages")?;
            cache.store_languages(&user, &bytes)?;
            Some(bytes)
        } else {
            None
        };
        (total, history, bytes)
    };

    let policy: &dyn StreakPolicy = if common.skip_weekends {
        &WeekendsExempt
    } else {
        &NoExemptions
    };
    let streaks = streak::compute_streaks(&history, crate::util::today_local(), policy);

    let shares = language_bytes
        .map(|bytes| languages::top_languages(&bytes, &LanguageFilter::default()))
        .unwrap_or_default();

    Ok(StatsOutput {
        version: SCHEMA_VERSION,
        generated_at: Utc::now(),
        username: user,
        total_contributions,
        current_streak: streaks.current_streak,
        longest_streak: streaks.longest_streak,
        languages: shares,
    })
}

fn output_summary(stats: &StatsOutput) {
    println!("{}", style("GitHub Contribution Stats").bold());
    println!("{}", "─".repeat(50));
    println!("User: {}", style(&stats.username).cyan());
    println!(
        "Total contributions: {}",
        style(stats.total_contributions).cyan()
    );
    println!(
        "Current streak: {} days",
        style(stats.current_streak).green()
    );
    println!(
        "Longest streak: {} days",
        style(stats.longest_streak).yellow()
    );

    if !stats.languages.is_empty() {
        println!("\n{}", style("Top Languages").bold());
        for share in &stats.languages {
            println!("  {}: {:.2}%", share.language, share.percent);
        }
    }

    println!("\nUse --json to export the raw data.");
}
