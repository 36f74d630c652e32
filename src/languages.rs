use crate::cache::Cache;
use crate::cli::CommonArgs;
use crate::error::{GstatsError, Result};
use crate::github::{self, GitHubClient};
use crate::model::{LanguageShare, LanguagesOutput, SCHEMA_VERSION};
use anyhow::Context;
use chrono::Utc;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use std::collections::HashMap;

/// Which languages make the cut: drop anything that takes up
/// `exclusion_threshold` percent or more of all bytes, keep the `top` rest.
#[derive(Debug, Clone)]
pub struct LanguageFilter {
    pub exclusion_threshold: f64,
    pub top: usize,
}

impl Default for LanguageFilter {
    fn default() -> Self {
        Self {
            exclusion_threshold: 90.0,
            top: 5,
        }
    }
}

pub async fn exec(common: CommonArgs, json: bool, top: usize, threshold: f64) -> anyhow::Result<()> {
    let user = common.username()?.to_string();
    let mut cache = Cache::new(common.cache.as_deref()).context("Failed to initialize cache")?;

    let bytes = if common.offline {
        cache
            .get_languages(&user)?
            .ok_or_else(|| GstatsError::Cache(format!("no cached languages for {user}")))?
    } else {
        let client = GitHubClient::new(common.token.as_deref())?;
        let bytes = fetch_language_bytes(&client, &user, true)
            .await
            .context("Failed to fetch repository languages")?;
        cache.store_languages(&user, &bytes)?;
        bytes
    };

    let filter = LanguageFilter {
        exclusion_threshold: threshold,
        top,
    };
    let shares = top_languages(&bytes, &filter);

    if json {
        output_json(&user, &shares)?;
    } else {
        output_table(&shares);
    }

    Ok(())
}

/// Sum per-repo language byte maps across every repository of `user`.
pub async fn fetch_language_bytes(
    client: &GitHubClient,
    user: &str,
    progress: bool,
) -> Result<HashMap<String, u64>> {
    let repos = github::list_repos(client, user).await?;

    let pb = if progress {
        let pb = ProgressBar::new(repos.len() as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{bar:40.cyan/blue} {pos}/{len} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_bar()),
        );
        Some(pb)
    } else {
        None
    };

    let mut bytes: HashMap<String, u64> = HashMap::new();
    for repo in &repos {
        if let Some(pb) = &pb {
            pb.set_message(repo.name.clone());
        }
        // Repos with disabled stats answer with an error status; skip them.
        match github::repo_languages(client, repo).await {
            Ok(langs) => {
                for (language, count) in langs {
                    *bytes.entry(language).or_insert(0) += count;
                }
            }
            Err(GstatsError::Api(_)) => {}
            Err(e) => return Err(e),
        }
        if let Some(pb) = &pb {
            pb.inc(1);
        }
    }
    if let Some(pb) = &pb {
        pb.finish_and_clear();
    }

    Ok(bytes)
}

/// Reduce raw byte counts to the displayed shares. Percentages are over
/// the post-filter total, so they still sum to ~100 after a dominant
/// language is excluded.
pub fn top_languages(bytes: &HashMap<String, u64>, filter: &LanguageFilter) -> Vec<LanguageShare> {
    let total: u64 = bytes.values().sum();
    if total == 0 {
        return Vec::new();
    }

    let mut kept: Vec<(&str, u64)> = bytes
        .iter()
        .filter(|(_, &b)| (b as f64 / total as f64) * 100.0 < filter.exclusion_threshold)
        .map(|(language, &b)| (language.as_str(), b))
        .collect();

    let kept_total: u64 = kept.iter().map(|(_, b)| *b).sum();
    if kept_total == 0 {
        return Vec::new();
    }

    kept.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));

    kept.into_iter()
        .take(filter.top)
        .map(|(language, b)| LanguageShare {
            language: language.to_string(),
            bytes: b,
            percent: (b as f64 / kept_total as f64) * 100.0,
        })
        .collect()
}

fn output_json(username: &str, shares: &[LanguageShare]) -> anyhow::Result<()> {
    let output = LanguagesOutput {
        version: SCHEMA_VERSION,
        generated_at: Utc::now(),
        username: username.to_string(),
        languages: shares.to_vec(),
    };
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

fn output_table(shares: &[LanguageShare]) {
    if shares.is_empty() {
        println!("No language data to display");
        return;
    }

    println!("{}", style("Top Languages").bold());
    println!("{}", "─".repeat(50));
    for share in shares {
        println!(
            "{:<20} {:>10} {:>8.2}%",
            share.language,
            share.bytes,
            share.percent
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bytes(pairs: &[(&str, u64)]) -> HashMap<String, u64> {
        pairs
            .iter()
            .map(|(l, b)| (l.to_string(), *b))
            .collect()
    }

    #[test]
    fn empty_map_gives_no_shares() {
        assert!(top_languages(&HashMap::new(), &LanguageFilter::default()).is_empty());
    }

    #[test]
    fn shares_are_sorted_descending() {
        let shares = top_languages(
            &bytes(&[("Rust", 500), ("Python", 300), ("C", 200)]),
            &LanguageFilter::default(),
        );
        let names: Vec<&str> = shares.iter().map(|s| s.language.as_str()).collect();
        assert_eq!(names, vec!["Rust", "Python", "C"]);
        assert_eq!(shares[0].percent, 50.0);
    }

    #[test]
    fn top_n_cuts_the_tail() {
        let shares = top_languages(
            &bytes(&[
                ("A", 600),
                ("B", 500),
                ("C", 400),
                ("D", 300),
                ("E", 200),
                ("F", 100),
            ]),
            &LanguageFilter::default(),
        );
        assert_eq!(shares.len(), 5);
        assert!(shares.iter().all(|s| s.language != "F"));
    }

    #[test]
    fn dominant_language_is_excluded() {
        // HTML takes 95% of all bytes; percentages rebase on the rest.
        let shares = top_languages(
            &bytes(&[("HTML", 9500), ("Rust", 300), ("Python", 200)]),
            &LanguageFilter::default(),
        );
        let names: Vec<&str> = shares.iter().map(|s| s.language.as_str()).collect();
        assert_eq!(names, vec!["Rust", "Python"]);
        assert_eq!(shares[0].percent, 60.0);
        assert_eq!(shares[1].percent, 40.0);
    }

    #[test]
    fn percentages_sum_to_one_hundred_within_top() {
        let shares = top_languages(
            &bytes(&[("Rust", 123), ("Go", 456), ("C", 789)]),
            &LanguageFilter::default(),
        );
        let sum: f64 = shares.iter().map(|s| s.percent).sum();
        assert!((sum - 100.0).abs() < 1e-9);
    }

    #[test]
    fn ties_break_alphabetically() {
        let shares = top_languages(
            &bytes(&[("Zig", 100), ("Ada", 100)]),
            &LanguageFilter::default(),
        );
        assert_eq!(shares[0].language, "Ada");
    }
}
