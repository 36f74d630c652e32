use super::client::{GitHubClient, API_ROOT, PER_PAGE};
use crate::error::{GstatsError, Result};
use serde::Deserialize;
use std::collections::HashMap;

#[derive(Debug, Clone, Deserialize)]
pub struct RepoInfo {
    pub name: String,
    pub languages_url: String,
}

#[derive(Debug, Deserialize)]
struct CommitEntry {
    commit: CommitDetail,
}

#[derive(Debug, Deserialize)]
struct CommitDetail {
    author: Option<CommitAuthor>,
}

#[derive(Debug, Deserialize)]
struct CommitAuthor {
    email: Option<String>,
}

/// List every repository owned by `user`, walking the paginated index
/// until an empty page.
pub async fn list_repos(client: &GitHubClient, user: &str) -> Result<Vec<RepoInfo>> {
    let mut repos = Vec::new();
    let mut page = 1u32;
    loop {
        let url = format!("{API_ROOT}/users/{user}/repos?page={page}&per_page={PER_PAGE}");
        let batch: Vec<RepoInfo> = client.get_json(&url).await?;
        if batch.is_empty() {
            break;
        }
        repos.extend(batch);
        page += 1;
    }
    Ok(repos)
}

/// Count default-branch commits in one repo whose author email is in
/// `emails`. An empty email set counts every commit.
///
/// Empty or disabled repositories answer the commit listing with an error
/// status; those repos contribute zero rather than failing the whole walk.
pub async fn count_authored_commits(
    client: &GitHubClient,
    user: &str,
    repo: &str,
    emails: &[String],
) -> Result<u64> {
    let mut total = 0u64;
    let mut page = 1u32;
    loop {
        let url =
            format!("{API_ROOT}/repos/{user}/{repo}/commits?page={page}&per_page={PER_PAGE}");
        let batch: Vec<CommitEntry> = match client.get_json(&url).await {
            Ok(batch) => batch,
            Err(GstatsError::Api(_)) => break,
            Err(e) => return Err(e),
        };
        if batch.is_empty() {
            break;
        }
        total += batch
            .iter()
            .filter(|entry| {
                if emails.is_empty() {
                    return true;
                }
                entry
                    .commit
                    .author
                    .as_ref()
                    .and_then(|a| a.email.as_deref())
                    .is_some_and(|email| emails.iter().any(|e| e == email))
            })
            .count() as u64;
        page += 1;
    }
    Ok(total)
}

/// Byte counts per language for one repository.
pub async fn repo_languages(
    client: &GitHubClient,
    repo: &RepoInfo,
) -> Result<HashMap<String, u64>> {
    client.get_json(&repo.languages_url).await
}
