pub mod calendar;
pub mod client;
pub mod repos;

pub use calendar::fetch_calendar;
pub use client::GitHubClient;
pub use repos::{count_authored_commits, list_repos, repo_languages, RepoInfo};
