use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

pub const SCHEMA_VERSION: u32 = 1;

/// One day of the contribution calendar. The calendar covers a fixed
/// trailing window with exactly one record per date, count 0 on idle days.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyRecord {
    pub date: NaiveDate,
    pub contribution_count: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreakResult {
    pub current_streak: u32,
    pub longest_streak: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LanguageShare {
    pub language: String,
    pub bytes: u64,
    pub percent: f64,
}

/// Aggregated profile stats, also the on-disk JSON format consumed by
/// `card --stats-file`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatsOutput {
    pub version: u32,
    pub generated_at: DateTime<Utc>,
    pub username: String,
    pub total_contributions: u64,
    pub current_streak: u32,
    pub longest_streak: u32,
    pub languages: Vec<LanguageShare>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommitsOutput {
    pub version: u32,
    pub generated_at: DateTime<Utc>,
    pub username: String,
    pub repos_scanned: usize,
    pub total_commits: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LanguagesOutput {
    pub version: u32,
    pub generated_at: DateTime<Utc>,
    pub username: String,
    pub languages: Vec<LanguageShare>,
}
