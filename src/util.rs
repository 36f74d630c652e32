use chrono::{Local, NaiveDate};
use std::path::PathBuf;

/// Today in the local timezone, matching how a person reads their own
/// profile calendar.
pub fn today_local() -> NaiveDate {
    Local::now().date_naive()
}

pub fn default_cache_dir() -> PathBuf {
    std::env::current_dir()
        .map(|d| d.join(".gstats"))
        .unwrap_or_else(|_| PathBuf::from(".gstats"))
}
