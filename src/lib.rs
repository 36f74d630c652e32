pub mod cache;
pub mod card;
pub mod cli;
pub mod commits;
pub mod error;
pub mod github;
pub mod languages;
pub mod model;
pub mod stats;
pub mod streak;
pub mod util;
