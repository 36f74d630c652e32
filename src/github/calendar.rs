use super::client::GitHubClient;
use crate::error::{GstatsError, Result};
use crate::model::DailyRecord;
use chrono::NaiveDate;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
struct QueryData {
    user: Option<UserNode>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UserNode {
    contributions_collection: ContributionsCollection,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ContributionsCollection {
    contribution_calendar: ContributionCalendar,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ContributionCalendar {
    total_contributions: u64,
    weeks: Vec<Week>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Week {
    contribution_days: Vec<CalendarDay>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CalendarDay {
    date: NaiveDate,
    contribution_count: u32,
}

fn calendar_query(user: &str) -> String {
    format!(
        "{{ user(login: \"{user}\") {{ contributionsCollection {{ contributionCalendar \
         {{ totalContributions weeks {{ contributionDays {{ date contributionCount }} }} }} }} }} }}"
    )
}

/// Fetch the trailing contribution calendar for `user`, flattened to a
/// date-ascending daily history alongside the platform's own total.
pub async fn fetch_calendar(
    client: &GitHubClient,
    user: &str,
) -> Result<(u64, Vec<DailyRecord>)> {
    let body = client.graphql(&calendar_query(user)).await?;
    let data = body
        .get("data")
        .cloned()
        .ok_or_else(|| GstatsError::Api("GraphQL response missing data".into()))?;

    let parsed: QueryData = serde_json::from_value(data)?;
    let calendar = parsed
        .user
        .ok_or_else(|| GstatsError::Api(format!("unknown user: {user}")))?
        .contributions_collection
        .contribution_calendar;

    let mut history: Vec<DailyRecord> = calendar
        .weeks
        .into_iter()
        .flat_map(|w| w.contribution_days)
        .map(|d| DailyRecord {
            date: d.date,
            contribution_count: d.contribution_count,
        })
        .collect();
    history.sort_by_key(|r| r.date);

    Ok((calendar.total_contributions, history))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn query_embeds_the_login() {
        let q = calendar_query("octocat");
        assert!(q.contains("user(login: \"octocat\")"));
        assert!(q.contains("contributionCalendar"));
    }

    #[test]
    fn calendar_payload_parses() {
        let data = serde_json::json!({
            "user": {
                "contributionsCollection": {
                    "contributionCalendar": {
                        "totalContributions": 42,
                        "weeks": [
                            { "contributionDays": [
                                { "date": "2024-06-01", "contributionCount": 2 },
                                { "date": "2024-06-02", "contributionCount": 0 }
                            ]}
                        ]
                    }
                }
            }
        });
        let parsed: QueryData = serde_json::from_value(data).unwrap();
        let calendar = parsed
            .user
            .unwrap()
            .contributions_collection
            .contribution_calendar;
        assert_eq!(calendar.total_contributions, 42);
        assert_eq!(calendar.weeks[0].contribution_days.len(), 2);
        assert_eq!(calendar.weeks[0].contribution_days[0].contribution_count, 2);
    }
}
