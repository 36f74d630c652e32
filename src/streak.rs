use crate::error::{GstatsError, Result};
use crate::model::{DailyRecord, StreakResult};
use chrono::{Datelike, NaiveDate, Weekday};

/// Decides whether a zero-contribution day is skipped rather than breaking
/// an in-progress streak. Days with contributions never consult the policy.
pub trait StreakPolicy {
    fn is_exempt(&self, date: NaiveDate) -> bool;
}

/// Strictest semantics: every zero-contribution day breaks the streak.
pub struct NoExemptions;

impl StreakPolicy for NoExemptions {
    fn is_exempt(&self, _date: NaiveDate) -> bool {
        false
    }
}

/// Saturdays and Sundays with no contributions are skipped.
pub struct WeekendsExempt;

impl StreakPolicy for WeekendsExempt {
    fn is_exempt(&self, date: NaiveDate) -> bool {
        matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
    }
}

impl<F> StreakPolicy for F
where
    F: Fn(NaiveDate) -> bool,
{
    fn is_exempt(&self, date: NaiveDate) -> bool {
        self(date)
    }
}

/// Compute the current and longest contribution streaks.
///
/// `history` must be date-ascending and gapless (see [`validate_history`]);
/// the scan walks it backward from the most recent day not after `today`.
/// Records dated after `today` are ignored. A contributing day always
/// extends the active run by one; a zero day either breaks the run or, if
/// the policy exempts it, is skipped without extending it.
pub fn compute_streaks(
    history: &[DailyRecord],
    today: NaiveDate,
    policy: &dyn StreakPolicy,
) -> StreakResult {
    let mut running = 0u32;
    let mut longest = 0u32;
    let mut current = 0u32;
    // True until the first breaking day is seen walking back from today.
    let mut at_current = true;

    for record in history.iter().rev() {
        if record.date > today {
            continue;
        }
        if record.contribution_count > 0 {
            running += 1;
            longest = longest.max(running);
        } else if policy.is_exempt(record.date) {
            // Skipped: neither extends nor breaks the run.
        } else {
            if at_current {
                current = running;
                at_current = false;
            }
            running = 0;
        }
    }

    // The whole history was one unbroken run.
    if at_current {
        current = running;
    }

    StreakResult {
        current_streak: current,
        longest_streak: longest,
    }
}

/// Fail fast on malformed calendars instead of computing a wrong streak.
///
/// Accepts only a strictly ascending sequence where each date is followed
/// by the next calendar day.
pub fn validate_history(history: &[DailyRecord]) -> Result<()> {
    for pair in history.windows(2) {
        let (prev, next) = (pair[0], pair[1]);
        if next.date == prev.date {
            return Err(GstatsError::Calendar(format!(
                "duplicate date {}",
                next.date
            )));
        }
        if next.date < prev.date {
            return Err(GstatsError::Calendar(format!(
                "dates out of order: {} after {}",
                next.date, prev.date
            )));
        }
        match prev.date.succ_opt() {
            Some(expected) if next.date == expected => {}
            _ => {
                return Err(GstatsError::Calendar(format!(
                    "non-contiguous date range: gap between {} and {}",
                    prev.date, next.date
                )));
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn history(start: &str, counts: &[u32]) -> Vec<DailyRecord> {
        let start = day(start);
        counts
            .iter()
            .enumerate()
            .map(|(i, &contribution_count)| DailyRecord {
                date: start + chrono::Days::new(i as u64),
                contribution_count,
            })
            .collect()
    }

    #[test]
    fn empty_history_is_zero_zero() {
        let result = compute_streaks(&[], day("2024-06-10"), &NoExemptions);
        assert_eq!(
            result,
            StreakResult {
                current_streak: 0,
                longest_streak: 0
            }
        );
    }

    #[test]
    fn all_zero_history_is_zero_zero() {
        let h = history("2024-06-01", &[0, 0, 0, 0]);
        let result = compute_streaks(&h, day("2024-06-04"), &NoExemptions);
        assert_eq!(result.current_streak, 0);
        assert_eq!(result.longest_streak, 0);
    }

    #[test]
    fn unbroken_run_spans_whole_history() {
        let h = history("2024-06-01", &[1, 1, 1, 1, 1]);
        let result = compute_streaks(&h, day("2024-06-05"), &NoExemptions);
        assert_eq!(result.current_streak, 5);
        assert_eq!(result.longest_streak, 5);
    }

    #[test]
    fn break_in_the_middle_splits_runs() {
        // oldest..newest: 1 1 0 1 1 -> current 2, longest 2
        let h = history("2024-06-01", &[1, 1, 0, 1, 1]);
        let result = compute_streaks(&h, day("2024-06-05"), &NoExemptions);
        assert_eq!(result.current_streak, 2);
        assert_eq!(result.longest_streak, 2);
    }

    #[test]
    fn zero_today_without_exemption_zeroes_current() {
        let h = history("2024-06-01", &[1, 1, 0]);
        let result = compute_streaks(&h, day("2024-06-03"), &NoExemptions);
        assert_eq!(result.current_streak, 0);
        assert_eq!(result.longest_streak, 2);
    }

    #[test]
    fn longest_keeps_updating_after_current_breaks() {
        // oldest..newest: 1 1 1 1 0 1 -> current 1, longest 4
        let h = history("2024-06-01", &[1, 1, 1, 1, 0, 1]);
        let result = compute_streaks(&h, day("2024-06-06"), &NoExemptions);
        assert_eq!(result.current_streak, 1);
        assert_eq!(result.longest_streak, 4);
    }

    #[test]
    fn exempt_saturday_does_not_break_current() {
        // 2024-06-03 is a Monday; Mon-Fri contributing, Saturday idle.
        let h = history("2024-06-03", &[1, 1, 1, 1, 1, 0]);
        let result = compute_streaks(&h, day("2024-06-08"), &WeekendsExempt);
        assert_eq!(result.current_streak, 5);
        assert_eq!(result.longest_streak, 5);
    }

    #[test]
    fn weekend_contribution_still_extends_run() {
        // Fri 1, Sat 1, Sun 0, Mon 1 under weekend exemption: the Saturday
        // contribution counts, the idle Sunday is skipped.
        let h = history("2024-06-07", &[1, 1, 0, 1]);
        let result = compute_streaks(&h, day("2024-06-10"), &WeekendsExempt);
        assert_eq!(result.current_streak, 3);
        assert_eq!(result.longest_streak, 3);
    }

    #[test]
    fn idle_weekend_breaks_under_strict_policy() {
        let h = history("2024-06-07", &[1, 0, 0, 1]);
        let result = compute_streaks(&h, day("2024-06-10"), &NoExemptions);
        assert_eq!(result.current_streak, 1);
        assert_eq!(result.longest_streak, 1);
    }

    #[test]
    fn future_dated_records_are_ignored() {
        let mut h = history("2024-06-01", &[1, 1, 1]);
        h.push(DailyRecord {
            date: day("2024-06-04"),
            contribution_count: 9,
        });
        let result = compute_streaks(&h, day("2024-06-03"), &NoExemptions);
        assert_eq!(result.current_streak, 3);
        assert_eq!(result.longest_streak, 3);
    }

    #[test]
    fn closure_policy_is_accepted() {
        let h = history("2024-06-01", &[1, 0, 1]);
        let exempt_all = |_: NaiveDate| true;
        let result = compute_streaks(&h, day("2024-06-03"), &exempt_all);
        assert_eq!(result.current_streak, 2);
        assert_eq!(result.longest_streak, 2);
    }

    #[test]
    fn current_never_exceeds_longest() {
        let cases: &[&[u32]] = &[
            &[],
            &[0],
            &[3],
            &[1, 0, 1, 1, 0, 1, 1, 1],
            &[0, 0, 2, 0, 5, 5, 0],
            &[1, 1, 1, 0, 0, 0, 1],
        ];
        for counts in cases {
            let h = history("2024-05-01", counts);
            let today = day("2024-05-01") + chrono::Days::new(counts.len() as u64);
            for policy in [&NoExemptions as &dyn StreakPolicy, &WeekendsExempt] {
                let result = compute_streaks(&h, today, policy);
                assert!(result.current_streak <= result.longest_streak);
            }
        }
    }

    #[test]
    fn identical_inputs_give_identical_outputs() {
        let h = history("2024-06-01", &[1, 0, 1, 1, 0, 1]);
        let today = day("2024-06-06");
        let first = compute_streaks(&h, today, &WeekendsExempt);
        let second = compute_streaks(&h, today, &WeekendsExempt);
        assert_eq!(first, second);
    }

    #[test]
    fn validate_accepts_contiguous_ascending() {
        let h = history("2024-06-01", &[0, 1, 2, 0]);
        assert!(validate_history(&h).is_ok());
    }

    #[test]
    fn validate_accepts_empty_and_single() {
        assert!(validate_history(&[]).is_ok());
        assert!(validate_history(&history("2024-06-01", &[4])).is_ok());
    }

    #[test]
    fn validate_rejects_duplicate_date() {
        let mut h = history("2024-06-01", &[1, 1]);
        h.push(h[1]);
        let err = validate_history(&h).unwrap_err();
        assert!(err.to_string().contains("duplicate date"));
    }

    #[test]
    fn validate_rejects_gap() {
        let mut h = history("2024-06-01", &[1, 1]);
        h.push(DailyRecord {
            date: day("2024-06-05"),
            contribution_count: 1,
        });
        let err = validate_history(&h).unwrap_err();
        assert!(err.to_string().contains("non-contiguous"));
    }

    #[test]
    fn validate_rejects_descending_input() {
        let mut h = history("2024-06-01", &[1, 1, 1]);
        h.reverse();
        let err = validate_history(&h).unwrap_err();
        assert!(err.to_string().contains("out of order"));
    }
}
