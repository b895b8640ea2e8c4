//! Session statistics and display formatting.
//!
//! Days are calendar days in the time zone of the `now` passed in, so the
//! same session list can be summarized for any user's local day boundary.

use std::collections::{BTreeSet, HashMap};

use chrono::{DateTime, Days, NaiveDate, TimeZone};

use crate::types::Session;

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SessionStats {
    /// All-time focus hours, one decimal.
    pub total_hours: f64,
    /// Focus hours recorded today, one decimal.
    pub today_hours: f64,
    /// Consecutive days with a session, ending today or yesterday.
    pub current_streak: u32,
    pub longest_streak: u32,
}

fn day_of<Tz: TimeZone>(timestamp: i64, tz: &Tz) -> Option<NaiveDate> {
    tz.timestamp_millis_opt(timestamp)
        .single()
        .map(|dt| dt.date_naive())
}

fn hours(seconds: u64) -> f64 {
    (seconds as f64 / 3600.0 * 10.0).round() / 10.0
}

impl SessionStats {
    pub fn compute<Tz: TimeZone>(sessions: &[Session], now: &DateTime<Tz>) -> Self {
        if sessions.is_empty() {
            return Self::default();
        }

        let tz = now.timezone();
        let today = now.date_naive();

        let total_seconds: u64 = sessions.iter().map(|s| s.duration).sum();
        let today_seconds: u64 = sessions
            .iter()
            .filter(|s| day_of(s.timestamp, &tz) == Some(today))
            .map(|s| s.duration)
            .sum();

        let days: BTreeSet<NaiveDate> = sessions
            .iter()
            .filter_map(|s| day_of(s.timestamp, &tz))
            .collect();

        let mut longest = 0u32;
        let mut run = 0u32;
        let mut prev: Option<NaiveDate> = None;
        for &day in &days {
            run = match prev {
                Some(p) if p.checked_add_days(Days::new(1)) == Some(day) => run + 1,
                _ => 1,
            };
            longest = longest.max(run);
            prev = Some(day);
        }

        let yesterday = today.checked_sub_days(Days::new(1));
        let current = match prev {
            Some(last) if last == today || Some(last) == yesterday => run,
            _ => 0,
        };

        Self {
            total_hours: hours(total_seconds),
            today_hours: hours(today_seconds),
            current_streak: current,
            longest_streak: longest,
        }
    }
}

/// Focus seconds recorded on one calendar day.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DailyTotal {
    pub date: NaiveDate,
    pub seconds: u64,
}

/// Per-day totals for the `days` days ending today, oldest first.
pub fn daily_totals<Tz: TimeZone>(sessions: &[Session], now: &DateTime<Tz>, days: u32) -> Vec<DailyTotal> {
    let tz = now.timezone();
    let today = now.date_naive();

    let mut by_day: HashMap<NaiveDate, u64> = HashMap::new();
    for session in sessions {
        if let Some(day) = day_of(session.timestamp, &tz) {
            *by_day.entry(day).or_default() += session.duration;
        }
    }

    (0..days)
        .rev()
        .filter_map(|offset| today.checked_sub_days(Days::new(u64::from(offset))))
        .map(|date| DailyTotal {
            date,
            seconds: by_day.get(&date).copied().unwrap_or(0),
        })
        .collect()
}

/// `"1h 5m"` or `"25m"`.
pub fn format_duration(secs: u64) -> String {
    let h = secs / 3600;
    let m = (secs % 3600) / 60;
    if h > 0 {
        format!("{}h {}m", h, m)
    } else {
        format!("{}m", m)
    }
}

/// `"1:05:09"` or `"05:09"`.
pub fn format_clock(secs: u64) -> String {
    let h = secs / 3600;
    let m = (secs % 3600) / 60;
    let s = secs % 60;
    if h > 0 {
        format!("{}:{:02}:{:02}", h, m, s)
    } else {
        format!("{:02}:{:02}", m, s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{FixedOffset, Utc};

    const DAY_MS: i64 = 86_400_000;

    fn at(ts: i64, duration: u64) -> Session {
        Session {
            id: format!("s{}", ts),
            date: String::new(),
            duration,
            timestamp: ts,
        }
    }

    fn noon(day: i64) -> i64 {
        // 2024-01-01T12:00:00Z plus `day` days
        1_704_110_400_000 + day * DAY_MS
    }

    fn now_at(day: i64) -> DateTime<Utc> {
        Utc.timestamp_millis_opt(noon(day)).unwrap()
    }

    #[test]
    fn test_empty_sessions() {
        assert_eq!(
            SessionStats::compute(&[], &now_at(0)),
            SessionStats::default()
        );
    }

    #[test]
    fn test_totals_round_to_one_decimal() {
        let sessions = vec![at(noon(0), 5400), at(noon(-3), 1800)];
        let stats = SessionStats::compute(&sessions, &now_at(0));
        assert_eq!(stats.total_hours, 2.0);
        assert_eq!(stats.today_hours, 1.5);
    }

    #[test]
    fn test_streaks() {
        // Days -6,-5,-4 (run of 3), gap, -1 and 0 (run of 2).
        let sessions: Vec<_> = [-6, -5, -4, -1, 0, 0]
            .iter()
            .map(|&d| at(noon(d), 600))
            .collect();
        let stats = SessionStats::compute(&sessions, &now_at(0));
        assert_eq!(stats.longest_streak, 3);
        assert_eq!(stats.current_streak, 2);
    }

    #[test]
    fn test_streak_survives_until_end_of_next_day() {
        let sessions = vec![at(noon(-2), 600), at(noon(-1), 600)];
        assert_eq!(SessionStats::compute(&sessions, &now_at(0)).current_streak, 2);
        assert_eq!(SessionStats::compute(&sessions, &now_at(1)).current_streak, 0);
    }

    #[test]
    fn test_days_follow_time_zone_of_now() {
        // 23:30 UTC on day 0 is already day 1 at UTC+2.
        let late = noon(0) + 11 * 3_600_000 + 30 * 60_000;
        let sessions = vec![at(late, 600)];
        let plus_two = FixedOffset::east_opt(2 * 3600).unwrap();
        let now = plus_two.timestamp_millis_opt(noon(1)).unwrap();
        assert_eq!(SessionStats::compute(&sessions, &now).today_hours, 0.2);
        assert_eq!(SessionStats::compute(&sessions, &now_at(1)).today_hours, 0.0);
    }

    #[test]
    fn test_daily_totals_oldest_first() {
        let sessions = vec![at(noon(0), 100), at(noon(0), 50), at(noon(-2), 30), at(noon(-40), 9)];
        let totals = daily_totals(&sessions, &now_at(0), 3);
        let seconds: Vec<_> = totals.iter().map(|d| d.seconds).collect();
        assert_eq!(seconds, vec![30, 0, 150]);
        assert_eq!(totals[2].date, now_at(0).date_naive());
    }

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(59), "0m");
        assert_eq!(format_duration(1500), "25m");
        assert_eq!(format_duration(3900), "1h 5m");
    }

    #[test]
    fn test_format_clock() {
        assert_eq!(format_clock(0), "00:00");
        assert_eq!(format_clock(309), "05:09");
        assert_eq!(format_clock(3909), "1:05:09");
    }
}
