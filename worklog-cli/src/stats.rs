//! Weekly statistics derived from the stored sessions.
//!
//! Weeks start on Monday and are bucketed by the UTC date of each session's
//! start time. A session is counted entirely on the day it started.

use std::collections::BTreeMap;

use chrono::Datelike;
use chrono::Days;
use chrono::NaiveDate;
use serde::Serialize;
use worklog_persist::Session;

/// Label shown for sessions recorded without a project name.
pub const UNTITLED_PROJECT: &str = "Untitled";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProjectTotal {
    pub name: String,
    pub seconds: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeeklySummary {
    pub week_start: NaiveDate,
    pub total_seconds: f64,
    /// Monday through Sunday.
    pub per_day: [f64; 7],
    /// Largest first; ties broken by name.
    pub per_project: Vec<ProjectTotal>,
    pub session_count: usize,
}

/// Monday of the week containing `day`.
pub fn week_start(day: NaiveDate) -> NaiveDate {
    let offset = u64::from(day.weekday().num_days_from_monday());
    day.checked_sub_days(Days::new(offset)).unwrap_or(day)
}

pub fn weekly_summary(sessions: &[Session], day_in_week: NaiveDate) -> WeeklySummary {
    let start = week_start(day_in_week);
    let mut per_day = [0.0; 7];
    let mut by_project: BTreeMap<&str, f64> = BTreeMap::new();
    let mut session_count = 0;

    for session in sessions {
        let date = session.start_date.date_naive();
        let offset = (date - start).num_days();
        if !(0..7).contains(&offset) {
            continue;
        }
        per_day[offset as usize] += session.seconds;
        let name = if session.project_name.is_empty() {
            UNTITLED_PROJECT
        } else {
            session.project_name.as_str()
        };
        *by_project.entry(name).or_insert(0.0) += session.seconds;
        session_count += 1;
    }

    let mut per_project: Vec<ProjectTotal> = by_project
        .into_iter()
        .map(|(name, seconds)| ProjectTotal {
            name: name.to_string(),
            seconds,
        })
        .collect();
    per_project.sort_by(|a, b| {
        b.seconds
            .total_cmp(&a.seconds)
            .then_with(|| a.name.cmp(&b.name))
    });

    WeeklySummary {
        week_start: start,
        total_seconds: per_day.iter().sum(),
        per_day,
        per_project,
        session_count,
    }
}

/// Compact human duration: `1h 05m`, `12m 30s`, `45s`.
pub fn format_duration(seconds: f64) -> String {
    let total = seconds.max(0.0).round() as u64;
    let hours = total / 3600;
    let minutes = (total % 3600) / 60;
    let secs = total % 60;
    if hours > 0 {
        format!("{hours}h {minutes:02}m")
    } else if minutes > 0 {
        format!("{minutes}m {secs:02}s")
    } else {
        format!("{secs}s")
    }
}

const WEEKDAY_LABELS: [&str; 7] = ["Mon", "Tue", "Wed", "Thu", "Fri", "Sat", "Sun"];

pub fn render_summary(summary: &WeeklySummary) -> String {
    let mut out = String::new();
    out.push_str(&format!("Week of {}\n", summary.week_start));
    out.push_str(&format!(
        "Total: {} ({} sessions)\n",
        format_duration(summary.total_seconds),
        summary.session_count
    ));
    for (label, seconds) in WEEKDAY_LABELS.iter().zip(summary.per_day) {
        out.push_str(&format!("  {label}  {}\n", format_duration(seconds)));
    }
    if !summary.per_project.is_empty() {
        out.push_str("By project:\n");
        for project in &summary.per_project {
            out.push_str(&format!(
                "  {}  {}\n",
                project.name,
                format_duration(project.seconds)
            ));
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use chrono::Utc;
    use pretty_assertions::assert_eq;

    fn session(project: &str, seconds: f64, day: u32, hour: u32) -> Session {
        Session::new(
            project,
            seconds,
            Utc.with_ymd_and_hms(2024, 4, day, hour, 0, 0).unwrap(),
            "",
        )
    }

    fn date(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 4, day).unwrap()
    }

    #[test]
    fn test_week_start_is_monday() {
        // 2024-04-01 is a Monday.
        assert_eq!(week_start(date(1)), date(1));
        assert_eq!(week_start(date(3)), date(1));
        assert_eq!(week_start(date(7)), date(1));
        assert_eq!(week_start(date(8)), date(8));
    }

    #[test]
    fn test_summary_buckets_by_day_and_project() {
        let sessions = vec![
            session("Thesis", 3600.0, 1, 9),
            session("Thesis", 1800.0, 3, 10),
            session("Piano", 900.0, 3, 20),
            session("", 60.0, 7, 23),
            session("Piano", 5000.0, 8, 0),
            session("Thesis", 100.0, 30, 12),
        ];
        let summary = weekly_summary(&sessions, date(4));

        assert_eq!(summary.week_start, date(1));
        assert_eq!(summary.session_count, 4);
        assert_eq!(summary.per_day, [3600.0, 0.0, 2700.0, 0.0, 0.0, 0.0, 60.0]);
        assert_eq!(summary.total_seconds, 6360.0);
        assert_eq!(
            summary.per_project,
            vec![
                ProjectTotal {
                    name: "Thesis".to_string(),
                    seconds: 5400.0
                },
                ProjectTotal {
                    name: "Piano".to_string(),
                    seconds: 900.0
                },
                ProjectTotal {
                    name: UNTITLED_PROJECT.to_string(),
                    seconds: 60.0
                },
            ]
        );
    }

    #[test]
    fn test_empty_week() {
        let summary = weekly_summary(&[], date(10));
        assert_eq!(summary.week_start, date(8));
        assert_eq!(summary.total_seconds, 0.0);
        assert!(summary.per_project.is_empty());
        assert!(render_summary(&summary).contains("Total: 0s (0 sessions)"));
    }

    #[test]
    fn test_project_ties_sorted_by_name() {
        let sessions = vec![session("b", 10.0, 2, 1), session("a", 10.0, 2, 2)];
        let summary = weekly_summary(&sessions, date(2));
        let names: Vec<_> = summary.per_project.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["a", "b"]);
    }

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(0.0), "0s");
        assert_eq!(format_duration(45.4), "45s");
        assert_eq!(format_duration(750.0), "12m 30s");
        assert_eq!(format_duration(3900.0), "1h 05m");
        assert_eq!(format_duration(-5.0), "0s");
    }

    #[test]
    fn test_render_summary_lists_projects() {
        let sessions = vec![session("Thesis", 3600.0, 1, 9)];
        let text = render_summary(&weekly_summary(&sessions, date(1)));
        assert!(text.starts_with("Week of 2024-04-01\n"));
        assert!(text.contains("  Mon  1h 00m\n"));
        assert!(text.contains("By project:\n  Thesis  1h 00m\n"));
    }
}
