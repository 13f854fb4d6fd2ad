//! Calendar arithmetic for the Monday-aligned week buckets.

use chrono::{DateTime, Datelike, Duration, NaiveTime, Utc};

/// The most recent Monday at midnight UTC at or before `t`.
///
/// `num_days_from_monday` yields 6 for Sunday, so a Sunday steps back six
/// days to the previous Monday rather than forward.
pub fn week_start(t: DateTime<Utc>) -> DateTime<Utc> {
    let days_since_monday = i64::from(t.weekday().num_days_from_monday());
    let monday = t.date_naive() - Duration::days(days_since_monday);
    monday.and_time(NaiveTime::MIN).and_utc()
}

/// `count` week-start instants, most recent first, each exactly seven days
/// before the previous, starting from the week containing `now`.
pub fn recent_weeks(now: DateTime<Utc>, count: u32) -> Vec<DateTime<Utc>> {
    let current = week_start(now);
    (0..count)
        .map(|i| current - Duration::days(7 * i64::from(i)))
        .collect()
}

/// Bucket header, e.g. "Week of Dec 23". Carries no year.
pub fn week_label(week_start: DateTime<Utc>) -> String {
    format!("Week of {} {}", week_start.format("%b"), week_start.day())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Weekday};

    fn at(y: i32, m: u32, d: u32, h: u32, min: u32, s: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, min, s).unwrap()
    }

    #[test]
    fn wednesday_maps_to_preceding_monday() {
        let ws = week_start(at(2024, 12, 25, 15, 30, 45));
        assert_eq!(ws, at(2024, 12, 23, 0, 0, 0));
        assert_eq!(ws.weekday(), Weekday::Mon);
    }

    #[test]
    fn monday_maps_to_itself_at_midnight() {
        let ws = week_start(at(2024, 12, 23, 9, 0, 0));
        assert_eq!(ws, at(2024, 12, 23, 0, 0, 0));
    }

    #[test]
    fn sunday_steps_back_six_days() {
        let ws = week_start(at(2024, 12, 29, 23, 59, 59));
        assert_eq!(ws, at(2024, 12, 23, 0, 0, 0));
    }

    #[test]
    fn saturday_maps_to_same_week() {
        let ws = week_start(at(2024, 12, 28, 1, 0, 0));
        assert_eq!(ws, at(2024, 12, 23, 0, 0, 0));
    }

    #[test]
    fn crosses_month_boundary() {
        // Tue Jan 2 2024 belongs to the week of Mon Jan 1.
        let ws = week_start(at(2024, 1, 2, 12, 0, 0));
        assert_eq!(ws, at(2024, 1, 1, 0, 0, 0));
    }

    #[test]
    fn crosses_year_boundary() {
        // Wed Jan 3 2018: Jan 1 2018 was a Monday.
        let ws = week_start(at(2018, 1, 3, 0, 0, 0));
        assert_eq!(ws, at(2018, 1, 1, 0, 0, 0));
        // Sat Jan 2 2021 belongs to the week of Mon Dec 28 2020.
        let ws = week_start(at(2021, 1, 2, 0, 0, 0));
        assert_eq!(ws, at(2020, 12, 28, 0, 0, 0));
    }

    #[test]
    fn idempotent() {
        let t = at(2024, 12, 25, 15, 30, 45);
        assert_eq!(week_start(week_start(t)), week_start(t));
    }

    #[test]
    fn always_monday_midnight() {
        // A year's worth of days.
        let mut t = at(2024, 1, 1, 13, 7, 11);
        for _ in 0..366 {
            let ws = week_start(t);
            assert_eq!(ws.weekday(), Weekday::Mon);
            assert_eq!(ws.time(), NaiveTime::MIN);
            assert!(ws <= t);
            t += Duration::days(1);
        }
    }

    #[test]
    fn recent_weeks_counts_and_spacing() {
        let now = at(2024, 12, 25, 10, 0, 0);
        assert!(recent_weeks(now, 0).is_empty());

        let weeks = recent_weeks(now, 4);
        assert_eq!(weeks.len(), 4);
        assert_eq!(weeks[0], at(2024, 12, 23, 0, 0, 0));
        for pair in weeks.windows(2) {
            assert_eq!(pair[0] - pair[1], Duration::days(7));
        }
    }

    #[test]
    fn recent_weeks_across_year_boundary() {
        let weeks = recent_weeks(at(2024, 1, 10, 0, 0, 0), 3);
        assert_eq!(
            weeks,
            vec![
                at(2024, 1, 8, 0, 0, 0),
                at(2024, 1, 1, 0, 0, 0),
                at(2023, 12, 25, 0, 0, 0),
            ]
        );
    }

    #[test]
    fn labels() {
        assert_eq!(week_label(at(2024, 12, 23, 0, 0, 0)), "Week of Dec 23");
        assert_eq!(week_label(at(2024, 1, 1, 0, 0, 0)), "Week of Jan 1");
        assert_eq!(week_label(at(2024, 1, 8, 0, 0, 0)), "Week of Jan 8");
        assert_eq!(week_label(at(2024, 7, 15, 0, 0, 0)), "Week of Jul 15");
    }
}
