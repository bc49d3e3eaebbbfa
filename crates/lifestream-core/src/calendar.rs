//! Date math for the calendar grids.
//!
//! Pure helpers; rendering belongs to whatever front end sits on top.

use chrono::{DateTime, Datelike, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::event::CalendarEvent;

/// Which grid the user is looking at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ViewMode {
    Month,
    Week,
    Day,
}

/// Every day of the given month, in order. Empty for an invalid month.
pub fn days_in_month(year: i32, month: u32) -> Vec<NaiveDate> {
    let Some(mut day) = NaiveDate::from_ymd_opt(year, month, 1) else {
        return Vec::new();
    };
    let mut days = Vec::new();
    while day.month() == month {
        days.push(day);
        day = match day.succ_opt() {
            Some(next) => next,
            None => break,
        };
    }
    days
}

/// The Sunday-through-Saturday week containing `date` (Sunday start, to
/// match the grid headers).
pub fn week_of(date: NaiveDate) -> [NaiveDate; 7] {
    let back = i64::from(date.weekday().num_days_from_sunday());
    let sunday = date - Duration::days(back);
    std::array::from_fn(|i| sunday + Duration::days(i as i64))
}

pub fn same_day(a: DateTime<Utc>, b: DateTime<Utc>) -> bool {
    a.date_naive() == b.date_naive()
}

/// Events whose start falls on `day`.
pub fn events_on_day(events: &[CalendarEvent], day: NaiveDate) -> Vec<&CalendarEvent> {
    events
        .iter()
        .filter(|e| e.start.date_naive() == day)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Weekday};

    #[test]
    fn month_lengths() {
        assert_eq!(days_in_month(2024, 2).len(), 29);
        assert_eq!(days_in_month(2025, 2).len(), 28);
        assert_eq!(days_in_month(2024, 12).len(), 31);
        assert!(days_in_month(2024, 13).is_empty());
    }

    #[test]
    fn week_starts_on_sunday() {
        // 2024-03-06 is a Wednesday.
        let week = week_of(NaiveDate::from_ymd_opt(2024, 3, 6).unwrap());
        assert_eq!(week[0].weekday(), Weekday::Sun);
        assert_eq!(week[0], NaiveDate::from_ymd_opt(2024, 3, 3).unwrap());
        assert_eq!(week[6], NaiveDate::from_ymd_opt(2024, 3, 9).unwrap());
        // A Sunday is the head of its own week.
        assert_eq!(week_of(week[0])[0], week[0]);
    }

    #[test]
    fn events_filter_by_start_day() {
        let start = Utc.with_ymd_and_hms(2024, 3, 6, 9, 0, 0).unwrap();
        let a = CalendarEvent::new("A", start, start + Duration::hours(1)).unwrap();
        let b = CalendarEvent::new(
            "B",
            start + Duration::days(1),
            start + Duration::days(1) + Duration::hours(1),
        )
        .unwrap();
        let events = vec![a, b];

        let day = NaiveDate::from_ymd_opt(2024, 3, 6).unwrap();
        let on_day = events_on_day(&events, day);
        assert_eq!(on_day.len(), 1);
        assert_eq!(on_day[0].title, "A");
    }

    #[test]
    fn view_mode_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&ViewMode::Month).unwrap(), "\"month\"");
        let parsed: ViewMode = serde_json::from_str("\"week\"").unwrap();
        assert_eq!(parsed, ViewMode::Week);
    }

    #[test]
    fn same_day_ignores_time_of_day() {
        let morning = Utc.with_ymd_and_hms(2024, 3, 6, 1, 0, 0).unwrap();
        let night = Utc.with_ymd_and_hms(2024, 3, 6, 23, 59, 0).unwrap();
        let next = Utc.with_ymd_and_hms(2024, 3, 7, 0, 0, 0).unwrap();
        assert!(same_day(morning, night));
        assert!(!same_day(night, next));
    }
}
