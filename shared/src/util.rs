use chrono::{DateTime, Datelike, NaiveDate, TimeZone, Timelike};

/// Current UTC timestamp in milliseconds
pub fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

/// Wall-clock time of day as `HH:MM`, the format stored in `seats.updated_date`
pub fn time_of_day<Tz: TimeZone>(at: &DateTime<Tz>) -> String {
    format!("{:02}:{:02}", at.hour(), at.minute())
}

/// Local `HH:MM` right now
pub fn now_hhmm() -> String {
    time_of_day(&chrono::Local::now())
}

/// Weekday index with Monday = 0 .. Sunday = 6
pub fn weekday_index(date: NaiveDate) -> u8 {
    date.weekday().num_days_from_monday() as u8
}

/// English weekday name for a Monday-based index
pub fn weekday_name(index: u8) -> Option<&'static str> {
    const NAMES: [&str; 7] = [
        "monday",
        "tuesday",
        "wednesday",
        "thursday",
        "friday",
        "saturday",
        "sunday",
    ];
    NAMES.get(index as usize).copied()
}

/// Round to two decimal places
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn time_of_day_is_zero_padded() {
        let at = Utc.with_ymd_and_hms(2025, 6, 2, 9, 5, 59).unwrap();
        assert_eq!(time_of_day(&at), "09:05");
    }

    #[test]
    fn weekday_index_starts_on_monday() {
        let monday = NaiveDate::from_ymd_opt(2025, 6, 2).unwrap();
        assert_eq!(weekday_index(monday), 0);
        assert_eq!(weekday_index(monday + chrono::Duration::days(6)), 6);
        assert_eq!(weekday_name(4), Some("friday"));
        assert_eq!(weekday_name(7), None);
    }

    #[test]
    fn round2_matches_dashboard_rounding() {
        assert_eq!(round2(33.3333), 33.33);
        assert_eq!(round2(12.345678), 12.35);
        assert_eq!(round2(0.0), 0.0);
    }
}
