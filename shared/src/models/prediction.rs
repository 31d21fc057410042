//! Occupancy forecast types
//!
//! `Ml*` types mirror what the prediction service returns; the rest are the
//! shapes served to the dashboard.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One day in the prediction service's today/tomorrow response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MlDayForecast {
    pub weekday_name: String,
    pub occupancy_rate: f64,
    pub occupied_seats: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MlTodayTomorrow {
    pub today: MlDayForecast,
    pub tomorrow: MlDayForecast,
}

/// Envelope used by every prediction service endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MlEnvelope<T> {
    #[serde(default)]
    pub success: bool,
    pub data: Option<T>,
    pub error: Option<String>,
}

/// A dated forecast as shown on the dashboard
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DayForecast {
    /// `YYYY-MM-DD`
    pub date: String,
    pub day_of_week: String,
    pub occupancy_rate: f64,
    pub occupied_seats: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TodayTomorrow {
    pub today: DayForecast,
    pub tomorrow: DayForecast,
}

impl TodayTomorrow {
    /// Attach calendar dates to the service's weekday-only forecast.
    pub fn from_ml(data: MlTodayTomorrow, today: NaiveDate) -> Self {
        let tomorrow = today.succ_opt().unwrap_or(today);
        Self {
            today: DayForecast {
                date: today.format("%Y-%m-%d").to_string(),
                day_of_week: data.today.weekday_name,
                occupancy_rate: data.today.occupancy_rate,
                occupied_seats: data.today.occupied_seats,
            },
            tomorrow: DayForecast {
                date: tomorrow.format("%Y-%m-%d").to_string(),
                day_of_week: data.tomorrow.weekday_name,
                occupancy_rate: data.tomorrow.occupancy_rate,
                occupied_seats: data.tomorrow.occupied_seats,
            },
        }
    }
}

/// One entry of the 7-day forecast (`day0`..`day6`)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeeklyForecastDay {
    pub date: String,
    /// Monday = 0 .. Sunday = 6
    pub weekday: u8,
    pub weekday_name: String,
    #[serde(default)]
    pub is_weekend: bool,
    pub occupancy_rate: f64,
    pub occupied_seats: f64,
}

pub type WeeklyForecast = BTreeMap<String, WeeklyForecastDay>;

/// Today/tomorrow picked out of a weekly forecast
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PickedDays {
    pub today: Option<WeeklyForecastDay>,
    pub tomorrow: Option<WeeklyForecastDay>,
}

/// Find today and tomorrow by date, falling back to the weekday index for
/// whichever one the date lookup missed.
pub fn pick_today_tomorrow(days: &WeeklyForecast, today: NaiveDate) -> PickedDays {
    let tomorrow = today.succ_opt().unwrap_or(today);
    let today_str = today.format("%Y-%m-%d").to_string();
    let tomorrow_str = tomorrow.format("%Y-%m-%d").to_string();

    let mut picked = PickedDays {
        today: days.values().find(|d| d.date == today_str).cloned(),
        tomorrow: days.values().find(|d| d.date == tomorrow_str).cloned(),
    };

    let today_wd = crate::util::weekday_index(today);
    let tomorrow_wd = (today_wd + 1) % 7;
    if picked.today.is_none() {
        picked.today = days.values().find(|d| d.weekday == today_wd).cloned();
    }
    if picked.tomorrow.is_none() {
        picked.tomorrow = days.values().find(|d| d.weekday == tomorrow_wd).cloned();
    }
    picked
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(date: &str, weekday: u8) -> WeeklyForecastDay {
        WeeklyForecastDay {
            date: date.to_string(),
            weekday,
            weekday_name: crate::util::weekday_name(weekday).unwrap().to_string(),
            is_weekend: weekday >= 5,
            occupancy_rate: 0.5,
            occupied_seats: 4.0,
        }
    }

    #[test]
    fn from_ml_dates_today_and_tomorrow() {
        let ml = MlTodayTomorrow {
            today: MlDayForecast {
                weekday_name: "Friday".into(),
                occupancy_rate: 0.62,
                occupied_seats: 5.0,
            },
            tomorrow: MlDayForecast {
                weekday_name: "Saturday".into(),
                occupancy_rate: 0.1,
                occupied_seats: 1.0,
            },
        };
        let today = NaiveDate::from_ymd_opt(2025, 12, 31).unwrap();
        let out = TodayTomorrow::from_ml(ml, today);
        assert_eq!(out.today.date, "2025-12-31");
        assert_eq!(out.today.day_of_week, "Friday");
        assert_eq!(out.tomorrow.date, "2026-01-01");
        assert_eq!(out.tomorrow.occupied_seats, 1.0);
    }

    #[test]
    fn pick_prefers_exact_dates() {
        let mut days = WeeklyForecast::new();
        days.insert("day0".into(), day("2025-06-02", 0));
        days.insert("day1".into(), day("2025-06-03", 1));
        let picked = pick_today_tomorrow(&days, NaiveDate::from_ymd_opt(2025, 6, 2).unwrap());
        assert_eq!(picked.today.unwrap().date, "2025-06-02");
        assert_eq!(picked.tomorrow.unwrap().date, "2025-06-03");
    }

    #[test]
    fn pick_falls_back_to_weekday() {
        // Stale forecast from the previous week
        let mut days = WeeklyForecast::new();
        days.insert("day0".into(), day("2025-05-26", 0));
        days.insert("day1".into(), day("2025-05-27", 1));
        let picked = pick_today_tomorrow(&days, NaiveDate::from_ymd_opt(2025, 6, 2).unwrap());
        assert_eq!(picked.today.unwrap().weekday, 0);
        assert_eq!(picked.tomorrow.unwrap().weekday, 1);
    }

    #[test]
    fn pick_sunday_wraps_to_monday() {
        let mut days = WeeklyForecast::new();
        days.insert("day0".into(), day("2025-05-26", 0));
        let picked = pick_today_tomorrow(&days, NaiveDate::from_ymd_opt(2025, 6, 8).unwrap());
        assert!(picked.today.is_none());
        assert_eq!(picked.tomorrow.unwrap().weekday, 0);
    }
}
