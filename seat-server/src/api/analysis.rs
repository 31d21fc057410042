//! History-based weekday statistics

use axum::{
    Json,
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use shared::models::{DensityRecord, WeekdayAverages};
use shared::util::{round2, weekday_name};

use crate::db;
use crate::error::ServiceError;
use crate::state::AppState;

/// Rows averaged by `/api/ml/predict`
const PREDICT_SAMPLE: i64 = 100;
/// Rows scanned by `/api/analysis/weekday_analysis`
const ANALYSIS_SAMPLE: i64 = 200;
/// Monday..Friday
const WORKDAYS: u8 = 5;

/// Mean density rate and occupied seats, both rounded to 2 decimals
pub fn average<'a>(records: impl IntoIterator<Item = &'a DensityRecord>) -> Option<WeekdayAverages> {
    let (mut density_sum, mut seats_sum, mut n) = (0.0, 0.0, 0usize);
    for r in records {
        density_sum += r.density_rate;
        seats_sum += r.occupied_seats as f64;
        n += 1;
    }
    (n > 0).then(|| WeekdayAverages {
        density_rate: round2(density_sum / n as f64),
        occupied_seats: round2(seats_sum / n as f64),
    })
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DayStats {
    pub record_count: usize,
    pub predictions: Option<WeekdayAverages>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Monday..Friday in calendar order
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailyPredictions {
    pub monday: DayStats,
    pub tuesday: DayStats,
    pub wednesday: DayStats,
    pub thursday: DayStats,
    pub friday: DayStats,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OverallStats {
    /// Weekday records that went into the analysis
    pub record_count: usize,
    /// Mean of the per-day means (days without data excluded)
    pub density_rate_mean: f64,
    pub occupied_seats_mean: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Summary {
    pub overall: OverallStats,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeekdayAnalysis {
    pub detailed_stats: serde_json::Map<String, serde_json::Value>,
    pub daily_predictions: DailyPredictions,
    pub summary: Summary,
}

/// Group weekday records by day and average each group. Weekend rows are ignored.
pub fn analyze_weekdays(records: &[DensityRecord]) -> WeekdayAnalysis {
    let mut days: Vec<DayStats> = (0..WORKDAYS)
        .map(|day| {
            let rows: Vec<&DensityRecord> = records
                .iter()
                .filter(|r| r.day_of_week == day as i16)
                .collect();
            let predictions = average(rows.iter().copied());
            DayStats {
                record_count: rows.len(),
                message: predictions
                    .is_none()
                    .then(|| "No history for this weekday".to_string()),
                predictions,
            }
        })
        .collect();

    let with_data: Vec<&WeekdayAverages> =
        days.iter().filter_map(|d| d.predictions.as_ref()).collect();
    let mean = |f: fn(&WeekdayAverages) -> f64| {
        if with_data.is_empty() {
            0.0
        } else {
            round2(with_data.iter().map(|a| f(a)).sum::<f64>() / with_data.len() as f64)
        }
    };
    let overall = OverallStats {
        record_count: days.iter().map(|d| d.record_count).sum(),
        density_rate_mean: mean(|a| a.density_rate),
        occupied_seats_mean: mean(|a| a.occupied_seats),
    };

    let mut take = || days.remove(0);
    WeekdayAnalysis {
        detailed_stats: serde_json::Map::new(),
        daily_predictions: DailyPredictions {
            monday: take(),
            tuesday: take(),
            wednesday: take(),
            thursday: take(),
            friday: take(),
        },
        summary: Summary { overall },
    }
}

#[derive(Debug, Deserialize)]
pub struct PredictQuery {
    day_of_week: Option<String>,
}

fn bad_day(error: &str) -> Response {
    (
        StatusCode::BAD_REQUEST,
        Json(json!({
            "success": false,
            "error": error,
            "message": "day_of_week must be 0-4 (0: Monday .. 4: Friday)",
        })),
    )
        .into_response()
}

/// GET /api/ml/predict?day_of_week=0..4
pub async fn ml_predict(
    State(state): State<AppState>,
    Query(query): Query<PredictQuery>,
) -> Result<Response, ServiceError> {
    let Some(raw) = query.day_of_week.filter(|s| !s.trim().is_empty()) else {
        return Ok(bad_day("day_of_week is required"));
    };
    let day = match raw.trim().parse::<u8>() {
        Ok(day) if day < WORKDAYS => day,
        _ => return Ok(bad_day("invalid day_of_week")),
    };
    let name = weekday_name(day).unwrap_or_default();

    let rows = db::history::latest_for_day(&state.pool, day as i16, PREDICT_SAMPLE).await?;
    let response = match average(&rows) {
        Some(avg) => (
            StatusCode::OK,
            Json(json!({
                "success": true,
                "day_of_week": day,
                "weekday_name": name,
                "predictions": {
                    "density_rate": avg.density_rate,
                    "occupied_seats": avg.occupied_seats.round() as i64,
                },
                "message": "Average of recorded history",
            })),
        ),
        None => (
            StatusCode::NOT_FOUND,
            Json(json!({
                "success": false,
                "day_of_week": day,
                "weekday_name": name,
                "predictions": null,
                "message": "No history for this weekday",
            })),
        ),
    };
    Ok(response.into_response())
}

/// GET /api/analysis/weekday_analysis
pub async fn weekday_analysis(
    State(state): State<AppState>,
) -> Result<Json<serde_json::Value>, ServiceError> {
    let rows = db::history::latest(&state.pool, ANALYSIS_SAMPLE).await?;
    Ok(Json(json!({
        "success": true,
        "data": analyze_weekdays(&rows),
        "message": "Weekday averages from recorded history",
    })))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn record(day: i16, seats: i32, rate: f64) -> DensityRecord {
        DensityRecord {
            id: 0,
            day_of_week: day,
            occupied_seats: seats,
            density_rate: rate,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn average_rounds_to_two_decimals() {
        let rows = vec![record(0, 3, 40.0), record(0, 4, 45.0), record(0, 4, 50.0)];
        let avg = average(&rows).unwrap();
        assert_eq!(avg.density_rate, 45.0);
        assert_eq!(avg.occupied_seats, 3.67);
        assert!(average(&[]).is_none());
    }

    #[test]
    fn analysis_groups_weekdays_and_skips_weekends() {
        let rows = vec![
            record(0, 2, 20.0),
            record(0, 4, 40.0),
            record(2, 6, 70.0),
            record(5, 8, 100.0),
        ];
        let analysis = analyze_weekdays(&rows);
        let daily = &analysis.daily_predictions;

        assert_eq!(daily.monday.record_count, 2);
        assert_eq!(daily.monday.predictions.as_ref().unwrap().density_rate, 30.0);
        assert_eq!(daily.tuesday.record_count, 0);
        assert!(daily.tuesday.predictions.is_none());
        assert!(daily.tuesday.message.is_some());
        assert_eq!(daily.wednesday.predictions.as_ref().unwrap().occupied_seats, 6.0);

        let overall = &analysis.summary.overall;
        assert_eq!(overall.record_count, 3);
        assert_eq!(overall.density_rate_mean, 50.0);
        assert_eq!(overall.occupied_seats_mean, 4.5);
    }

    #[test]
    fn empty_history_gives_zero_summary() {
        let analysis = analyze_weekdays(&[]);
        assert_eq!(analysis.summary.overall.record_count, 0);
        assert_eq!(analysis.summary.overall.density_rate_mean, 0.0);

        let json = serde_json::to_value(&analysis).unwrap();
        assert!(json["daily_predictions"]["friday"]["predictions"].is_null());
        assert_eq!(json["detailed_stats"], json!({}));
    }
}
