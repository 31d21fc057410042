//! HTTP client for the seat-server REST API

use crate::{ClientConfig, ClientError, ClientResult};
use chrono::NaiveDate;
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use shared::models::{
    Density, DensityRecord, DensityUpdate, FeedbackRequest, OccupyRequest, PickedDays,
    RenameRequest, ResetRequest, Seat, SeatPatch, TodayTomorrow, WeeklyForecast,
    pick_today_tomorrow,
};

/// `{success, data}` wrapper used by the prediction routes
#[derive(Debug, Deserialize)]
struct Envelope<T> {
    data: Option<T>,
}

#[derive(Debug, Deserialize)]
struct ResetResponse {
    seats: Vec<Seat>,
}

/// Averages returned by `GET /api/ml/predict`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryAverages {
    pub density_rate: f64,
    pub occupied_seats: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeekdayPrediction {
    pub day_of_week: u8,
    pub weekday_name: String,
    pub predictions: Option<HistoryAverages>,
}

/// HTTP client for making requests to seat-server
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: Client,
    base_url: String,
}

impl HttpClient {
    /// Create a new HTTP client from configuration
    pub fn new(config: &ClientConfig) -> ClientResult<Self> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout))
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// Make a GET request
    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> ClientResult<T> {
        let response = self.client.get(self.url(path)).send().await?;
        Self::handle_response(response).await
    }

    /// Make a POST request with JSON body
    pub async fn post<T: DeserializeOwned, B: Serialize>(&self, path: &str, body: &B) -> ClientResult<T> {
        let response = self.client.post(self.url(path)).json(body).send().await?;
        Self::handle_response(response).await
    }

    /// Make a POST request without body
    pub async fn post_empty<T: DeserializeOwned>(&self, path: &str) -> ClientResult<T> {
        let response = self.client.post(self.url(path)).send().await?;
        Self::handle_response(response).await
    }

    /// Make a PUT request with JSON body
    pub async fn put<T: DeserializeOwned, B: Serialize>(&self, path: &str, body: &B) -> ClientResult<T> {
        let response = self.client.put(self.url(path)).json(body).send().await?;
        Self::handle_response(response).await
    }

    /// Handle the HTTP response
    async fn handle_response<T: DeserializeOwned>(response: reqwest::Response) -> ClientResult<T> {
        let status = response.status();

        if !status.is_success() {
            let text = response.text().await?;
            let message = error_message(&text);
            tracing::debug!(status = %status, message = %message, "Request failed");
            return match status {
                StatusCode::UNAUTHORIZED => Err(ClientError::Unauthorized),
                StatusCode::NOT_FOUND => Err(ClientError::NotFound(message)),
                StatusCode::BAD_REQUEST => Err(ClientError::Validation(message)),
                StatusCode::TOO_MANY_REQUESTS => Err(ClientError::RateLimited(message)),
                StatusCode::SERVICE_UNAVAILABLE | StatusCode::GONE => {
                    Err(ClientError::Unavailable(message))
                }
                _ => Err(ClientError::Internal(message)),
            };
        }

        response.json().await.map_err(Into::into)
    }

    // ========== Health ==========

    pub async fn health(&self) -> ClientResult<serde_json::Value> {
        self.get("/api/health").await
    }

    // ========== Seats ==========

    /// All 8 seats in id order
    pub async fn seats(&self) -> ClientResult<Vec<Seat>> {
        self.get("/api/seats").await
    }

    pub async fn update_seat(&self, id: i32, patch: &SeatPatch) -> ClientResult<Seat> {
        self.put(&format!("/api/seats/{id}"), patch).await
    }

    pub async fn occupy(&self, id: i32, name: &str) -> ClientResult<Seat> {
        let body = OccupyRequest {
            name: name.to_string(),
        };
        self.post(&format!("/api/seats/{id}/occupy"), &body).await
    }

    pub async fn release(&self, id: i32) -> ClientResult<Seat> {
        self.post_empty(&format!("/api/seats/{id}/release")).await
    }

    pub async fn rename(&self, id: i32, name: &str) -> ClientResult<Seat> {
        let body = RenameRequest {
            name: name.to_string(),
        };
        self.put(&format!("/api/seats/{id}/name"), &body).await
    }

    /// Clear the board; returns the fresh seats
    pub async fn reset_seats(&self, key: &str) -> ClientResult<Vec<Seat>> {
        let body = ResetRequest {
            authorization: key.to_string(),
        };
        let resp: ResetResponse = self.post("/api/reset-seats", &body).await?;
        Ok(resp.seats)
    }

    // ========== Density ==========

    pub async fn density(&self) -> ClientResult<Density> {
        let resp: DensityUpdate = self.get("/api/density").await?;
        Ok(Density::clamped(resp.value))
    }

    /// Store a density value; the server clamps it to 0..=100
    pub async fn set_density(&self, value: i64) -> ClientResult<Density> {
        let resp: DensityUpdate = self.put("/api/density", &DensityUpdate { value }).await?;
        Ok(Density::clamped(resp.value))
    }

    // ========== Predictions ==========

    pub async fn today_tomorrow(&self) -> ClientResult<TodayTomorrow> {
        let env: Envelope<TodayTomorrow> = self.get("/api/predictions/today-tomorrow").await?;
        env.data
            .ok_or_else(|| ClientError::InvalidResponse("Missing forecast data".to_string()))
    }

    pub async fn weekly(&self) -> ClientResult<WeeklyForecast> {
        let env: Envelope<WeeklyForecast> = self.get("/api/predictions/weekly").await?;
        env.data
            .ok_or_else(|| ClientError::InvalidResponse("Missing weekly forecast".to_string()))
    }

    /// Today/tomorrow taken from the 7-day forecast
    pub async fn weekly_today_tomorrow(&self, today: NaiveDate) -> ClientResult<PickedDays> {
        let days = self.weekly().await?;
        Ok(pick_today_tomorrow(&days, today))
    }

    /// Pass-through of the prediction service's weekday averages
    pub async fn weekly_averages(&self) -> ClientResult<serde_json::Value> {
        self.get("/api/predictions/weekly-averages").await
    }

    // ========== History ==========

    /// History average for a weekday (0 = Monday .. 4 = Friday); `None`
    /// when there is no history for that day.
    pub async fn ml_predict(&self, day_of_week: u8) -> ClientResult<Option<WeekdayPrediction>> {
        match self
            .get::<WeekdayPrediction>(&format!("/api/ml/predict?day_of_week={day_of_week}"))
            .await
        {
            Ok(prediction) => Ok(Some(prediction)),
            Err(ClientError::NotFound(_)) => Ok(None),
            Err(e) => Err(e),
        }
    }

    pub async fn weekday_analysis(&self) -> ClientResult<serde_json::Value> {
        self.get("/api/analysis/weekday_analysis").await
    }

    pub async fn density_history(&self) -> ClientResult<Vec<DensityRecord>> {
        #[derive(Deserialize)]
        struct History {
            data: Vec<DensityRecord>,
        }
        let resp: History = self.get("/api/debug/density-history").await?;
        Ok(resp.data)
    }

    // ========== Feedback ==========

    pub async fn send_feedback(&self, feedback: &FeedbackRequest) -> ClientResult<()> {
        self.post::<serde_json::Value, _>("/api/send-feedback", feedback)
            .await?;
        Ok(())
    }
}

/// Pull a readable message out of an error body
fn error_message(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| {
            v.get("error")
                .or_else(|| v.get("message"))
                .and_then(|m| m.as_str())
                .map(str::to_string)
        })
        .unwrap_or_else(|| body.to_string())
}
