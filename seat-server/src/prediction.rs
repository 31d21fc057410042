//! Prediction service client
//!
//! Candidates are probed in order (local backend first, hosted service
//! second) and the first one that answers is cached until a request to it
//! fails.

use std::sync::Arc;
use std::time::Duration;

use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde_json::Value;
use shared::models::{MlEnvelope, MlTodayTomorrow, WeeklyForecast};
use thiserror::Error;
use tokio::sync::RwLock;

/// Path used to check whether a candidate is up
const PROBE_PATH: &str = "/api/predictions/today-tomorrow";

#[derive(Debug, Error)]
pub enum PredictionError {
    #[error("no prediction service is reachable")]
    Unreachable,
    #[error("prediction service error: {0}")]
    Status(StatusCode),
    #[error("prediction service error: {message}")]
    Upstream { status: StatusCode, message: String },
    #[error("{0}")]
    Rejected(String),
    #[error("prediction service request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("invalid prediction payload: {0}")]
    Decode(#[from] serde_json::Error),
}

impl PredictionError {
    fn is_retryable(&self) -> bool {
        match self {
            PredictionError::Unreachable | PredictionError::Transport(_) => true,
            PredictionError::Status(status) | PredictionError::Upstream { status, .. } => {
                status.is_server_error()
            }
            PredictionError::Rejected(_) | PredictionError::Decode(_) => false,
        }
    }
}

/// Timeouts and retry behaviour
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    pub timeout: Duration,
    pub probe_timeout: Duration,
    pub attempts: u32,
    pub delay: Duration,
}

impl RetryPolicy {
    pub fn for_environment(development: bool) -> Self {
        if development {
            Self {
                timeout: Duration::from_secs(5),
                probe_timeout: Duration::from_secs(3),
                attempts: 2,
                delay: Duration::from_secs(1),
            }
        } else {
            Self {
                timeout: Duration::from_secs(15),
                probe_timeout: Duration::from_secs(5),
                attempts: 3,
                delay: Duration::from_secs(1),
            }
        }
    }
}

#[derive(Clone)]
pub struct PredictionClient {
    http: reqwest::Client,
    candidates: Arc<Vec<String>>,
    policy: RetryPolicy,
    resolved: Arc<RwLock<Option<String>>>,
}

impl PredictionClient {
    pub fn new(candidates: Vec<String>, policy: RetryPolicy) -> Result<Self, reqwest::Error> {
        let http = reqwest::Client::builder()
            .timeout(policy.timeout)
            .build()?;
        Ok(Self {
            http,
            candidates: Arc::new(candidates),
            policy,
            resolved: Arc::new(RwLock::new(None)),
        })
    }

    /// Base URL of the first reachable candidate, cached after the first hit
    pub async fn resolve(&self) -> Result<String, PredictionError> {
        if let Some(base) = self.resolved.read().await.clone() {
            return Ok(base);
        }

        for base in self.candidates.iter() {
            if self.probe(base).await {
                tracing::info!(base = %base, "Prediction service selected");
                *self.resolved.write().await = Some(base.clone());
                return Ok(base.clone());
            }
            tracing::debug!(base = %base, "Prediction candidate unreachable");
        }
        Err(PredictionError::Unreachable)
    }

    async fn probe(&self, base: &str) -> bool {
        match self
            .http
            .get(format!("{base}{PROBE_PATH}"))
            .timeout(self.policy.probe_timeout)
            .send()
            .await
        {
            Ok(resp) => resp.status().is_success(),
            Err(_) => false,
        }
    }

    async fn forget(&self, base: &str) {
        let mut resolved = self.resolved.write().await;
        if resolved.as_deref() == Some(base) {
            *resolved = None;
        }
    }

    /// Today/tomorrow forecast (`data` of the service envelope)
    pub async fn today_tomorrow(&self) -> Result<MlTodayTomorrow, PredictionError> {
        self.fetch_data("/api/predictions/today-tomorrow").await
    }

    /// Seven-day forecast keyed `day0`..`day6`
    pub async fn weekly(&self) -> Result<WeeklyForecast, PredictionError> {
        self.fetch_data("/api/predictions/weekly").await
    }

    /// Weekly averages, returned as the service sent them
    pub async fn weekly_averages(&self) -> Result<Value, PredictionError> {
        self.fetch_json("/api/predictions/weekly-averages").await
    }

    async fn fetch_data<T: DeserializeOwned>(&self, path: &str) -> Result<T, PredictionError> {
        let envelope: MlEnvelope<T> = serde_json::from_value(self.fetch_json(path).await?)?;
        envelope
            .data
            .ok_or_else(|| PredictionError::Rejected("prediction service returned no data".to_string()))
    }

    /// GET `path` on the resolved service with retries; the body must carry `success: true`.
    async fn fetch_json(&self, path: &str) -> Result<Value, PredictionError> {
        let attempts = self.policy.attempts.max(1);
        let mut attempt = 1;
        loop {
            let result = match self.resolve().await {
                Ok(base) => {
                    let result = self.fetch_once(&base, path).await;
                    if result.as_ref().is_err_and(PredictionError::is_retryable) {
                        self.forget(&base).await;
                    }
                    result
                }
                Err(e) => Err(e),
            };

            match result {
                Ok(body) => return Ok(body),
                Err(e) if e.is_retryable() && attempt < attempts => {
                    tracing::warn!(path, attempt, error = %e, "Prediction request failed, retrying");
                    attempt += 1;
                    tokio::time::sleep(self.policy.delay).await;
                }
                Err(e) => {
                    tracing::error!(path, attempt, error = %e, "Prediction request failed");
                    return Err(e);
                }
            }
        }
    }

    async fn fetch_once(&self, base: &str, path: &str) -> Result<Value, PredictionError> {
        let resp = self.http.get(format!("{base}{path}")).send().await?;
        let status = resp.status();

        if !status.is_success() {
            let message = resp
                .json::<Value>()
                .await
                .ok()
                .and_then(|b| b.get("error").and_then(Value::as_str).map(str::to_string));
            return Err(match message {
                Some(message) => PredictionError::Upstream { status, message },
                None => PredictionError::Status(status),
            });
        }

        let body: Value = resp.json().await?;
        let envelope: MlEnvelope<serde::de::IgnoredAny> = serde_json::from_value(body.clone())?;
        if !envelope.success {
            let message = envelope
                .error
                .unwrap_or_else(|| "prediction service reported an unexpected error".to_string());
            return Err(PredictionError::Rejected(message));
        }
        Ok(body)
    }
}
