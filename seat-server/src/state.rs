//! Application state for seat-server

use std::sync::Arc;
use std::sync::atomic::AtomicUsize;

use aws_sdk_sesv2::Client as SesClient;
use dashmap::DashMap;
use sqlx::PgPool;

use crate::auth::{BasicCredentials, RateLimiter};
use crate::config::Config;
use crate::live::LiveBoardHub;
use crate::prediction::{PredictionClient, RetryPolicy};

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// PostgreSQL connection pool
    pub pool: PgPool,
    /// Live board mirror + broadcast
    pub hub: LiveBoardHub,
    /// Prediction service client
    pub predictions: PredictionClient,
    /// AWS SES client for feedback mail
    pub ses: SesClient,
    /// SES sender email address
    pub ses_from_email: String,
    /// Feedback notice recipient
    pub feedback_to_email: String,
    /// Shared secret for board reset
    pub reset_api_key: String,
    /// Static site login (None = site locked)
    pub basic_auth: Option<BasicCredentials>,
    /// Rate limiter for feedback/reset routes
    pub rate_limiter: RateLimiter,
    /// Open live WebSocket sessions per client IP
    pub live_connections: Arc<DashMap<String, AtomicUsize>>,
}

impl AppState {
    /// Create a new AppState
    pub async fn new(config: &Config) -> Result<Self, BoxError> {
        let pool = PgPool::connect(&config.database_url).await?;

        sqlx::migrate!("./migrations").run(&pool).await?;

        let aws_config = aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await;
        let ses = if let Ok(ses_region) = std::env::var("SES_REGION") {
            let ses_config = aws_config
                .to_builder()
                .region(aws_config::Region::new(ses_region))
                .build();
            SesClient::new(&ses_config)
        } else {
            SesClient::new(&aws_config)
        };

        let predictions = PredictionClient::new(
            config.ml_backend_urls.clone(),
            RetryPolicy::for_environment(config.is_development()),
        )?;

        let basic_auth = BasicCredentials::from_parts(
            config.auth_username.clone(),
            config.auth_password_hash.clone(),
        );
        if basic_auth.is_none() {
            tracing::warn!("AUTH_USERNAME/AUTH_PASSWORD_HASH not set, static site will reject all logins");
        }

        Ok(Self {
            pool,
            hub: LiveBoardHub::new(&shared::util::now_hhmm()),
            predictions,
            ses,
            ses_from_email: config.ses_from_email.clone(),
            feedback_to_email: config.feedback_to_email.clone(),
            reset_api_key: config.reset_api_key.clone(),
            basic_auth,
            rate_limiter: RateLimiter::new(),
            live_connections: Arc::new(DashMap::new()),
        })
    }
}
