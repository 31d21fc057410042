//! Seat server configuration

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Hosted prediction service, tried after the local backend
const HOSTED_ML_URL: &str = "https://real-time-seating-app-ml.vercel.app";
const LOCAL_ML_URL: &str = "http://localhost:8000";

/// Seat server configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// PostgreSQL connection URL
    pub database_url: String,
    /// HTTP port
    pub http_port: u16,
    /// Environment: development | staging | production
    pub environment: String,
    /// Prediction service base URLs in probe order
    pub ml_backend_urls: Vec<String>,
    /// Shared secret for `POST /api/reset-seats`
    pub reset_api_key: String,
    /// Basic auth username for the static site
    pub auth_username: Option<String>,
    /// Argon2 PHC hash of the basic auth password
    pub auth_password_hash: Option<String>,
    /// SES sender email address
    pub ses_from_email: String,
    /// Recipient of feedback notices
    pub feedback_to_email: String,
    /// Local hour (0-23) after which the nightly reset runs
    pub reset_hour: u32,
    /// Directory served under `/` behind basic auth
    pub static_dir: Option<String>,
}

impl Config {
    /// Require a secret env var: must be set and non-empty in non-development environments.
    fn require_secret(name: &str, environment: &str) -> Result<String, BoxError> {
        let val = match std::env::var(name) {
            Ok(v) => v,
            Err(_) => {
                if environment != "development" {
                    return Err(format!("{name} must be set in {environment} environment").into());
                }
                format!("dev-{name}-not-for-production")
            }
        };
        if val.is_empty() && environment != "development" {
            return Err(format!("{name} must not be empty in {environment} environment").into());
        }
        Ok(val)
    }

    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, BoxError> {
        let environment = std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".into());

        let reset_hour = std::env::var("RESET_HOUR")
            .ok()
            .and_then(|h| h.parse().ok())
            .unwrap_or(21);
        if reset_hour > 23 {
            return Err(format!("RESET_HOUR must be 0-23, got {reset_hour}").into());
        }

        Ok(Self {
            database_url: std::env::var("DATABASE_URL").map_err(|_| "DATABASE_URL must be set")?,
            http_port: std::env::var("HTTP_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(8080),
            ml_backend_urls: std::env::var("ML_BACKEND_URLS")
                .ok()
                .map(|v| parse_url_list(&v))
                .filter(|urls| !urls.is_empty())
                .unwrap_or_else(default_ml_urls),
            reset_api_key: Self::require_secret("RESET_API_KEY", &environment)?,
            auth_username: std::env::var("AUTH_USERNAME").ok().filter(|s| !s.is_empty()),
            auth_password_hash: std::env::var("AUTH_PASSWORD_HASH")
                .ok()
                .filter(|s| !s.is_empty()),
            ses_from_email: std::env::var("SES_FROM_EMAIL")
                .unwrap_or_else(|_| "noreply@seatboard.app".into()),
            feedback_to_email: std::env::var("FEEDBACK_TO_EMAIL")
                .unwrap_or_else(|_| "admin@seatboard.app".into()),
            reset_hour,
            static_dir: std::env::var("STATIC_DIR").ok().filter(|s| !s.is_empty()),
            environment,
        })
    }

    pub fn is_development(&self) -> bool {
        self.environment == "development"
    }
}

fn default_ml_urls() -> Vec<String> {
    vec![LOCAL_ML_URL.to_string(), HOSTED_ML_URL.to_string()]
}

/// Split a comma list, dropping blanks and trailing slashes
fn parse_url_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().trim_end_matches('/'))
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}
