//! API routes for seat-server

pub mod analysis;
pub mod debug;
pub mod density;
pub mod feedback;
pub mod health;
pub mod live_ws;
pub mod predictions;
pub mod reset;
pub mod seats;

use crate::auth::basic_auth;
use crate::auth::rate_limit::{feedback_rate_limit, reset_rate_limit};
use crate::state::AppState;
use axum::http::StatusCode;
use axum::routing::{get, post, put};
use axum::{Router, middleware};
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

/// Create the combined router
///
/// `/api/*` is open (CORS permissive); everything else is the optional
/// static site behind basic auth.
pub fn create_router(state: AppState, static_dir: Option<&str>) -> Router {
    // Abusable writes (per-IP rate limited)
    let reset = Router::new()
        .route("/api/reset-seats", post(reset::reset_seats))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            reset_rate_limit,
        ));
    let feedback = Router::new()
        .route("/api/send-feedback", post(feedback::send_feedback))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            feedback_rate_limit,
        ));

    let api = Router::new()
        .route("/api/health", get(health::health_check))
        // Board
        .route("/api/seats", get(seats::list_seats))
        .route("/api/seats/{id}", put(seats::update_seat))
        .route("/api/seats/{id}/occupy", post(seats::occupy_seat))
        .route("/api/seats/{id}/release", post(seats::release_seat))
        .route("/api/seats/{id}/name", put(seats::rename_seat))
        .route(
            "/api/density",
            get(density::get_density).put(density::set_density),
        )
        .route("/api/live/ws", get(live_ws::handle_live_ws))
        // Predictions
        .route(
            "/api/predictions/today-tomorrow",
            get(predictions::today_tomorrow),
        )
        .route(
            "/api/predictions/weekly-averages",
            get(predictions::weekly_averages),
        )
        .route("/api/predictions/weekly", get(predictions::weekly))
        .route(
            "/api/predictions/weekly-average",
            get(predictions::weekly_average_gone),
        )
        // History
        .route("/api/ml/predict", get(analysis::ml_predict))
        .route(
            "/api/analysis/weekday_analysis",
            get(analysis::weekday_analysis),
        )
        .route("/api/debug/density-history", get(debug::density_history))
        .merge(reset)
        .merge(feedback)
        .layer(CorsLayer::permissive());

    let site = match static_dir {
        Some(dir) => Router::new().fallback_service(ServeDir::new(dir)),
        None => Router::new().fallback(site_not_found),
    }
    .layer(middleware::from_fn_with_state(state.clone(), basic_auth));

    Router::new()
        .merge(api)
        .merge(site)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn site_not_found() -> StatusCode {
    StatusCode::NOT_FOUND
}
