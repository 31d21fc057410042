//! seat-server: Shared seating board service
//!
//! Long-running service that:
//! - Stores the 8-seat board and congestion level in PostgreSQL
//! - Pushes board changes to browsers over WebSocket (LISTEN/NOTIFY mirror)
//! - Proxies the external prediction service with failover and retry
//! - Records a nightly density snapshot and resets the board
//! - Relays user feedback by email (AWS SES)
//!
//! `seat-server hash-password <password>` prints an argon2 hash for
//! `AUTH_PASSWORD_HASH` and exits.

mod api;
mod auth;
mod config;
mod db;
mod email;
mod error;
mod live;
mod prediction;
mod state;
mod tasks;
mod util;

#[cfg(test)]
mod test_support;

use std::net::SocketAddr;

use config::Config;
use state::AppState;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[tokio::main]
async fn main() -> Result<(), BoxError> {
    let mut args = std::env::args().skip(1);
    if args.next().as_deref() == Some("hash-password") {
        let password = args.next().ok_or("usage: seat-server hash-password <password>")?;
        let hash = util::hash_password(&password).map_err(|e| e.to_string())?;
        println!("{hash}");
        return Ok(());
    }

    // Load .env file
    let _ = dotenvy::dotenv();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "seat_server=info,tower_http=info".into()),
        )
        .init();

    let config = Config::from_env()?;

    tracing::info!("Starting seat-server (env: {})", config.environment);

    // Initialize application state
    let state = AppState::new(&config).await?;

    // Board mirror fed by NOTIFY
    tokio::spawn(live::listener::run(state.pool.clone(), state.hub.clone()));

    // Nightly snapshot + reset
    tokio::spawn(tasks::run_nightly_reset(
        state.pool.clone(),
        config.reset_hour,
    ));

    // Periodic rate limiter cleanup (every 5 minutes)
    let rate_limiter = state.rate_limiter.clone();
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(std::time::Duration::from_secs(300));
        loop {
            interval.tick().await;
            rate_limiter.cleanup().await;
        }
    });

    let app = api::create_router(state, config.static_dir.as_deref());

    let http_addr = format!("0.0.0.0:{}", config.http_port);
    let listener = tokio::net::TcpListener::bind(&http_addr).await?;
    tracing::info!("seat-server HTTP listening on {http_addr}");

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}
