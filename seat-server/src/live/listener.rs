//! Postgres LISTEN bridge feeding the hub

use std::time::Duration;

use shared::message::{BoardChange, NOTIFY_CHANNEL};
use shared::util::now_hhmm;
use sqlx::PgPool;
use sqlx::postgres::PgListener;

use super::LiveBoardHub;
use crate::db::{self, BoxError};

const RECONNECT_DELAY: Duration = Duration::from_secs(5);

/// Run forever: listen, decode, apply. Reconnects after any failure.
pub async fn run(pool: PgPool, hub: LiveBoardHub) {
    loop {
        if let Err(e) = listen(&pool, &hub).await {
            tracing::error!(error = %e, "Board listener failed, reconnecting");
        }
        tokio::time::sleep(RECONNECT_DELAY).await;
    }
}

async fn listen(pool: &PgPool, hub: &LiveBoardHub) -> Result<(), BoxError> {
    let mut listener = PgListener::connect_with(pool).await?;
    listener.listen(NOTIFY_CHANNEL).await?;
    tracing::info!(channel = NOTIFY_CHANNEL, "Board listener subscribed");

    // LISTEN is active before the reload, so no change can fall in between
    reload(pool, hub).await?;

    loop {
        match listener.try_recv().await? {
            Some(notification) => handle_payload(hub, notification.payload()).await,
            None => {
                tracing::warn!("Board listener connection lost, reloading mirror");
                reload(pool, hub).await?;
            }
        }
    }
}

async fn handle_payload(hub: &LiveBoardHub, payload: &str) {
    match BoardChange::from_notification(payload) {
        Ok(Some(change)) => {
            tracing::debug!(?change, "Board change");
            hub.apply(change, &now_hhmm()).await;
        }
        Ok(None) => {}
        Err(e) => tracing::warn!(error = %e, payload, "Undecodable board notification"),
    }
}

/// Rebuild the hub mirror from the database
pub async fn reload(pool: &PgPool, hub: &LiveBoardHub) -> Result<(), BoxError> {
    let now = now_hhmm();
    db::seats::seed_missing(pool, &now).await?;
    let seats = db::seats::list(pool).await?;
    let density = db::settings::ensure_density(pool).await?;
    hub.load(&seats, density, &now).await;
    tracing::debug!(seats = seats.len(), density = density.value(), "Board mirror reloaded");
    Ok(())
}
