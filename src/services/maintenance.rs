use sqlx::SqlitePool;

use crate::config::CleanupConfig;
use crate::db::repository::ShareLinkRepository;

// ============================================================================
// Maintenance Worker
// ============================================================================

/// Spawn the periodic sweep that deactivates expired and use-exhausted
/// share links.
///
/// Housekeeping only: resolution checks expiry and exhaustion lazily, so
/// the system is correct with this worker disabled. The task listens on a
/// `broadcast` channel and exits on shutdown.
pub fn spawn_cleanup_worker(
    pool: SqlitePool,
    config: CleanupConfig,
    shutdown: tokio::sync::broadcast::Sender<()>,
) -> tokio::task::JoinHandle<()> {
    let mut shutdown_rx = shutdown.subscribe();

    tokio::spawn(async move {
        loop {
            if !config.enabled {
                tokio::select! {
                    _ = shutdown_rx.recv() => {
                        tracing::info!("Share link cleanup worker shutting down");
                        break;
                    }
                    _ = tokio::time::sleep(std::time::Duration::from_secs(60)) => {}
                }
                continue;
            }

            match ShareLinkRepository::deactivate_dead_links(&pool).await {
                Ok(0) => {}
                Ok(n) => tracing::info!("Deactivated {} dead share links", n),
                Err(e) => tracing::warn!("Share link sweep failed: {:?}", e),
            }

            tokio::select! {
                _ = shutdown_rx.recv() => {
                    tracing::info!("Share link cleanup worker shutting down");
                    break;
                }
                _ = tokio::time::sleep(std::time::Duration::from_secs(config.interval_seconds)) => {}
            }
        }
    })
}
