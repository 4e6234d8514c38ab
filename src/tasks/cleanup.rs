//! TTL Cleanup Task
//!
//! Background task that periodically removes expired cache entries.

use std::sync::Weak;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::cache::CacheStore;

/// Spawns a background task that periodically cleans up expired cache entries.
///
/// The task sleeps for `interval` between sweeps and stops when `token` is
/// cancelled or the store has been dropped. It only holds a `Weak` reference,
/// so it never keeps the cache alive, and the runtime does not wait on it at
/// shutdown.
///
/// The token is checked again while the store lock is held: once a caller
/// has cancelled the token and then acquired the lock, no later sweep can run.
///
/// Must be called from within a tokio runtime.
pub fn spawn_cleanup_task<V>(
    store: Weak<Mutex<CacheStore<V>>>,
    interval: Duration,
    token: CancellationToken,
) -> JoinHandle<()>
where
    V: Send + 'static,
{
    tokio::spawn(async move {
        info!(
            "Starting TTL cleanup task with interval of {} ms",
            interval.as_millis()
        );

        loop {
            tokio::select! {
                _ = token.cancelled() => break,
                _ = tokio::time::sleep(interval) => {}
            }

            let Some(shared) = store.upgrade() else {
                break;
            };

            let removed = {
                let mut guard = shared.lock();
                if token.is_cancelled() {
                    break;
                }
                guard.cleanup_expired()
            };

            if removed > 0 {
                info!("TTL cleanup: removed {} expired entries", removed);
            } else {
                debug!("TTL cleanup: no expired entries found");
            }
        }

        debug!("TTL cleanup task stopped");
    })
}
