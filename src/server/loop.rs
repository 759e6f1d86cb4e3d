// Server loop module
// Accepts connections until shutdown is signalled

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::Notify;

use super::connection::accept_connection;
use crate::config;
use crate::logger;

/// How long in-flight connections get to finish after shutdown
const DRAIN_TIMEOUT: Duration = Duration::from_secs(5);

/// Run the accept loop on the current `LocalSet`.
///
/// Returns once `shutdown` fires and open connections have drained
/// (or `DRAIN_TIMEOUT` elapses).
#[allow(clippy::ignored_unit_patterns)]
pub async fn start_server_loop(
    listener: TcpListener,
    state: Arc<config::AppState>,
    active_connections: Arc<AtomicUsize>,
    shutdown: Arc<Notify>,
) {
    loop {
        tokio::select! {
            accept_result = listener.accept() => {
                match accept_result {
                    Ok((stream, peer_addr)) => {
                        accept_connection(stream, peer_addr, &state, &active_connections);
                    }
                    Err(e) => {
                        logger::log_error(&format!("Failed to accept connection: {e}"));
                    }
                }
            }

            _ = shutdown.notified() => {
                logger::log_shutdown();
                break;
            }
        }
    }

    drop(listener);
    drain_connections(&active_connections).await;
}

async fn drain_connections(active_connections: &AtomicUsize) {
    let deadline = tokio::time::Instant::now() + DRAIN_TIMEOUT;
    while active_connections.load(Ordering::SeqCst) > 0 {
        if tokio::time::Instant::now() >= deadline {
            logger::log_warning(&format!(
                "Closing with {} connection(s) still open",
                active_connections.load(Ordering::SeqCst)
            ));
            return;
        }
        tokio::time::sleep(Duration::from_millis(50)).await;
    }
    logger::log_info("All connections closed");
}
