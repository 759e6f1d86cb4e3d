use std::sync::atomic::AtomicUsize;
use std::sync::Arc;
use tokio::sync::Notify;

mod api;
mod arithmetic;
mod config;
mod http;
mod logger;
mod routing;
mod server;
mod store;

use store::{InMemoryUserRepository, MongoUserRepository, UnavailableUserRepository, UserRepository};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| config::DEFAULT_CONFIG_PATH.to_string());
    let cfg = config::Config::load_from(&config_path)?;

    // Log files that cannot be opened are reported, the console sink still works
    if let Err(e) = logger::init(&cfg) {
        logger::log_error(&format!("Failed to open log files: {e}"));
    }

    let mut runtime_builder = tokio::runtime::Builder::new_multi_thread();
    runtime_builder.enable_all();
    if let Some(workers) = cfg.server.workers {
        runtime_builder.worker_threads(workers);
    }
    let runtime = runtime_builder.build()?;

    runtime.block_on(async_main(cfg))
}

async fn async_main(cfg: config::Config) -> Result<(), Box<dyn std::error::Error>> {
    let addr = cfg.get_socket_addr()?;
    let users = open_store(&cfg).await;

    let listener = server::create_reusable_listener(addr, cfg.server.backlog)?;
    logger::log_server_start(&addr, &cfg);

    let shutdown = Arc::new(Notify::new());
    server::start_signal_handler(Arc::clone(&shutdown))?;

    let state = Arc::new(config::AppState::new(cfg, users));
    let active_connections = Arc::new(AtomicUsize::new(0));

    // Connections run as local tasks
    let local = tokio::task::LocalSet::new();
    local
        .run_until(server::start_server_loop(
            listener,
            state,
            active_connections,
            shutdown,
        ))
        .await;
    Ok(())
}

/// Build the configured repository and probe it once.
///
/// Store failures never stop startup; user endpoints answer 500 until the
/// store is reachable.
async fn open_store(cfg: &config::Config) -> Arc<dyn UserRepository> {
    let users: Arc<dyn UserRepository> = match cfg.store.backend {
        config::StoreBackend::Memory => Arc::new(InMemoryUserRepository::new()),
        config::StoreBackend::Mongo => {
            match MongoUserRepository::connect(&cfg.store, &cfg.logging.service).await {
                Ok(repo) => Arc::new(repo),
                Err(e) => {
                    logger::log_store_connect_failed(&e);
                    return Arc::new(UnavailableUserRepository::new(e.to_string()));
                }
            }
        }
    };

    match users.ping().await {
        Ok(()) => logger::log_store_connected(users.backend_name()),
        Err(e) => logger::log_store_connect_failed(&e),
    }
    users
}
