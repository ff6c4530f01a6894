//! # Bookstore API entry point

use std::sync::Arc;

use bookstore_api::Result;
use bookstore_api::config;
use bookstore_api::logging;
use bookstore_api::server::{AppContext, AppState, HttpServer};
use bookstore_api::users::{InMemoryDirectory, UserRecord};

#[tokio::main]
async fn main() -> Result<()> {
    logging::init(None);

    let config = config::load()?;

    // Seeded in-memory directory stands in for the external account service.
    let directory = Arc::new(InMemoryDirectory::new());
    for (index, seed) in config.seed_users.iter().enumerate() {
        directory.insert(UserRecord {
            id: i32::try_from(index + 1).unwrap_or(i32::MAX),
            email: seed.email.clone(),
            password_hash: seed.password_hash.clone(),
            role: seed.role,
            provider: seed.provider,
            status: seed.status,
        });
    }
    tracing::info!(count = config.seed_users.len(), "user directory seeded");

    let server_config = config.server.clone();
    let context = Arc::new(AppContext::build(config, directory).await?);
    let state = AppState::new(Arc::clone(&context));

    // Bounds the rate-limiter map for the lifetime of the process.
    let sweeper = Arc::clone(&context.rate_limiter).spawn_sweeper();

    tracing::info!("service starting");
    let result = HttpServer::new(server_config, state).serve().await;
    sweeper.abort();

    if let Err(e) = result {
        tracing::error!(error = %e, "service failed");
        std::process::exit(1);
    }

    tracing::info!("service shut down");
    Ok(())
}
