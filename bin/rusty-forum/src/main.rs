//! # Rusty-Forum Binary
//!
//! The entry point that assembles the application based on compile-time features.

use anyhow::Context;
use rf_api::{router, AppState};
use rf_config::{LogSettings, Settings};
use secrecy::ExposeSecret;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[cfg(feature = "db-sqlite")]
use rf_db_sqlite::SqliteStore;

#[cfg(feature = "auth-argon2")]
use rf_auth_argon2::{Argon2Hasher, HashCost};

#[cfg(not(all(feature = "db-sqlite", feature = "auth-argon2")))]
compile_error!("rusty-forum needs the `db-sqlite` and `auth-argon2` features");

/// `RUST_LOG` wins over the configured filter.
fn init_tracing(log: &LogSettings) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&log.filter));
    let subscriber = tracing_subscriber::fmt().with_env_filter(filter);
    if log.json {
        subscriber.json().init();
    } else {
        subscriber.init();
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "could not listen for ctrl-c");
        std::future::pending::<()>().await;
    }
    info!("shutting down");
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let settings = Settings::load().context("loading settings")?;
    init_tracing(&settings.log);

    // 1. Storage
    let store = SqliteStore::connect(
        settings.database.url.expose_secret(),
        settings.database.max_connections,
    )
    .await
    .context("opening database")?;
    info!("database opened");

    // 2. Password hashing
    let hasher = Argon2Hasher::new(HashCost {
        memory_kib: settings.auth.memory_kib,
        iterations: settings.auth.iterations,
        parallelism: settings.auth.parallelism,
    })
    .context("configuring password hashing")?;

    // 3. Routes
    let state = AppState::new(
        store.clone(),
        hasher,
        settings.server.clone(),
        settings.pagination.clone(),
    );
    let app = router(state);

    if !settings.server.secure_cookies {
        tracing::warn!("secure cookies disabled; enable server.secure_cookies behind HTTPS");
    }

    let listener = TcpListener::bind(&settings.server.listen)
        .await
        .with_context(|| format!("binding {}", settings.server.listen))?;
    info!("Rusty-Forum listening on http://{}", settings.server.listen);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("serving")?;

    store.close().await;
    Ok(())
}
