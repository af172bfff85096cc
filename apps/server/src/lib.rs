//! # TrAi Server
//!
//! HTTP entrypoint for the TrAi training assistant: `Axum` on top of `SurrealDB`
//! and the in-process event bus. Binds `0.0.0.0:8000` unless configured otherwise.
//!
//! ## Example
//! ```no_run
//! use trai_server::Server;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     Server::builder()
//!         .port(8000)
//!         .build()
//!         .await?
//!         .run()
//!         .await
//! }
//! ```

mod router;

use anyhow::{Context, Result};
use axum::Router;
use axum_server::Handle;
use std::net::SocketAddr;
use std::time::Duration;
use tokio::signal;
use tracing::{error, info, warn};
use trai::domain::config::ApiConfig;
use trai::kernel::server::ApiState;
use trai_database::Database;
use trai_event_bus::EventBus;

const SHUTDOWN_GRACE: Duration = Duration::from_secs(30);

#[must_use = "builders do nothing unless you call .build()"]
#[derive(Debug, Default)]
pub struct ServerBuilder {
    cfg: ApiConfig,
}

impl ServerBuilder {
    pub fn config(mut self, cfg: ApiConfig) -> Self {
        self.cfg = cfg;
        self
    }

    pub fn port(mut self, port: u16) -> Self {
        self.cfg.server.port = port;
        self
    }

    async fn init_database(&self) -> Result<Database> {
        let db_cfg = &self.cfg.database;
        let mut builder =
            Database::builder().url(&db_cfg.url).session(&db_cfg.namespace, &db_cfg.database);

        if let Some(creds) = &db_cfg.credentials {
            builder = builder.auth(&creds.username, &creds.password);
        }

        builder.init().await.context("Failed to establish database connection")
    }

    fn validate_ssl_config(&self) -> Result<()> {
        let Some(ssl) = &self.cfg.server.ssl else {
            return Ok(());
        };
        if !ssl.cert.exists() {
            anyhow::bail!("SSL certificate not found at: {}", ssl.cert.display());
        }
        if !ssl.key.exists() {
            anyhow::bail!("SSL key not found at: {}", ssl.key.display());
        }

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            if ssl.key.metadata()?.permissions().mode() & 0o077 != 0 {
                warn!("SSL private key {} is readable by group or others", ssl.key.display());
            }
        }
        Ok(())
    }

    /// Served under `/static`, so it has to exist before the first request.
    fn prepare_dirs(&self) -> Result<()> {
        let storage = &self.cfg.storage;
        for dir in [&storage.static_dir, &storage.data_dir] {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create directory {}", dir.display()))?;
        }
        Ok(())
    }

    /// Connects the database, runs migrations and seeds, and registers every slice.
    ///
    /// # Errors
    /// * missing or unreadable TLS material;
    /// * the static or data directory cannot be created;
    /// * the database is unreachable or a migration fails;
    /// * a feature slice fails to initialize.
    pub async fn build(self) -> Result<Server> {
        self.validate_ssl_config()?;
        self.prepare_dirs()?;

        let address = SocketAddr::new(self.cfg.server.address, self.cfg.server.port);
        info!(%address, "Initializing server");

        let db = self.init_database().await?;

        let events = EventBus::new();
        let slices =
            trai::init(&self.cfg, &db, &events).await.context("Platform bootstrap failed")?;

        let state = slices
            .into_iter()
            .fold(ApiState::builder().config(self.cfg).db(db).events(events), |builder, slice| {
                builder.register_slice(slice)
            })
            .build()
            .context("Failed to finalize API state registry")?;
        info!(slices = ?state.slice_names(), "Feature slices registered");
        Ok(Server { state })
    }
}

/// Fully initialized server, ready to bind.
#[must_use = "call .run().await to start the server"]
#[derive(Debug)]
pub struct Server {
    state: ApiState,
}

impl Server {
    pub fn builder() -> ServerBuilder {
        ServerBuilder::default()
    }

    /// The complete application router, including docs and static files.
    pub fn router(&self) -> Router {
        router::init(self.state.clone())
    }

    #[must_use]
    pub const fn state(&self) -> &ApiState {
        &self.state
    }

    /// Serves until SIGINT or SIGTERM, then drains connections for up to 30s.
    ///
    /// # Errors
    /// Bind failures and TLS setup errors.
    pub async fn run(self) -> Result<()> {
        let cfg = self.state.config.clone();
        let address = SocketAddr::new(cfg.server.address, cfg.server.port);
        let app = self.router();

        let handle = Handle::<SocketAddr>::new();
        let shutdown_handle = handle.clone();

        tokio::spawn(async move {
            if let Err(e) = shutdown_signal().await {
                error!("Error while waiting for shutdown signal: {e}");
                return;
            }
            info!("Shutdown signal received, starting graceful shutdown...");
            shutdown_handle.graceful_shutdown(Some(SHUTDOWN_GRACE));
        });

        if let Some(ssl_config) = &cfg.server.ssl {
            info!("Starting HTTPS server on https://{address}");

            let tls_config = axum_server::tls_rustls::RustlsConfig::from_pem_file(
                &ssl_config.cert,
                &ssl_config.key,
            )
            .await
            .context("Failed to load SSL/TLS certificates")?;

            axum_server::bind_rustls(address, tls_config)
                .handle(handle)
                .serve(app.into_make_service())
                .await
                .context("HTTPS server failed")?;
        } else {
            info!("Starting HTTP server on http://{address}");

            axum_server::bind(address)
                .handle(handle)
                .serve(app.into_make_service())
                .await
                .context("HTTP server failed")?;
        }

        info!("Server shutdown complete");
        Ok(())
    }
}

async fn shutdown_signal() -> Result<()> {
    let ctrl_c = async { signal::ctrl_c().await.context("Failed to install Ctrl+C handler") };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .context("Failed to install SIGTERM handler")?
            .recv()
            .await;
        Ok::<_, anyhow::Error>(())
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<Result<()>>();

    tokio::select! {
        res = ctrl_c => res?,
        res = terminate => res?,
    }

    Ok(())
}
