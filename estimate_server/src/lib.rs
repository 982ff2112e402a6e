//! # estimate_server
//!
//! HTTP front-end for [`estimate_core`]. The engine is stateless and shared
//! across requests behind an `Arc`; PDF rendering runs on tokio's blocking
//! pool.

pub mod config;
pub mod error;
pub mod routes;
pub mod shutdown;
pub mod telemetry;

use std::io;

use axum::Router;
use tracing::info;

pub use config::{Config, ConfigError, Environment, FromEnv};
pub use error::{ApiError, ApiResult};
pub use routes::{router, AppState};

/// Bind the configured address and serve until Ctrl-C or SIGTERM.
pub async fn serve(router: Router, config: &Config) -> io::Result<()> {
    let listener = tokio::net::TcpListener::bind(config.address()).await?;

    info!("Server starting on {}", listener.local_addr()?);
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown::shutdown_signal())
        .await
        .inspect_err(|e| {
            tracing::error!("Server encountered an error: {:?}", e);
        })
}
