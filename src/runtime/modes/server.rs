//! Server mode
//!
//! This module contains the HTTP server startup logic.
//! It configures and starts the HTTP server with all necessary routes.

use actix_cors::Cors;
use actix_web::{
    App, HttpServer,
    middleware::{Compress, Condition, DefaultHeaders},
};
use anyhow::{Context, Result};
use tracing::{info, warn};

use crate::api::configure_app;
use crate::api::middleware::{RequestIdMiddleware, SessionMiddleware};
use crate::config::get_config;
use crate::runtime::lifetime;

/// 最多使用的 worker 数
const MAX_WORKERS: usize = 32;

/// Build CORS middleware from configuration
///
/// 只在配置了 cors_allowed_origins 时启用。
fn build_cors_middleware(allowed_origins: &[String]) -> Cors {
    let cors = Cors::default()
        .allow_any_method()
        .allow_any_header()
        .max_age(3600);

    if allowed_origins.iter().any(|o| o == "*") {
        // 任意来源时不允许携带凭据
        return cors.allow_any_origin();
    }

    allowed_origins
        .iter()
        .fold(cors, |cors, origin| cors.allowed_origin(origin))
        .supports_credentials()
}

/// Run the HTTP server
///
/// **Note**: Logging system must be initialized before calling this function
pub async fn run_server() -> Result<()> {
    let config = get_config();

    let state = lifetime::startup::prepare_server_startup(&config)
        .await
        .inspect_err(|e| tracing::error!("Server startup failed: {}", e))?;

    let cpu_count = config.server.cpu_count.clamp(1, MAX_WORKERS);
    info!("Using {} CPU cores for the server", cpu_count);

    if config.server.trusted_proxies.is_empty() {
        warn!(
            "Client IP: auto-detect mode. Connections from private IPs will use X-Forwarded-For. \
             Configure server.trusted_proxies to restrict this."
        );
    } else {
        info!(
            "Client IP: trusted proxies configured: {:?}",
            config.server.trusted_proxies
        );
    }

    let cors_origins = config.server.cors_allowed_origins.clone();
    let db_for_shutdown = state.storage.get_db().clone();
    let settings = state.settings.clone();

    let server = HttpServer::new(move || {
        App::new()
            .wrap(SessionMiddleware::new(settings.clone()))
            .wrap(Condition::new(
                !cors_origins.is_empty(),
                build_cors_middleware(&cors_origins),
            ))
            .wrap(Compress::default())
            .wrap(
                DefaultHeaders::new()
                    .add(("X-Content-Type-Options", "nosniff"))
                    .add(("Referrer-Policy", "strict-origin-when-cross-origin")),
            )
            .wrap(RequestIdMiddleware)
            .configure(|cfg| configure_app(cfg, &state))
    })
    .keep_alive(std::time::Duration::from_secs(30))
    .client_request_timeout(std::time::Duration::from_millis(5000))
    .client_disconnect_timeout(std::time::Duration::from_millis(1000))
    .workers(cpu_count);

    let bind_address = format!("{}:{}", config.server.host, config.server.port);
    warn!("Starting server at http://{}", bind_address);
    let server = server
        .bind(&bind_address)
        .with_context(|| format!("Failed to bind {}", bind_address))?
        .run();

    // Wait for server or shutdown signal
    tokio::select! {
        res = server => {
            res.context("HTTP server exited with error")?;
        }
        _ = lifetime::shutdown::listen_for_shutdown(&db_for_shutdown) => {
            warn!("Graceful shutdown completed");
        }
    }

    Ok(())
}
