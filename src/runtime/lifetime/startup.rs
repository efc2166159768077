use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::{debug, info, warn};

use crate::api::AppState;
use crate::config::StaticConfig;
use crate::services::{GeoIpProvider, build_mailer};
use crate::storage::StorageFactory;

/// 准备服务器启动的上下文
/// 包括存储、邮件发送、GeoIP 以及各业务服务
pub async fn prepare_server_startup(config: &StaticConfig) -> Result<AppState> {
    let start_time = std::time::Instant::now();
    debug!("Starting pre-startup processing...");

    // ring / aws-lc 同时存在时必须显式选择
    if rustls::crypto::ring::default_provider()
        .install_default()
        .is_err()
    {
        debug!("rustls crypto provider already installed");
    }

    let storage = StorageFactory::create(&config.database)
        .await
        .context("Failed to create storage backend")?;
    info!("Using storage backend: {}", storage.get_backend_name());

    let mailer = build_mailer(&config.smtp).context("Failed to configure OTP mailer")?;

    let geoip = GeoIpProvider::new(&config.analytics);

    if config.admin.token.is_empty() {
        info!("Admin API is disabled (admin.token not set)");
    } else {
        info!("Admin API available at: /admin/analytics");
    }

    if !config.session.secure_cookie {
        warn!("session.secure_cookie is disabled, login cookies will be sent over plain HTTP");
    }

    let state = AppState::build(Arc::clone(&storage), config, mailer, geoip);

    info!(
        "Pre-startup completed in {} ms",
        start_time.elapsed().as_millis()
    );
    Ok(state)
}
